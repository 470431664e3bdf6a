//! Types for the payloads exchanged with the coordinating service.

// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The service tells a client which sketch to submit with a
//! [`SubmitCommand`], and the client answers with a [`Sketch`]. Both travel as
//! camelCase JSON. Transport, retries and scheduling are the caller's
//! business; this module only fixes the payload shapes and fills in the
//! masked values.

use crate::{
    blinding::Round,
    errors::{InternalError, Result},
    group::Group,
    key::KeyPair,
    masking::MaskedCounter,
    participant::Participant,
    participants::ParticipantList,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, trace};

/// Instruction to submit one sketch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCommand {
    /// Name the sketch is filed under.
    pub sketch_name: String,
    /// Start of the collection period (RFC 3339).
    pub start_time: String,
    /// End of the collection period (RFC 3339).
    pub end_time: String,
    /// Monitored items; counter `i + 1` belongs to `vocabulary[i]`.
    pub vocabulary: Vec<String>,
    /// Hex-encoded participant keys, in the order assigned for the round.
    pub public_keys: Vec<String>,
    /// Round the blinding factors are derived for.
    pub round: Round,
    /// Whether masked values are requested at all.
    pub collect_encrypted: bool,
}

impl SubmitCommand {
    /// Number of counters a sketch for this command carries: one total plus
    /// one per vocabulary item.
    pub fn counter_len(&self) -> usize {
        self.vocabulary.len() + 1
    }

    /// Parses the participant list carried by the command.
    pub fn participants(&self) -> Result<ParticipantList> {
        ParticipantList::from_hex(&self.public_keys[..])
    }
}

/// A client's answer to a [`SubmitCommand`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sketch {
    /// The counters as collected.
    pub raw_values: Vec<u64>,
    /// The masked counters, as decimal strings. Empty when the command did
    /// not ask for them.
    pub encrypted_values: Vec<MaskedCounter>,
}

impl Sketch {
    /// Builds the answer to `command` for the client owning `key_pair`.
    ///
    /// `raw_values` must hold [`SubmitCommand::counter_len`] counters. The
    /// key pair is supplied by the caller and is never part of the command.
    #[instrument(skip_all, fields(sketch = %command.sketch_name, round = command.round), err(Debug))]
    pub fn build(
        group: Group,
        command: &SubmitCommand,
        key_pair: &KeyPair,
        raw_values: Vec<u64>,
    ) -> Result<Self> {
        if raw_values.len() != command.counter_len() {
            error!(
                "Sketch has {} counters but the vocabulary implies {}",
                raw_values.len(),
                command.counter_len()
            );
            return Err(InternalError::LengthMismatch {
                expected: command.counter_len(),
                actual: raw_values.len(),
            });
        }

        let encrypted_values = if command.collect_encrypted {
            let participants = command.participants()?;
            Participant::new(group, key_pair.clone()).mask(
                &participants,
                command.round,
                &raw_values,
            )?
        } else {
            trace!("Masked values not requested");
            vec![]
        };

        Ok(Self {
            raw_values,
            encrypted_values,
        })
    }
}
