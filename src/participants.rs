// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The ordered list of public keys taking part in a round.
//!
//! Positions in a [`ParticipantList`] decide the sign of every pairwise term:
//! the higher-positioned participant adds the shared term and the lower one
//! subtracts it. The coordinating service assigns the order and every
//! participant, as well as the aggregator, must use the same list. This crate
//! never reorders it.

use crate::{
    errors::{InternalError, Result},
    key::PublicKey,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

/// An ordered, duplicate-free sequence of participant public keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PublicKey>", into = "Vec<PublicKey>")]
pub struct ParticipantList {
    keys: Vec<PublicKey>,
    positions: HashMap<PublicKey, usize>,
}

impl ParticipantList {
    /// Builds the list, keeping the given order. Fails if a key appears
    /// twice.
    pub fn new(keys: Vec<PublicKey>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            if positions.insert(*key, position).is_some() {
                error!(
                    "Public key at position {} already appears earlier in the list",
                    position
                );
                return Err(InternalError::DuplicateParticipant(position));
            }
        }
        Ok(Self { keys, positions })
    }

    /// Parses every hex-encoded key, then builds the list.
    pub fn from_hex<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        let keys = keys
            .iter()
            .map(|key| PublicKey::from_hex(key.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(keys)
    }

    /// Position of `key`, failing with
    /// [`ParticipantNotFound`](InternalError::ParticipantNotFound) if it is
    /// not part of the round.
    pub fn position_of(&self, key: &PublicKey) -> Result<usize> {
        self.positions.get(key).copied().ok_or_else(|| {
            error!("Public key is not part of the participant list");
            InternalError::ParticipantNotFound
        })
    }

    /// Returns `true` if `key` is part of the round.
    pub fn contains(&self, key: &PublicKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of participants.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the list has no participants.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over the keys in list order.
    pub fn iter(&self) -> impl Iterator<Item = &PublicKey> {
        self.keys.iter()
    }

    /// The canonical hex encodings, in list order.
    pub fn to_hex(&self) -> Vec<String> {
        self.keys.iter().map(PublicKey::to_hex).collect()
    }
}

impl TryFrom<Vec<PublicKey>> for ParticipantList {
    type Error = InternalError;

    fn try_from(keys: Vec<PublicKey>) -> Result<Self> {
        Self::new(keys)
    }
}

impl From<ParticipantList> for Vec<PublicKey> {
    fn from(list: ParticipantList) -> Self {
        list.keys
    }
}
