// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Collector-side summation of masked counters for one round.
//!
//! [`RoundAggregator`] is a reference implementation of the collector's
//! contract: it accepts exactly one masked vector per participant of the
//! round, sums them index by index modulo `q`, and only releases the sums once
//! every participant has submitted. Before that point the sums still contain
//! uncancelled pairwise terms and carry no meaning.

use crate::{
    blinding::Round,
    errors::{InternalError, Result},
    key::PublicKey,
    masking::MaskedCounter,
    participants::ParticipantList,
    utils,
};
use k256::Scalar;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, trace};

/// What the collector expects for one round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// The round identifier participants derived their factors with.
    pub round: Round,
    /// The participant list, in the order handed to participants.
    pub participants: ParticipantList,
    /// Length of every counter vector in the round.
    pub len: usize,
}

/// The unmasked sum at one index, modulo `q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregateValue(Scalar);

impl AggregateValue {
    /// The sum as a native counter, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        utils::scalar_to_u64(&self.0)
    }

    /// Canonical decimal representative.
    pub fn to_decimal(&self) -> String {
        utils::scalar_to_decimal(&self.0)
    }
}

/// Accumulates the masked vectors of one round.
#[derive(Clone, Debug)]
pub struct RoundAggregator {
    config: RoundConfig,
    sums: Vec<Scalar>,
    submitted: Vec<bool>,
}

impl RoundAggregator {
    /// Creates an empty aggregation for `config`.
    pub fn new(config: RoundConfig) -> Self {
        Self {
            sums: vec![Scalar::ZERO; config.len],
            submitted: vec![false; config.participants.len()],
            config,
        }
    }

    /// The round being aggregated.
    pub fn round(&self) -> Round {
        self.config.round
    }

    /// Checks whether a submission from `from` may be aggregated, returning
    /// the submitter's position.
    ///
    /// # Errors
    /// - [`UnknownParticipant`](InternalError::UnknownParticipant) if `from`
    ///   is not in the round's participant list.
    /// - [`DuplicateSubmission`](InternalError::DuplicateSubmission) if `from`
    ///   has already submitted.
    /// - [`LengthMismatch`](InternalError::LengthMismatch) if `masked` does
    ///   not have the round's vector length.
    pub fn validate_submission(&self, from: &PublicKey, masked: &[MaskedCounter]) -> Result<usize> {
        let position = self.config.participants.position_of(from).map_err(|_| {
            error!("Submission for round {} from an unknown key", self.round());
            InternalError::UnknownParticipant
        })?;
        if self.submitted[position] {
            error!(
                "Participant at position {} already submitted for round {}",
                position,
                self.round()
            );
            return Err(InternalError::DuplicateSubmission(position));
        }
        if masked.len() != self.config.len {
            error!(
                "Submission has {} masked counters, round {} expects {}",
                masked.len(),
                self.round(),
                self.config.len
            );
            return Err(InternalError::LengthMismatch {
                expected: self.config.len,
                actual: masked.len(),
            });
        }
        Ok(position)
    }

    /// Validates and adds one participant's masked vector.
    #[instrument(skip_all, fields(round = self.config.round), err(Debug))]
    pub fn submit(&mut self, from: &PublicKey, masked: &[MaskedCounter]) -> Result<()> {
        let position = self.validate_submission(from, masked)?;
        for (sum, value) in self.sums.iter_mut().zip(masked) {
            *sum += value.0;
        }
        self.submitted[position] = true;
        trace!("Accepted submission from position {}", position);
        Ok(())
    }

    /// Like [`RoundAggregator::submit`], for masked counters still in their
    /// decimal wire form.
    pub fn submit_decimal<S: AsRef<str>>(&mut self, from: &PublicKey, masked: &[S]) -> Result<()> {
        let masked = masked
            .iter()
            .map(|text| MaskedCounter::from_decimal(text.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.submit(from, &masked)
    }

    /// Positions that have not submitted yet.
    pub fn missing(&self) -> Vec<usize> {
        self.submitted
            .iter()
            .enumerate()
            .filter(|(_, done)| !**done)
            .map(|(position, _)| position)
            .collect()
    }

    /// Returns `true` once every participant has submitted.
    pub fn is_complete(&self) -> bool {
        self.submitted.iter().all(|done| *done)
    }

    /// Releases the per-index sums of the raw counters.
    ///
    /// Fails with [`IncompleteRound`](InternalError::IncompleteRound) if any
    /// participant is missing; a partial sum would be dominated by
    /// uncancelled blinding terms.
    pub fn finalize(self) -> Result<Vec<AggregateValue>> {
        let missing = self.missing();
        if !missing.is_empty() {
            error!(
                "Round {} cannot be finalized, {} participants missing",
                self.round(),
                missing.len()
            );
            return Err(InternalError::IncompleteRound { missing });
        }
        Ok(self.sums.into_iter().map(AggregateValue).collect())
    }
}
