// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A list of error types which are produced while deriving, masking or
//! aggregating counters
use thiserror::Error;

/// The default Result type used in this crate
pub type Result<T> = std::result::Result<T, InternalError>;

/// Represents an error in the manipulation of keys, blinding factors or
/// masked counters
#[derive(Clone, Eq, PartialEq, Error, Debug)]
pub enum InternalError {
    /// A key, scalar or masked counter could not be decoded
    #[error("Invalid encoding: `{0}`")]
    InvalidEncoding(String),
    /// The caller's own public key does not appear in the participant list
    #[error("Own public key was not found among the participants of the round")]
    ParticipantNotFound,
    /// The same public key appears more than once in a participant list
    #[error("Public key appears more than once in the participant list (position {0})")]
    DuplicateParticipant(usize),
    /// Two sequences that must be index-aligned have different lengths
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// The length that was required
        expected: usize,
        /// The length that was supplied
        actual: usize,
    },
    /// The secure random source failed or kept producing unusable values
    #[error("Secure random number generation failed")]
    RandomnessFailure,
    /// A submission came from a key outside the round's participant list
    #[error("Submission from a public key that is not part of this round")]
    UnknownParticipant,
    /// A participant already submitted for this round
    #[error("Participant at position {0} already submitted for this round")]
    DuplicateSubmission(usize),
    /// The round cannot be finalized until every participant has submitted
    #[error("Round is incomplete, missing submissions from positions {missing:?}")]
    IncompleteRound {
        /// Positions in the participant list that have not submitted
        missing: Vec<usize>,
    },
    /// Binary or JSON (de)serialization failed
    #[error("Serialization Error")]
    Serialization,
}

macro_rules! serialize {
    ($x:expr) => {{
        bincode::serialize($x).or(Err(crate::errors::InternalError::Serialization))
    }};
}

macro_rules! deserialize {
    ($x:expr) => {{
        bincode::deserialize($x).or(Err(crate::errors::InternalError::Serialization))
    }};
}

macro_rules! encoding_err {
    ($x:expr) => {{
        Err(crate::errors::InternalError::InvalidEncoding(String::from(
            $x,
        )))
    }};
}
