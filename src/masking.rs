// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Masking of raw counters with blinding factors.

use crate::{
    blinding::BlindingFactor,
    errors::{InternalError, Result},
    group::Group,
    utils,
};
use k256::Scalar;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use tracing::{error, instrument};

/// A counter hidden under its blinding factor: `(factor + counter) mod q`.
///
/// This is the only per-participant value that leaves the participant. It is
/// written on the wire as a decimal string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskedCounter(pub(crate) Scalar);

impl MaskedCounter {
    /// Canonical decimal representative in `[0, q)`.
    pub fn to_decimal(&self) -> String {
        utils::scalar_to_decimal(&self.0)
    }

    /// Parses a decimal string, rejecting values that are not below `q`.
    pub fn from_decimal(text: &str) -> Result<Self> {
        Ok(Self(utils::scalar_from_decimal(text)?))
    }
}

impl Display for MaskedCounter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl Serialize for MaskedCounter {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for MaskedCounter {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        MaskedCounter::from_decimal(&text).map_err(serde::de::Error::custom)
    }
}

/// Adds blinding factors to raw counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct Masker {
    group: Group,
}

impl Masker {
    /// Creates a masker over `group`.
    pub fn new(group: Group) -> Self {
        Self { group }
    }

    /// Masks `counters[l]` with `blinding_factors[l]` for every index.
    ///
    /// The two slices must have the same length; an empty pair of slices
    /// yields an empty result.
    #[instrument(skip_all, err(Debug))]
    pub fn mask_counters(
        &self,
        blinding_factors: &[BlindingFactor],
        counters: &[u64],
    ) -> Result<Vec<MaskedCounter>> {
        if blinding_factors.len() != counters.len() {
            error!(
                "Cannot mask {} counters with {} blinding factors",
                counters.len(),
                blinding_factors.len()
            );
            return Err(InternalError::LengthMismatch {
                expected: blinding_factors.len(),
                actual: counters.len(),
            });
        }
        Ok(blinding_factors
            .iter()
            .zip(counters)
            .map(|(factor, counter)| {
                MaskedCounter(factor.0 + self.group.counter_to_scalar(*counter))
            })
            .collect())
    }
}
