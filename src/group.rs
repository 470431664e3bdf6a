// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! The prime-order group that every other component computes in.
//!
//! A [`Group`] is an immutable value handed to the key manager, the blinding
//! factor engine, the masker and the aggregator. Nothing in this crate reaches
//! for an implicit global curve instance.
//!
//! The element types are the `k256` point and scalar types, so secp256k1 is
//! the only group a [`Group`] value can describe. Decoding keys still goes
//! through the value so every import names the group it targets.

use crate::{
    errors::{InternalError, Result},
    parameters::{CRYPTOGRAPHIC_RETRY_MAX, SCALAR_BYTES},
    utils::{self, CurvePoint},
};
use k256::{elliptic_curve::PrimeField, FieldBytes, ProjectivePoint, Scalar};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::error;

/// The secp256k1 group: its generator, its order `q`, and the scalar
/// arithmetic modulo `q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Group {
    generator: CurvePoint,
}

impl Default for Group {
    fn default() -> Self {
        Self::secp256k1()
    }
}

impl Group {
    /// The secp256k1 group with its standard base point.
    pub fn secp256k1() -> Self {
        Self {
            generator: CurvePoint(ProjectivePoint::GENERATOR),
        }
    }

    /// The base point `G`.
    pub fn generator(&self) -> CurvePoint {
        self.generator
    }

    /// The group order `q`.
    pub fn order(&self) -> BigUint {
        // q - 1 is the largest canonical scalar.
        utils::scalar_to_biguint(&-Scalar::ONE) + 1u32
    }

    /// Computes `scalar · G`.
    pub(crate) fn scale_generator(&self, scalar: &Scalar) -> CurvePoint {
        CurvePoint(self.generator.0 * scalar)
    }

    /// Embeds a raw counter as a scalar. Counters are far below `q`, so this
    /// never wraps.
    pub(crate) fn counter_to_scalar(&self, counter: u64) -> Scalar {
        Scalar::from(counter)
    }

    /// Samples a uniformly random scalar in `[1, q)`.
    ///
    /// Candidates are drawn as 32 random bytes and rejected when they are zero
    /// or not below `q`. Failures of the random source are reported instead of
    /// panicking.
    pub(crate) fn random_scalar<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Scalar> {
        for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
            let mut bytes = [0u8; SCALAR_BYTES];
            rng.try_fill_bytes(&mut bytes).map_err(|e| {
                error!("Secure random source failed: {}", e);
                InternalError::RandomnessFailure
            })?;
            let candidate: Option<Scalar> =
                Scalar::from_repr(FieldBytes::clone_from_slice(&bytes)).into();
            if let Some(scalar) = candidate {
                if scalar != Scalar::ZERO {
                    return Ok(scalar);
                }
            }
        }
        error!(
            "Random source produced no usable scalar in {} attempts",
            CRYPTOGRAPHIC_RETRY_MAX
        );
        Err(InternalError::RandomnessFailure)
    }

    /// Decodes a hex SEC1 point, compressed or uncompressed, as a group
    /// element. Off-curve points and the identity are rejected.
    pub(crate) fn decode_point(&self, text: &str) -> Result<CurvePoint> {
        CurvePoint::from_hex(text)
    }

    /// Decodes a hex private scalar, which must lie in `[1, q)`.
    pub(crate) fn decode_private_scalar(&self, text: &str) -> Result<Scalar> {
        let scalar = utils::scalar_from_hex(text)?;
        if scalar == Scalar::ZERO {
            error!("Refusing to import a zero private key");
            return encoding_err!("private key is zero");
        }
        Ok(scalar)
    }

    /// Maps `(text, index, round)` to a scalar: SHA-256 over the string
    /// `text ++ decimal(index) ++ decimal(round)`, read big-endian and
    /// reduced modulo `q`.
    pub fn hash_to_scalar(&self, text: &str, index: usize, round: u64) -> Scalar {
        utils::hash_to_scalar(text, index, round)
    }
}
