// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    errors::Result,
    parameters::{COMPRESSED_POINT_BYTES, SCALAR_BYTES, UNCOMPRESSED_POINT_BYTES},
};
use k256::{
    elliptic_curve::{
        bigint::U256,
        ops::Reduce,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        PrimeField,
    },
    AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar,
};
use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use tracing::error;

/// Wrapper around k256::ProjectivePoint so that we can define our own
/// serialization/deserialization for it
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CurvePoint(pub k256::ProjectivePoint);

impl CurvePoint {
    pub(crate) const IDENTITY: Self = CurvePoint(ProjectivePoint::IDENTITY);

    /// Serialize the point as a compressed SEC1 byte array.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_affine().to_encoded_point(true).as_bytes().to_vec()
    }

    /// The canonical textual form of the point: lowercase hex of the
    /// compressed SEC1 encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Deserialize a point from a compressed or uncompressed SEC1 encoding.
    /// The identity point is rejected.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMPRESSED_POINT_BYTES && bytes.len() != UNCOMPRESSED_POINT_BYTES {
            error!(
                "Point encoding has {} bytes, expected {} or {}",
                bytes.len(),
                COMPRESSED_POINT_BYTES,
                UNCOMPRESSED_POINT_BYTES
            );
            return encoding_err!("point encoding has the wrong length");
        }
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| {
            error!("Failed to parse bytes as a SEC1 point");
            crate::errors::InternalError::InvalidEncoding(String::from("malformed SEC1 point"))
        })?;
        let point: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
        match point {
            Some(point) => {
                let point = CurvePoint(point.into());
                if point == Self::IDENTITY {
                    error!("Refusing to import the identity point");
                    return encoding_err!("point is the identity");
                }
                Ok(point)
            }
            None => {
                error!("Failed to encode bytes as a curve point");
                encoding_err!("point is not on the curve")
            }
        }
    }

    /// Parse the hex form produced by [`CurvePoint::to_hex`].
    pub fn from_hex(text: &str) -> Result<Self> {
        let bytes = decode_hex(text)?;
        Self::try_from_bytes(&bytes)
    }
}

impl Serialize for CurvePoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        CurvePoint::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn decode_hex(text: &str) -> Result<Vec<u8>> {
    hex::decode(text).or_else(|_| {
        error!("Input is not valid hexadecimal");
        encoding_err!("not valid hexadecimal")
    })
}

/// Parses 32 big-endian bytes as a scalar, failing if the value is not in
/// `[0, q)`.
pub(crate) fn scalar_from_bytes(bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() != SCALAR_BYTES {
        error!(
            "Scalar encoding has {} bytes, expected {}",
            bytes.len(),
            SCALAR_BYTES
        );
        return encoding_err!("scalar encoding has the wrong length");
    }
    let scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::clone_from_slice(bytes)).into();
    scalar.ok_or_else(|| {
        error!("Scalar encoding is not reduced modulo the group order");
        crate::errors::InternalError::InvalidEncoding(String::from(
            "scalar is not smaller than the group order",
        ))
    })
}

pub(crate) fn scalar_to_hex(scalar: &Scalar) -> String {
    hex::encode(scalar.to_bytes())
}

pub(crate) fn scalar_from_hex(text: &str) -> Result<Scalar> {
    let bytes = decode_hex(text)?;
    scalar_from_bytes(&bytes)
}

pub(crate) fn scalar_to_biguint(scalar: &Scalar) -> BigUint {
    BigUint::from_bytes_be(&scalar.to_bytes())
}

/// Renders a scalar as its canonical decimal representative in `[0, q)`.
pub(crate) fn scalar_to_decimal(scalar: &Scalar) -> String {
    scalar_to_biguint(scalar).to_str_radix(10)
}

/// Parses a decimal string as a scalar. Values that are not in `[0, q)` are
/// rejected rather than reduced.
pub(crate) fn scalar_from_decimal(text: &str) -> Result<Scalar> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        error!("Input is not a decimal number");
        return encoding_err!("not a decimal number");
    }
    let value = BigUint::parse_bytes(text.as_bytes(), 10).ok_or_else(|| {
        error!("Input is not a decimal number");
        crate::errors::InternalError::InvalidEncoding(String::from("not a decimal number"))
    })?;
    let bytes = value.to_bytes_be();
    if bytes.len() > SCALAR_BYTES {
        error!("Decimal value does not fit in a scalar");
        return encoding_err!("scalar is not smaller than the group order");
    }
    let mut padded = [0u8; SCALAR_BYTES];
    padded[SCALAR_BYTES - bytes.len()..].copy_from_slice(&bytes);
    scalar_from_bytes(&padded)
}

/// Returns the scalar as a `u64` if its canonical representative fits.
pub(crate) fn scalar_to_u64(scalar: &Scalar) -> Option<u64> {
    let bytes = scalar.to_bytes();
    let (high, low) = bytes.split_at(SCALAR_BYTES - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut word = [0u8; 8];
    word.copy_from_slice(low);
    Some(u64::from_be_bytes(word))
}

/// Builds the digest input `text ++ decimal(index) ++ decimal(round)`.
///
/// This is plain string concatenation with no separators. Every participant
/// must produce these exact bytes, or pairwise terms stop cancelling.
pub(crate) fn digest_input(text: &str, index: usize, round: u64) -> String {
    format!("{}{}{}", text, index, round)
}

/// SHA-256 of the digest input, read as a big-endian integer and reduced
/// modulo the group order.
pub(crate) fn hash_to_scalar(text: &str, index: usize, round: u64) -> Scalar {
    let digest = Sha256::digest(digest_input(text, index, round).as_bytes());
    <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(&digest))
}
