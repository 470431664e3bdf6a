// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Fixed parameters of the masking protocol.
//!
//! The group is secp256k1, so scalars and field elements are 32 bytes and the
//! canonical (compressed SEC1) point encoding is 33 bytes. Everything that is
//! exchanged between participants is text: points and scalars as lowercase hex,
//! masked counters as decimal digits.

/// Length in bytes of a serialized scalar.
pub(crate) const SCALAR_BYTES: usize = 32;

/// Length in bytes of a compressed SEC1 point.
pub(crate) const COMPRESSED_POINT_BYTES: usize = 33;

/// Length in bytes of an uncompressed SEC1 point, accepted on import only.
pub(crate) const UNCOMPRESSED_POINT_BYTES: usize = 65;

/// Maximum number of candidates drawn when rejection-sampling a scalar.
///
/// A uniformly random 256-bit string lands outside `[1, n)` with probability
/// below 2^-127, so hitting this bound means the random source is broken.
pub(crate) const CRYPTOGRAPHIC_RETRY_MAX: usize = 500usize;
