// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Pairwise-masked secure aggregation of counter vectors
//!
//! Many participants each hold a vector of non-negative counters for a shared
//! round. Each of them sends the collector a masked version of that vector,
//! and the collector, by summing all of the masked vectors, learns the
//! per-index totals and nothing about any single participant's counters.
//!
//! The masks come from pairwise Diffie–Hellman secrets over
//! [secp256k1](https://en.bitcoin.it/wiki/Secp256k1). For every pair of
//! participants and every counter index, both sides hash their shared point
//! together with the index and the round into the same scalar. The
//! participant that comes later in the round's [`ParticipantList`] adds that
//! scalar to its counter, the earlier one subtracts it, so all masks cancel in
//! the sum over a complete round. The cancellation needs every listed
//! participant to submit: a single missing vector leaves the result
//! meaningless, and [`RoundAggregator`] refuses to release it.
//!
//! The pieces, in dependency order:
//! - [`Group`], the explicit curve-group value every component holds;
//! - [`KeyManager`], which creates and imports [`KeyPair`]s;
//! - [`BlindingFactorEngine`], which derives one [`BlindingFactor`] per index;
//! - [`Masker`], which turns counters into [`MaskedCounter`]s;
//! - [`RoundAggregator`], a reference collector that sums a round;
//! - [`Participant`], [`SubmitCommand`] and [`Sketch`] for the client side.
//!
//! Note that this library only provides the computations. Talking to the
//! collector, retrying, scheduling and storing keys are left to the caller.
//!
//! ```
//! use pairwise_secagg::{
//!     Group, Participant, ParticipantList, RoundAggregator, RoundConfig,
//! };
//! use rand::rngs::OsRng;
//!
//! let group = Group::secp256k1();
//! let alice = Participant::generate(group, &mut OsRng).unwrap();
//! let bob = Participant::generate(group, &mut OsRng).unwrap();
//! let participants =
//!     ParticipantList::new(vec![*alice.public_key(), *bob.public_key()]).unwrap();
//!
//! let mut aggregator = RoundAggregator::new(RoundConfig {
//!     round: 7,
//!     participants: participants.clone(),
//!     len: 2,
//! });
//! let masked = alice.mask(&participants, 7, &[3, 1]).unwrap();
//! aggregator.submit(alice.public_key(), &masked).unwrap();
//! let masked = bob.mask(&participants, 7, &[4, 0]).unwrap();
//! aggregator.submit(bob.public_key(), &masked).unwrap();
//!
//! let sums: Vec<_> = aggregator
//!     .finalize()
//!     .unwrap()
//!     .iter()
//!     .map(|value| value.to_u64().unwrap())
//!     .collect();
//! assert_eq!(sums, vec![7, 1]);
//! ```

#![warn(missing_docs)]

#[macro_use]
pub mod errors;

mod aggregator;
mod blinding;
mod group;
mod key;
mod masking;
mod messages;
mod parameters;
mod participant;
mod participants;
mod utils;

pub use aggregator::{AggregateValue, RoundAggregator, RoundConfig};
pub use blinding::{BlindingFactor, BlindingFactorEngine, Round};
pub use group::Group;
pub use key::{KeyManager, KeyPair, PrivateKey, PublicKey};
pub use masking::{MaskedCounter, Masker};
pub use messages::{Sketch, SubmitCommand};
pub use participant::Participant;
pub use participants::ParticipantList;
pub use utils::CurvePoint;
