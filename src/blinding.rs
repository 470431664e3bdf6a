// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Derivation of per-index blinding factors from pairwise shared secrets.
//!
//! Participant `i` at position `p_i` and participant `j` at position `p_j`
//! both compute the same Diffie–Hellman point `S_ij`. For counter index `l`
//! and round `r` they hash it to the same scalar
//!
//! ```text
//! n_ijl = SHA-256(hex(S_ij) ++ decimal(l) ++ decimal(r)) mod q
//! ```
//!
//! The participant with the higher position adds `n_ijl` to its blinding
//! factor for `l`, the lower-positioned one subtracts it. Put differently,
//! peers listed before us contribute `+n`, peers listed after us `-n`. Summed over all participants
//! every pairwise term appears once with each sign, so the blinding factors
//! of a complete round sum to zero for every index. A participant that does
//! not submit leaves its terms uncancelled in everybody else's factors.

use crate::{
    errors::Result,
    group::Group,
    key::{KeyPair, PublicKey},
    participants::ParticipantList,
    utils,
};
use k256::Scalar;
use std::cmp::Ordering;
use tracing::{instrument, trace};
use zeroize::Zeroizing;

/// Identifier of an aggregation window.
pub type Round = u64;

/// The scalar added to the counter at one index, in `[0, q)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlindingFactor(pub(crate) Scalar);

impl BlindingFactor {
    /// Returns `true` if this factor would leave the counter unmasked.
    pub fn is_zero(&self) -> bool {
        self.0 == Scalar::ZERO
    }

    /// Canonical decimal representative.
    pub fn to_decimal(&self) -> String {
        utils::scalar_to_decimal(&self.0)
    }
}

/// Whether a peer's pairwise term is added or subtracted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    /// The peer sits before us in the list: add.
    Before,
    /// The peer sits after us in the list: subtract.
    After,
}

/// Computes blinding factors for one participant.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlindingFactorEngine {
    group: Group,
}

impl BlindingFactorEngine {
    /// Creates an engine over `group`.
    pub fn new(group: Group) -> Self {
        Self { group }
    }

    /// The pairwise term shared between `own` and `peer` for index `index`
    /// in `round`. Both ends of the pair compute the same value.
    pub fn pairwise_term(
        &self,
        own: &KeyPair,
        peer: &PublicKey,
        index: usize,
        round: Round,
    ) -> Scalar {
        let text = own.private_key().diffie_hellman(peer).to_text();
        self.group.hash_to_scalar(&text, index, round)
    }

    /// Derives `len` blinding factors for `own` in `round`.
    ///
    /// Fails with
    /// [`ParticipantNotFound`](crate::errors::InternalError::ParticipantNotFound)
    /// if `own` is not in `participants`. `len == 0` yields an empty vector.
    ///
    /// Shared secrets are computed once per peer for this call and dropped
    /// when it returns.
    #[instrument(skip_all, fields(participants = participants.len(), len = len, round = round), err(Debug))]
    pub fn blinding_factors(
        &self,
        participants: &ParticipantList,
        own: &KeyPair,
        len: usize,
        round: Round,
    ) -> Result<Vec<BlindingFactor>> {
        let self_index = participants.position_of(own.public_key())?;
        trace!("Deriving blinding factors at position {}", self_index);

        let peers: Vec<(Side, Zeroizing<String>)> = participants
            .iter()
            .enumerate()
            .filter_map(|(idx, peer)| {
                let side = match idx.cmp(&self_index) {
                    Ordering::Less => Side::Before,
                    Ordering::Greater => Side::After,
                    Ordering::Equal => return None,
                };
                Some((side, own.private_key().diffie_hellman(peer).to_text()))
            })
            .collect();

        let factors = (0..len)
            .map(|l| {
                let mut k = Scalar::ZERO;
                for (side, text) in &peers {
                    let term = self.group.hash_to_scalar(text, l, round);
                    match side {
                        Side::Before => k += term,
                        Side::After => k -= term,
                    }
                }
                BlindingFactor(k)
            })
            .collect();
        Ok(factors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{errors::InternalError, key::KeyManager, utils::testing::init_testing};
    use rand::{CryptoRng, RngCore};

    fn setup<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> (Vec<KeyPair>, ParticipantList) {
        let manager = KeyManager::default();
        let pairs: Vec<KeyPair> = (0..n)
            .map(|_| manager.generate_key_pair(rng).unwrap())
            .collect();
        let list = ParticipantList::new(pairs.iter().map(|p| *p.public_key()).collect()).unwrap();
        (pairs, list)
    }

    #[test]
    fn factors_cancel_across_a_complete_round() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, list) = setup(&mut rng, 4);
        let len = 6;

        let mut sums = vec![Scalar::ZERO; len];
        for pair in &pairs {
            let factors = engine.blinding_factors(&list, pair, len, 9).unwrap();
            assert_eq!(factors.len(), len);
            for (sum, factor) in sums.iter_mut().zip(&factors) {
                *sum += factor.0;
            }
        }
        assert!(sums.iter().all(|s| *s == Scalar::ZERO));
    }

    #[test]
    fn pairwise_term_is_symmetric() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, _) = setup(&mut rng, 2);
        for l in 0..3 {
            assert_eq!(
                engine.pairwise_term(&pairs[0], pairs[1].public_key(), l, 4),
                engine.pairwise_term(&pairs[1], pairs[0].public_key(), l, 4)
            );
        }
    }

    #[test]
    fn signs_follow_list_positions() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, list) = setup(&mut rng, 3);
        let (a, b, c) = (&pairs[0], &pairs[1], &pairs[2]);
        let round = 17;

        let factors_a = engine.blinding_factors(&list, a, 4, round).unwrap();
        let factors_b = engine.blinding_factors(&list, b, 4, round).unwrap();
        let factors_c = engine.blinding_factors(&list, c, 4, round).unwrap();
        for l in 0..4 {
            let ab = engine.pairwise_term(a, b.public_key(), l, round);
            let ac = engine.pairwise_term(a, c.public_key(), l, round);
            let bc = engine.pairwise_term(b, c.public_key(), l, round);
            // A is first: both of its peers come later, so it subtracts.
            assert_eq!(factors_a[l].0, -(ab + ac));
            assert_eq!(factors_b[l].0, ab - bc);
            assert_eq!(factors_c[l].0, ac + bc);
        }
    }

    #[test]
    fn pairwise_term_uses_hex_of_shared_point() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, _) = setup(&mut rng, 2);
        let shared = crate::utils::CurvePoint(
            pairs[1].public_key().point().0
                * utils::scalar_from_hex(&pairs[0].private_key().to_hex()).unwrap(),
        );
        let expected = utils::hash_to_scalar(&shared.to_hex(), 3, 11);
        assert_eq!(
            engine.pairwise_term(&pairs[0], pairs[1].public_key(), 3, 11),
            expected
        );
    }

    #[test]
    fn derivation_is_deterministic_and_round_dependent() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, list) = setup(&mut rng, 3);

        let first = engine.blinding_factors(&list, &pairs[1], 5, 1).unwrap();
        let again = engine.blinding_factors(&list, &pairs[1], 5, 1).unwrap();
        let next_round = engine.blinding_factors(&list, &pairs[1], 5, 2).unwrap();
        assert_eq!(first, again);
        assert_ne!(first, next_round);
        assert!(first.iter().all(|f| !f.is_zero()));
    }

    #[test]
    fn zero_length_yields_no_factors() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, list) = setup(&mut rng, 3);
        assert!(engine
            .blinding_factors(&list, &pairs[0], 0, 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn single_participant_gets_zero_factors() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (pairs, list) = setup(&mut rng, 1);
        let factors = engine.blinding_factors(&list, &pairs[0], 3, 0).unwrap();
        assert!(factors.iter().all(BlindingFactor::is_zero));
    }

    #[test]
    fn absent_participant_is_an_error() {
        let mut rng = init_testing();
        let engine = BlindingFactorEngine::default();
        let (_pairs, list) = setup(&mut rng, 3);
        let outsider = KeyManager::default().generate_key_pair(&mut rng).unwrap();
        assert_eq!(
            engine.blinding_factors(&list, &outsider, 4, 0),
            Err(InternalError::ParticipantNotFound)
        );
        assert_eq!(
            engine.blinding_factors(&list, &outsider, 0, 0),
            Err(InternalError::ParticipantNotFound)
        );
    }
}
