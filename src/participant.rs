// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A participant that masks its counters for a round.

use crate::{
    blinding::{BlindingFactorEngine, Round},
    errors::Result,
    group::Group,
    key::{KeyManager, KeyPair, PublicKey},
    masking::{MaskedCounter, Masker},
    participants::ParticipantList,
};
use rand::{CryptoRng, RngCore};
use tracing::{info, instrument};

/// Holds one participant's key pair together with the group it lives in.
///
/// Nothing derived from a round is kept between calls: every call to
/// [`Participant::mask`] recomputes the blinding factors from scratch.
#[derive(Debug)]
pub struct Participant {
    key_pair: KeyPair,
    engine: BlindingFactorEngine,
    masker: Masker,
}

impl Participant {
    /// Wraps an existing key pair.
    pub fn new(group: Group, key_pair: KeyPair) -> Self {
        Self {
            key_pair,
            engine: BlindingFactorEngine::new(group),
            masker: Masker::new(group),
        }
    }

    /// Creates a participant with a freshly generated key pair.
    pub fn generate<R: RngCore + CryptoRng>(group: Group, rng: &mut R) -> Result<Self> {
        let key_pair = KeyManager::new(group).generate_key_pair(rng)?;
        Ok(Self::new(group, key_pair))
    }

    /// This participant's public key, as it must appear in participant lists.
    pub fn public_key(&self) -> &PublicKey {
        self.key_pair.public_key()
    }

    /// The key pair, for persistence by the caller.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Masks `counters` for `round`.
    ///
    /// Fails with
    /// [`ParticipantNotFound`](crate::errors::InternalError::ParticipantNotFound)
    /// if this participant's key is not in `participants`; there is no
    /// fallback that would send an empty or unmasked vector.
    #[instrument(skip_all, fields(round = round, len = counters.len()), err(Debug))]
    pub fn mask(
        &self,
        participants: &ParticipantList,
        round: Round,
        counters: &[u64],
    ) -> Result<Vec<MaskedCounter>> {
        let factors =
            self.engine
                .blinding_factors(participants, &self.key_pair, counters.len(), round)?;
        let masked = self.masker.mask_counters(&factors, counters)?;
        info!(
            "Masked {} counters among {} participants",
            masked.len(),
            participants.len()
        );
        Ok(masked)
    }
}
