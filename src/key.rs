// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Participant key pairs and their textual encodings.

use crate::{
    errors::{InternalError, Result},
    group::Group,
    utils::{self, CurvePoint},
};
use k256::Scalar;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Debug, Formatter},
    hash::{Hash, Hasher},
};
use tracing::{error, instrument};
use zeroize::{Zeroize, Zeroizing};

/// A participant's public key: a non-identity point on the curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(CurvePoint);

impl PublicKey {
    /// Parses a hex-encoded SEC1 point (compressed or uncompressed) on
    /// secp256k1, the only group this key type can hold.
    pub fn from_hex(text: &str) -> Result<Self> {
        KeyManager::new(Group::secp256k1()).import_public(text)
    }

    /// The canonical encoding: lowercase hex of the compressed SEC1 point.
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    pub(crate) fn point(&self) -> &CurvePoint {
        &self.0
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bytes().hash(state)
    }
}

/// A participant's private key, a scalar in `[1, q)`.
///
/// The scalar is wiped when the key is dropped and never shows up in `Debug`
/// output.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(Scalar);

impl PrivateKey {
    /// Parses a 32-byte big-endian secp256k1 scalar written as hex.
    pub fn from_hex(text: &str) -> Result<Self> {
        KeyManager::new(Group::secp256k1()).import_private(text)
    }

    /// Lowercase hex of the 32-byte big-endian scalar.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(utils::scalar_to_hex(&self.0))
    }

    /// The Diffie–Hellman shared point `self · peer`.
    pub(crate) fn diffie_hellman(&self, peer: &PublicKey) -> SharedSecret {
        SharedSecret(CurvePoint(peer.point().0 * self.0))
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey([redacted])")
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// The point two participants agree on through Diffie–Hellman.
pub(crate) struct SharedSecret(CurvePoint);

impl SharedSecret {
    /// Textual form fed into the pairwise digest: lowercase hex of the
    /// compressed point.
    pub(crate) fn to_text(&self) -> Zeroizing<String> {
        Zeroizing::new(self.0.to_hex())
    }
}

/// A participant's long-lived key pair.
///
/// Invariant: `public_key = private_key · G`. Serializes to
/// `{"publicKey": "<hex>", "privateKey": "<hex>"}` and the invariant is
/// checked again on deserialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "EncodedKeyPair", into = "EncodedKeyPair")]
pub struct KeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl KeyPair {
    /// The public half.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The private half.
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    /// Compact binary form for local persistence.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serialize!(&self)
    }

    /// Inverse of [`KeyPair::to_bytes`].
    pub fn from_slice<B: Clone + AsRef<[u8]>>(buf: B) -> Result<Self> {
        deserialize!(&buf.as_ref()[..])
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodedKeyPair {
    public_key: String,
    private_key: String,
}

impl Drop for EncodedKeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

impl From<KeyPair> for EncodedKeyPair {
    fn from(pair: KeyPair) -> Self {
        Self {
            public_key: pair.public_key.to_hex(),
            private_key: utils::scalar_to_hex(&pair.private_key.0),
        }
    }
}

impl TryFrom<EncodedKeyPair> for KeyPair {
    type Error = InternalError;

    // Deserialization carries no group. The key types only hold secp256k1
    // elements, so that is the group the pair is checked against.
    fn try_from(encoded: EncodedKeyPair) -> Result<Self> {
        KeyManager::new(Group::secp256k1())
            .import_key_pair(&encoded.public_key, &encoded.private_key)
    }
}

/// Generates, imports and exports key pairs for one [`Group`].
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyManager {
    group: Group,
}

impl KeyManager {
    /// Creates a key manager over `group`.
    pub fn new(group: Group) -> Self {
        Self { group }
    }

    /// Draws a fresh key pair uniformly at random. The only failure is an
    /// unusable random source.
    #[instrument(skip_all, err(Debug))]
    pub fn generate_key_pair<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<KeyPair> {
        let private_key = PrivateKey(self.group.random_scalar(rng)?);
        let public_key = PublicKey(self.group.scale_generator(&private_key.0));
        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    /// Parses a hex-encoded private key.
    pub fn import_private(&self, encoding: &str) -> Result<PrivateKey> {
        Ok(PrivateKey(self.group.decode_private_scalar(encoding)?))
    }

    /// Parses a hex-encoded public key.
    pub fn import_public(&self, encoding: &str) -> Result<PublicKey> {
        Ok(PublicKey(self.group.decode_point(encoding)?))
    }

    /// Parses both halves and checks that the public key belongs to the
    /// private key.
    pub fn import_key_pair(&self, public: &str, private: &str) -> Result<KeyPair> {
        let public_key = self.import_public(public)?;
        let private_key = self.import_private(private)?;
        if self.group.scale_generator(&private_key.0) != public_key.0 {
            error!("Imported public key does not match the private key");
            return encoding_err!("public key does not match private key");
        }
        Ok(KeyPair {
            public_key,
            private_key,
        })
    }

    /// Recomputes the public key of `private_key`.
    pub fn public_key_of(&self, private_key: &PrivateKey) -> PublicKey {
        PublicKey(self.group.scale_generator(&private_key.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::{init_testing, BrokenRng};

    #[test]
    fn generated_key_pair_is_consistent() {
        let mut rng = init_testing();
        let manager = KeyManager::default();
        let pair = manager.generate_key_pair(&mut rng).unwrap();
        assert_eq!(manager.public_key_of(pair.private_key()), *pair.public_key());

        let other = manager.generate_key_pair(&mut rng).unwrap();
        assert_ne!(pair.public_key(), other.public_key());
    }

    #[test]
    fn key_generation_reports_broken_randomness() {
        let manager = KeyManager::new(Group::secp256k1());
        assert_eq!(
            manager.generate_key_pair(&mut BrokenRng),
            Err(InternalError::RandomnessFailure)
        );
        assert!(crate::Participant::generate(Group::secp256k1(), &mut BrokenRng).is_err());
    }

    #[test]
    fn imports_agree_across_entry_points() {
        let mut rng = init_testing();
        let manager = KeyManager::new(Group::secp256k1());
        let pair = manager.generate_key_pair(&mut rng).unwrap();
        let public_hex = pair.public_key().to_hex();
        let private_hex = pair.private_key().to_hex();

        assert_eq!(
            manager.import_public(&public_hex).unwrap(),
            PublicKey::from_hex(&public_hex).unwrap()
        );
        assert_eq!(
            manager.import_private(&private_hex).unwrap(),
            PrivateKey::from_hex(&private_hex).unwrap()
        );
        let from_json: KeyPair = serde_json::from_value(serde_json::json!({
            "publicKey": public_hex,
            "privateKey": private_hex.as_str(),
        }))
        .unwrap();
        assert_eq!(
            from_json,
            manager.import_key_pair(&public_hex, &private_hex).unwrap()
        );
    }

    #[test]
    fn hex_encodings_roundtrip() {
        let mut rng = init_testing();
        let manager = KeyManager::default();
        let pair = manager.generate_key_pair(&mut rng).unwrap();

        let public_hex = pair.public_key().to_hex();
        assert_eq!(public_hex.len(), 66);
        assert_eq!(public_hex, public_hex.to_lowercase());
        let private_hex = pair.private_key().to_hex();
        assert_eq!(private_hex.len(), 64);

        let imported = manager.import_key_pair(&public_hex, &private_hex).unwrap();
        assert_eq!(imported, pair);
    }

    #[test]
    fn key_pair_is_json_serializable() {
        let mut rng = init_testing();
        let pair = KeyManager::default().generate_key_pair(&mut rng).unwrap();

        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["publicKey"], pair.public_key().to_hex());
        assert_eq!(json["privateKey"], pair.private_key().to_hex().as_str());

        let roundtrip: KeyPair = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip, pair);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = init_testing();
        let pair = KeyManager::default().generate_key_pair(&mut rng).unwrap();
        let bytes = pair.to_bytes().unwrap();
        let roundtrip = KeyPair::from_slice(&bytes).unwrap();
        assert_eq!(roundtrip, pair);
        assert_eq!(
            KeyPair::from_slice(&bytes[..bytes.len() - 1]),
            Err(InternalError::Serialization)
        );
    }

    #[test]
    fn uncompressed_public_keys_are_accepted() {
        use k256::elliptic_curve::sec1::ToEncodedPoint;

        let mut rng = init_testing();
        let pair = KeyManager::default().generate_key_pair(&mut rng).unwrap();
        let uncompressed = pair
            .public_key()
            .point()
            .0
            .to_affine()
            .to_encoded_point(false);
        let imported = PublicKey::from_hex(&hex::encode(uncompressed.as_bytes())).unwrap();
        assert_eq!(imported, *pair.public_key());
        assert_eq!(imported.to_hex(), pair.public_key().to_hex());
    }

    #[test]
    fn invalid_encodings_are_rejected() {
        let mut rng = init_testing();
        let manager = KeyManager::default();
        let pair = manager.generate_key_pair(&mut rng).unwrap();
        let other = manager.generate_key_pair(&mut rng).unwrap();

        let is_encoding_err = |r: Result<_>| matches!(r, Err(InternalError::InvalidEncoding(_)));

        assert!(is_encoding_err(manager.import_private("not hex").map(|_| ())));
        assert!(is_encoding_err(manager.import_private(&"00".repeat(32)).map(|_| ())));
        assert!(is_encoding_err(manager.import_private(&"ff".repeat(32)).map(|_| ())));
        assert!(is_encoding_err(manager.import_private(&"01".repeat(31)).map(|_| ())));
        assert!(is_encoding_err(manager.import_public("").map(|_| ())));
        assert!(is_encoding_err(
            manager.import_public(&format!("05{}", "11".repeat(32))).map(|_| ())
        ));
        assert!(is_encoding_err(
            manager
                .import_key_pair(&pair.public_key().to_hex(), &other.private_key().to_hex())
                .map(|_| ())
        ));

        let mismatched = serde_json::json!({
            "publicKey": pair.public_key().to_hex(),
            "privateKey": other.private_key().to_hex().as_str(),
        });
        assert!(serde_json::from_value::<KeyPair>(mismatched).is_err());
    }

    #[test]
    fn private_key_debug_is_redacted() {
        let mut rng = init_testing();
        let pair = KeyManager::default().generate_key_pair(&mut rng).unwrap();
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains(pair.private_key().to_hex().as_str()));
        assert!(rendered.contains("redacted"));
    }
}
