//! An account key pair and its address.

use ed25519_dalek::{SigningKey, VerifyingKey};

use crate::crypto::keys::Ed25519KeyPair;

use super::Address;

/// The key material of one account.
///
/// The signing key is zeroized on drop.
pub struct Signer {
    key_pair: Ed25519KeyPair,
    address: Address,
    /// Human-readable account name (optional).
    pub name: Option<String>,
}

impl Signer {
    /// Create an account with a fresh random key pair.
    pub fn generate(name: Option<String>) -> Self {
        Self::from_key_pair(Ed25519KeyPair::generate(), name)
    }

    /// Deterministic account for fixtures, simulations and tests.
    pub fn from_seed(seed: &str) -> Self {
        Self::from_key_pair(Ed25519KeyPair::from_seed(seed), Some(seed.to_string()))
    }

    /// Reconstruct from stored signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32], name: Option<String>) -> Self {
        Self::from_key_pair(Ed25519KeyPair::from_signing_key_bytes(bytes), name)
    }

    fn from_key_pair(key_pair: Ed25519KeyPair, name: Option<String>) -> Self {
        let address = Address::from_verifying_key(key_pair.verifying_key());
        Self {
            key_pair,
            address,
            name,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signing_key(&self) -> &SigningKey {
        self.key_pair.signing_key()
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.key_pair.verifying_key()
    }

    /// Return the signing key bytes. Caller must zeroize after use.
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.key_pair.signing_key_bytes()
    }

    /// Return the public key as base64.
    pub fn public_key_base64(&self) -> String {
        base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            self.key_pair.verifying_key_bytes(),
        )
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
