//! Ed25519 key pairs.
//!
//! Every account that submits calls owns one key pair; its address is
//! derived from the public half.

use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::error::{Result, SuccessionError};

/// An Ed25519 key pair for signing call envelopes.
///
/// The signing key bytes are zeroized on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

impl Ed25519KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Derive a key pair deterministically from a seed phrase.
    ///
    /// Intended for fixtures and simulations where accounts are referred to
    /// by name; never use it for keys that guard real authority.
    pub fn from_seed(seed: &str) -> Self {
        let digest = Sha256::digest(format!("asx-seed:{seed}").as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        let signing_key = SigningKey::from_bytes(&bytes);
        bytes.zeroize();
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a key pair from raw signing key bytes.
    pub fn from_signing_key_bytes(bytes: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(bytes);
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Reconstruct a verifying key from raw bytes.
    pub fn verifying_key_from_bytes(bytes: &[u8; 32]) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(bytes)
            .map_err(|e| SuccessionError::InvalidKey(format!("invalid verifying key: {e}")))
    }

    /// Decode a base64 verifying key.
    pub fn verifying_key_from_base64(encoded: &str) -> Result<VerifyingKey> {
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
            .map_err(|e| SuccessionError::InvalidKey(format!("invalid base64 public key: {e}")))?;
        let key_bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SuccessionError::InvalidKey("public key must be 32 bytes".into()))?;
        Self::verifying_key_from_bytes(&key_bytes)
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Return the signing key bytes. Caller must zeroize after use.
    pub fn signing_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn verifying_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }
}

impl Drop for Ed25519KeyPair {
    fn drop(&mut self) {
        let mut bytes = self.signing_key.to_bytes();
        bytes.zeroize();
    }
}
