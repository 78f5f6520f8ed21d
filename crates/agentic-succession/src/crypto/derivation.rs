//! Key derivation using HKDF-SHA256.

use hkdf::Hkdf;
use sha2::Sha256;

use crate::error::{Result, SuccessionError};

/// Context for the account-key file encryption key. Must stay stable.
pub const ACCOUNT_KEY_CONTEXT: &str = "agentic-succession/account-key-encryption";

/// Derive a 32-byte key from input key material and a context string.
pub fn derive_key(ikm: &[u8; 32], context: &str) -> Result<[u8; 32]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);
    let mut output = [0u8; 32];
    hk.expand(context.as_bytes(), &mut output)
        .map_err(|e| SuccessionError::DerivationFailed(format!("HKDF expand failed: {e}")))?;
    Ok(output)
}
