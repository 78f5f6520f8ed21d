//! Signed call envelopes.
//!
//! A [`SignedCall`] binds a call to the signer's public key and a nonce. The
//! chain derives the caller address from the key, so a caller can only ever
//! act as the account whose key signed.

use serde::{Deserialize, Serialize};

use crate::chain::Call;
use crate::crypto::{keys::Ed25519KeyPair, signing};
use crate::error::{Result, SuccessionError};
use crate::identity::{Address, Signer};

const CALL_DOMAIN: &str = "asx-call:v1";

/// A call signed by an account key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCall {
    /// Base64 Ed25519 public key of the signer.
    pub signer_key: String,
    /// Per-signer sequence number, starting at 0.
    pub nonce: u64,
    pub call: Call,
    /// Base64 signature over the canonical payload.
    pub signature: String,
}

impl SignedCall {
    pub fn sign(signer: &Signer, nonce: u64, call: Call) -> Result<Self> {
        let signer_key = signer.public_key_base64();
        let payload = signing_payload(&signer_key, nonce, &call)?;
        let signature = signing::sign_to_base64(signer.signing_key(), payload.as_bytes());
        Ok(Self {
            signer_key,
            nonce,
            call,
            signature,
        })
    }

    /// Check the signature and return the signer's address.
    pub fn verify(&self) -> Result<Address> {
        let key = Ed25519KeyPair::verifying_key_from_base64(&self.signer_key)?;
        let payload = signing_payload(&self.signer_key, self.nonce, &self.call)?;
        signing::verify_from_base64(&key, payload.as_bytes(), &self.signature)?;
        Ok(Address::from_verifying_key(&key))
    }
}

fn signing_payload(signer_key: &str, nonce: u64, call: &Call) -> Result<String> {
    let body = serde_json::to_string(call)
        .map_err(|e| SuccessionError::SerializationError(e.to_string()))?;
    Ok(format!("{CALL_DOMAIN}:{signer_key}:{nonce}:{body}"))
}
