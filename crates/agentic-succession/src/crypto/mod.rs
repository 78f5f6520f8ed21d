//! Cryptographic primitives for AgenticSuccession.
//!
//! This module provides:
//! - Ed25519 key pairs for signing call envelopes
//! - HKDF-SHA256 key derivation
//! - Argon2id passphrase-based key derivation
//! - ChaCha20-Poly1305 authenticated encryption of account keys
//! - Cryptographically secure random number generation

pub mod derivation;
pub mod encryption;
pub mod keys;
pub mod random;
pub mod signing;
