//! .ask file format — encrypted account key storage.
//!
//! An `.ask` file stores an account's Ed25519 signing key encrypted with
//! ChaCha20-Poly1305 under a key derived from a passphrase via Argon2id and
//! HKDF. The account address is kept in plaintext so tooling can list
//! accounts without the passphrase.
//!
//! File format (JSON):
//! ```json
//! {
//!     "version": 1,
//!     "format": "ask-v1",
//!     "address": "0x…",
//!     "name": "alice",
//!     "encryption": {
//!         "algorithm": "chacha20-poly1305",
//!         "kdf": "argon2id",
//!         "salt": "<base64-16-bytes>",
//!         "nonce": "<base64-12-bytes>"
//!     },
//!     "encrypted_key": "<base64-ciphertext>"
//! }
//! ```

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::encryption::{self, Sealed};
use crate::error::{Result, SuccessionError};
use crate::identity::{Address, Signer};

use super::write_atomic;

const ASK_VERSION: u32 = 1;
const ASK_FORMAT: &str = "ask-v1";
const ASK_ALGORITHM: &str = "chacha20-poly1305";
const ASK_KDF: &str = "argon2id";

#[derive(Debug, Serialize, Deserialize)]
pub struct AskFile {
    pub version: u32,
    pub format: String,
    pub address: Address,
    pub name: Option<String>,
    pub encryption: EncryptionMetadata,
    /// Base64 ciphertext of the 32 signing key bytes.
    pub encrypted_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub algorithm: String,
    pub kdf: String,
    pub salt: String,
    pub nonce: String,
}

/// Save `signer` to `path`, sealing the key with `passphrase`.
pub fn save_account(signer: &Signer, path: &Path, passphrase: &str) -> Result<()> {
    let mut key_bytes = signer.signing_key_bytes();
    let sealed = encryption::seal(passphrase.as_bytes(), &key_bytes);
    key_bytes.zeroize();
    let sealed = sealed?;

    let file = AskFile {
        version: ASK_VERSION,
        format: ASK_FORMAT.to_string(),
        address: signer.address(),
        name: signer.name.clone(),
        encryption: EncryptionMetadata {
            algorithm: ASK_ALGORITHM.to_string(),
            kdf: ASK_KDF.to_string(),
            salt: STANDARD.encode(sealed.salt),
            nonce: STANDARD.encode(sealed.nonce),
        },
        encrypted_key: STANDARD.encode(&sealed.ciphertext),
    };

    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| SuccessionError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Load and decrypt the account stored at `path`.
///
/// Fails with `InvalidPassphrase` when `passphrase` does not open the key.
pub fn load_account(path: &Path, passphrase: &str) -> Result<Signer> {
    let file = read_file(path)?;

    let salt: [u8; 16] = decode(&file.encryption.salt, "salt")?
        .try_into()
        .map_err(|_| SuccessionError::InvalidFileFormat("salt must be 16 bytes".into()))?;
    let nonce: [u8; 12] = decode(&file.encryption.nonce, "nonce")?
        .try_into()
        .map_err(|_| SuccessionError::InvalidFileFormat("nonce must be 12 bytes".into()))?;
    let sealed = Sealed {
        salt,
        nonce,
        ciphertext: decode(&file.encrypted_key, "ciphertext")?,
    };

    let mut plaintext = encryption::open(passphrase.as_bytes(), &sealed)?;
    let key_bytes: std::result::Result<[u8; 32], _> = plaintext.as_slice().try_into();
    plaintext.zeroize();
    let mut key_bytes =
        key_bytes.map_err(|_| SuccessionError::InvalidKey("signing key must be 32 bytes".into()))?;

    let signer = Signer::from_signing_key_bytes(&key_bytes, file.name);
    key_bytes.zeroize();

    if signer.address() != file.address {
        return Err(SuccessionError::InvalidFileFormat(format!(
            "stored address {} does not match key",
            file.address
        )));
    }
    Ok(signer)
}

/// Read only the plaintext address. No passphrase needed.
pub fn read_account_address(path: &Path) -> Result<Address> {
    Ok(read_file(path)?.address)
}

fn read_file(path: &Path) -> Result<AskFile> {
    let bytes = std::fs::read(path)?;
    let file: AskFile = serde_json::from_slice(&bytes)
        .map_err(|e| SuccessionError::InvalidFileFormat(format!("failed to parse .ask file: {e}")))?;
    if file.version != ASK_VERSION || file.format != ASK_FORMAT {
        return Err(SuccessionError::InvalidFileFormat(format!(
            "unsupported .ask file version={} format={}",
            file.version, file.format
        )));
    }
    Ok(file)
}

fn decode(value: &str, what: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| SuccessionError::InvalidFileFormat(format!("invalid {what} base64: {e}")))
}
