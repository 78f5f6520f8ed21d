//! Accounts: addresses and the key pairs that control them.
//!
//! An [`Address`] names every participant: holders, successors, factories,
//! registries and linked resources. Accounts that submit calls own a
//! [`Signer`]; their address is derived from the Ed25519 public key.

pub mod address;
pub mod signer;

pub use address::Address;
pub use signer::Signer;
