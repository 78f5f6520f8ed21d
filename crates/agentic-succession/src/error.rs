//! Error types for AgenticSuccession.
//!
//! Every failure names its specific cause, so tooling can tell a successor
//! to wait longer apart from one who must free capacity first. Private key
//! material is never included in error messages.

use crate::identity::Address;
use crate::token::TokenId;

/// Coarse classification of a [`SuccessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A one-time setup step was repeated or its prerequisite is missing.
    Configuration,
    /// The caller lacks the required relationship to the instance.
    Authorization,
    /// A real-time precondition does not hold yet.
    Timing,
    /// The recipient has no room left for more authority tokens.
    Capacity,
    /// A forbidden operation or an internal bookkeeping inconsistency.
    Invariant,
    /// Failures of the execution environment, signatures or storage.
    Environment,
}

/// Succession error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum SuccessionError {
    // ── Configuration ────────────────────────────────────────────────────
    #[error("Holder {0} has already minted an authority token")]
    AlreadyMinted(Address),

    #[error("Succession policy is already configured")]
    AlreadyConfigured,

    #[error("Instance is already initialized")]
    AlreadyInitialized,

    #[error("Instance is not initialized")]
    NotInitialized,

    #[error("A registry is already deployed for {0}")]
    AlreadyDeployed(Address),

    #[error("Zero address is not allowed")]
    ZeroAddress,

    #[error("Authority token address cannot be zero")]
    ZeroControllerNFT,

    #[error("Original holder address cannot be zero")]
    ZeroOriginalHolder,

    #[error("Succession policy is not configured")]
    NotConfigured,

    // ── Authorization ────────────────────────────────────────────────────
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Caller {0} is not permitted to perform this operation")]
    Unauthorized(Address),

    #[error("Authority tokens only move through an authorized succession registry")]
    RegistryLinkedToken,

    #[error("Caller {caller} is not the current controller (controller: {controller})")]
    NotController { caller: Address, controller: Address },

    #[error("Factory {0} is not trusted")]
    NotTrustedFactory(Address),

    #[error("Only governance may change the trusted factory list")]
    NotGovernance,

    #[error("Holder {0} does not hold a valid authority token")]
    NoAuthorityToken(Address),

    // ── Timing ───────────────────────────────────────────────────────────
    #[error("Succession conditions not met: claimable at {claimable_at}, now {now}")]
    ConditionsNotMet { claimable_at: u64, now: u64 },

    #[error("Check-in too soon: next check-in allowed at {next_allowed_at}")]
    CheckInTooSoon { next_allowed_at: u64 },

    // ── Capacity ─────────────────────────────────────────────────────────
    #[error("Inherited token limit exceeded: recipient holds {current} of {max}")]
    InheritedTokenLimitExceeded { current: usize, max: usize },

    #[error(
        "Insufficient space: successor holds {current}, incoming {incoming}, available {available}"
    )]
    InsufficientSpace {
        current: usize,
        incoming: usize,
        available: usize,
    },

    #[error("No authority tokens left to transfer")]
    NoNFTsToTransfer,

    // ── Invariant ────────────────────────────────────────────────────────
    #[error("Token not found: {0}")]
    TokenNotFound(TokenId),

    #[error("Original token {0} cannot be burned")]
    CannotBurnOriginalToken(TokenId),

    // ── Environment ──────────────────────────────────────────────────────
    #[error("Reentrant call rejected")]
    ReentrantCall,

    #[error("Unknown instance: {0}")]
    UnknownInstance(Address),

    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Invalid nonce: expected {expected}, got {actual}")]
    InvalidNonce { expected: u64, actual: u64 },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid passphrase")]
    InvalidPassphrase,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SuccessionError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyMinted(_)
            | Self::AlreadyConfigured
            | Self::AlreadyInitialized
            | Self::NotInitialized
            | Self::AlreadyDeployed(_)
            | Self::ZeroAddress
            | Self::ZeroControllerNFT
            | Self::ZeroOriginalHolder
            | Self::NotConfigured => ErrorKind::Configuration,

            Self::NotAuthorized(_)
            | Self::Unauthorized(_)
            | Self::RegistryLinkedToken
            | Self::NotController { .. }
            | Self::NotTrustedFactory(_)
            | Self::NotGovernance
            | Self::NoAuthorityToken(_) => ErrorKind::Authorization,

            Self::ConditionsNotMet { .. } | Self::CheckInTooSoon { .. } => ErrorKind::Timing,

            Self::InheritedTokenLimitExceeded { .. }
            | Self::InsufficientSpace { .. }
            | Self::NoNFTsToTransfer => ErrorKind::Capacity,

            Self::TokenNotFound(_) | Self::CannotBurnOriginalToken(_) => ErrorKind::Invariant,

            Self::ReentrantCall
            | Self::UnknownInstance(_)
            | Self::SignatureInvalid
            | Self::InvalidNonce { .. }
            | Self::InvalidKey(_)
            | Self::InvalidPassphrase
            | Self::EncryptionFailed(_)
            | Self::DerivationFailed(_)
            | Self::SerializationError(_)
            | Self::InvalidFileFormat(_)
            | Self::Io(_) => ErrorKind::Environment,
        }
    }

    /// True when simply waiting and calling again can succeed.
    pub fn is_retryable_later(&self) -> bool {
        self.kind() == ErrorKind::Timing
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, SuccessionError>;
