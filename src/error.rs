//! Error kinds for the session state machine and its collaborators.
//!
//! Every failure is returned at the boundary of the operation that caused
//! it. None of these leave the session half-updated.

use alloy_primitives::TxHash;

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures reported by the wallet selection UI
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    #[error("wallet selection cancelled by user")]
    UserCancelled,
    #[error("wallet connection failed: {0}")]
    Failed(String),
}

/// Failures of `connect()`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("wallet selection cancelled by user")]
    UserCancelled,
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("a wallet session is already connected")]
    AlreadyConnected,
    #[error("a connection attempt is already in progress")]
    ConnectInProgress,
}

impl From<ConnectError> for SessionError {
    fn from(e: ConnectError) -> Self {
        match e {
            ConnectError::UserCancelled => SessionError::UserCancelled,
            ConnectError::Failed(msg) => SessionError::ConnectionFailed(msg),
        }
    }
}

/// Failures of `mint()`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MintError {
    #[error("no wallet session is connected")]
    NotConnected,
    /// Empty recipient or uri, or a recipient that is not a 20-byte hex address.
    /// Nothing is submitted in either case.
    #[error("invalid mint input: {0}")]
    InvalidInput(String),
    #[error("a mint is already pending")]
    MintPending,
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),
    #[error("transaction {transaction_hash} reverted")]
    Reverted { transaction_hash: TxHash },
}

/// Failures of calls made through the wallet provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The wallet refused the request (EIP-1193 error object)
    #[error("request rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("provider does not support {0}")]
    Unsupported(&'static str),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Persisted storage failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// Configuration failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid { key: String, value: String, reason: String },
}
