//! # Domain Errors
//!
//! Error types for the sales-channel pipeline.

use thiserror::Error;

/// Sales-channel error types.
///
/// Errors are `Clone` so a terminal [`SubmissionRecord`](super::SubmissionRecord)
/// can keep the failure that ended it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    /// No key material could be loaded or generated. Fatal for signing.
    #[error("Identity unavailable: {0}")]
    IdentityUnavailable(String),

    /// Caller input failed structural validation. Never retried.
    #[error("Invalid command: {field}: {reason}")]
    InvalidCommand {
        /// Offending input field
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// The keystore could not produce a signature.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Connection failure or timeout talking to the ledger.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The ledger answered with a non-success status.
    #[error("Rejected by ledger (HTTP {status}): {body}")]
    RejectedByLedger {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// Channel does not exist on the ledger.
    #[error("Channel not found: {0}")]
    NotFound(String),

    /// Ledger response could not be parsed or violates channel invariants.
    #[error("Malformed ledger response: {0}")]
    MalformedResponse(String),

    /// Local key-value store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Submission completion was lost before a terminal state was reported.
    #[error("Submission queue closed")]
    QueueClosed,

    /// Processing of a submission ended abnormally (the task panicked or was
    /// cancelled). The ledger may or may not have received it.
    #[error("Submission aborted: {0}")]
    SubmissionAborted(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The caller is neither owner nor seller of the channel.
    #[error("{address} is not a member of channel {channel_id}")]
    MembershipRequired {
        /// Channel that was checked
        channel_id: String,
        /// Caller address
        address: String,
    },

    /// No active channel is recorded in the session.
    #[error("No active sales channel")]
    NoActiveChannel,
}

impl ChannelError {
    /// Shorthand for [`ChannelError::InvalidCommand`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            field,
            reason: reason.into(),
        }
    }

    /// Whether re-submitting the same command may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkError(_) | Self::QueueClosed)
    }
}

impl From<dag_crypto::CryptoError> for ChannelError {
    fn from(err: dag_crypto::CryptoError) -> Self {
        Self::SigningFailed(err.to_string())
    }
}
