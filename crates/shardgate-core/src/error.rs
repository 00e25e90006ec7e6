//! Common error types for shardgate routing.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while resolving a route or computing a partition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The partition dividend is missing or not a decimal number.
    #[error("wrong partition dividend {0}")]
    InvalidDividend(String),

    /// A dividend of zero was supplied for a partitioned queue.
    #[error("partition dividend in partitioned queues must be not 0")]
    ZeroDividend,

    /// A queue identifier could not be parsed.
    #[error("invalid queue id: {0}")]
    InvalidQueueId(String),

    /// A partition table entry could not be parsed.
    #[error("invalid partition table entry: {0}")]
    InvalidEntry(String),
}

impl CoreError {
    /// Returns `true` for the two flavours of rejected dividend.
    #[must_use]
    pub const fn is_invalid_dividend(&self) -> bool {
        matches!(self, Self::InvalidDividend(_) | Self::ZeroDividend)
    }
}
