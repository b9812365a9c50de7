//! Domain error model.

use thiserror::Error;

/// Result type used across the ledger domain.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every failure the ledger reports is one of these. They are deterministic
/// and synchronous: nothing here is retried by the core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation (non-positive amount, same-account transfer,
    /// endpoint fields that do not match the transaction kind, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced account or transaction does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request clashes with current state (duplicate id, stale version,
    /// account still referenced, ...).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A ledger invariant would be broken (arithmetic overflow, poisoned lock).
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
