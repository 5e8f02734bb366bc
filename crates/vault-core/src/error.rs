//! Unified error taxonomy for vault operations
//!
//! Every failure the client can surface is one of these variants. Local
//! validation and classified ledger rejections are recoverable into user
//! messages; unavailability and partial reconciliation are degraded-state
//! indicators that leave prior known-good state in place.

use serde::{Deserialize, Serialize};

/// Classified reason for a ledger-side rejection.
///
/// The same underlying condition arrives in multiple raw textual shapes
/// depending on the transport, so raw revert text is never surfaced
/// directly; it is mapped into this fixed set first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Caller is not an authorized signer
    NotAuthorized,
    /// Caller has already signed this transaction
    AlreadySigned,
    /// The transaction has already executed
    AlreadyExecuted,
    /// The referenced transaction does not exist or is malformed
    InvalidTransaction,
    /// Caller cannot cover the submission cost
    InsufficientFunds,
    /// The call was priced below what the fee market accepts
    Underpriced,
    /// The call ran out of its resource allowance
    OutOfResource,
    /// The connected signer declined the submission
    UserDeclined,
    /// Rejection that matched no known pattern
    Unknown,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NotAuthorized => "caller is not an authorized signer",
            Self::AlreadySigned => "transaction already signed by caller",
            Self::AlreadyExecuted => "transaction already executed",
            Self::InvalidTransaction => "transaction does not exist",
            Self::InsufficientFunds => "insufficient funds for submission",
            Self::Underpriced => "submission priced below market",
            Self::OutOfResource => "submission exceeded its resource allowance",
            Self::UserDeclined => "submission declined by the connected signer",
            Self::Unknown => "rejected for an unrecognized reason",
        };
        f.write_str(text)
    }
}

/// Unified error type for all vault operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum VaultError {
    /// Local validation failure, raised before any network call
    #[error("validation failed: {message}")]
    Validation {
        /// What was malformed
        message: String,
    },

    /// The ledger could not be reached; prior known-good state is retained
    #[error("ledger unavailable: {message}")]
    LedgerUnavailable {
        /// Transport-level detail
        message: String,
    },

    /// Fallback probing read some but not all in-range transactions
    #[error("partial reconciliation: transaction {failed_id} unreadable: {message}")]
    PartialReconciliation {
        /// First in-range id that failed to read
        failed_id: u64,
        /// Underlying read failure
        message: String,
    },

    /// An optional ledger method is absent; a documented fallback applies
    #[error("ledger capability missing: {method}")]
    CapabilityMissing {
        /// Name of the absent method
        method: String,
    },

    /// A duplicate concurrent mutating call for the same key
    #[error("duplicate in-flight call: {operation}")]
    AlreadyInFlight {
        /// The operation key the outstanding call holds
        operation: String,
    },

    /// Ledger-side rejection, classified from the raw revert signal
    #[error("rejected: {reason}")]
    Rejected {
        /// Classified rejection reason
        reason: RejectReason,
        /// Raw signal the classification was derived from
        detail: String,
    },

    /// A mutating call timed out with its outcome unknown; never auto-retried
    #[error("submission outcome unknown: {message}")]
    OutcomeUnknown {
        /// What was observed before the outcome became ambiguous
        message: String,
    },

    /// Internal invariant failure
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure
        message: String,
    },
}

impl VaultError {
    /// Create a local validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a ledger-unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::LedgerUnavailable {
            message: message.into(),
        }
    }

    /// Create a partial-reconciliation error
    pub fn partial(failed_id: u64, message: impl Into<String>) -> Self {
        Self::PartialReconciliation {
            failed_id,
            message: message.into(),
        }
    }

    /// Create a capability-missing error
    pub fn capability_missing(method: impl Into<String>) -> Self {
        Self::CapabilityMissing {
            method: method.into(),
        }
    }

    /// Create a duplicate in-flight call error
    pub fn already_in_flight(operation: impl Into<String>) -> Self {
        Self::AlreadyInFlight {
            operation: operation.into(),
        }
    }

    /// Create a classified rejection
    pub fn rejected(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self::Rejected {
            reason,
            detail: detail.into(),
        }
    }

    /// Create an outcome-unknown error
    pub fn outcome_unknown(message: impl Into<String>) -> Self {
        Self::OutcomeUnknown {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether retrying the same operation later could succeed.
    ///
    /// Only transient transport conditions qualify; rejections and
    /// validation failures are deterministic, and outcome-unknown mutating
    /// calls must never be retried automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LedgerUnavailable { .. } | Self::PartialReconciliation { .. }
        )
    }
}

/// Standard result type for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_helpers_build_expected_variants() {
        let err = VaultError::validation("bad address");
        assert!(matches!(err, VaultError::Validation { .. }));
        assert_eq!(err.to_string(), "validation failed: bad address");

        let err = VaultError::rejected(RejectReason::AlreadySigned, "revert: already signed");
        assert_eq!(
            err.to_string(),
            "rejected: transaction already signed by caller"
        );
    }

    #[test]
    fn retryability_covers_only_transient_failures() {
        assert!(VaultError::unavailable("timeout").is_retryable());
        assert!(VaultError::partial(3, "read failed").is_retryable());
        assert!(!VaultError::validation("bad").is_retryable());
        assert!(!VaultError::outcome_unknown("timeout mid-submit").is_retryable());
        assert!(!VaultError::rejected(RejectReason::Unknown, "x").is_retryable());
    }
}
