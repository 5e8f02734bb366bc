//! Failure modes of the ledger boundary
//!
//! The ledger client reports failures in their raw shape; mapping revert
//! text into the user-facing rejection taxonomy is the orchestrator's
//! job, so the same condition classifies identically regardless of which
//! transport produced it.

use serde::{Deserialize, Serialize};

/// A failure reported by the ledger client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// The ledger could not be reached or the call timed out before
    /// submission
    #[error("ledger unreachable: {message}")]
    Unavailable {
        /// Transport-level detail
        message: String,
    },

    /// The requested method is not exposed by this ledger.
    ///
    /// A capability-detection failure, not a value failure; callers fall
    /// back to a derived source where one is specified.
    #[error("method not supported: {method}")]
    CapabilityMissing {
        /// Name of the absent method
        method: String,
    },

    /// The ledger accepted the call but reverted it, with the raw reason
    /// text as delivered by the transport
    #[error("reverted: {reason}")]
    Reverted {
        /// Raw revert reason, shape varies by transport
        reason: String,
    },

    /// The connected signer declined to authorize the submission
    #[error("declined by signer: {reason}")]
    Declined {
        /// Raw decline message
        reason: String,
    },

    /// The call was sent but its outcome could not be observed
    #[error("submission outcome unknown: {message}")]
    OutcomeUnknown {
        /// What was observed before the outcome became ambiguous
        message: String,
    },
}

impl LedgerError {
    /// Create an unavailability error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a capability-missing error
    pub fn capability_missing(method: impl Into<String>) -> Self {
        Self::CapabilityMissing {
            method: method.into(),
        }
    }

    /// Create a reverted error with the raw reason text
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::Reverted {
            reason: reason.into(),
        }
    }

    /// Create a signer-declined error
    pub fn declined(reason: impl Into<String>) -> Self {
        Self::Declined {
            reason: reason.into(),
        }
    }

    /// Create an outcome-unknown error
    pub fn outcome_unknown(message: impl Into<String>) -> Self {
        Self::OutcomeUnknown {
            message: message.into(),
        }
    }
}
