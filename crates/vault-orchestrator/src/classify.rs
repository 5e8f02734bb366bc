//! Mapping raw ledger rejections into the fixed taxonomy
//!
//! The same underlying condition ("already signed", "already executed",
//! "not authorized") arrives in different textual shapes depending on
//! the transport, so classification happens once, here, by substring
//! matching over the lowercased raw signal. Callers never see raw
//! transport text as the primary reason.

use vault_core::error::{RejectReason, VaultError};
use vault_ledger::LedgerError;

/// Classify a raw revert reason into the rejection taxonomy.
pub fn classify_reason(raw: &str) -> RejectReason {
    let text = raw.to_lowercase();
    if text.contains("already signed") || text.contains("already approved") {
        RejectReason::AlreadySigned
    } else if text.contains("executed") {
        RejectReason::AlreadyExecuted
    } else if text.contains("not a signer")
        || text.contains("not authorized")
        || text.contains("unauthorized")
        || text.contains("only signer")
    {
        RejectReason::NotAuthorized
    } else if text.contains("does not exist")
        || text.contains("doesn't exist")
        || text.contains("invalid transaction")
        || text.contains("out of bounds")
        || text.contains("invalid opcode")
    {
        RejectReason::InvalidTransaction
    } else if text.contains("insufficient funds") || text.contains("insufficient balance") {
        RejectReason::InsufficientFunds
    } else if text.contains("underpriced") || text.contains("replacement transaction") {
        RejectReason::Underpriced
    } else if text.contains("out of gas") || text.contains("exceeds gas") || text.contains("gas required exceeds")
    {
        RejectReason::OutOfResource
    } else if text.contains("user denied") || text.contains("user rejected") {
        RejectReason::UserDeclined
    } else {
        RejectReason::Unknown
    }
}

/// Convert a ledger-boundary failure into the vault error taxonomy.
pub fn ledger_to_vault(err: LedgerError) -> VaultError {
    match err {
        LedgerError::Unavailable { message } => VaultError::unavailable(message),
        LedgerError::CapabilityMissing { method } => VaultError::capability_missing(method),
        LedgerError::Reverted { reason } => {
            VaultError::rejected(classify_reason(&reason), reason)
        }
        LedgerError::Declined { reason } => {
            VaultError::rejected(RejectReason::UserDeclined, reason)
        }
        LedgerError::OutcomeUnknown { message } => VaultError::outcome_unknown(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_shapes_map_to_each_reason() {
        let cases = [
            ("VM Exception: already signed", RejectReason::AlreadySigned),
            ("revert: caller already approved", RejectReason::AlreadySigned),
            ("Tx already EXECUTED", RejectReason::AlreadyExecuted),
            ("caller is not a signer", RejectReason::NotAuthorized),
            ("Unauthorized caller", RejectReason::NotAuthorized),
            ("transaction does not exist", RejectReason::InvalidTransaction),
            ("index out of bounds", RejectReason::InvalidTransaction),
            ("invalid opcode", RejectReason::InvalidTransaction),
            ("insufficient funds for transfer", RejectReason::InsufficientFunds),
            ("transaction underpriced", RejectReason::Underpriced),
            ("out of gas", RejectReason::OutOfResource),
            ("gas required exceeds allowance", RejectReason::OutOfResource),
            ("User denied transaction signature", RejectReason::UserDeclined),
            ("something unexpected", RejectReason::Unknown),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify_reason(raw), expected, "raw signal: {raw}");
        }
    }

    #[test]
    fn already_signed_takes_precedence_over_executed_wording() {
        // a revert that mentions both conditions classifies by the cause
        assert_eq!(
            classify_reason("already signed; cannot sign executed transaction"),
            RejectReason::AlreadySigned
        );
    }

    #[test]
    fn ledger_errors_convert_without_losing_shape() {
        assert!(matches!(
            ledger_to_vault(LedgerError::unavailable("connection refused")),
            VaultError::LedgerUnavailable { .. }
        ));
        assert!(matches!(
            ledger_to_vault(LedgerError::capability_missing("read_is_signer")),
            VaultError::CapabilityMissing { .. }
        ));
        assert!(matches!(
            ledger_to_vault(LedgerError::declined("User rejected in wallet")),
            VaultError::Rejected {
                reason: RejectReason::UserDeclined,
                ..
            }
        ));
        assert!(matches!(
            ledger_to_vault(LedgerError::outcome_unknown("timeout after broadcast")),
            VaultError::OutcomeUnknown { .. }
        ));
    }
}
