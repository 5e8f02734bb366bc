//! # Vault Core
//!
//! Foundational types for the vault client: ledger-facing identifiers,
//! the reconciled transaction record model, signer-set derivation, the
//! error taxonomy, and configuration.
//!
//! This crate performs no I/O. Everything here is deterministic and
//! synchronous; the asynchronous ledger surface lives in `vault-ledger`
//! and the components that drive it live in `vault-orchestrator`.

#![forbid(unsafe_code)]

/// Error taxonomy shared across all vault crates
pub mod error;

/// Ledger-facing identifier and value types
pub mod types;

/// Reconciled transaction records and their projections
pub mod record;

/// Signer-set derivation from membership events
pub mod signers;

/// Runtime configuration for fee strategy and retries
pub mod config;

/// Pure display-boundary transforms (no effect on correctness)
pub mod display;

pub use config::{FeeConfig, OrchestratorConfig, RetryConfig};
pub use error::{RejectReason, Result, VaultError};
pub use record::{TransactionRecord, TransactionView};
pub use signers::{SignerChange, SignerSet};
pub use types::{Address, Payload, TransactionId, TransferIntent, TransferRequest};
