//! # Vault Ledger
//!
//! The abstract surface of the external ledger as consumed by the vault
//! client: an async [`LedgerClient`] trait for reads, event queries, cost
//! estimation, and submission, plus the event and call types that cross
//! that boundary.
//!
//! The real ledger is an opaque, append-only, totally-ordered system of
//! record; this crate deliberately specifies only the request/response
//! shapes the core needs, not any wire format.

#![forbid(unsafe_code)]

/// The async ledger client trait
pub mod client;

/// Ledger event records and block ranges
pub mod event;

/// Failure modes of the ledger boundary
pub mod error;

pub use client::{Call, LedgerClient, SubmitParams, SubmitReceipt, TransactionState};
pub use error::LedgerError;
pub use event::{BlockRange, EventBody, EventKind, EventMeta, LedgerEvent};
