//! # Vault Orchestrator
//!
//! Reconstructs a consistent, queryable view of vault state from the
//! ledger's event stream and drives new actions against the ledger with
//! correct idempotency, retry, and fee-adjustment semantics.
//!
//! The pipeline is one-way for reads: the [`ingest::EventIngestor`]
//! fetches and orders raw events, the [`reconcile::StateReconciler`]
//! folds them into transaction records, and the
//! [`orchestrator::LifecycleOrchestrator`] owns the resulting snapshot
//! and exposes the two mutating operations, `propose` and `sign`.
//! Execution is ledger-side: the orchestrator only ever observes it
//! through a later reconciliation pass, never asserts it locally.

#![forbid(unsafe_code)]

/// Concurrent event fetching and merge ordering
pub mod ingest;

/// Folding events (or direct reads) into transaction records
pub mod reconcile;

/// Signer authorization checks with capability fallback
pub mod authorize;

/// Fee estimation, margins, and the fallback ceiling
pub mod fees;

/// Mapping raw ledger rejections into the fixed taxonomy
pub mod classify;

/// The lifecycle orchestrator owning session state
pub mod orchestrator;

pub use authorize::AuthorizationGate;
pub use fees::FeePlan;
pub use ingest::EventIngestor;
pub use orchestrator::{LifecycleOrchestrator, ViewHealth};
pub use reconcile::{Snapshot, StateReconciler};
