//! # Vault Testkit
//!
//! Test doubles and fixtures for the vault client crates. The centre
//! piece is [`MockLedger`], a scripted in-memory implementation of
//! `LedgerClient` that counts every call (so tests can assert a
//! validation failure made zero network calls), lets individual
//! capabilities be switched off, injects failures per method or per
//! transaction id, and simulates ledger-side execution on submit so
//! end-to-end lifecycle flows can run against it.

#![forbid(unsafe_code)]
// test support: panicking on poisoned mock state is the right behavior
#![allow(clippy::expect_used)]

/// The scripted mock ledger
pub mod mock;

/// Event and address fixture builders
pub mod fixtures;

pub use fixtures::{
    executed_event, proposed_event, signed_event, signer_added_event, signer_removed_event,
    test_address,
};
pub use mock::MockLedger;

/// Initialize test logging once; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
