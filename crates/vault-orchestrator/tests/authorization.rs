//! Authorization gate behavior, including the membership fallback.

use assert_matches::assert_matches;
use std::sync::Arc;
use vault_core::error::{RejectReason, VaultError};
use vault_core::OrchestratorConfig;
use vault_orchestrator::LifecycleOrchestrator;
use vault_testkit::{
    init_tracing, proposed_event, signer_added_event, signer_removed_event, test_address,
    MockLedger,
};

fn orchestrator(
    ledger: Arc<MockLedger>,
    identity_byte: u8,
) -> LifecycleOrchestrator<MockLedger> {
    init_tracing();
    LifecycleOrchestrator::new(
        ledger,
        test_address(identity_byte),
        OrchestratorConfig::default(),
    )
    .expect("default config is valid")
}

#[tokio::test]
async fn direct_read_answers_the_membership_question() {
    let ledger = Arc::new(MockLedger::new().with_signers([test_address(1)]));
    let orch = orchestrator(Arc::clone(&ledger), 1);
    assert!(orch.is_authorized().await.expect("gate check"));

    orch.switch_identity(test_address(9)).await;
    assert!(!orch.is_authorized().await.expect("gate check"));
}

#[tokio::test]
async fn membership_answers_are_memoized_per_identity() {
    let ledger = Arc::new(MockLedger::new().with_signers([test_address(1)]));
    let orch = orchestrator(Arc::clone(&ledger), 1);

    orch.is_authorized().await.expect("gate check");
    orch.is_authorized().await.expect("gate check");
    assert_eq!(ledger.calls("read_is_signer"), 1);

    // an identity switch drops the cache
    orch.switch_identity(test_address(1)).await;
    orch.is_authorized().await.expect("gate check");
    assert_eq!(ledger.calls("read_is_signer"), 2);
}

#[tokio::test]
async fn missing_read_capability_derives_membership_from_events() {
    let s1 = test_address(1);
    let ledger = Arc::new(
        MockLedger::new()
            .without_capability("read_is_signer")
            .with_event(signer_added_event(1, 0, s1))
            .with_event(signer_added_event(1, 1, test_address(2))),
    );
    let orch = orchestrator(Arc::clone(&ledger), 1);
    assert!(orch.is_authorized().await.expect("derived membership"));

    orch.switch_identity(test_address(9)).await;
    assert!(!orch.is_authorized().await.expect("derived membership"));
}

#[tokio::test]
async fn removal_events_cancel_earlier_additions() {
    let s1 = test_address(1);
    let ledger = Arc::new(
        MockLedger::new()
            .without_capability("read_is_signer")
            .with_event(signer_added_event(1, 0, s1))
            .with_event(signer_removed_event(2, 0, s1)),
    );
    let orch = orchestrator(Arc::clone(&ledger), 1);
    assert!(!orch.is_authorized().await.expect("derived membership"));
}

#[tokio::test]
async fn revocation_is_seen_after_an_authorization_refresh() {
    let s1 = test_address(1);
    let ledger = Arc::new(MockLedger::new().with_signers([s1]));
    let orch = orchestrator(Arc::clone(&ledger), 1);
    assert!(orch.is_authorized().await.expect("gate check"));

    // the ledger revokes the signer mid-session
    ledger.apply_event(signer_removed_event(1, 0, s1));
    assert!(
        orch.is_authorized().await.expect("gate check"),
        "the memoized answer cannot see the revocation"
    );

    assert!(!orch.refresh_authorization().await.expect("forced re-check"));
    assert!(!orch.is_authorized().await.expect("gate check"));
    assert_eq!(ledger.calls("read_is_signer"), 2);
}

#[tokio::test]
async fn authorization_refresh_covers_the_derived_path_too() {
    let s1 = test_address(1);
    let ledger = Arc::new(
        MockLedger::new()
            .without_capability("read_is_signer")
            .with_event(signer_added_event(1, 0, s1)),
    );
    let orch = orchestrator(Arc::clone(&ledger), 1);
    assert!(orch.is_authorized().await.expect("derived membership"));

    ledger.apply_event(signer_removed_event(2, 0, s1));
    assert!(!orch.refresh_authorization().await.expect("forced re-check"));
}

#[tokio::test]
async fn unauthorized_identity_is_rejected_before_submission() {
    let ledger = Arc::new(
        MockLedger::new()
            .with_signers([test_address(2)])
            .with_event(proposed_event(1, 0, 0, test_address(0xaa), 500)),
    );
    let orch = orchestrator(Arc::clone(&ledger), 1);
    orch.refresh().await.expect("refresh succeeds");

    let outcome = orch.sign(0).await;
    assert_matches!(
        outcome,
        Err(VaultError::Rejected {
            reason: RejectReason::NotAuthorized,
            ..
        })
    );
    assert_eq!(ledger.calls("submit"), 0);
}
