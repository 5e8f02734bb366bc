//! Property tests for the event fold.

use proptest::prelude::*;
use vault_core::types::TransactionId;
use vault_ledger::LedgerEvent;
use vault_orchestrator::reconcile::fold_events;
use vault_testkit::{executed_event, proposed_event, signed_event, test_address};

#[derive(Debug, Clone)]
enum Op {
    Proposed(TransactionId),
    Signed(TransactionId, u8),
    Executed(TransactionId),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..4).prop_map(Op::Proposed),
        ((0u64..4), (1u8..6)).prop_map(|(id, signer)| Op::Signed(id, signer)),
        (0u64..4).prop_map(Op::Executed),
    ]
}

/// Turn an op sequence into an ordered event stream, one block apiece.
fn events_from(ops: &[Op]) -> Vec<LedgerEvent> {
    ops.iter()
        .enumerate()
        .map(|(i, op)| {
            let block = i as u64 + 1;
            match op {
                Op::Proposed(id) => proposed_event(block, 0, *id, test_address(0xaa), 1000),
                Op::Signed(id, signer) => signed_event(block, 0, *id, test_address(*signer)),
                Op::Executed(id) => executed_event(block, 0, *id),
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn signature_count_always_equals_distinct_signers(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let events = events_from(&ops);
        for record in fold_events(&events, 2).values() {
            prop_assert_eq!(record.signature_count as usize, record.signed_by.len());
        }
    }

    #[test]
    fn refold_is_deterministic(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let events = events_from(&ops);
        prop_assert_eq!(fold_events(&events, 2), fold_events(&events, 2));
    }

    #[test]
    fn execution_is_permanent_across_suffixes(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let events = events_from(&ops);
        for cut in 1..events.len() {
            let before = fold_events(&events[..cut], 2);
            let after = fold_events(&events, 2);
            for (id, record) in &before {
                if record.executed {
                    prop_assert!(after[id].executed, "id {} lost executed status", id);
                }
            }
        }
    }

    #[test]
    fn approvals_after_execution_never_count(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let events = events_from(&ops);
        let records = fold_events(&events, 2);
        for record in records.values() {
            if record.executed {
                // replaying only the prefix up to the execution yields
                // the same approval set as the full stream
                let cut = events
                    .iter()
                    .position(|e| matches!(
                        &e.body,
                        vault_ledger::EventBody::Executed { id } if *id == record.id
                    ))
                    .map_or(events.len(), |i| i + 1);
                let frozen = fold_events(&events[..cut], 2);
                prop_assert_eq!(&frozen[&record.id].signed_by, &record.signed_by);
            }
        }
    }
}
