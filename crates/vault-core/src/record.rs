//! Reconciled transaction records and their projections
//!
//! A `TransactionRecord` is the canonical, event-derived view of one
//! proposed transfer. Records are mutated only through the methods here,
//! which maintain the core invariants: along the event-fold path the
//! signature count always equals the size of the signer set, and an
//! executed record is frozen.

use crate::types::{Address, Payload, TransactionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Canonical state of one proposed transfer, derived from ledger events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Ledger-assigned identifier
    pub id: TransactionId,
    /// Destination of the transfer
    pub recipient: Address,
    /// Amount in the ledger's smallest unit
    pub amount: u128,
    /// Opaque call payload
    pub payload: Payload,
    /// Threshold snapshot in effect when the record was reconciled
    pub required_signatures: u32,
    /// Whether the ledger has executed the transfer
    pub executed: bool,
    /// Count of distinct approvals. Equal to `signed_by.len()` for
    /// event-derived records; may exceed it for records rebuilt from
    /// direct reads, where individual memberships are only partially
    /// observable.
    pub signature_count: u32,
    /// Distinct signers known to have approved
    pub signed_by: BTreeSet<Address>,
    /// Block in which the proposal event was observed, when known
    pub proposed_at_block: Option<u64>,
}

impl TransactionRecord {
    /// Create a record for a freshly observed proposal.
    pub fn proposed(
        id: TransactionId,
        recipient: Address,
        amount: u128,
        payload: Payload,
        required_signatures: u32,
        proposed_at_block: Option<u64>,
    ) -> Self {
        Self {
            id,
            recipient,
            amount,
            payload,
            required_signatures,
            executed: false,
            signature_count: 0,
            signed_by: BTreeSet::new(),
            proposed_at_block,
        }
    }

    /// Synthesize a minimal placeholder for an id referenced by a later
    /// event before any proposal was observed. The ledger is untrusted
    /// input, so a gap in the event stream must not fail the whole pass.
    pub fn placeholder(id: TransactionId, required_signatures: u32, block: Option<u64>) -> Self {
        Self::proposed(
            id,
            Address::ZERO,
            0,
            Payload::empty(),
            required_signatures,
            block,
        )
    }

    /// Record a signer approval with set semantics.
    ///
    /// Re-adding an already-present signer is a no-op, and an executed
    /// record ignores late approvals entirely. The stored count is
    /// recomputed from the set on every change, so the two cannot drift
    /// along this path. Returns whether the set changed.
    pub fn add_signature(&mut self, signer: Address) -> bool {
        if self.executed {
            return false;
        }
        let changed = self.signed_by.insert(signer);
        if changed {
            self.signature_count = self.signed_by.len() as u32;
        }
        changed
    }

    /// Mark the record executed. Permanent; the record is frozen from
    /// this point on.
    pub fn mark_executed(&mut self) {
        self.executed = true;
    }

    /// Whether the given identity has approved this transfer.
    pub fn has_signed(&self, identity: &Address) -> bool {
        self.signed_by.contains(identity)
    }

    /// Project this record for a particular viewer.
    pub fn view_for(&self, viewer: &Address) -> TransactionView {
        TransactionView {
            id: self.id,
            recipient: self.recipient,
            amount: self.amount,
            payload: self.payload.clone(),
            signature_count: self.signature_count,
            required_signatures: self.required_signatures,
            executed: self.executed,
            has_signed: self.has_signed(viewer),
            proposed_at_block: self.proposed_at_block,
        }
    }
}

/// A record projected for one viewer, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    /// Ledger-assigned identifier
    pub id: TransactionId,
    /// Destination of the transfer
    pub recipient: Address,
    /// Amount in the ledger's smallest unit
    pub amount: u128,
    /// Opaque call payload
    pub payload: Payload,
    /// Distinct approvals observed
    pub signature_count: u32,
    /// Threshold snapshot
    pub required_signatures: u32,
    /// Whether the transfer has executed
    pub executed: bool,
    /// Whether the viewer has approved
    pub has_signed: bool,
    /// Block of the proposal event, when known
    pub proposed_at_block: Option<u64>,
}

/// Project the pending records of a mapping for a viewer, most recently
/// proposed first.
pub fn pending_views(
    records: &BTreeMap<TransactionId, TransactionRecord>,
    viewer: &Address,
) -> Vec<TransactionView> {
    records
        .values()
        .rev()
        .filter(|record| !record.executed)
        .map(|record| record.view_for(viewer))
        .collect()
}

/// Project the executed records of a mapping for a viewer, most recently
/// proposed first.
pub fn executed_views(
    records: &BTreeMap<TransactionId, TransactionRecord>,
    viewer: &Address,
) -> Vec<TransactionView> {
    records
        .values()
        .rev()
        .filter(|record| record.executed)
        .map(|record| record.view_for(viewer))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn record(id: TransactionId) -> TransactionRecord {
        TransactionRecord::proposed(id, addr(0xaa), 1000, Payload::empty(), 2, Some(10))
    }

    #[test]
    fn signature_count_tracks_set_cardinality() {
        let mut rec = record(0);
        assert_eq!(rec.signature_count, 0);
        assert!(rec.add_signature(addr(1)));
        assert!(!rec.add_signature(addr(1)));
        assert!(rec.add_signature(addr(2)));
        assert_eq!(rec.signature_count, 2);
        assert_eq!(rec.signature_count as usize, rec.signed_by.len());
    }

    #[test]
    fn executed_record_is_frozen() {
        let mut rec = record(0);
        rec.add_signature(addr(1));
        rec.mark_executed();
        assert!(!rec.add_signature(addr(2)));
        assert_eq!(rec.signature_count, 1);
        assert!(rec.executed);
    }

    #[test]
    fn projections_partition_the_mapping() {
        let mut records = BTreeMap::new();
        for id in 0..5u64 {
            let mut rec = record(id);
            if id % 2 == 0 {
                rec.mark_executed();
            }
            records.insert(id, rec);
        }
        let viewer = addr(1);
        let pending = pending_views(&records, &viewer);
        let executed = executed_views(&records, &viewer);
        assert_eq!(pending.len() + executed.len(), records.len());
        for view in &pending {
            assert!(!view.executed);
            assert!(!executed.iter().any(|e| e.id == view.id));
        }
        // most recently proposed first
        assert!(pending.windows(2).all(|w| w[0].id > w[1].id));
        assert!(executed.windows(2).all(|w| w[0].id > w[1].id));
    }

    #[test]
    fn view_reflects_viewer_membership() {
        let mut rec = record(7);
        rec.add_signature(addr(1));
        assert!(rec.view_for(&addr(1)).has_signed);
        assert!(!rec.view_for(&addr(2)).has_signed);
        assert_eq!(rec.view_for(&addr(2)).signature_count, 1);
    }
}
