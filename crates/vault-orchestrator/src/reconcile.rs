//! Folding events (or direct reads) into transaction records
//!
//! Reconciliation is the single writer of transaction state. The
//! preferred source is the ordered event stream; when the ledger exposes
//! no event query, the reconciler falls back to probing ids directly.
//! In the fallback, the first `NotFound` inside the probed range means
//! "no more transactions", but any other per-id failure surfaces as a
//! degraded pass rather than being papered over with fabricated records.

use crate::classify::ledger_to_vault;
use crate::ingest::EventIngestor;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use vault_core::error::{Result, VaultError};
use vault_core::record::TransactionRecord;
use vault_core::types::{Address, TransactionId};
use vault_ledger::{BlockRange, EventBody, LedgerClient, LedgerEvent};

/// One reconciled view of the vault: every known transaction plus the
/// threshold snapshot the pass observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// All known transactions, keyed by id
    pub records: BTreeMap<TransactionId, TransactionRecord>,
    /// Threshold in effect when the pass ran
    pub required_signatures: u32,
    /// Highest block observed in the event stream, when event-derived
    pub latest_block: Option<u64>,
}

impl Snapshot {
    /// An empty snapshot, as held before the first pass.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Fold an ordered event sequence into a record mapping.
///
/// Pure and deterministic: folding the same sequence twice yields the
/// same mapping. A `Signed` event for an unknown id synthesizes a
/// minimal placeholder (the ledger is untrusted input; a gap must not
/// fail the pass), and events on an executed record are ignored.
pub fn fold_events(
    events: &[LedgerEvent],
    required_signatures: u32,
) -> BTreeMap<TransactionId, TransactionRecord> {
    let mut records = BTreeMap::new();
    for event in events {
        let block = event.meta.block_number;
        match &event.body {
            EventBody::Proposed {
                id,
                recipient,
                amount,
                payload,
            } => {
                records
                    .entry(*id)
                    .or_insert_with(|| {
                        TransactionRecord::proposed(
                            *id,
                            *recipient,
                            *amount,
                            payload.clone(),
                            required_signatures,
                            Some(block),
                        )
                    });
            }
            EventBody::Signed { id, signer } => {
                let record = records.entry(*id).or_insert_with(|| {
                    warn!(id, "approval for unknown transaction, synthesizing placeholder");
                    TransactionRecord::placeholder(*id, required_signatures, Some(block))
                });
                record.add_signature(*signer);
            }
            EventBody::Executed { id } => {
                let record = records.entry(*id).or_insert_with(|| {
                    warn!(id, "execution of unknown transaction, synthesizing placeholder");
                    TransactionRecord::placeholder(*id, required_signatures, Some(block))
                });
                record.mark_executed();
            }
            EventBody::SignerAdded { .. } | EventBody::SignerRemoved { .. } => {
                // membership events are folded by the authorization gate
            }
        }
    }
    records
}

/// Folds the ordered event sequence (or the direct-read fallback) into
/// the canonical record mapping.
pub struct StateReconciler<C: ?Sized> {
    client: Arc<C>,
    ingestor: EventIngestor<C>,
}

impl<C> StateReconciler<C>
where
    C: LedgerClient + ?Sized,
{
    /// Create a reconciler over a client and its ingestor.
    pub fn new(client: Arc<C>, ingestor: EventIngestor<C>) -> Self {
        Self { client, ingestor }
    }

    /// Run one reconciliation pass.
    ///
    /// Returns the new snapshot plus an optional degradation warning
    /// (set when the fallback probe could read some but not all in-range
    /// ids). A hard failure leaves the caller's prior snapshot in place.
    pub async fn reconcile(
        &self,
        range: BlockRange,
        viewer: Address,
    ) -> Result<(Snapshot, Option<VaultError>)> {
        let required_signatures = self
            .client
            .read_required_signatures()
            .await
            .map_err(ledger_to_vault)?;

        match self.ingestor.fetch_transaction_events(range).await {
            Ok(events) => {
                let latest_block = events.iter().map(|e| e.meta.block_number).max();
                let records = fold_events(&events, required_signatures);
                debug!(
                    records = records.len(),
                    required_signatures, "reconciled from events"
                );
                Ok((
                    Snapshot {
                        records,
                        required_signatures,
                        latest_block,
                    },
                    None,
                ))
            }
            Err(VaultError::CapabilityMissing { method }) => {
                debug!(%method, "event query unsupported, probing direct reads");
                self.reconcile_from_reads(required_signatures, viewer).await
            }
            Err(err) => Err(err),
        }
    }

    /// Probe transaction ids sequentially via direct reads.
    ///
    /// `NotFound` ends the probe (no more transactions); any other
    /// failure for an in-range id stops the probe and surfaces as a
    /// degradation carrying what was read so far — presenting fabricated
    /// zero-value records as real data is worse than admitting a gap.
    async fn reconcile_from_reads(
        &self,
        required_signatures: u32,
        viewer: Address,
    ) -> Result<(Snapshot, Option<VaultError>)> {
        let count = self
            .client
            .read_transaction_count()
            .await
            .map_err(ledger_to_vault)?;

        let mut records = BTreeMap::new();
        let mut degraded = None;
        for id in 0..count {
            match self.client.read_transaction(id).await {
                Ok(Some(state)) => {
                    let mut record = TransactionRecord {
                        id,
                        recipient: state.recipient,
                        amount: state.amount,
                        payload: state.payload,
                        required_signatures,
                        executed: state.executed,
                        signature_count: state.signature_count,
                        signed_by: std::collections::BTreeSet::new(),
                        proposed_at_block: None,
                    };
                    // Direct reads expose only the viewer's own
                    // membership; the projection still needs it.
                    match self.client.read_has_signed(id, viewer).await {
                        Ok(true) => {
                            record.signed_by.insert(viewer);
                        }
                        Ok(false) => {}
                        Err(err) => {
                            warn!(id, error = %err, "has-signed read failed during fallback");
                            degraded = Some(VaultError::partial(id, err.to_string()));
                            break;
                        }
                    }
                    records.insert(id, record);
                }
                Ok(None) => {
                    debug!(id, "probe reached end of transactions");
                    break;
                }
                Err(err) => {
                    warn!(id, error = %err, "in-range transaction unreadable");
                    degraded = Some(VaultError::partial(id, err.to_string()));
                    break;
                }
            }
        }

        Ok((
            Snapshot {
                records,
                required_signatures,
                latest_block: None,
            },
            degraded,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::types::Payload;
    use vault_ledger::{EventMeta, LedgerEvent};

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn proposed(block: u64, index: u32, id: TransactionId) -> LedgerEvent {
        LedgerEvent::new(
            EventMeta::new(block, index),
            EventBody::Proposed {
                id,
                recipient: addr(0xaa),
                amount: 1000,
                payload: Payload::empty(),
            },
        )
    }

    fn signed(block: u64, index: u32, id: TransactionId, signer: Address) -> LedgerEvent {
        LedgerEvent::new(EventMeta::new(block, index), EventBody::Signed { id, signer })
    }

    fn executed(block: u64, index: u32, id: TransactionId) -> LedgerEvent {
        LedgerEvent::new(EventMeta::new(block, index), EventBody::Executed { id })
    }

    #[test]
    fn fold_builds_records_from_proposals_and_approvals() {
        let events = vec![
            proposed(1, 0, 0),
            signed(2, 0, 0, addr(1)),
            signed(2, 1, 0, addr(2)),
        ];
        let records = fold_events(&events, 2);
        let record = &records[&0];
        assert_eq!(record.signature_count, 2);
        assert!(!record.executed);
        assert_eq!(record.proposed_at_block, Some(1));
    }

    #[test]
    fn duplicate_approvals_do_not_double_count() {
        let events = vec![
            proposed(1, 0, 0),
            signed(2, 0, 0, addr(1)),
            signed(3, 0, 0, addr(1)),
        ];
        let records = fold_events(&events, 2);
        assert_eq!(records[&0].signature_count, 1);
    }

    #[test]
    fn approval_before_proposal_synthesizes_placeholder() {
        let events = vec![signed(5, 0, 7, addr(1))];
        let records = fold_events(&events, 2);
        let record = &records[&7];
        assert_eq!(record.recipient, Address::ZERO);
        assert_eq!(record.signature_count, 1);
        assert!(record.has_signed(&addr(1)));
    }

    #[test]
    fn late_events_cannot_unfreeze_an_executed_record() {
        let events = vec![
            proposed(1, 0, 0),
            signed(2, 0, 0, addr(1)),
            executed(3, 0, 0),
            signed(4, 0, 0, addr(2)),
        ];
        let records = fold_events(&events, 2);
        let record = &records[&0];
        assert!(record.executed);
        assert_eq!(record.signature_count, 1);
    }

    #[test]
    fn refold_is_idempotent() {
        let events = vec![
            proposed(1, 0, 0),
            proposed(1, 1, 1),
            signed(2, 0, 0, addr(1)),
            signed(2, 1, 1, addr(2)),
            executed(3, 0, 1),
        ];
        assert_eq!(fold_events(&events, 2), fold_events(&events, 2));
    }
}
