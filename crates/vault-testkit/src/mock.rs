//! The scripted mock ledger
//!
//! `MockLedger` keeps its whole state behind one mutex and never holds
//! the lock across an await, so it is safe to share via `Arc` between
//! concurrent test tasks. Submissions are applied with the semantics of
//! the real vault contract: proposals are assigned the next id, and an
//! approval that reaches the threshold executes the transfer in the same
//! submission.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;
use vault_core::types::{Address, TransactionId};
use vault_ledger::{
    BlockRange, Call, EventBody, EventKind, EventMeta, LedgerClient, LedgerError, LedgerEvent,
    SubmitParams, SubmitReceipt, TransactionState,
};

/// Default cost estimate returned when none is scripted.
pub const DEFAULT_ESTIMATE: u64 = 100_000;
/// Default fee rate returned when none is scripted.
pub const DEFAULT_FEE_RATE: u64 = 1_000;

#[derive(Default)]
struct MockState {
    transactions: BTreeMap<TransactionId, TransactionState>,
    approvals: HashMap<TransactionId, BTreeSet<Address>>,
    events: Vec<LedgerEvent>,
    signers: BTreeSet<Address>,
    required_signatures: u32,
    fee_rate: u64,
    estimate: u64,
    next_id: TransactionId,
    next_block: u64,
    missing_capabilities: BTreeSet<&'static str>,
    method_failures: HashMap<&'static str, LedgerError>,
    transaction_failures: HashMap<TransactionId, LedgerError>,
    calls: HashMap<&'static str, u32>,
    submissions: Vec<(Call, SubmitParams)>,
}

/// Scripted in-memory `LedgerClient` double.
pub struct MockLedger {
    state: Mutex<MockState>,
    submit_delay: Option<Duration>,
    query_delay: Option<Duration>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// An empty ledger with sane defaults.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                required_signatures: 2,
                fee_rate: DEFAULT_FEE_RATE,
                estimate: DEFAULT_ESTIMATE,
                next_block: 1,
                ..MockState::default()
            }),
            submit_delay: None,
            query_delay: None,
        }
    }

    /// Set the signature threshold.
    pub fn with_required_signatures(self, required: u32) -> Self {
        self.locked().required_signatures = required;
        self
    }

    /// Register authorized signers.
    pub fn with_signers(self, signers: impl IntoIterator<Item = Address>) -> Self {
        self.locked().signers.extend(signers);
        self
    }

    /// Set the current fee rate.
    pub fn with_fee_rate(self, rate: u64) -> Self {
        self.locked().fee_rate = rate;
        self
    }

    /// Set the cost estimate returned by `estimate_cost`.
    pub fn with_estimate(self, estimate: u64) -> Self {
        self.locked().estimate = estimate;
        self
    }

    /// Append a scripted historical event, keeping the block cursor and
    /// id counter consistent with it.
    pub fn with_event(self, event: LedgerEvent) -> Self {
        self.apply_event(event);
        self
    }

    /// Append an event after construction, for mid-test ledger changes.
    pub fn apply_event(&self, event: LedgerEvent) {
        let mut state = self.locked();
        state.next_block = state.next_block.max(event.meta.block_number + 1);
        match &event.body {
            EventBody::Proposed {
                id,
                recipient,
                amount,
                payload,
            } => {
                state.next_id = state.next_id.max(id + 1);
                state.transactions.insert(
                    *id,
                    TransactionState {
                        recipient: *recipient,
                        amount: *amount,
                        payload: payload.clone(),
                        executed: false,
                        signature_count: 0,
                    },
                );
            }
            EventBody::Signed { id, signer } => {
                state.approvals.entry(*id).or_default().insert(*signer);
                let count = state.approvals[id].len() as u32;
                if let Some(tx) = state.transactions.get_mut(id) {
                    tx.signature_count = count;
                }
            }
            EventBody::Executed { id } => {
                if let Some(tx) = state.transactions.get_mut(id) {
                    tx.executed = true;
                }
            }
            EventBody::SignerAdded { signer } => {
                state.signers.insert(*signer);
            }
            EventBody::SignerRemoved { signer } => {
                state.signers.remove(signer);
            }
        }
        state.events.push(event);
    }

    /// Declare a method absent, so calls report `CapabilityMissing`.
    pub fn without_capability(self, method: &'static str) -> Self {
        self.locked().missing_capabilities.insert(method);
        self
    }

    /// Script a persistent failure for a method.
    pub fn failing(self, method: &'static str, error: LedgerError) -> Self {
        self.locked().method_failures.insert(method, error);
        self
    }

    /// Script a persistent failure for reading one transaction id.
    pub fn failing_transaction(self, id: TransactionId, error: LedgerError) -> Self {
        self.locked().transaction_failures.insert(id, error);
        self
    }

    /// Delay every submission, for in-flight exclusion tests.
    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = Some(delay);
        self
    }

    /// Delay every event query, for single-flight and teardown tests.
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    /// Script a persistent failure for a method after construction.
    pub fn set_failing(&self, method: &'static str, error: LedgerError) {
        self.locked().method_failures.insert(method, error);
    }

    /// Clear a scripted method failure.
    pub fn clear_failing(&self, method: &'static str) {
        self.locked().method_failures.remove(method);
    }

    /// Number of calls made to one method.
    pub fn calls(&self, method: &str) -> u32 {
        self.locked().calls.get(method).copied().unwrap_or(0)
    }

    /// Total calls made across every method.
    pub fn total_calls(&self) -> u32 {
        self.locked().calls.values().sum()
    }

    /// Every submission received, in order.
    pub fn submissions(&self) -> Vec<(Call, SubmitParams)> {
        self.locked().submissions.clone()
    }

    fn locked(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }

    fn checked(&self, method: &'static str) -> Result<(), LedgerError> {
        let mut state = self.locked();
        *state.calls.entry(method).or_default() += 1;
        if state.missing_capabilities.contains(method) {
            return Err(LedgerError::capability_missing(method));
        }
        if let Some(error) = state.method_failures.get(method) {
            return Err(error.clone());
        }
        Ok(())
    }

    fn apply_submission(&self, call: &Call, params: &SubmitParams) -> Result<(), LedgerError> {
        let mut state = self.locked();
        match call {
            Call::Propose {
                recipient,
                amount,
                payload,
            } => {
                let id = state.next_id;
                state.next_id += 1;
                state.transactions.insert(
                    id,
                    TransactionState {
                        recipient: *recipient,
                        amount: *amount,
                        payload: payload.clone(),
                        executed: false,
                        signature_count: 0,
                    },
                );
                let block = state.next_block;
                state.next_block += 1;
                state.events.push(LedgerEvent::new(
                    EventMeta::new(block, 0),
                    EventBody::Proposed {
                        id,
                        recipient: *recipient,
                        amount: *amount,
                        payload: payload.clone(),
                    },
                ));
                Ok(())
            }
            Call::Sign { transaction_id } => {
                let id = *transaction_id;
                if !state.signers.is_empty() && !state.signers.contains(&params.from) {
                    return Err(LedgerError::reverted("caller is not a signer"));
                }
                let Some(tx) = state.transactions.get(&id) else {
                    return Err(LedgerError::reverted("transaction does not exist"));
                };
                if tx.executed {
                    return Err(LedgerError::reverted("transaction already executed"));
                }
                if state
                    .approvals
                    .get(&id)
                    .is_some_and(|set| set.contains(&params.from))
                {
                    return Err(LedgerError::reverted("caller already signed"));
                }
                state.approvals.entry(id).or_default().insert(params.from);
                let count = state.approvals[&id].len() as u32;
                let required = state.required_signatures;
                let block = state.next_block;
                state.next_block += 1;
                state.events.push(LedgerEvent::new(
                    EventMeta::new(block, 0),
                    EventBody::Signed {
                        id,
                        signer: params.from,
                    },
                ));
                let tx = state
                    .transactions
                    .get_mut(&id)
                    .expect("transaction present");
                tx.signature_count = count;
                if count >= required {
                    tx.executed = true;
                    state.events.push(LedgerEvent::new(
                        EventMeta::new(block, 1),
                        EventBody::Executed { id },
                    ));
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn read_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionState>, LedgerError> {
        self.checked("read_transaction")?;
        let state = self.locked();
        if let Some(error) = state.transaction_failures.get(&id) {
            return Err(error.clone());
        }
        Ok(state.transactions.get(&id).cloned())
    }

    async fn read_required_signatures(&self) -> Result<u32, LedgerError> {
        self.checked("read_required_signatures")?;
        Ok(self.locked().required_signatures)
    }

    async fn read_transaction_count(&self) -> Result<u64, LedgerError> {
        self.checked("read_transaction_count")?;
        let state = self.locked();
        let highest = state.transactions.keys().next_back().map_or(0, |id| id + 1);
        Ok(state.next_id.max(highest))
    }

    async fn read_has_signed(
        &self,
        id: TransactionId,
        identity: Address,
    ) -> Result<bool, LedgerError> {
        self.checked("read_has_signed")?;
        Ok(self
            .locked()
            .approvals
            .get(&id)
            .is_some_and(|set| set.contains(&identity)))
    }

    async fn read_is_signer(&self, identity: Address) -> Result<bool, LedgerError> {
        self.checked("read_is_signer")?;
        Ok(self.locked().signers.contains(&identity))
    }

    async fn query_events(
        &self,
        kind: EventKind,
        range: BlockRange,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        self.checked("query_events")?;
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.locked();
        let mut events: Vec<LedgerEvent> = state
            .events
            .iter()
            .filter(|event| event.body.kind() == kind && range.contains(event.meta.block_number))
            .cloned()
            .collect();
        events.sort_by_key(|event| event.meta.ordering_key());
        Ok(events)
    }

    async fn estimate_cost(&self, _call: &Call, _from: Address) -> Result<u64, LedgerError> {
        self.checked("estimate_cost")?;
        Ok(self.locked().estimate)
    }

    async fn current_fee_rate(&self) -> Result<u64, LedgerError> {
        self.checked("current_fee_rate")?;
        Ok(self.locked().fee_rate)
    }

    async fn submit(&self, call: Call, params: SubmitParams) -> Result<SubmitReceipt, LedgerError> {
        self.checked("submit")?;
        self.locked().submissions.push((call.clone(), params));
        if let Some(delay) = self.submit_delay {
            tokio::time::sleep(delay).await;
        }
        self.apply_submission(&call, &params)?;
        let block = self.locked().next_block.saturating_sub(1);
        Ok(SubmitReceipt {
            included_in_block: Some(block),
        })
    }
}
