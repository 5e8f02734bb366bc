//! The lifecycle orchestrator owning session state
//!
//! One orchestrator instance corresponds to one connected-signer
//! session. It exclusively owns the reconciled snapshot and the
//! authorization cache; both are discarded and rebuilt from scratch when
//! the identity changes or the session is torn down.
//!
//! Mutating operations follow a fixed shape: validate locally, admit
//! against the in-flight exclusion set, price with a fresh fee quote,
//! submit, then trigger a reconciliation refresh — the refresh is the
//! single source of truth for effects, because a failed submission does
//! not prove no state change occurred. Execution is never asserted
//! locally; it is only ever observed through reconciliation once the
//! ledger crosses the threshold.

use crate::authorize::AuthorizationGate;
use crate::classify::ledger_to_vault;
use crate::fees;
use crate::ingest::EventIngestor;
use crate::reconcile::{Snapshot, StateReconciler};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use vault_core::config::OrchestratorConfig;
use vault_core::error::{RejectReason, Result, VaultError};
use vault_core::record::{executed_views, pending_views, TransactionView};
use vault_core::types::{Address, TransactionId, TransferIntent, TransferRequest};
use vault_ledger::{BlockRange, Call, LedgerClient, SubmitParams, SubmitReceipt};

/// Freshness of the reconciled view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewHealth {
    /// No reconciliation pass has completed yet
    Unsynced,
    /// The last pass completed fully
    Fresh,
    /// The last pass completed with a gap; retry is advised
    Degraded {
        /// What degraded the pass
        error: VaultError,
    },
}

struct Session {
    identity: Address,
    snapshot: Snapshot,
    health: ViewHealth,
}

impl Session {
    fn fresh(identity: Address) -> Self {
        Self {
            identity,
            snapshot: Snapshot::empty(),
            health: ViewHealth::Unsynced,
        }
    }
}

/// Drives the transaction lifecycle for one connected signer.
pub struct LifecycleOrchestrator<C: ?Sized> {
    client: Arc<C>,
    config: OrchestratorConfig,
    reconciler: StateReconciler<C>,
    gate: AuthorizationGate<C>,
    session: Mutex<Session>,
    /// Keys of outstanding sign submissions
    sign_in_flight: Mutex<BTreeSet<(TransactionId, Address)>>,
    /// Whether a propose submission is outstanding
    propose_in_flight: AtomicBool,
    /// Serializes reconciliation passes
    refresh_gate: Mutex<()>,
    /// Completed-pass counter, for join-instead-of-refold
    pass_counter: AtomicU64,
    /// Session epoch; bumped on identity change and teardown
    epoch: AtomicU64,
}

impl<C> LifecycleOrchestrator<C>
where
    C: LedgerClient + ?Sized,
{
    /// Create an orchestrator for one connected identity.
    pub fn new(client: Arc<C>, identity: Address, config: OrchestratorConfig) -> Result<Self> {
        config.validate()?;
        let ingestor = EventIngestor::new(Arc::clone(&client), config.retry.clone());
        let reconciler = StateReconciler::new(Arc::clone(&client), ingestor.clone());
        let gate = AuthorizationGate::new(Arc::clone(&client), ingestor);
        Ok(Self {
            client,
            config,
            reconciler,
            gate,
            session: Mutex::new(Session::fresh(identity)),
            sign_in_flight: Mutex::new(BTreeSet::new()),
            propose_in_flight: AtomicBool::new(false),
            refresh_gate: Mutex::new(()),
            pass_counter: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
        })
    }

    /// The currently connected identity.
    pub async fn identity(&self) -> Address {
        self.session.lock().await.identity
    }

    /// Freshness of the current view.
    pub async fn health(&self) -> ViewHealth {
        self.session.lock().await.health.clone()
    }

    /// Threshold snapshot from the last completed pass.
    pub async fn required_signatures(&self) -> u32 {
        self.session.lock().await.snapshot.required_signatures
    }

    /// Pending transactions projected for the connected identity, most
    /// recently proposed first.
    pub async fn pending(&self) -> Vec<TransactionView> {
        let session = self.session.lock().await;
        pending_views(&session.snapshot.records, &session.identity)
    }

    /// Executed transactions projected for the connected identity, most
    /// recently proposed first.
    pub async fn executed(&self) -> Vec<TransactionView> {
        let session = self.session.lock().await;
        executed_views(&session.snapshot.records, &session.identity)
    }

    /// Whether the connected identity is an authorized signer (advisory).
    pub async fn is_authorized(&self) -> Result<bool> {
        let identity = self.identity().await;
        self.gate.is_authorized(identity).await
    }

    /// Re-check the connected identity's authorization against the
    /// ledger, dropping the memoized answer first. The memoized result
    /// cannot observe signer-set changes made after it was cached, so
    /// callers reacting to signer-change events (or simply wanting a
    /// current answer) force the re-check here.
    pub async fn refresh_authorization(&self) -> Result<bool> {
        let identity = self.identity().await;
        self.gate.invalidate(&identity).await;
        self.gate.is_authorized(identity).await
    }

    /// Replace the connected identity, discarding all session state.
    pub async fn switch_identity(&self, identity: Address) {
        info!(%identity, "switching connected identity");
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.session.lock().await = Session::fresh(identity);
        self.sign_in_flight.lock().await.clear();
        self.propose_in_flight.store(false, Ordering::SeqCst);
        self.gate.invalidate_all().await;
    }

    /// Tear the session down. A reconciliation pass still in flight will
    /// discard its result rather than mutate state after teardown.
    pub async fn teardown(&self) {
        let identity = self.identity().await;
        debug!(%identity, "session teardown");
        self.switch_identity(identity).await;
    }

    /// Run (or join) a reconciliation pass and publish the new snapshot.
    ///
    /// A refresh requested while a pass is running waits for that pass
    /// and adopts its result instead of starting a second fold over
    /// possibly-partial data. On `LedgerUnavailable` the prior
    /// known-good snapshot is retained.
    pub async fn refresh(&self) -> Result<ViewHealth> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let passes_before = self.pass_counter.load(Ordering::SeqCst);
        let _running = self.refresh_gate.lock().await;
        if self.pass_counter.load(Ordering::SeqCst) != passes_before {
            // a pass completed while we waited; join its result
            return Ok(self.session.lock().await.health.clone());
        }

        let viewer = self.identity().await;
        let outcome = self
            .reconciler
            .reconcile(BlockRange::genesis_to_latest(), viewer)
            .await;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!("discarding reconciliation result: session changed mid-pass");
            return Ok(self.session.lock().await.health.clone());
        }

        match outcome {
            Ok((snapshot, degradation)) => {
                let health = match degradation {
                    None => ViewHealth::Fresh,
                    Some(error) => {
                        warn!(%error, "reconciliation pass degraded");
                        ViewHealth::Degraded { error }
                    }
                };
                let mut session = self.session.lock().await;
                session.snapshot = snapshot;
                session.health = health.clone();
                drop(session);
                self.pass_counter.fetch_add(1, Ordering::SeqCst);
                Ok(health)
            }
            Err(error) => {
                warn!(%error, "reconciliation pass failed, retaining prior view");
                self.session.lock().await.health = ViewHealth::Degraded {
                    error: error.clone(),
                };
                Err(error)
            }
        }
    }

    /// Propose a new transfer.
    ///
    /// Validation is local and happens before any network call. The new
    /// record becomes visible only through the triggered refresh — the
    /// id is assigned by the ledger and only observable via the
    /// resulting event. An ambiguous submission outcome is surfaced as
    /// [`VaultError::OutcomeUnknown`] and never retried automatically: a
    /// duplicate proposal would be a distinct, unwanted transfer.
    pub async fn propose(&self, request: &TransferRequest) -> Result<()> {
        let intent = TransferIntent::validate(request)?;
        let from = self.identity().await;

        if self.propose_in_flight.swap(true, Ordering::SeqCst) {
            return Err(VaultError::already_in_flight("propose"));
        }
        let result = self
            .submit_priced(
                Call::propose(intent.recipient, intent.amount, intent.payload),
                from,
            )
            .await;
        self.propose_in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(receipt) => {
                info!(recipient = %intent.recipient, amount = intent.amount, "proposal submitted");
                debug!(?receipt, "proposal receipt");
                // the submission landed; a refresh failure only means the
                // view is stale, which health already reflects. Reporting
                // it as the operation's failure would invite a retry of a
                // call that must not be repeated.
                if let Err(error) = self.refresh().await {
                    warn!(%error, "refresh after proposal failed, view is stale");
                }
                Ok(())
            }
            Err(error @ VaultError::OutcomeUnknown { .. }) => {
                // the call may have landed; refresh so it becomes
                // visible, but report the ambiguity instead of retrying
                warn!(%error, "proposal outcome unknown");
                let _ = self.refresh().await;
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    /// Approve a pending transfer.
    ///
    /// At most one sign submission per `(transaction, identity)` pair
    /// may be outstanding; a duplicate concurrent call is rejected
    /// locally with [`VaultError::AlreadyInFlight`] and never reaches
    /// the ledger. A refresh is triggered on success and on classified
    /// failure alike, since a failure does not prove no state change
    /// occurred.
    pub async fn sign(&self, id: TransactionId) -> Result<()> {
        let identity = self.identity().await;
        self.check_sign_preconditions(id, &identity).await?;

        match self.gate.is_authorized(identity).await {
            Ok(false) => {
                return Err(VaultError::rejected(
                    RejectReason::NotAuthorized,
                    "local authorization check",
                ));
            }
            Ok(true) => {}
            // advisory only; the ledger is the enforcing authority
            Err(error) => warn!(%error, "authorization check unavailable, proceeding"),
        }

        let key = (id, identity);
        {
            let mut in_flight = self.sign_in_flight.lock().await;
            if !in_flight.insert(key) {
                return Err(VaultError::already_in_flight(format!("sign({id})")));
            }
        }
        let result = self.submit_priced(Call::sign(id), identity).await;
        self.sign_in_flight.lock().await.remove(&key);

        // refresh regardless of outcome; reconciliation is the single
        // source of truth for what actually changed
        let refresh_outcome = self.refresh().await;

        match result {
            Ok(_) => {
                info!(id, %identity, "approval submitted");
                if let Err(error) = refresh_outcome {
                    warn!(id, %error, "refresh after approval failed, view is stale");
                }
                Ok(())
            }
            Err(error) => {
                debug!(id, %error, "approval failed");
                Err(error)
            }
        }
    }

    async fn check_sign_preconditions(&self, id: TransactionId, identity: &Address) -> Result<()> {
        let session = self.session.lock().await;
        match session.snapshot.records.get(&id) {
            None => Err(VaultError::rejected(
                RejectReason::InvalidTransaction,
                "unknown transaction id",
            )),
            Some(record) if record.executed => Err(VaultError::rejected(
                RejectReason::AlreadyExecuted,
                "transaction already executed in local view",
            )),
            Some(record) if record.has_signed(identity) => Err(VaultError::rejected(
                RejectReason::AlreadySigned,
                "identity already present in signer set of local view",
            )),
            Some(_) => Ok(()),
        }
    }

    async fn submit_priced(&self, call: Call, from: Address) -> Result<SubmitReceipt> {
        let plan =
            fees::plan_submission(self.client.as_ref(), &self.config.fees, &call, from).await?;
        self.client
            .submit(
                call,
                SubmitParams {
                    from,
                    fee_limit: plan.fee_limit,
                    fee_rate: plan.fee_rate,
                },
            )
            .await
            .map_err(ledger_to_vault)
    }
}
