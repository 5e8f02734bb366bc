//! Signer authorization checks with capability fallback
//!
//! The gate answers "is this identity a current signer?" for UX purposes
//! only — enabling or disabling the sign action. The ledger remains the
//! enforcing authority; a positive answer here never substitutes for
//! ledger-side rejection.
//!
//! The direct membership query is capability-optional. When the ledger
//! reports the method absent, membership is derived by folding
//! `SignerAdded` / `SignerRemoved` events instead, handled here in one
//! place rather than probed ad hoc at every call site.

use crate::classify::ledger_to_vault;
use crate::ingest::EventIngestor;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use vault_core::error::Result;
use vault_core::signers::{SignerChange, SignerSet};
use vault_core::types::Address;
use vault_ledger::{BlockRange, EventBody, LedgerClient, LedgerError};

/// Memoized signer-authorization checks.
///
/// Results are cached per identity for the session and dropped on
/// explicit invalidation: a connected-identity change, newly observed
/// signer-change events, or a caller-requested refresh.
pub struct AuthorizationGate<C: ?Sized> {
    client: Arc<C>,
    ingestor: EventIngestor<C>,
    cache: Mutex<HashMap<Address, bool>>,
}

impl<C> AuthorizationGate<C>
where
    C: LedgerClient + ?Sized,
{
    /// Create a gate over a client and its ingestor.
    pub fn new(client: Arc<C>, ingestor: EventIngestor<C>) -> Self {
        Self {
            client,
            ingestor,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Whether the identity is a current authorized signer.
    ///
    /// Advisory: the answer gates UI affordances, not submissions.
    pub async fn is_authorized(&self, identity: Address) -> Result<bool> {
        if let Some(cached) = self.cache.lock().await.get(&identity) {
            return Ok(*cached);
        }

        let answer = match self.client.read_is_signer(identity).await {
            Ok(answer) => answer,
            Err(LedgerError::CapabilityMissing { method }) => {
                debug!(%method, "membership query unsupported, deriving from events");
                self.derive_membership(identity).await?
            }
            Err(err) => return Err(ledger_to_vault(err)),
        };

        self.cache.lock().await.insert(identity, answer);
        Ok(answer)
    }

    /// Drop the cached answer for one identity.
    pub async fn invalidate(&self, identity: &Address) {
        self.cache.lock().await.remove(identity);
    }

    /// Drop every cached answer. Called on identity change and when new
    /// signer-change events are observed.
    pub async fn invalidate_all(&self) {
        self.cache.lock().await.clear();
    }

    async fn derive_membership(&self, identity: Address) -> Result<bool> {
        let events = self
            .ingestor
            .fetch_signer_events(BlockRange::genesis_to_latest())
            .await?;
        let changes = events.iter().filter_map(|event| match event.body {
            EventBody::SignerAdded { signer } => Some(SignerChange::Added(signer)),
            EventBody::SignerRemoved { signer } => Some(SignerChange::Removed(signer)),
            _ => None,
        });
        Ok(SignerSet::derive(changes).contains(&identity))
    }
}
