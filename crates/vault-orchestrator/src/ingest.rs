//! Concurrent event fetching and merge ordering
//!
//! The three transaction event collections are independent reads, so
//! they are fetched concurrently; no pairwise ordering between them is
//! assumed as delivered. The only merge key is `(block_number,
//! log_index)` ascending. A failure fetching any one collection is fatal
//! to the whole pass — an incomplete view must never be presented as
//! complete.

use crate::classify::ledger_to_vault;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, warn};
use vault_core::config::RetryConfig;
use vault_core::error::Result;
use vault_ledger::{BlockRange, EventKind, LedgerClient, LedgerError, LedgerEvent};

/// Fetches and normalizes ledger events into a single ordered sequence.
///
/// Pure fetch-and-merge: no state is held beyond the client handle and
/// the read-side retry policy. Reads are idempotent, so transient
/// transport failures are retried with exponential backoff before the
/// pass is declared failed.
pub struct EventIngestor<C: ?Sized> {
    client: Arc<C>,
    retry: RetryConfig,
}

impl<C: ?Sized> Clone for EventIngestor<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            retry: self.retry.clone(),
        }
    }
}

impl<C> EventIngestor<C>
where
    C: LedgerClient + ?Sized,
{
    /// Create an ingestor over a ledger client.
    pub fn new(client: Arc<C>, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// Fetch the three transaction event kinds concurrently and merge
    /// them by `(block_number, log_index)`.
    pub async fn fetch_transaction_events(&self, range: BlockRange) -> Result<Vec<LedgerEvent>> {
        let (proposed, signed, executed) = futures::try_join!(
            self.query_with_retry(EventKind::Proposed, range),
            self.query_with_retry(EventKind::Signed, range),
            self.query_with_retry(EventKind::Executed, range),
        )
        .map_err(ledger_to_vault)?;

        let mut events = proposed;
        events.extend(signed);
        events.extend(executed);
        events.sort_by_key(|event| event.meta.ordering_key());
        debug!(count = events.len(), "transaction events merged");
        Ok(events)
    }

    /// Fetch the signer membership event kinds concurrently and merge
    /// them in ledger order.
    pub async fn fetch_signer_events(&self, range: BlockRange) -> Result<Vec<LedgerEvent>> {
        let (added, removed) = futures::try_join!(
            self.query_with_retry(EventKind::SignerAdded, range),
            self.query_with_retry(EventKind::SignerRemoved, range),
        )
        .map_err(ledger_to_vault)?;

        let mut events = added;
        events.extend(removed);
        events.sort_by_key(|event| event.meta.ordering_key());
        Ok(events)
    }

    async fn query_with_retry(
        &self,
        kind: EventKind,
        range: BlockRange,
    ) -> std::result::Result<Vec<LedgerEvent>, LedgerError> {
        let mut attempt = 1u32;
        loop {
            match self.client.query_events(kind, range).await {
                Ok(events) => return Ok(events),
                Err(LedgerError::Unavailable { message }) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        ?kind,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        %message,
                        "event query failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
