//! Ledger event records and block ranges
//!
//! Events are the authoritative history: proposals, approvals,
//! executions, and signer-set changes. Each event carries its position
//! in the ledger as a `(block_number, log_index)` pair, which is the only
//! ordering key the client may rely on when merging collections fetched
//! separately.

use serde::{Deserialize, Serialize};
use vault_core::types::{Address, Payload, TransactionId};

/// The categories of event the ledger emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A transfer was proposed
    Proposed,
    /// A signer approved a transfer
    Signed,
    /// A transfer crossed its threshold and executed
    Executed,
    /// An identity was added to the signer set
    SignerAdded,
    /// An identity was removed from the signer set
    SignerRemoved,
}

/// Position of an event in the ledger's total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventMeta {
    /// Block the event was included in
    pub block_number: u64,
    /// Position within the block
    pub log_index: u32,
}

impl EventMeta {
    /// Create an event position.
    pub fn new(block_number: u64, log_index: u32) -> Self {
        Self {
            block_number,
            log_index,
        }
    }

    /// The merge-ordering key.
    pub fn ordering_key(&self) -> (u64, u32) {
        (self.block_number, self.log_index)
    }
}

/// Event payload, by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventBody {
    /// A transfer was proposed
    Proposed {
        /// Ledger-assigned transaction id
        id: TransactionId,
        /// Destination of the transfer
        recipient: Address,
        /// Amount in smallest units
        amount: u128,
        /// Opaque call payload
        payload: Payload,
    },
    /// A signer approved a transfer
    Signed {
        /// Transaction being approved
        id: TransactionId,
        /// Approving identity
        signer: Address,
    },
    /// A transfer executed
    Executed {
        /// Transaction that executed
        id: TransactionId,
    },
    /// An identity joined the signer set
    SignerAdded {
        /// Added identity
        signer: Address,
    },
    /// An identity left the signer set
    SignerRemoved {
        /// Removed identity
        signer: Address,
    },
}

impl EventBody {
    /// The kind this body belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Proposed { .. } => EventKind::Proposed,
            Self::Signed { .. } => EventKind::Signed,
            Self::Executed { .. } => EventKind::Executed,
            Self::SignerAdded { .. } => EventKind::SignerAdded,
            Self::SignerRemoved { .. } => EventKind::SignerRemoved,
        }
    }
}

/// One event as delivered by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the ledger's total order
    pub meta: EventMeta,
    /// Event payload
    pub body: EventBody,
}

impl LedgerEvent {
    /// Create an event record.
    pub fn new(meta: EventMeta, body: EventBody) -> Self {
        Self { meta, body }
    }
}

/// A half-open range of blocks to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    /// First block of the range
    pub from: u64,
    /// Last block of the range, or `None` for the latest
    pub to: Option<u64>,
}

impl BlockRange {
    /// The full history: genesis to latest.
    pub fn genesis_to_latest() -> Self {
        Self { from: 0, to: None }
    }

    /// A bounded range.
    pub fn bounded(from: u64, to: u64) -> Self {
        Self { from, to: Some(to) }
    }

    /// Whether a block falls inside this range.
    pub fn contains(&self, block: u64) -> bool {
        block >= self.from && self.to.map_or(true, |to| block <= to)
    }
}

impl Default for BlockRange {
    fn default() -> Self {
        Self::genesis_to_latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_key_sorts_block_then_log_index() {
        let a = EventMeta::new(5, 9);
        let b = EventMeta::new(6, 0);
        let c = EventMeta::new(6, 1);
        assert!(a.ordering_key() < b.ordering_key());
        assert!(b.ordering_key() < c.ordering_key());
    }

    #[test]
    fn block_range_membership() {
        let open = BlockRange::genesis_to_latest();
        assert!(open.contains(0));
        assert!(open.contains(u64::MAX));

        let bounded = BlockRange::bounded(10, 20);
        assert!(!bounded.contains(9));
        assert!(bounded.contains(10));
        assert!(bounded.contains(20));
        assert!(!bounded.contains(21));
    }
}
