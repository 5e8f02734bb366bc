//! The async ledger client trait
//!
//! [`LedgerClient`] is the single seam between the vault client and the
//! external ledger. Implementations issue read calls, stream historical
//! events, and submit state-changing calls; everything above this trait
//! is deterministic and testable against a double.

use crate::error::LedgerError;
use crate::event::{BlockRange, EventKind, LedgerEvent};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vault_core::types::{Address, Payload, TransactionId};

/// Direct-read view of one transaction, as stored by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    /// Destination of the transfer
    pub recipient: Address,
    /// Amount in smallest units
    pub amount: u128,
    /// Opaque call payload
    pub payload: Payload,
    /// Whether the transfer has executed
    pub executed: bool,
    /// Approval count as stored by the ledger
    pub signature_count: u32,
}

/// A state-changing call the client can submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    /// Propose a new transfer
    Propose {
        /// Destination of the transfer
        recipient: Address,
        /// Amount in smallest units
        amount: u128,
        /// Opaque call payload
        payload: Payload,
    },
    /// Approve a pending transfer
    Sign {
        /// Transaction to approve
        transaction_id: TransactionId,
    },
}

/// Pricing and origin parameters for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitParams {
    /// Submitting identity
    pub from: Address,
    /// Resource ceiling for the call
    pub fee_limit: u64,
    /// Price per resource unit
    pub fee_rate: u64,
}

/// Acknowledgement of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    /// Block the call was included in, when already known
    pub included_in_block: Option<u64>,
}

/// The ledger surface consumed by the vault client.
///
/// Reads are idempotent and may be retried by callers; `submit` is not,
/// and callers own the decision of whether an ambiguous outcome may ever
/// be retried (for this system: never).
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read one transaction directly. `Ok(None)` means the id does not
    /// exist — distinct from a read failure.
    async fn read_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<TransactionState>, LedgerError>;

    /// Read the process-wide signature threshold.
    async fn read_required_signatures(&self) -> Result<u32, LedgerError>;

    /// Read the total number of transactions ever proposed.
    async fn read_transaction_count(&self) -> Result<u64, LedgerError>;

    /// Whether the identity has signed the given transaction.
    async fn read_has_signed(
        &self,
        id: TransactionId,
        identity: Address,
    ) -> Result<bool, LedgerError>;

    /// Whether the identity is a current signer.
    ///
    /// Capability-optional: ledgers without this method report
    /// [`LedgerError::CapabilityMissing`] and callers derive membership
    /// from signer-change events instead.
    async fn read_is_signer(&self, identity: Address) -> Result<bool, LedgerError>;

    /// Fetch the events of one kind over a block range, ordered by
    /// `(block_number, log_index)`.
    async fn query_events(
        &self,
        kind: EventKind,
        range: BlockRange,
    ) -> Result<Vec<LedgerEvent>, LedgerError>;

    /// Estimate the resource cost of a call. May fail; estimation failure
    /// is not proof the call would fail.
    async fn estimate_cost(&self, call: &Call, from: Address) -> Result<u64, LedgerError>;

    /// Read the current network fee rate.
    async fn current_fee_rate(&self) -> Result<u64, LedgerError>;

    /// Submit a state-changing call.
    async fn submit(&self, call: Call, params: SubmitParams) -> Result<SubmitReceipt, LedgerError>;
}

impl Call {
    /// Build a propose call from a validated transfer.
    pub fn propose(recipient: Address, amount: u128, payload: Payload) -> Self {
        Self::Propose {
            recipient,
            amount,
            payload,
        }
    }

    /// Build a sign call.
    pub fn sign(transaction_id: TransactionId) -> Self {
        Self::Sign { transaction_id }
    }
}
