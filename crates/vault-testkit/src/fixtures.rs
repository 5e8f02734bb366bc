//! Event and address fixture builders

use vault_core::types::{Address, Payload, TransactionId};
use vault_ledger::{EventBody, EventMeta, LedgerEvent};

/// A deterministic test address filled with one byte.
pub fn test_address(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

/// A `Proposed` event fixture.
pub fn proposed_event(
    block: u64,
    log_index: u32,
    id: TransactionId,
    recipient: Address,
    amount: u128,
) -> LedgerEvent {
    LedgerEvent::new(
        EventMeta::new(block, log_index),
        EventBody::Proposed {
            id,
            recipient,
            amount,
            payload: Payload::empty(),
        },
    )
}

/// A `Signed` event fixture.
pub fn signed_event(
    block: u64,
    log_index: u32,
    id: TransactionId,
    signer: Address,
) -> LedgerEvent {
    LedgerEvent::new(
        EventMeta::new(block, log_index),
        EventBody::Signed { id, signer },
    )
}

/// An `Executed` event fixture.
pub fn executed_event(block: u64, log_index: u32, id: TransactionId) -> LedgerEvent {
    LedgerEvent::new(EventMeta::new(block, log_index), EventBody::Executed { id })
}

/// A `SignerAdded` event fixture.
pub fn signer_added_event(block: u64, log_index: u32, signer: Address) -> LedgerEvent {
    LedgerEvent::new(
        EventMeta::new(block, log_index),
        EventBody::SignerAdded { signer },
    )
}

/// A `SignerRemoved` event fixture.
pub fn signer_removed_event(block: u64, log_index: u32, signer: Address) -> LedgerEvent {
    LedgerEvent::new(
        EventMeta::new(block, log_index),
        EventBody::SignerRemoved { signer },
    )
}
