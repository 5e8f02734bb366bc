//! Ledger-facing identifier and value types
//!
//! Addresses and payloads carry their canonical text encodings here so
//! that validation happens once, before any network call, and the rest
//! of the system only ever sees well-formed values.

use crate::error::{Result, VaultError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ledger-assigned transaction identifier.
///
/// Assigned at proposal time, stable for the record's lifetime, never
/// reused.
pub type TransactionId = u64;

/// A 20-byte account address with a canonical `0x`-prefixed hex encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Construct from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse the canonical text form, rejecting anything that is not a
    /// `0x`-prefixed 40-digit hex string.
    pub fn parse(text: &str) -> Result<Self> {
        let stripped = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .ok_or_else(|| VaultError::validation("address must start with 0x"))?;
        if stripped.len() != 40 {
            return Err(VaultError::validation(format!(
                "address must be 40 hex digits, got {}",
                stripped.len()
            )));
        }
        let raw = hex::decode(stripped)
            .map_err(|_| VaultError::validation("address contains non-hex characters"))?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&raw);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Opaque call payload attached to a transfer.
///
/// The empty sequence is the canonical "no payload" value and renders as
/// the single token `0x`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// The canonical empty payload.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Construct from raw bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw byte view.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether this is the canonical empty payload.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse payload text. Accepts an empty string or bare `0x` as the
    /// empty payload, and otherwise requires well-formed hex (the `0x`
    /// prefix is optional on input). Odd-length or non-hex input is a
    /// validation failure.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if stripped.is_empty() {
            return Ok(Self::empty());
        }
        if stripped.len() % 2 != 0 {
            return Err(VaultError::validation(
                "payload hex must have an even number of digits",
            ));
        }
        let bytes = hex::decode(stripped)
            .map_err(|_| VaultError::validation("payload contains non-hex characters"))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Raw transfer input as entered at the boundary, prior to validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Recipient address text
    pub recipient: String,
    /// Amount in the ledger's smallest unit, as a decimal integer string
    pub amount: String,
    /// Optional hex payload text; empty means no payload
    pub payload: String,
}

/// A fully validated transfer, safe to hand to the ledger client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferIntent {
    /// Destination of the transfer
    pub recipient: Address,
    /// Amount in the ledger's smallest unit
    pub amount: u128,
    /// Opaque call payload
    pub payload: Payload,
}

impl TransferIntent {
    /// Validate a raw request into a transfer intent.
    ///
    /// All checks are local; no network call is made. The amount must be
    /// a non-negative integer in the smallest unit — decimal conversion
    /// from display units happens at the presentation boundary, never
    /// here.
    pub fn validate(request: &TransferRequest) -> Result<Self> {
        let recipient = Address::parse(request.recipient.trim())?;
        let amount_text = request.amount.trim();
        let amount = if amount_text.is_empty() {
            0
        } else {
            amount_text.parse::<u128>().map_err(|_| {
                VaultError::validation("amount must be a non-negative integer in smallest units")
            })?
        };
        let payload = Payload::parse(&request.payload)?;
        Ok(Self {
            recipient,
            amount,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x16ab72bc604e00bfcdcad1ddc7625f303ca44f47";

    #[test]
    fn address_round_trips_through_text() {
        let addr = Address::parse(ADDR).expect("valid address");
        assert_eq!(addr.to_string(), ADDR);
    }

    #[test]
    fn address_rejects_malformed_input() {
        assert!(Address::parse("16ab72bc604e00bfcdcad1ddc7625f303ca44f47").is_err());
        assert!(Address::parse("0x16ab").is_err());
        assert!(Address::parse("0xzzab72bc604e00bfcdcad1ddc7625f303ca44f47").is_err());
        assert!(Address::parse("").is_err());
    }

    #[test]
    fn payload_empty_forms_are_canonical() {
        assert_eq!(Payload::parse("").expect("empty"), Payload::empty());
        assert_eq!(Payload::parse("0x").expect("bare 0x"), Payload::empty());
        assert_eq!(Payload::empty().to_string(), "0x");
    }

    #[test]
    fn payload_rejects_odd_length_and_non_hex() {
        assert!(Payload::parse("0xabc").is_err());
        assert!(Payload::parse("0xgg").is_err());
        assert!(Payload::parse("a0b1c2").is_ok());
    }

    #[test]
    fn transfer_intent_validates_all_fields_locally() {
        let intent = TransferIntent::validate(&TransferRequest {
            recipient: ADDR.to_string(),
            amount: "1000".to_string(),
            payload: String::new(),
        })
        .expect("valid request");
        assert_eq!(intent.amount, 1000);
        assert!(intent.payload.is_empty());

        let bad = TransferIntent::validate(&TransferRequest {
            recipient: "not-an-address".to_string(),
            amount: "1000".to_string(),
            payload: String::new(),
        });
        assert!(matches!(bad, Err(VaultError::Validation { .. })));

        let bad = TransferIntent::validate(&TransferRequest {
            recipient: ADDR.to_string(),
            amount: "1.5".to_string(),
            payload: String::new(),
        });
        assert!(matches!(bad, Err(VaultError::Validation { .. })));
    }

    #[test]
    fn canonical_text_forms_survive_serde() {
        let addr = Address::parse(ADDR).expect("valid address");
        let json = serde_json::to_string(&addr).expect("serialize");
        assert_eq!(json, format!("\"{ADDR}\""));
        let back: Address = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, addr);

        let payload = Payload::parse("0xdeadbeef").expect("valid payload");
        let json = serde_json::to_string(&payload).expect("serialize");
        assert_eq!(json, "\"0xdeadbeef\"");
    }

    #[test]
    fn empty_amount_defaults_to_zero() {
        let intent = TransferIntent::validate(&TransferRequest {
            recipient: ADDR.to_string(),
            amount: "  ".to_string(),
            payload: "0x".to_string(),
        })
        .expect("valid request");
        assert_eq!(intent.amount, 0);
    }
}
