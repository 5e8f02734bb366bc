//! Signer-set derivation from membership events
//!
//! When the ledger exposes no direct membership query, the current signer
//! set is derived by folding `SignerAdded` / `SignerRemoved` events: an
//! identity is a member when it has been added more times than removed.

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// A single membership change observed in the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignerChange {
    /// The identity was added to the signer set
    Added(Address),
    /// The identity was removed from the signer set
    Removed(Address),
}

/// The derived set of authorized signer identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet {
    members: BTreeSet<Address>,
}

impl SignerSet {
    /// An empty signer set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set directly from known members.
    pub fn from_members(members: impl IntoIterator<Item = Address>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// Fold an ordered sequence of membership changes into the net set.
    ///
    /// Membership is net-positive: added-count greater than removed-count
    /// for an identity implies membership. The changes must be supplied
    /// in ledger order.
    pub fn derive(changes: impl IntoIterator<Item = SignerChange>) -> Self {
        let mut balance: BTreeMap<Address, i64> = BTreeMap::new();
        for change in changes {
            match change {
                SignerChange::Added(addr) => *balance.entry(addr).or_default() += 1,
                SignerChange::Removed(addr) => *balance.entry(addr).or_default() -= 1,
            }
        }
        Self {
            members: balance
                .into_iter()
                .filter(|(_, count)| *count > 0)
                .map(|(addr, _)| addr)
                .collect(),
        }
    }

    /// Whether the identity is currently a member.
    pub fn contains(&self, identity: &Address) -> bool {
        self.members.contains(identity)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over the members in address order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    #[test]
    fn derivation_nets_adds_against_removes() {
        let set = SignerSet::derive([
            SignerChange::Added(addr(1)),
            SignerChange::Added(addr(2)),
            SignerChange::Removed(addr(1)),
            SignerChange::Added(addr(3)),
        ]);
        assert!(!set.contains(&addr(1)));
        assert!(set.contains(&addr(2)));
        assert!(set.contains(&addr(3)));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn re_added_signer_is_a_member_again() {
        let set = SignerSet::derive([
            SignerChange::Added(addr(1)),
            SignerChange::Removed(addr(1)),
            SignerChange::Added(addr(1)),
        ]);
        assert!(set.contains(&addr(1)));
    }

    #[test]
    fn remove_without_add_never_produces_membership() {
        let set = SignerSet::derive([
            SignerChange::Removed(addr(9)),
            SignerChange::Removed(addr(9)),
        ]);
        assert!(set.is_empty());
    }
}
