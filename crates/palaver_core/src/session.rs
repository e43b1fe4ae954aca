//! Active pairings, stored as a symmetric directed map.

use std::collections::HashMap;

use crate::id::UserId;

/// Bidirectional map of active pairings.
///
/// Invariants: if `a -> b` is present then `b -> a` is present, and a
/// user appears as a key in at most one pairing. Both directions are
/// always inserted or removed in the same call, so no caller can
/// observe a half-removed pairing.
#[derive(Debug, Default)]
pub struct SessionTable {
    partners: HashMap<UserId, UserId>,
}

impl SessionTable {
    pub fn partner_of(&self, user: UserId) -> Option<UserId> {
        self.partners.get(&user).copied()
    }

    pub fn is_paired(&self, user: UserId) -> bool {
        self.partners.contains_key(&user)
    }

    /// Insert the pairing `{a, b}`. Callers must ensure neither side
    /// is currently paired.
    pub fn insert_pair(&mut self, a: UserId, b: UserId) {
        debug_assert!(a != b);
        debug_assert!(!self.partners.contains_key(&a));
        debug_assert!(!self.partners.contains_key(&b));
        self.partners.insert(a, b);
        self.partners.insert(b, a);
    }

    /// Remove the pairing containing `user`, both directions at once.
    /// Returns the former partner; idempotent.
    pub fn remove_pair(&mut self, user: UserId) -> Option<UserId> {
        let partner = self.partners.remove(&user)?;
        self.partners.remove(&partner);
        Some(partner)
    }

    /// Number of active pairings.
    pub fn len(&self) -> usize {
        self.partners.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}
