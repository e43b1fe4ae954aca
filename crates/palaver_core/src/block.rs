//! Permanent mutual-exclusion pairs.

use std::collections::HashSet;

use crate::id::UserId;

/// Symmetric "never match again" relation.
///
/// Once either side blocks the other the pair is excluded from
/// matching for the rest of the process lifetime; there is no
/// clearing mechanism.
#[derive(Debug, Default)]
pub struct BlockRegistry {
    pairs: HashSet<(UserId, UserId)>,
}

fn ordered(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl BlockRegistry {
    pub fn insert(&mut self, a: UserId, b: UserId) {
        self.pairs.insert(ordered(a, b));
    }

    pub fn contains(&self, a: UserId, b: UserId) -> bool {
        self.pairs.contains(&ordered(a, b))
    }
}
