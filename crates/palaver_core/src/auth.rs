//! Access gating: who may use the relay at all.
//!
//! The engine consumes only the [`AccessGate`] predicates, re-checked
//! on every inbound event. [`InviteGate`] is the in-memory
//! implementation behind `/join`, `/revoke`, and `/allow`; nothing it
//! holds survives a restart.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::AccessConfig;
use crate::id::UserId;

/// Gate checks consumed by the engine.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn is_authorized(&self, user: UserId) -> bool;

    /// Revocation overrides authorization: a revoked user is unusable
    /// even if they still appear in the authorized set.
    async fn is_revoked(&self, user: UserId) -> bool;
}

/// In-memory invite-code gate.
pub struct InviteGate {
    codes: Vec<String>,
    inner: RwLock<GateState>,
}

#[derive(Default)]
struct GateState {
    authorized: HashSet<UserId>,
    revoked: HashSet<UserId>,
}

impl InviteGate {
    pub fn new(config: &AccessConfig) -> Self {
        Self {
            codes: config.invite_codes.clone(),
            inner: RwLock::new(GateState::default()),
        }
    }

    /// Redeem an invite code. Returns true when the code matched and
    /// the user gained access. A revoked user cannot redeem their way
    /// back in; only an owner `/allow` clears revocation.
    pub async fn redeem(&self, user: UserId, code: &str) -> bool {
        if !self.codes.iter().any(|known| known == code) {
            return false;
        }
        let mut state = self.inner.write().await;
        if state.revoked.contains(&user) {
            return false;
        }
        if state.authorized.insert(user) {
            info!(%user, "invite redeemed");
        }
        true
    }

    /// Owner action: revoke a user's access.
    pub async fn revoke(&self, user: UserId) {
        let mut state = self.inner.write().await;
        if state.revoked.insert(user) {
            info!(%user, "access revoked");
        }
    }

    /// Owner action: clear revocation and grant access.
    pub async fn allow(&self, user: UserId) {
        let mut state = self.inner.write().await;
        state.revoked.remove(&user);
        if state.authorized.insert(user) {
            info!(%user, "access granted");
        }
    }
}

#[async_trait]
impl AccessGate for InviteGate {
    async fn is_authorized(&self, user: UserId) -> bool {
        self.inner.read().await.authorized.contains(&user)
    }

    async fn is_revoked(&self, user: UserId) -> bool {
        self.inner.read().await.revoked.contains(&user)
    }
}
