//! Pairing and session lifecycle.
//!
//! The matchmaker owns the single waiting slot, the session table, and
//! the block/report moderation state. Every mutation happens under one
//! lock section, so callers never observe a half-created or
//! half-removed pairing; notices go out after the locks drop.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::auth::AccessGate;
use crate::block::BlockRegistry;
use crate::config::PalaverConfig;
use crate::id::UserId;
use crate::outbound::OutboundSink;
use crate::pacer::Pacer;
use crate::report::ReportLedger;
use crate::session::SessionTable;
use crate::texts;

/// Matchmaking state that must mutate as a unit.
#[derive(Default)]
struct PairState {
    /// The one holding position for a user searching for a partner.
    /// Never contains a currently-paired user.
    waiting: Option<UserId>,
    blocks: BlockRegistry,
    reports: ReportLedger,
}

/// The pairing engine: waiting slot, session table, moderation state,
/// and the pacer that relays paired text.
pub struct Matchmaker {
    gate: Arc<dyn AccessGate>,
    sink: Arc<dyn OutboundSink>,
    sessions: Arc<RwLock<SessionTable>>,
    state: Mutex<PairState>,
    pacer: Pacer,
}

impl Matchmaker {
    pub fn new(
        config: &PalaverConfig,
        gate: Arc<dyn AccessGate>,
        sink: Arc<dyn OutboundSink>,
    ) -> Self {
        let sessions = Arc::new(RwLock::new(SessionTable::default()));
        let pacer = Pacer::new(&config.pacer, sessions.clone(), sink.clone());
        Self {
            gate,
            sink,
            sessions,
            state: Mutex::new(PairState::default()),
            pacer,
        }
    }

    /// Current partner, if any.
    pub async fn partner_of(&self, user: UserId) -> Option<UserId> {
        self.sessions.read().await.partner_of(user)
    }

    /// Current waiting-slot occupant, if any.
    pub async fn waiting_occupant(&self) -> Option<UserId> {
        self.state.lock().await.waiting
    }

    /// Cumulative reports filed against `user`.
    pub async fn report_count(&self, user: UserId) -> u64 {
        self.state.lock().await.reports.count(user)
    }

    /// Pair `user` with the waiting occupant, or park them in the
    /// waiting slot. Silent no-op for unauthorized or revoked users.
    ///
    /// Any existing session is torn down first, with the former
    /// partner notified. An incompatible waiting occupant (same user,
    /// blocked pair, or occupant no longer allowed through the gate)
    /// is silently displaced; the single slot is a deliberate design
    /// limit, not a queue.
    pub async fn request_match(&self, user: UserId) {
        if !self.gate.is_authorized(user).await || self.gate.is_revoked(user).await {
            debug!(%user, "match request refused by gate");
            return;
        }

        let mut notices: Vec<(UserId, &'static str)> = Vec::new();
        {
            let mut state = self.state.lock().await;
            let mut sessions = self.sessions.write().await;

            if let Some(partner) = self.teardown(&mut sessions, user) {
                notices.push((partner, texts::PARTNER_LEFT));
            }

            let mut matched = None;
            if let Some(candidate) = state.waiting {
                if candidate != user
                    && !state.blocks.contains(user, candidate)
                    && self.gate.is_authorized(candidate).await
                    && !self.gate.is_revoked(candidate).await
                {
                    matched = Some(candidate);
                }
            }

            match matched {
                Some(partner) => {
                    state.waiting = None;
                    sessions.insert_pair(user, partner);
                    state.reports.reset_guard(user);
                    state.reports.reset_guard(partner);
                    info!(%user, %partner, "session created");
                    notices.push((user, texts::CONNECTED));
                    notices.push((partner, texts::CONNECTED));
                }
                None => {
                    if let Some(displaced) = state.waiting.replace(user) {
                        if displaced != user {
                            debug!(%displaced, %user, "waiting slot overwritten");
                        }
                    }
                    notices.push((user, texts::SEARCHING));
                }
            }
        }
        self.dispatch(notices).await;
    }

    /// Explicit stop. Idempotent: without a session there is nothing
    /// to do and nobody is notified.
    pub async fn end_session(&self, user: UserId) {
        let mut notices = Vec::new();
        {
            let _state = self.state.lock().await;
            let mut sessions = self.sessions.write().await;
            if let Some(partner) = self.teardown(&mut sessions, user) {
                info!(%user, %partner, "session ended");
                notices.push((partner, texts::PARTNER_LEFT));
            }
        }
        self.dispatch(notices).await;
    }

    /// File a report against the current partner and end the session.
    /// No-op without a session or when this user already reported in
    /// this session.
    pub async fn report(&self, reporter: UserId) {
        let mut notices = Vec::new();
        {
            let mut state = self.state.lock().await;
            let mut sessions = self.sessions.write().await;
            let Some(partner) = sessions.partner_of(reporter) else {
                return;
            };
            if !state.reports.file(reporter, partner) {
                debug!(%reporter, "duplicate report in session ignored");
                return;
            }
            self.teardown(&mut sessions, reporter);
            info!(%reporter, %partner, count = state.reports.count(partner), "partner reported");
            notices.push((reporter, texts::REPORTED));
            notices.push((partner, texts::PARTNER_LEFT));
        }
        self.dispatch(notices).await;
    }

    /// Block the current partner and end the session. The blocked
    /// party receives only the generic disconnect text, so a block
    /// reads like an ordinary leave.
    pub async fn block(&self, blocker: UserId) {
        let mut notices = Vec::new();
        {
            let mut state = self.state.lock().await;
            let mut sessions = self.sessions.write().await;
            let Some(partner) = sessions.partner_of(blocker) else {
                return;
            };
            state.blocks.insert(blocker, partner);
            self.teardown(&mut sessions, blocker);
            info!(%blocker, %partner, "partner blocked");
            notices.push((blocker, texts::BLOCKED));
            notices.push((partner, texts::PARTNER_LEFT));
        }
        self.dispatch(notices).await;
    }

    /// Moderator revocation: drop the target from the waiting slot and
    /// end their session. The gate itself has already been updated by
    /// the caller; from here on every transition for the target is a
    /// gate-refused no-op until an owner `/allow`.
    pub async fn on_revoked(&self, target: UserId) {
        let mut notices = Vec::new();
        {
            let mut state = self.state.lock().await;
            let mut sessions = self.sessions.write().await;
            if state.waiting == Some(target) {
                state.waiting = None;
            }
            if let Some(partner) = self.teardown(&mut sessions, target) {
                info!(%target, %partner, "session ended by revocation");
                notices.push((partner, texts::PARTNER_LEFT));
            }
        }
        self.dispatch(notices).await;
    }

    /// Queue paired text for paced relay. Returns false when the
    /// sender has no active session, so the router can redirect them.
    pub async fn relay_text(&self, sender: UserId, text: String) -> bool {
        if self.sessions.read().await.partner_of(sender).is_none() {
            return false;
        }
        self.pacer.enqueue(sender, text).await;
        true
    }

    /// Remove `user`'s pairing (both directions) and stop both sides'
    /// delivery workers. Must run inside a `state` lock section.
    fn teardown(&self, sessions: &mut SessionTable, user: UserId) -> Option<UserId> {
        let partner = sessions.remove_pair(user)?;
        self.pacer.on_session_end(user);
        self.pacer.on_session_end(partner);
        Some(partner)
    }

    async fn dispatch(&self, notices: Vec<(UserId, &'static str)>) {
        for (user, text) in notices {
            self.sink.send_text(user, text).await;
        }
    }
}
