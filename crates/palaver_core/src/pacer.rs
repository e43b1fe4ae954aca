//! Per-sender outbound queues with throttled delivery.
//!
//! A burst of typed messages is relayed to the partner one at a time
//! with a fixed delay in between, instead of all at once. Each sender
//! with pending text has at most one delivery worker; the worker
//! re-validates the session after every pause rather than caching the
//! partner.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::PacerConfig;
use crate::id::UserId;
use crate::outbound::OutboundSink;
use crate::session::SessionTable;
use crate::texts;

/// Queue state for one sender.
///
/// `running` belongs to the delivery worker: [`Pacer::enqueue`] sets it
/// when spawning and only the worker clears it, so a second worker can
/// never start while one is alive. `warned` tracks the one-time
/// overflow warning and resets when the queue empties.
#[derive(Debug, Default)]
struct SenderQueue {
    pending: VecDeque<String>,
    running: bool,
    warned: bool,
}

/// Relays each sender's pending messages to their partner at a fixed rate.
#[derive(Clone)]
pub struct Pacer {
    sessions: Arc<RwLock<SessionTable>>,
    sink: Arc<dyn OutboundSink>,
    queues: Arc<DashMap<UserId, SenderQueue>>,
    delay: Duration,
    capacity: usize,
}

impl Pacer {
    pub fn new(
        config: &PacerConfig,
        sessions: Arc<RwLock<SessionTable>>,
        sink: Arc<dyn OutboundSink>,
    ) -> Self {
        Self {
            sessions,
            sink,
            queues: Arc::new(DashMap::new()),
            delay: config.delay(),
            capacity: config.queue_capacity,
        }
    }

    /// Queue `text` for paced delivery to the sender's current partner.
    ///
    /// No-op when the sender has no active session. When the queue is
    /// full the message is dropped; the first drop since the queue
    /// last emptied earns the sender a single warning, later drops in
    /// the same overrun stay silent.
    pub async fn enqueue(&self, sender: UserId, text: String) {
        if self.sessions.read().await.partner_of(sender).is_none() {
            debug!(%sender, "text from unpaired sender ignored");
            return;
        }

        let mut warn_sender = false;
        let mut spawn_worker = false;
        {
            let mut entry = self.queues.entry(sender).or_default();
            if entry.pending.len() >= self.capacity {
                if !entry.warned {
                    entry.warned = true;
                    warn_sender = true;
                }
                debug!(%sender, "queue full, message dropped");
            } else {
                entry.pending.push_back(text);
                if !entry.running {
                    entry.running = true;
                    spawn_worker = true;
                }
            }
        }

        if warn_sender {
            self.sink.send_text(sender, texts::SLOW_DOWN).await;
        }
        if spawn_worker {
            let pacer = self.clone();
            tokio::spawn(async move { pacer.deliver(sender).await });
        }
    }

    /// Session-end entry point: discard the sender's pending text so
    /// their worker stops at its next iteration instead of relaying
    /// into a dead (or brand-new) session. The worker clears its own
    /// `running` flag on the way out.
    pub fn on_session_end(&self, user: UserId) {
        if let Some(mut entry) = self.queues.get_mut(&user) {
            entry.pending.clear();
            entry.warned = false;
        }
    }

    /// Delivery loop for one sender. Exits once the queue drains or
    /// the session is gone; every iteration re-reads the session table
    /// because the pairing may have changed during the pause.
    async fn deliver(self, sender: UserId) {
        debug!(%sender, "delivery worker started");
        loop {
            let next = {
                let Some(mut entry) = self.queues.get_mut(&sender) else {
                    return;
                };
                match entry.pending.pop_front() {
                    Some(text) => text,
                    None => {
                        entry.running = false;
                        entry.warned = false;
                        debug!(%sender, "delivery worker drained");
                        return;
                    }
                }
            };

            let partner = self.sessions.read().await.partner_of(sender);
            let Some(partner) = partner else {
                if let Some(mut entry) = self.queues.get_mut(&sender) {
                    entry.pending.clear();
                    entry.running = false;
                    entry.warned = false;
                }
                debug!(%sender, "session gone, delivery worker stopped");
                return;
            };

            self.sink.send_text(partner, &next).await;
            tokio::time::sleep(self.delay).await;
        }
    }
}
