//! The outbound seam to the transport collaborator.

use async_trait::async_trait;

use crate::id::UserId;

/// Fire-and-forget outbound text delivery.
///
/// The engine awaits the send only for backpressure; delivery failures
/// are the transport's responsibility and are never surfaced back.
#[async_trait]
pub trait OutboundSink: Send + Sync {
    async fn send_text(&self, user: UserId, text: &str);
}
