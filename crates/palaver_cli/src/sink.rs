//! Console implementation of the outbound seam.

use async_trait::async_trait;
use owo_colors::OwoColorize;

use palaver_core::{OutboundSink, UserId};

/// Prints every outbound send instead of delivering it anywhere.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutboundSink for ConsoleSink {
    async fn send_text(&self, user: UserId, text: &str) {
        println!("{} {}", format!("→ {user}").bright_cyan(), text);
    }
}
