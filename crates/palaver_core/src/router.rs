//! Inbound event routing: the small fixed protocol the transport
//! delivers, mapped onto engine operations.

use std::sync::Arc;

use tracing::debug;

use crate::auth::InviteGate;
use crate::error::Result;
use crate::id::UserId;
use crate::matchmaker::Matchmaker;
use crate::outbound::OutboundSink;
use crate::texts;

/// A parsed inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Join(String),
    Next,
    Stop,
    Report,
    Block,
    Revoke(UserId),
    Allow(UserId),
    /// A slash command the protocol does not know; ignored, never relayed.
    Unknown(String),
    /// Anything else is paired chat text.
    Text(String),
}

impl Command {
    /// Parse one raw line from the transport.
    ///
    /// The reply-keyboard button labels arrive as plain text and double
    /// as commands, the way the original keyboard worked.
    pub fn parse(raw: &str) -> Result<Command> {
        let line = raw.trim();
        match line {
            "🔄 Next" => return Ok(Command::Next),
            "❌ Stop" => return Ok(Command::Stop),
            _ => {}
        }
        if !line.starts_with('/') {
            return Ok(Command::Text(line.to_string()));
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();
        match head {
            "/start" => Ok(Command::Start),
            "/join" => Ok(Command::Join(arg.to_string())),
            "/next" => Ok(Command::Next),
            "/stop" => Ok(Command::Stop),
            "/report" => Ok(Command::Report),
            "/block" => Ok(Command::Block),
            "/revoke" => arg.parse().map(Command::Revoke),
            "/allow" => arg.parse().map(Command::Allow),
            _ => Ok(Command::Unknown(head.to_string())),
        }
    }
}

/// Routes inbound `(user, line)` events into the engine, applying the
/// gate checks and fixed denial texts at the surface so the engine
/// operations themselves can stay silent no-ops.
pub struct Router {
    gate: Arc<InviteGate>,
    matchmaker: Arc<Matchmaker>,
    sink: Arc<dyn OutboundSink>,
    owner: Option<UserId>,
}

impl Router {
    pub fn new(
        gate: Arc<InviteGate>,
        matchmaker: Arc<Matchmaker>,
        sink: Arc<dyn OutboundSink>,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            gate,
            matchmaker,
            sink,
            owner,
        }
    }

    /// Handle one inbound event to completion.
    pub async fn handle(&self, user: UserId, raw: &str) {
        use crate::auth::AccessGate;

        let command = match Command::parse(raw) {
            Ok(command) => command,
            Err(error) => {
                // Malformed moderator argument: usage notice, operation aborted
                self.sink.send_text(user, &error.to_string()).await;
                return;
            }
        };

        let authorized = self.gate.is_authorized(user).await;
        let revoked = self.gate.is_revoked(user).await;
        let usable = authorized && !revoked;

        match command {
            Command::Start => {
                self.sink.send_text(user, texts::GREETING).await;
                if !usable {
                    self.sink.send_text(user, texts::NOT_AUTHORIZED).await;
                }
            }
            Command::Join(code) => {
                if usable {
                    self.sink.send_text(user, texts::ALREADY_AUTHORIZED).await;
                } else if self.gate.redeem(user, &code).await {
                    self.sink.send_text(user, texts::JOIN_ACCEPTED).await;
                } else {
                    self.sink.send_text(user, texts::JOIN_REJECTED).await;
                }
            }
            Command::Next => {
                if usable {
                    self.matchmaker.request_match(user).await;
                } else {
                    self.sink.send_text(user, texts::NOT_AUTHORIZED).await;
                }
            }
            Command::Stop => {
                if usable {
                    self.matchmaker.end_session(user).await;
                    self.sink.send_text(user, texts::STOPPED).await;
                }
            }
            Command::Report => {
                if usable {
                    self.matchmaker.report(user).await;
                }
            }
            Command::Block => {
                if usable {
                    self.matchmaker.block(user).await;
                }
            }
            Command::Revoke(target) => {
                if self.owner == Some(user) {
                    self.gate.revoke(target).await;
                    self.matchmaker.on_revoked(target).await;
                    self.sink
                        .send_text(user, &format!("Revoked user {target}."))
                        .await;
                } else {
                    debug!(%user, "revoke from non-owner ignored");
                }
            }
            Command::Allow(target) => {
                if self.owner == Some(user) {
                    self.gate.allow(target).await;
                    self.sink
                        .send_text(user, &format!("Allowed user {target}."))
                        .await;
                } else {
                    debug!(%user, "allow from non-owner ignored");
                }
            }
            Command::Unknown(head) => {
                debug!(%user, command = %head, "unknown command ignored");
            }
            Command::Text(text) => {
                if !usable {
                    self.sink.send_text(user, texts::NOT_AUTHORIZED).await;
                } else if !self.matchmaker.relay_text(user, text).await {
                    self.sink.send_text(user, texts::FIND_PARTNER).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_slash_commands() {
        assert_eq!(Command::parse("/start").unwrap(), Command::Start);
        assert_eq!(
            Command::parse("/join TEST123").unwrap(),
            Command::Join("TEST123".to_string())
        );
        assert_eq!(Command::parse("/next").unwrap(), Command::Next);
        assert_eq!(Command::parse("/stop").unwrap(), Command::Stop);
        assert_eq!(
            Command::parse("/revoke 1000").unwrap(),
            Command::Revoke(UserId::new(1000))
        );
        assert_eq!(
            Command::parse("/allow -5").unwrap(),
            Command::Allow(UserId::new(-5))
        );
    }

    #[test]
    fn keyboard_labels_double_as_commands() {
        assert_eq!(Command::parse("🔄 Next").unwrap(), Command::Next);
        assert_eq!(Command::parse("❌ Stop").unwrap(), Command::Stop);
    }

    #[test]
    fn plain_text_relays_and_unknown_commands_do_not() {
        assert_eq!(
            Command::parse("hello there").unwrap(),
            Command::Text("hello there".to_string())
        );
        assert_eq!(
            Command::parse("/frobnicate now").unwrap(),
            Command::Unknown("/frobnicate".to_string())
        );
    }

    #[test]
    fn malformed_moderator_argument_is_an_error() {
        assert!(Command::parse("/revoke abc").is_err());
        assert!(Command::parse("/revoke").is_err());
        assert!(Command::parse("/allow 12x").is_err());
    }
}
