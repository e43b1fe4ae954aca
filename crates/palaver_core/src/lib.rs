//! Palaver Core - Anonymous Pairing and Relay Engine
//!
//! This crate pairs anonymous users for one-on-one text chat, relays
//! their messages at a paced rate, and tracks block/report moderation
//! state in between. The messaging platform itself lives behind the
//! narrow seams in [`outbound`] and [`auth`].

pub mod auth;
pub mod block;
pub mod config;
pub mod error;
pub mod id;
pub mod matchmaker;
pub mod outbound;
pub mod pacer;
pub mod report;
pub mod router;
pub mod session;
pub mod texts;

pub use auth::{AccessGate, InviteGate};
pub use config::{AccessConfig, PacerConfig, PalaverConfig, load_config};
pub use error::{CoreError, Result};
pub use id::UserId;
pub use matchmaker::Matchmaker;
pub use outbound::OutboundSink;
pub use pacer::Pacer;
pub use router::{Command, Router};
pub use session::SessionTable;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        AccessConfig, AccessGate, Command, CoreError, InviteGate, Matchmaker, OutboundSink,
        PacerConfig, PalaverConfig, Result, Router, UserId,
    };
}
