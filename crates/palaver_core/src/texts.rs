//! User-facing notice text, centralized so wording stays uniform
//! across the matchmaker, pacer, and router.

pub const GREETING: &str =
    "Welcome. Tap 🔄 Next to find a stranger.\nTap ❌ Stop to end chat.";

pub const SEARCHING: &str = "Searching for a stranger...";

pub const CONNECTED: &str = "You are now connected to a stranger.";

pub const PARTNER_LEFT: &str = "Stranger left the chat.";

pub const STOPPED: &str = "Chat stopped.";

pub const FIND_PARTNER: &str = "Use /next to find a stranger.";

pub const NOT_AUTHORIZED: &str =
    "You need an invite code to use this bot. Send /join <code> to get access.";

pub const JOIN_ACCEPTED: &str = "Invite accepted. Use /next to find a stranger.";

pub const JOIN_REJECTED: &str = "That invite code is not valid.";

pub const ALREADY_AUTHORIZED: &str = "You already have access. Use /next to find a stranger.";

pub const REPORTED: &str = "Report received. The chat has ended.";

pub const BLOCKED: &str = "Stranger blocked. You will not be matched with them again.";

pub const SLOW_DOWN: &str = "You're sending messages too quickly. Some were dropped.";
