//! Integration tests for the pairing flow: gating, the waiting slot,
//! session teardown, and the report/block moderation paths.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use palaver_core::{
    AccessConfig, InviteGate, Matchmaker, OutboundSink, PalaverConfig, Router, UserId, texts,
};
use pretty_assertions::assert_eq;

/// Captures every outbound send for assertions.
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(UserId, String)>>,
}

#[async_trait]
impl OutboundSink for RecordingSink {
    async fn send_text(&self, user: UserId, text: &str) {
        self.sent.lock().unwrap().push((user, text.to_string()));
    }
}

impl RecordingSink {
    fn texts_for(&self, user: UserId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == user)
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

struct Harness {
    gate: Arc<InviteGate>,
    matchmaker: Arc<Matchmaker>,
    router: Router,
    sink: Arc<RecordingSink>,
}

fn harness(owner: Option<i64>) -> Harness {
    let config = PalaverConfig {
        access: AccessConfig {
            invite_codes: vec!["TEST123".to_string()],
            owner: owner.map(UserId::new),
        },
        ..Default::default()
    };
    let sink = Arc::new(RecordingSink::default());
    let gate = Arc::new(InviteGate::new(&config.access));
    let matchmaker = Arc::new(Matchmaker::new(&config, gate.clone(), sink.clone()));
    let router = Router::new(
        gate.clone(),
        matchmaker.clone(),
        sink.clone(),
        config.access.owner,
    );
    Harness {
        gate,
        matchmaker,
        router,
        sink,
    }
}

/// Authorize a user directly, skipping the join ceremony.
async fn admit(h: &Harness, raw: i64) -> UserId {
    let user = UserId::new(raw);
    h.gate.allow(user).await;
    user
}

/// Authorize two users and pair them.
async fn admit_pair(h: &Harness, a: i64, b: i64) -> (UserId, UserId) {
    let a = admit(h, a).await;
    let b = admit(h, b).await;
    h.matchmaker.request_match(a).await;
    h.matchmaker.request_match(b).await;
    assert_eq!(h.matchmaker.partner_of(a).await, Some(b));
    h.sink.clear();
    (a, b)
}

#[tokio::test]
async fn join_then_match_flow() {
    let h = harness(None);
    let alice = UserId::new(1000);
    let bob = UserId::new(2000);

    // Unauthorized `/next`: denial text, no state change
    h.router.handle(alice, "/next").await;
    assert_eq!(h.sink.texts_for(alice), vec![texts::NOT_AUTHORIZED]);
    assert_eq!(h.matchmaker.waiting_occupant().await, None);
    h.sink.clear();

    // Redeem the invite, then search with an empty slot
    h.router.handle(alice, "/join TEST123").await;
    h.router.handle(alice, "/next").await;
    assert_eq!(
        h.sink.texts_for(alice),
        vec![texts::JOIN_ACCEPTED, texts::SEARCHING]
    );
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(alice));
    h.sink.clear();

    // A second authorized searcher pairs with the occupant
    h.router.handle(bob, "/join TEST123").await;
    h.router.handle(bob, "/next").await;
    assert_eq!(h.sink.texts_for(alice), vec![texts::CONNECTED]);
    assert!(h.sink.texts_for(bob).contains(&texts::CONNECTED.to_string()));
    assert_eq!(h.matchmaker.waiting_occupant().await, None);
    assert_eq!(h.matchmaker.partner_of(alice).await, Some(bob));
    assert_eq!(h.matchmaker.partner_of(bob).await, Some(alice));
}

#[tokio::test]
async fn bad_invite_code_is_rejected() {
    let h = harness(None);
    let user = UserId::new(1000);

    h.router.handle(user, "/join WRONG").await;
    assert_eq!(h.sink.texts_for(user), vec![texts::JOIN_REJECTED]);

    h.sink.clear();
    h.router.handle(user, "hello").await;
    assert_eq!(h.sink.texts_for(user), vec![texts::NOT_AUTHORIZED]);
}

#[tokio::test]
async fn end_session_removes_both_directions_and_is_idempotent() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.matchmaker.end_session(alice).await;
    assert_eq!(h.matchmaker.partner_of(alice).await, None);
    assert_eq!(h.matchmaker.partner_of(bob).await, None);
    assert_eq!(h.sink.texts_for(bob), vec![texts::PARTNER_LEFT]);
    h.sink.clear();

    // Second end is a no-op: nobody hears anything
    h.matchmaker.end_session(alice).await;
    h.matchmaker.end_session(bob).await;
    assert!(h.sink.texts_for(alice).is_empty());
    assert!(h.sink.texts_for(bob).is_empty());
}

#[tokio::test]
async fn next_while_paired_tears_down_first() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.matchmaker.request_match(alice).await;
    assert_eq!(h.sink.texts_for(bob), vec![texts::PARTNER_LEFT]);
    assert_eq!(h.sink.texts_for(alice), vec![texts::SEARCHING]);
    assert_eq!(h.matchmaker.partner_of(bob).await, None);
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(alice));
}

#[tokio::test]
async fn block_prevents_rematch_from_either_side() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.matchmaker.block(alice).await;
    assert_eq!(h.sink.texts_for(alice), vec![texts::BLOCKED]);
    // The blocked side only sees an ordinary disconnect
    assert_eq!(h.sink.texts_for(bob), vec![texts::PARTNER_LEFT]);
    h.sink.clear();

    // Neither order of searching may pair them again
    h.matchmaker.request_match(alice).await;
    h.matchmaker.request_match(bob).await;
    assert_eq!(h.matchmaker.partner_of(alice).await, None);
    assert_eq!(h.matchmaker.partner_of(bob).await, None);
    // Bob displaced Alice in the slot rather than matching her
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(bob));

    h.matchmaker.request_match(alice).await;
    assert_eq!(h.matchmaker.partner_of(alice).await, None);
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(alice));

    // A third user still pairs with either of them normally
    let carol = admit(&h, 3000).await;
    h.matchmaker.request_match(carol).await;
    assert_eq!(h.matchmaker.partner_of(carol).await, Some(alice));
}

#[tokio::test]
async fn report_counts_once_per_session() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.matchmaker.report(alice).await;
    assert_eq!(h.matchmaker.report_count(bob).await, 1);
    assert_eq!(h.sink.texts_for(alice), vec![texts::REPORTED]);
    assert_eq!(h.sink.texts_for(bob), vec![texts::PARTNER_LEFT]);
    h.sink.clear();

    // No session anymore: the second report is a silent no-op
    h.matchmaker.report(alice).await;
    assert_eq!(h.matchmaker.report_count(bob).await, 1);
    assert!(h.sink.texts_for(alice).is_empty());
}

#[tokio::test]
async fn report_guard_resets_on_new_session() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.matchmaker.report(alice).await;
    assert_eq!(h.matchmaker.report_count(bob).await, 1);

    // They meet again (no block involved), and Alice may report again
    h.matchmaker.request_match(alice).await;
    h.matchmaker.request_match(bob).await;
    assert_eq!(h.matchmaker.partner_of(alice).await, Some(bob));
    h.matchmaker.report(alice).await;
    assert_eq!(h.matchmaker.report_count(bob).await, 2);
}

#[tokio::test]
async fn revoke_ends_session_and_gates_the_target() {
    let h = harness(Some(1));
    let owner = UserId::new(1);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.router.handle(owner, "/revoke 2000").await;
    assert_eq!(h.matchmaker.partner_of(alice).await, None);
    assert_eq!(h.sink.texts_for(alice), vec![texts::PARTNER_LEFT]);
    h.sink.clear();

    // The revoked user bounces off the gate
    h.router.handle(bob, "/next").await;
    assert_eq!(h.sink.texts_for(bob), vec![texts::NOT_AUTHORIZED]);
    assert_eq!(h.matchmaker.waiting_occupant().await, None);
    h.sink.clear();

    // Until the owner lets them back in
    h.router.handle(owner, "/allow 2000").await;
    h.router.handle(bob, "/next").await;
    assert_eq!(h.sink.texts_for(bob), vec![texts::SEARCHING]);
}

#[tokio::test]
async fn revoke_clears_the_waiting_slot() {
    let h = harness(Some(1));
    let owner = UserId::new(1);
    let alice = admit(&h, 1000).await;

    h.matchmaker.request_match(alice).await;
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(alice));

    h.router.handle(owner, "/revoke 1000").await;
    assert_eq!(h.matchmaker.waiting_occupant().await, None);
}

#[tokio::test]
async fn moderator_commands_require_the_owner() {
    let h = harness(Some(1));
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    // A regular user cannot revoke anyone
    h.router.handle(alice, "/revoke 2000").await;
    assert_eq!(h.matchmaker.partner_of(bob).await, Some(alice));
    assert!(h.sink.texts_for(alice).is_empty());

    // The owner gets a usage notice for a malformed id
    let owner = UserId::new(1);
    h.router.handle(owner, "/revoke bob").await;
    let notices = h.sink.texts_for(owner);
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("Invalid user id"));
    assert_eq!(h.matchmaker.partner_of(bob).await, Some(alice));
}

#[tokio::test]
async fn unpaired_text_gets_a_redirect() {
    let h = harness(None);
    let alice = admit(&h, 1000).await;

    h.router.handle(alice, "hello out there").await;
    assert_eq!(h.sink.texts_for(alice), vec![texts::FIND_PARTNER]);
}

#[tokio::test]
async fn keyboard_labels_drive_the_same_flows() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.router.handle(alice, "❌ Stop").await;
    assert_eq!(h.matchmaker.partner_of(bob).await, None);
    assert_eq!(h.sink.texts_for(alice), vec![texts::STOPPED]);
    h.sink.clear();

    h.router.handle(alice, "🔄 Next").await;
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(alice));
    assert_eq!(h.sink.texts_for(alice), vec![texts::SEARCHING]);
}

#[tokio::test]
async fn start_greets_and_hints_at_the_gate() {
    let h = harness(None);
    let alice = UserId::new(1000);

    h.router.handle(alice, "/start").await;
    assert_eq!(
        h.sink.texts_for(alice),
        vec![texts::GREETING, texts::NOT_AUTHORIZED]
    );
    h.sink.clear();

    h.gate.allow(alice).await;
    h.router.handle(alice, "/start").await;
    assert_eq!(h.sink.texts_for(alice), vec![texts::GREETING]);
}

#[tokio::test]
async fn unknown_commands_are_never_relayed() {
    let h = harness(None);
    let (alice, bob) = admit_pair(&h, 1000, 2000).await;

    h.router.handle(alice, "/frobnicate now").await;
    assert!(h.sink.texts_for(alice).is_empty());
    assert!(h.sink.texts_for(bob).is_empty());
}

#[tokio::test]
async fn searching_twice_keeps_the_slot() {
    let h = harness(None);
    let alice = admit(&h, 1000).await;

    h.matchmaker.request_match(alice).await;
    h.matchmaker.request_match(alice).await;
    assert_eq!(h.matchmaker.waiting_occupant().await, Some(alice));
    assert_eq!(
        h.sink.texts_for(alice),
        vec![texts::SEARCHING, texts::SEARCHING]
    );
}
