//! Keeps a local snapshot of the remote game in step with the backend.
//!
//! [`Reconciler`] is the synchronous state machine: it folds one poll
//! response at a time into a [`Snapshot`]. [`spawn_poller`] drives it from a
//! fixed-interval timer and publishes each new snapshot on a watch channel.
//!
//! Guarantees:
//! - the dealt hand is recorded once; later hand payloads are ignored
//! - status never moves backwards, and nothing is applied once finished
//! - the completion callback fires at most once per session
//! - after cancellation no poll starts and no in-flight result is applied
//! - a transport failure ends the session with a connection-lost error

use crate::protocol::{GameResult, PlayerId, PlayerRecord, PollResponse};
use crate::routing::{self, HttpCall, RouteError};
use crate::transport::{Transport, TransportError};
use serde_json::Value;
use shisan_core::{codec, DecodeError, GameStatus, Hand, StatusError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Poll cadence when none is configured
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Error text shown when polling stops on a transport failure
pub const CONNECTION_LOST: &str = "connection lost";

/// A poll response that could not be applied
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolViolation {
    #[error("Server reported failure: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    #[error("Response is missing `{0}`")]
    MissingField(&'static str),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error(transparent)]
    Regression(#[from] StatusError),

    #[error("Undecodable card in hand: {0}")]
    UndecodableHand(#[from] DecodeError),
}

/// Local view of one game session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub status: GameStatus,
    /// Latest player list, replaced wholesale on every poll
    pub players: Vec<PlayerRecord>,
    /// The first hand delivered for this session
    pub hand: Option<Hand>,
    pub result: Option<GameResult>,
    /// Connectivity problem that ended polling
    pub error: Option<String>,
}

/// What applying a poll response did
#[derive(Debug, Clone, PartialEq)]
pub enum Applied {
    /// Nothing changed: the session is cancelled or already complete
    Ignored,
    /// Snapshot updated, session continues
    Updated,
    /// Response rejected, snapshot unchanged
    Violation(ProtocolViolation),
    /// Session reached its terminal status. Carries the caller's own record
    /// from the result, when the result lists it.
    Finished { own_record: Option<PlayerRecord> },
}

/// State machine folding poll responses into a [`Snapshot`]
#[derive(Debug, Clone)]
pub struct Reconciler {
    user_id: PlayerId,
    snapshot: Snapshot,
    completed: bool,
    cancelled: bool,
}

impl Reconciler {
    pub fn new(user_id: PlayerId) -> Self {
        Self {
            user_id,
            snapshot: Snapshot::default(),
            completed: false,
            cancelled: false,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Stop accepting responses. Irreversible.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether the session needs no further polling
    pub fn is_done(&self) -> bool {
        self.cancelled || self.completed
    }

    /// Parse and apply a raw poll body.
    pub fn apply_value(&mut self, body: Value) -> Applied {
        match serde_json::from_value::<PollResponse>(body) {
            Ok(response) => self.apply(response),
            Err(_) if self.is_done() => Applied::Ignored,
            Err(e) => Applied::Violation(ProtocolViolation::Malformed(e.to_string())),
        }
    }

    /// Apply one poll response. Every check runs before the snapshot is
    /// touched, so a rejected response leaves it exactly as it was.
    pub fn apply(&mut self, response: PollResponse) -> Applied {
        if self.is_done() {
            return Applied::Ignored;
        }
        match self.validate(response) {
            Ok(update) => self.commit(update),
            Err(violation) => Applied::Violation(violation),
        }
    }

    /// Record a transport failure that ended the session.
    pub fn connection_lost(&mut self) {
        if !self.cancelled {
            self.snapshot.error = Some(CONNECTION_LOST.to_string());
        }
    }

    fn validate(&self, response: PollResponse) -> Result<Update, ProtocolViolation> {
        if !response.success {
            return Err(ProtocolViolation::Rejected(response.message));
        }
        let status = response
            .game_status
            .ok_or(ProtocolViolation::MissingField("gameStatus"))?;
        let players = response
            .players
            .ok_or(ProtocolViolation::MissingField("players"))?;
        let status = self.snapshot.status.advance(status)?;

        let hand = match (&self.snapshot.hand, response.hand) {
            // a final response completes the session whatever hand it carries
            (None, Some(_)) if status.is_terminal() => None,
            (None, Some(raw)) => Some(codec::decode_all(&raw)?),
            (Some(_), Some(_)) => {
                debug!("Hand already recorded, ignoring re-delivery");
                None
            }
            (_, None) => None,
        };

        Ok(Update {
            status,
            players,
            hand,
            result: response.result,
        })
    }

    fn commit(&mut self, update: Update) -> Applied {
        let previous = self.snapshot.status;
        self.snapshot.status = update.status;
        self.snapshot.players = update.players;
        if let Some(hand) = update.hand {
            info!(cards = hand.len(), "Hand received");
            self.snapshot.hand = Some(hand);
        }
        if previous != update.status {
            info!(from = %previous, to = %update.status, "Game status changed");
        }

        if !update.status.is_terminal() {
            return Applied::Updated;
        }

        self.completed = true;
        let own_record = update.result.as_ref().and_then(|result| {
            let record = result.player(&self.user_id).cloned();
            if record.is_none() {
                warn!(user_id = %self.user_id, "Own record missing from result");
            }
            record
        });
        if self.snapshot.result.is_none() {
            self.snapshot.result = update.result;
        }
        Applied::Finished { own_record }
    }
}

/// Validated contents of a poll response
struct Update {
    status: GameStatus,
    players: Vec<PlayerRecord>,
    hand: Option<Hand>,
    result: Option<GameResult>,
}

/// The room and user a poller follows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub room_id: String,
    pub user_id: PlayerId,
}

impl PollTarget {
    /// Both identifiers are required; `None` if either is missing or blank.
    pub fn new(room_id: Option<&str>, user_id: Option<&str>) -> Option<Self> {
        let room_id = room_id.map(str::trim).filter(|s| !s.is_empty())?;
        let user_id = user_id.map(str::trim).filter(|s| !s.is_empty())?;
        Some(Self {
            room_id: room_id.to_string(),
            user_id: PlayerId::new(user_id),
        })
    }
}

/// How a polling session ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Finished(Snapshot),
    ConnectionLost(TransportError),
    Cancelled,
    InvalidTarget(RouteError),
}

/// Handle to a running poller
pub struct PollerHandle {
    cancel: watch::Sender<bool>,
    snapshots: watch::Receiver<Snapshot>,
    task: JoinHandle<PollOutcome>,
}

impl PollerHandle {
    /// Stop polling. A poll already in flight is discarded.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Wait for the session to end.
    pub async fn join(self) -> PollOutcome {
        let PollerHandle { cancel, task, .. } = self;
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Poller task failed: {}", e);
                PollOutcome::Cancelled
            }
        };
        // keep the sender alive until the task is done, dropping it cancels
        drop(cancel);
        outcome
    }
}

/// Start polling `target` every `interval`.
///
/// `on_complete` receives the caller's own record from the final result,
/// at most once. Dropping the returned handle cancels the poller.
pub fn spawn_poller<F>(
    transport: Arc<dyn Transport>,
    base_url: &str,
    target: PollTarget,
    interval: Duration,
    on_complete: F,
) -> PollerHandle
where
    F: FnOnce(PlayerRecord) + Send + 'static,
{
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());
    let call = routing::poll_call(base_url, &target.room_id, target.user_id.as_str());

    let task = tokio::spawn(async move {
        let call = match call {
            Ok(call) => call,
            Err(e) => {
                error!(room_id = %target.room_id, "Cannot poll: {}", e);
                return PollOutcome::InvalidTarget(e);
            }
        };
        let reconciler = Reconciler::new(target.user_id.clone());
        info!(room_id = %target.room_id, user_id = %target.user_id, "Polling started");
        run_poll_loop(
            transport,
            call,
            interval,
            reconciler,
            cancel_rx,
            snapshot_tx,
            on_complete,
        )
        .await
    });

    PollerHandle {
        cancel: cancel_tx,
        snapshots: snapshot_rx,
        task,
    }
}

async fn run_poll_loop<F>(
    transport: Arc<dyn Transport>,
    call: HttpCall,
    interval: Duration,
    mut reconciler: Reconciler,
    mut cancel: watch::Receiver<bool>,
    snapshots: watch::Sender<Snapshot>,
    on_complete: F,
) -> PollOutcome
where
    F: FnOnce(PlayerRecord) + Send + 'static,
{
    let mut on_complete = Some(on_complete);
    // first poll after one full interval, like the timer it replaces
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return stop(&mut reconciler),
            _ = ticker.tick() => {}
        }
        if is_cancelled(&cancel) {
            return stop(&mut reconciler);
        }

        let result = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return stop(&mut reconciler),
            result = transport.execute(call.clone()) => result,
        };
        // the poll may have finished in the same instant as a cancel
        if is_cancelled(&cancel) {
            return stop(&mut reconciler);
        }

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Poll failed, stopping");
                reconciler.connection_lost();
                snapshots.send_replace(reconciler.snapshot().clone());
                return PollOutcome::ConnectionLost(e);
            }
        };

        match reconciler.apply_value(body) {
            Applied::Ignored => {}
            Applied::Updated => {
                snapshots.send_replace(reconciler.snapshot().clone());
            }
            Applied::Violation(violation) => {
                warn!(%violation, "Ignoring poll response");
            }
            Applied::Finished { own_record } => {
                snapshots.send_replace(reconciler.snapshot().clone());
                if let (Some(record), Some(callback)) = (own_record, on_complete.take()) {
                    callback(record);
                }
                info!("Game finished, polling stopped");
                return PollOutcome::Finished(reconciler.snapshot().clone());
            }
        }
    }
}

/// Resolves once cancellation is requested or every handle is gone.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|cancelled| *cancelled).await;
}

fn is_cancelled(cancel: &watch::Receiver<bool>) -> bool {
    *cancel.borrow() || cancel.has_changed().is_err()
}

fn stop(reconciler: &mut Reconciler) -> PollOutcome {
    reconciler.cancel();
    debug!("Polling cancelled");
    PollOutcome::Cancelled
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shisan_core::{Card, Rank, Suit};

    fn me() -> PlayerId {
        PlayerId::new("7")
    }

    fn poll(body: Value) -> PollResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_players_are_replaced() {
        let mut r = Reconciler::new(me());
        r.apply(poll(json!({
            "success": true, "gameStatus": "matching",
            "players": [{"id": 1}, {"id": 7}]
        })));
        assert_eq!(r.snapshot().players.len(), 2);

        r.apply(poll(json!({
            "success": true, "gameStatus": "matching",
            "players": [{"id": 7}]
        })));
        assert_eq!(r.snapshot().players.len(), 1);
        assert_eq!(r.snapshot().players[0].id, Some(me()));
    }

    #[test]
    fn test_hand_is_one_shot() {
        let mut r = Reconciler::new(me());
        let first = r.apply(poll(json!({
            "success": true, "gameStatus": "playing", "players": [],
            "hand": ["AS", "KD"]
        })));
        assert_eq!(first, Applied::Updated);

        r.apply(poll(json!({
            "success": true, "gameStatus": "playing", "players": [],
            "hand": ["2C", "3C"]
        })));
        assert_eq!(
            r.snapshot().hand,
            Some(vec![
                Card::standard(Rank::Ace, Suit::Spades),
                Card::standard(Rank::King, Suit::Diamonds),
            ])
        );
    }

    #[test]
    fn test_undecodable_hand_is_not_recorded() {
        let mut r = Reconciler::new(me());
        let applied = r.apply(poll(json!({
            "success": true, "gameStatus": "playing", "players": [{"id": 7}],
            "hand": ["AS", "???"]
        })));
        assert!(matches!(
            applied,
            Applied::Violation(ProtocolViolation::UndecodableHand(_))
        ));
        assert_eq!(r.snapshot(), &Snapshot::default());

        // a later, clean delivery is still accepted
        r.apply(poll(json!({
            "success": true, "gameStatus": "playing", "players": [],
            "hand": ["AS"]
        })));
        assert_eq!(r.snapshot().hand.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_violations_keep_snapshot() {
        let mut r = Reconciler::new(me());
        r.apply(poll(json!({"success": true, "gameStatus": "playing", "players": [{"id": 1}]})));
        let before = r.snapshot().clone();

        let cases = [
            json!({"success": false, "message": "room closed"}),
            json!({"success": true, "players": []}),
            json!({"success": true, "gameStatus": "playing"}),
            json!({"success": true, "gameStatus": "matching", "players": []}),
        ];
        for body in cases {
            assert!(matches!(r.apply(poll(body)), Applied::Violation(_)));
            assert_eq!(r.snapshot(), &before);
        }

        let malformed = r.apply_value(json!({"success": "yes"}));
        assert!(matches!(
            malformed,
            Applied::Violation(ProtocolViolation::Malformed(_))
        ));
        assert_eq!(r.snapshot(), &before);
    }

    #[test]
    fn test_finish_finds_own_record_once() {
        let mut r = Reconciler::new(me());
        let finished = json!({
            "success": true, "gameStatus": "finished", "players": [],
            "result": {"players": [{"id": 3, "score": 1}, {"id": 7, "score": 5}]}
        });

        match r.apply(poll(finished.clone())) {
            Applied::Finished {
                own_record: Some(record),
            } => assert_eq!(record.field("score"), Some(&json!(5))),
            other => panic!("expected own record, got {:?}", other),
        }
        assert!(r.is_done());
        assert!(r.snapshot().result.is_some());

        assert_eq!(r.apply(poll(finished)), Applied::Ignored);
        assert_eq!(
            r.apply(poll(json!({"success": true, "gameStatus": "matching", "players": []}))),
            Applied::Ignored
        );
        assert_eq!(r.snapshot().status, GameStatus::Finished);
    }

    #[test]
    fn test_arranging_delivers_hand() {
        let mut r = Reconciler::new(me());
        let applied = r.apply_value(json!({
            "success": true, "gameStatus": "arranging", "players": [{"id": 7}],
            "hand": ["AS", "KD"]
        }));
        assert_eq!(applied, Applied::Updated);
        assert_eq!(r.snapshot().status, GameStatus::InProgress);
        assert_eq!(r.snapshot().hand.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_finish_with_undecodable_hand_still_completes() {
        let mut r = Reconciler::new(me());
        let applied = r.apply(poll(json!({
            "success": true, "gameStatus": "finished", "players": [],
            "hand": ["???"],
            "result": {"players": [{"id": 7, "score": 1}]}
        })));
        assert!(matches!(
            applied,
            Applied::Finished {
                own_record: Some(_)
            }
        ));
        assert!(r.is_done());
        assert!(r.snapshot().hand.is_none());
        assert!(r.snapshot().result.is_some());
    }

    #[test]
    fn test_finish_without_result() {
        let mut r = Reconciler::new(me());
        let applied = r.apply(poll(json!({
            "success": true, "gameStatus": "finished", "players": []
        })));
        assert_eq!(applied, Applied::Finished { own_record: None });
        assert!(r.is_done());
    }

    #[test]
    fn test_cancelled_ignores_everything() {
        let mut r = Reconciler::new(me());
        r.cancel();
        let applied = r.apply(poll(json!({
            "success": true, "gameStatus": "playing", "players": [{"id": 1}],
            "hand": ["AS"]
        })));
        assert_eq!(applied, Applied::Ignored);
        assert_eq!(r.snapshot(), &Snapshot::default());

        r.connection_lost();
        assert!(r.snapshot().error.is_none());
    }

    #[test]
    fn test_poll_target_requires_both_ids() {
        assert!(PollTarget::new(Some("12"), Some("7")).is_some());
        assert!(PollTarget::new(None, Some("7")).is_none());
        assert!(PollTarget::new(Some("12"), None).is_none());
        assert!(PollTarget::new(Some(" "), Some("7")).is_none());
    }
}
