/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
};

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::{
    Color, Difficulty, Game, Move, Piece, Search, SearchConfig, SearchResult, Square,
};

/// Who is sitting across the board.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Two humans, either at the same console or over the network.
    #[default]
    Human,

    /// A human against the AI.
    Computer,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Computer => write!(f, "computer"),
        }
    }
}

/// Settings for the AI opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    pub mode: GameMode,

    /// The side the AI plays when [`GameMode::Computer`] is selected.
    pub ai_color: Color,
}

impl AiConfig {
    /// Search parameters for the configured difficulty.
    #[inline(always)]
    pub const fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.difficulty)
    }

    /// Returns `true` if the AI should be the one to move when `side` is to move.
    #[inline(always)]
    pub fn should_ai_move(&self, side: Color) -> bool {
        self.mode == GameMode::Computer && self.ai_color == side
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            mode: GameMode::Human,
            ai_color: Color::Black,
        }
    }
}

impl fmt::Display for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "difficulty {} (depth {}), mode {}, ai plays {}",
            self.difficulty,
            self.difficulty.depth(),
            self.mode,
            self.ai_color
        )
    }
}

/// Where a committed move came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOrigin {
    /// Played at this session, either by selection or directly.
    Local,

    /// Played by the opponent on the other end of the network.
    Remote,

    /// Chosen by the search.
    Ai,
}

/// An outbound event for the networking layer to transmit.
///
/// Only local moves and local resets produce these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    Move { from: Square, to: Square, piece: Piece },
    Reset,
}

/// The result of a background search, tagged with the session epoch it was started in.
#[derive(Debug)]
pub struct SearchOutcome {
    pub epoch: u64,
    pub side: Color,
    pub result: Result<SearchResult>,
}

/// What happened in response to [`Session::on_square_selected`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Nothing changed.
    Ignored,

    /// A piece was selected. These are its legal destinations.
    Selected { square: Square, moves: Vec<Square> },

    /// The previous selection was dropped.
    Cleared,

    /// The selected piece moved to the chosen square.
    Committed(Move),
}

/// A search running on a background thread.
#[derive(Debug)]
struct PendingSearch {
    epoch: u64,
    is_searching: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Drives a [`Game`] on behalf of the UI and network collaborators.
///
/// Every move, no matter where it came from, goes through the same commit path.
/// The session also owns the piece selection, the network seat, and the AI opponent.
#[derive(Debug)]
pub struct Session {
    /// The live game.
    game: Game,

    config: AiConfig,

    /// When playing over the network, the color this side controls.
    seat: Option<Color>,

    /// Square of the currently selected piece, if any.
    selected: Option<Square>,

    /// Legal destinations of the selected piece.
    selected_moves: Vec<Square>,

    /// Bumped on every move, reset, and cancelled search.
    ///
    /// Search results are only applied if they were started in the current epoch.
    epoch: u64,

    /// The outstanding search, if one exists.
    pending: Option<PendingSearch>,

    /// Outbound notifications for the networking layer.
    outbox: Sender<Notification>,

    /// Where background searches deliver their results.
    replies: Sender<SearchOutcome>,
}

impl Session {
    /// Creates a new [`Session`] at the starting position.
    ///
    /// Local moves and resets are announced on `outbox`. Background searches report to `replies`,
    /// and whoever holds the other end must hand each [`SearchOutcome`] back to [`Session::on_search_finished`].
    pub fn new(
        config: AiConfig,
        outbox: Sender<Notification>,
        replies: Sender<SearchOutcome>,
    ) -> Self {
        Self {
            game: Game::default(),
            config,
            seat: None,
            selected: None,
            selected_moves: Vec::new(),
            epoch: 0,
            pending: None,
            outbox,
            replies,
        }
    }

    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    #[inline(always)]
    pub const fn config(&self) -> AiConfig {
        self.config
    }

    /// Replaces the AI settings, cancelling any search started under the old ones.
    pub fn set_config(&mut self, config: AiConfig) {
        if config != self.config {
            info!(%config, "AI settings changed");
            self.config = config;
            self.invalidate();
        }
    }

    #[inline(always)]
    pub const fn seat(&self) -> Option<Color> {
        self.seat
    }

    /// Sets (or clears) the color this side controls in a networked game.
    pub fn set_seat(&mut self, seat: Option<Color>) {
        debug!(?seat, "seat changed");
        self.seat = seat;
        self.clear_selection();
    }

    #[inline(always)]
    pub const fn selected(&self) -> Option<Square> {
        self.selected
    }

    #[inline(always)]
    pub fn selected_moves(&self) -> &[Square] {
        &self.selected_moves
    }

    #[inline(always)]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Returns `true` while a background search is outstanding.
    #[inline(always)]
    pub const fn is_thinking(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `true` if the local player may move the side to move.
    ///
    /// Without a seat, anyone may move either side.
    #[inline(always)]
    pub fn can_move_locally(&self) -> bool {
        self.seat
            .map_or(true, |seat| seat == self.game.side_to_move())
    }

    /// Handles a click on `square`.
    ///
    /// Selecting one of the side to move's pieces selects it. With a piece selected, selecting one of its
    /// legal destinations commits the move, and selecting anything else clears the selection.
    pub fn on_square_selected(&mut self, square: Square) -> Selection {
        if !self.can_move_locally() {
            debug!(%square, seat = ?self.seat, "ignoring selection out of turn");
            return Selection::Ignored;
        }

        if let Some(from) = self.selected {
            if self.selected_moves.contains(&square) {
                return match self.apply(from, square, MoveOrigin::Local) {
                    Some(mv) => Selection::Committed(mv),
                    None => Selection::Ignored,
                };
            }
        }

        let owned = self
            .game
            .piece_at(square)
            .is_some_and(|piece| piece.color() == self.game.side_to_move());

        if owned {
            self.selected = Some(square);
            self.selected_moves = self.game.legal_moves(square);
            trace!(%square, moves = self.selected_moves.len(), "selected");
            Selection::Selected {
                square,
                moves: self.selected_moves.clone(),
            }
        } else if self.selected.is_some() {
            self.clear_selection();
            Selection::Cleared
        } else {
            Selection::Ignored
        }
    }

    /// Commits a move played at this session.
    ///
    /// Illegal moves and moves out of turn are ignored. A committed move is announced on the outbox,
    /// and may prompt the AI to reply.
    pub fn commit_local_move(&mut self, from: Square, to: Square) -> Option<Move> {
        if !self.can_move_locally() {
            debug!(%from, %to, seat = ?self.seat, "ignoring local move out of turn");
            return None;
        }

        self.apply(from, to, MoveOrigin::Local)
    }

    /// Applies a move received from the network.
    ///
    /// This is not announced on the outbox and never prompts the AI.
    pub fn apply_remote_move(&mut self, from: Square, to: Square) -> Option<Move> {
        self.apply(from, to, MoveOrigin::Remote)
    }

    /// Resets the game and announces it on the outbox.
    pub fn reset(&mut self) {
        self.reset_game();
        self.notify(Notification::Reset);
    }

    /// Resets the game because the network told us to, without announcing it.
    pub fn apply_remote_reset(&mut self) {
        self.reset_game();
    }

    /// Starts a background search if it is the AI's turn in a game that is still going.
    ///
    /// Returns `true` if a search was started.
    pub fn request_ai_move(&mut self) -> bool {
        let side = self.game.side_to_move();

        if !self.config.should_ai_move(side) || self.game.status().is_over() {
            return false;
        }

        if let Some(pending) = &self.pending {
            warn!(epoch = pending.epoch, "a search is already running");
            return false;
        }

        self.start_search();
        true
    }

    /// Consumes the result of a background search, applying its move if it is still relevant.
    ///
    /// Results from searches started before the most recent move or reset are discarded.
    pub fn on_search_finished(&mut self, outcome: SearchOutcome) -> Option<Move> {
        if outcome.epoch != self.epoch {
            debug!(
                result_epoch = outcome.epoch,
                epoch = self.epoch,
                "discarding stale search result"
            );
            return None;
        }

        self.pending = None;

        let res = match outcome.result {
            Ok(res) => res,
            Err(e) => {
                debug!("search ended without a result: {e}");
                return None;
            }
        };

        let Some(mv) = res.best_move else {
            debug!(side = %outcome.side, "AI has no legal moves");
            return None;
        };

        self.apply(mv.from(), mv.to(), MoveOrigin::Ai)
    }

    /// Returns `true` if the outstanding search's thread has exited.
    ///
    /// A thread that delivered its result has also exited, so check the replies channel after calling this.
    pub fn search_thread_exited(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.handle.is_finished())
    }

    /// Gives up on the outstanding search. Anything it still delivers will be discarded.
    pub fn abandon_search(&mut self) {
        if self.is_thinking() {
            warn!(epoch = self.epoch, "abandoning AI search");
            self.invalidate();
        }
    }

    /// The single commit path shared by every move origin.
    fn apply(&mut self, from: Square, to: Square, origin: MoveOrigin) -> Option<Move> {
        if !self.game.is_legal(from, to) {
            warn!(%from, %to, ?origin, "ignoring illegal move");
            return None;
        }

        self.invalidate();
        self.clear_selection();

        let mv = self.game.apply_move(from, to)?;
        info!(?origin, mv = %format_args!("{mv:#}"), status = %self.game.status(), "move committed");

        if origin == MoveOrigin::Local {
            self.notify(Notification::Move {
                from,
                to,
                piece: mv.piece(),
            });
            self.request_ai_move();
        }

        Some(mv)
    }

    fn reset_game(&mut self) {
        self.invalidate();
        self.clear_selection();
        self.game.reset();
        info!("game reset");
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.selected_moves.clear();
    }

    /// Cancels any outstanding search and starts a new epoch, so that its result will be ignored.
    fn invalidate(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(epoch = pending.epoch, "cancelling search");
            pending.is_searching.store(false, Ordering::Relaxed);
        }

        self.epoch += 1;
    }

    /// Spawns a search over a copy of the current board.
    fn start_search(&mut self) {
        let is_searching = Arc::new(AtomicBool::new(true));

        // Clone the parameters that will be sent into the thread
        let board = *self.game.board();
        let side = self.game.side_to_move();
        let epoch = self.epoch;
        let config = self.config.search_config();
        let replies = self.replies.clone();
        let flag = Arc::clone(&is_searching);

        debug!(epoch, %side, depth = config.depth, "starting AI search");

        let handle = thread::spawn(move || {
            let result = Search::new(&board, side, flag, config).run();

            if replies
                .send(SearchOutcome {
                    epoch,
                    side,
                    result,
                })
                .is_err()
            {
                trace!(epoch, "search finished after its session was dropped");
            }
        });

        self.pending = Some(PendingSearch {
            epoch,
            is_searching,
            handle,
        });
    }

    fn notify(&self, notification: Notification) {
        if self.outbox.send(notification).is_err() {
            trace!(?notification, "no one is listening for notifications");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::mpsc::{channel, Receiver},
        time::Duration,
    };

    use super::*;

    struct Harness {
        session: Session,
        outbox: Receiver<Notification>,
        replies: Receiver<SearchOutcome>,
    }

    fn harness(config: AiConfig) -> Harness {
        let (outbox_tx, outbox) = channel();
        let (replies_tx, replies) = channel();
        Harness {
            session: Session::new(config, outbox_tx, replies_tx),
            outbox,
            replies,
        }
    }

    fn computer(ai_color: Color) -> AiConfig {
        AiConfig {
            difficulty: Difficulty::Easy,
            mode: GameMode::Computer,
            ai_color,
        }
    }

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn next_outcome(replies: &Receiver<SearchOutcome>) -> SearchOutcome {
        replies.recv_timeout(Duration::from_secs(60)).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.difficulty, Difficulty::Medium);
        assert_eq!(config.mode, GameMode::Human);
        assert_eq!(config.ai_color, Color::Black);
        assert!(!config.should_ai_move(Color::Black));
        assert_eq!(config.search_config().depth, 4);
    }

    #[test]
    fn test_select_then_commit() {
        let mut h = harness(AiConfig::default());

        // Empty square with nothing selected
        assert_eq!(h.session.on_square_selected(sq("e4")), Selection::Ignored);

        // Own piece
        assert_eq!(
            h.session.on_square_selected(sq("e2")),
            Selection::Selected {
                square: sq("e2"),
                moves: vec![sq("e3"), sq("e4")]
            }
        );

        // Switching to another own piece
        let Selection::Selected { square, moves } = h.session.on_square_selected(sq("g1")) else {
            panic!("expected the knight to be selected");
        };
        assert_eq!(square, sq("g1"));
        assert_eq!(moves.len(), 2);

        // Enemy piece clears the selection
        assert_eq!(h.session.on_square_selected(sq("e7")), Selection::Cleared);
        assert_eq!(h.session.selected(), None);

        // Select and commit
        h.session.on_square_selected(sq("e2"));
        let Selection::Committed(mv) = h.session.on_square_selected(sq("e4")) else {
            panic!("expected e2e4 to be committed");
        };
        assert_eq!(mv.to_string(), "e2e4");
        assert_eq!(h.session.selected(), None);
        assert!(h.session.selected_moves().is_empty());
        assert_eq!(h.session.game().side_to_move(), Color::Black);
    }

    #[test]
    fn test_local_moves_and_resets_are_announced() {
        let mut h = harness(AiConfig::default());

        h.session.commit_local_move(sq("e2"), sq("e4")).unwrap();
        assert_eq!(
            h.outbox.try_recv().unwrap(),
            Notification::Move {
                from: sq("e2"),
                to: sq("e4"),
                piece: Piece::WHITE_PAWN
            }
        );

        h.session.reset();
        assert_eq!(h.outbox.try_recv().unwrap(), Notification::Reset);
        assert!(h.outbox.try_recv().is_err());
    }

    #[test]
    fn test_remote_moves_and_resets_are_not_announced() {
        let mut h = harness(computer(Color::Black));

        h.session.apply_remote_move(sq("e2"), sq("e4")).unwrap();
        assert_eq!(h.session.game().history().len(), 1);

        // It is the AI's turn, but remote moves never prompt it
        assert!(!h.session.is_thinking());

        h.session.apply_remote_reset();
        assert_eq!(h.session.game(), &Game::default());
        assert!(h.outbox.try_recv().is_err());
    }

    #[test]
    fn test_illegal_moves_are_ignored() {
        let mut h = harness(AiConfig::default());
        let epoch = h.session.epoch();

        assert!(h.session.commit_local_move(sq("e2"), sq("e5")).is_none());
        assert!(h.session.apply_remote_move(sq("e7"), sq("e5")).is_none());
        assert!(h.session.apply_remote_move(sq("e4"), sq("e5")).is_none());

        assert_eq!(h.session.epoch(), epoch);
        assert!(h.session.game().history().is_empty());
        assert!(h.outbox.try_recv().is_err());
    }

    #[test]
    fn test_seat_guard() {
        let mut h = harness(AiConfig::default());
        h.session.set_seat(Some(Color::Black));

        assert_eq!(h.session.on_square_selected(sq("e2")), Selection::Ignored);
        assert!(h.session.commit_local_move(sq("e2"), sq("e4")).is_none());

        // The opponent's move arrives over the network, and then it is our turn
        h.session.apply_remote_move(sq("e2"), sq("e4")).unwrap();
        assert!(h.session.commit_local_move(sq("e7"), sq("e5")).is_some());
    }

    #[test]
    fn test_ai_replies_to_local_move() {
        let mut h = harness(computer(Color::Black));

        h.session.commit_local_move(sq("e2"), sq("e4")).unwrap();
        assert!(h.session.is_thinking());

        let outcome = next_outcome(&h.replies);
        assert_eq!(outcome.epoch, h.session.epoch());
        assert_eq!(outcome.side, Color::Black);

        let reply = h.session.on_search_finished(outcome).unwrap();
        assert_eq!(reply.piece().color(), Color::Black);
        assert!(!h.session.is_thinking());
        assert_eq!(h.session.game().side_to_move(), Color::White);
        assert_eq!(h.session.game().history().len(), 2);

        // Only the local move was announced, and the AI move did not trigger another search
        assert!(matches!(h.outbox.try_recv(), Ok(Notification::Move { .. })));
        assert!(h.outbox.try_recv().is_err());
        assert!(h.replies.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_stale_result_is_discarded_after_reset() {
        let mut h = harness(computer(Color::Black));

        h.session.commit_local_move(sq("e2"), sq("e4")).unwrap();
        assert!(h.session.is_thinking());

        h.session.reset();
        assert!(!h.session.is_thinking());

        // Whether it finished or noticed the cancellation, the result must not be applied
        let outcome = next_outcome(&h.replies);
        assert!(h.session.on_search_finished(outcome).is_none());
        assert_eq!(h.session.game(), &Game::default());
    }

    #[test]
    fn test_stale_result_is_discarded_after_a_move() {
        for remote in [false, true] {
            let mut h = harness(computer(Color::Black));

            h.session.commit_local_move(sq("e2"), sq("e4")).unwrap();
            assert!(h.session.is_thinking());
            let epoch = h.session.epoch();

            // Black's reply arrives before the AI has answered
            let reply = if remote {
                h.session.apply_remote_move(sq("e7"), sq("e5"))
            } else {
                h.session.commit_local_move(sq("e7"), sq("e5"))
            };
            assert!(reply.is_some());
            assert!(!h.session.is_thinking());
            assert!(h.session.epoch() > epoch);

            let outcome = next_outcome(&h.replies);
            assert_eq!(outcome.epoch, epoch);
            assert!(h.session.on_search_finished(outcome).is_none());
            assert_eq!(h.session.game().history().len(), 2);
            assert_eq!(h.session.game().side_to_move(), Color::White);
        }
    }

    #[test]
    fn test_abandoning_a_finished_search() {
        let mut h = harness(computer(Color::White));
        assert!(!h.session.search_thread_exited());
        assert!(h.session.request_ai_move());

        // Hold on to the result so the session never sees it
        let outcome = next_outcome(&h.replies);
        while !h.session.search_thread_exited() {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(h.session.is_thinking());

        h.session.abandon_search();
        assert!(!h.session.is_thinking());
        assert!(h.session.on_search_finished(outcome).is_none());
        assert!(h.session.game().history().is_empty());

        // The AI can be asked again afterwards
        assert!(h.session.request_ai_move());
    }

    #[test]
    fn test_no_overlapping_searches() {
        let mut h = harness(computer(Color::White));

        assert!(h.session.request_ai_move());
        assert!(!h.session.request_ai_move());

        let outcome = next_outcome(&h.replies);
        let mv = h.session.on_search_finished(outcome).unwrap();
        assert_eq!(mv.piece().color(), Color::White);

        // Exactly one search ran
        assert!(h.replies.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn test_ai_does_not_move_when_not_its_turn() {
        let mut h = harness(computer(Color::Black));
        assert!(!h.session.request_ai_move());

        let mut h = harness(AiConfig::default());
        assert!(!h.session.request_ai_move());
    }

    #[test]
    fn test_changing_settings_cancels_search() {
        let mut h = harness(computer(Color::White));
        assert!(h.session.request_ai_move());

        h.session.set_config(AiConfig::default());
        assert!(!h.session.is_thinking());

        let outcome = next_outcome(&h.replies);
        assert!(h.session.on_search_finished(outcome).is_none());
        assert!(h.session.game().history().is_empty());
    }

    #[test]
    fn test_notification_json() {
        let json = serde_json::to_string(&Notification::Move {
            from: sq("e2"),
            to: sq("e4"),
            piece: Piece::WHITE_PAWN,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"move","from":{"row":6,"col":4},"to":{"row":4,"col":4},"piece":{"color":"white","kind":"pawn"}}"#
        );

        assert_eq!(serde_json::to_string(&Notification::Reset).unwrap(), r#"{"type":"reset"}"#);
        assert_eq!(
            serde_json::from_str::<Notification>(r#"{"type":"reset"}"#).unwrap(),
            Notification::Reset
        );
    }
}
