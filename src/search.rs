/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{Board, Color, Evaluator, Move, Score};

/// How hard the AI tries, which is to say how deep it searches.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Search depth, in plies, for this difficulty.
    ///
    /// # Example
    /// ```
    /// # use rookie::Difficulty;
    /// assert_eq!(Difficulty::Easy.depth(), 3);
    /// assert_eq!(Difficulty::Expert.depth(), 6);
    /// ```
    #[inline(always)]
    pub const fn depth(&self) -> usize {
        match self {
            Self::Easy => 3,
            Self::Medium => 4,
            Self::Hard => 5,
            Self::Expert => 6,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        };
        write!(f, "{name}")
    }
}

/// The result of a search, containing the best move found, its score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Best move found during the search, or `None` if the side to move had no legal moves.
    pub best_move: Option<Move>,

    /// Minimax value of the position after `best_move` is made, from White's point of view.
    pub score: Score,

    /// Number of nodes searched.
    pub nodes: u64,
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Depth of the search, in plies. A depth of `0` is treated as `1`.
    pub depth: usize,

    /// Whether to skip branches that cannot affect the result.
    ///
    /// Disabling this yields plain minimax, which finds the same moves, only slower.
    pub pruning: bool,
}

impl SearchConfig {
    /// A pruned search at the depth of `difficulty`.
    #[inline(always)]
    pub const fn new(difficulty: Difficulty) -> Self {
        Self {
            depth: difficulty.depth(),
            pruning: true,
        }
    }
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// Executes a fixed-depth [minimax](https://www.chessprogramming.org/Minimax) search with
/// [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta) on a private copy of a position.
///
/// White is the maximizing player and Black the minimizing one. Moves are searched in generation order.
pub struct Search<'a> {
    /// The position to search.
    ///
    /// This board is copied whenever moves are applied to it, and is never mutated.
    board: &'a Board,

    /// The side to find a move for.
    side: Color,

    /// An atomic flag to determine if the search should be cancelled at any time.
    ///
    /// If this is ever `false`, the search will exit as soon as possible.
    is_searching: Arc<AtomicBool>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,

    /// Nodes visited so far.
    nodes: u64,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to find a move for `side` on `board`.
    #[inline(always)]
    pub fn new(
        board: &'a Board,
        side: Color,
        is_searching: Arc<AtomicBool>,
        config: SearchConfig,
    ) -> Self {
        Self {
            board,
            side,
            is_searching,
            config,
            nodes: 0,
        }
    }

    /// Start the search, returning its results if it was not cancelled.
    ///
    /// Every legal move is searched to `depth - 1` with a full window. The best one wins, and ties go to
    /// whichever move was generated first.
    pub fn run(mut self) -> Result<SearchResult> {
        let start = Instant::now();
        let depth = self.config.depth.max(1);
        debug!(side = %self.side, depth, pruning = self.config.pruning, position = ?self.board, "starting search");

        let mut scratch = *self.board;
        let moves = scratch.all_legal_moves(self.side);

        let mut best_move = None;
        let mut best_score = Score::worst_for(self.side);

        for mv in moves {
            let child = self.board.with_move_made(mv.from(), mv.to());
            let score = self.minimax(
                &child,
                self.side.opponent(),
                depth - 1,
                -Score::INF,
                Score::INF,
            )?;
            trace!(%mv, %score, "root move searched");

            if score.is_better_for(best_score, self.side) {
                best_score = score;
                best_move = Some(mv);
            }
        }

        // No legal moves at the root
        if best_move.is_none() {
            best_score = Score::no_moves_for(self.side);
        }

        let res = SearchResult {
            best_move,
            score: best_score,
            nodes: self.nodes,
        };

        debug!(
            best_move = %res.best_move.map(|mv| mv.to_string()).unwrap_or_else(|| String::from("(none)")),
            score = %res.score,
            nodes = res.nodes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search finished"
        );

        Ok(res)
    }

    /// Primary location of search logic.
    ///
    /// Returns the minimax value of `board` with `side` to move, searched `depth` plies deep, from White's point of view.
    fn minimax(
        &mut self,
        board: &Board,
        side: Color,
        depth: usize,
        mut alpha: Score,
        mut beta: Score,
    ) -> Result<Score> {
        self.nodes += 1;

        // The search was stopped by an external factor, like a reset or a new move
        if !self.is_searching.load(Ordering::Relaxed) {
            bail!("cancelled by external command");
        }

        // If we've reached a terminal node, evaluate the position
        if depth == 0 {
            return Ok(Evaluator::new(board).eval());
        }

        let mut scratch = *board;
        let moves = scratch.all_legal_moves(side);

        // Checkmate and stalemate score the same here
        if moves.is_empty() {
            return Ok(Score::no_moves_for(side));
        }

        let mut best = Score::worst_for(side);

        for mv in moves {
            // Copy-make the new position
            let child = board.with_move_made(mv.from(), mv.to());
            let score = self.minimax(&child, side.opponent(), depth - 1, alpha, beta)?;

            match side {
                Color::White => {
                    best = best.max(score);
                    alpha = alpha.max(score);
                }
                Color::Black => {
                    best = best.min(score);
                    beta = beta.min(score);
                }
            }

            if self.config.pruning && beta <= alpha {
                break;
            }
        }

        Ok(best)
    }
}

/// Convenience wrapper that runs an uncancellable [`Search`] for `side` on `board` at `depth`.
///
/// # Example
/// ```
/// # use rookie::{best_move, Board, Color};
/// let board: Board = "4k3/8/8/3q4/8/2N5/8/4K3".parse().unwrap();
/// let mv = best_move(&board, Color::White, 1).unwrap();
/// assert_eq!(mv.to_string(), "c3d5");
/// ```
pub fn best_move(board: &Board, side: Color, depth: usize) -> Option<Move> {
    let config = SearchConfig {
        depth,
        pruning: true,
    };

    // Nothing else holds the flag, so this search cannot be cancelled
    Search::new(board, side, Arc::new(AtomicBool::new(true)), config)
        .run()
        .ok()
        .and_then(|res| res.best_move)
}
