/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{Board, Color, Move, MoveList, Piece, Square};

/// The state of a game, derived from the board and the side to move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum GameStatus {
    /// The side to move has legal moves and is not in check.
    #[default]
    Playing,

    /// The side to move is in check, but can escape.
    Check,

    /// The side to move is in check with no legal moves. `winner` is their opponent.
    Checkmate { winner: Color },

    /// The side to move is not in check, but has no legal moves.
    Stalemate,
}

impl GameStatus {
    /// Classifies the position on `board` with `side` to move.
    ///
    /// This is a pure function of its inputs and never looks at history.
    pub fn classify(board: &Board, side: Color) -> Self {
        let mut scratch = *board;
        let in_check = scratch.is_in_check(side);

        match (scratch.has_legal_move(side), in_check) {
            (false, true) => Self::Checkmate {
                winner: side.opponent(),
            },
            (false, false) => Self::Stalemate,
            (true, true) => Self::Check,
            (true, false) => Self::Playing,
        }
    }

    /// Returns `true` if no further moves can be played.
    #[inline(always)]
    pub const fn is_over(&self) -> bool {
        matches!(self, Self::Checkmate { .. } | Self::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "playing"),
            Self::Check => write!(f, "check"),
            Self::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            Self::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// A game of chess: a [`Board`], whose turn it is, the derived [`GameStatus`], and the moves played so far.
///
/// The basic methods you're probably looking for are [`Game::legal_moves`] and [`Game::apply_move`].
#[derive(Clone, PartialEq, Eq)]
pub struct Game {
    /// The current piece layout.
    board: Board,

    /// The side whose turn it is.
    side_to_move: Color,

    /// Recomputed from scratch after every move.
    status: GameStatus,

    /// Every move committed since the start of the game, oldest first.
    history: MoveList,
}

impl Game {
    /// Creates a new [`Game`] from a [`Board`] and the side to move.
    pub fn new(board: Board, side_to_move: Color) -> Self {
        Self {
            status: GameStatus::classify(&board, side_to_move),
            board,
            side_to_move,
            history: MoveList::new(),
        }
    }

    /// Creates a new [`Game`] from a FEN string.
    ///
    /// Only the piece placement and side-to-move fields are read. The side to move defaults to White.
    ///
    /// # Example
    /// ```
    /// # use rookie::{Game, Color};
    /// let game = Game::from_fen("k7/8/1Q6/8/8/8/8/7K b").unwrap();
    /// assert_eq!(game.side_to_move(), Color::Black);
    /// assert!(game.status().is_over());
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut fields = fen.split_ascii_whitespace();

        let Some(placement) = fields.next() else {
            bail!("FEN string is empty");
        };
        let board = Board::from_fen(placement)?;

        let side = match fields.next() {
            Some(field) if field.len() == 1 => Color::from_fen(field.chars().next().unwrap_or('w'))?,
            Some(field) => bail!("Invalid side-to-move field {field:?} in FEN {fen:?}"),
            None => Color::White,
        };

        Ok(Self::new(board, side))
    }

    /// Generates a FEN string (placement and side to move) for the current position.
    pub fn to_fen(&self) -> String {
        format!("{} {}", self.board.to_fen(), self.side_to_move.to_fen())
    }

    #[inline(always)]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// All moves committed so far, oldest first.
    #[inline(always)]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    /// Returns `true` if `color`'s King is currently attacked.
    #[inline(always)]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.board.is_in_check(color)
    }

    /// Legal destinations of the piece on `square`, whichever side it belongs to.
    pub fn legal_moves(&self, square: Square) -> Vec<Square> {
        let mut scratch = self.board;
        scratch.legal_moves(square)
    }

    /// Returns `true` if `to` is a legal destination for the piece on `from` and it is that piece's turn.
    pub fn is_legal(&self, from: Square, to: Square) -> bool {
        self.piece_at(from)
            .is_some_and(|piece| piece.color() == self.side_to_move)
            && self.legal_moves(from).contains(&to)
    }

    /// Every legal move for the side to move.
    pub fn all_legal_moves(&self) -> MoveList {
        let mut scratch = self.board;
        scratch.all_legal_moves(self.side_to_move)
    }

    /// Commits the move `from` -> `to`, flips the turn and reclassifies the game.
    ///
    /// The caller is expected to have taken `to` from [`Game::legal_moves`]; legality is not re-checked here.
    /// If `from` is empty, nothing happens and `None` is returned.
    pub fn apply_move(&mut self, from: Square, to: Square) -> Option<Move> {
        let piece = self.board.piece_at(from)?;
        let captured = self.board.shift(from, to);

        let mv = Move::new(from, to, piece, captured);
        self.history.push(mv);

        self.side_to_move = self.side_to_move.opponent();
        self.status = GameStatus::classify(&self.board, self.side_to_move);

        Some(mv)
    }

    /// Resets to the standard starting position, with White to move and no history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    /// Wrapper for [`Game::from_fen`]
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Default for Game {
    /// Standard starting position, White to move.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Board::standard(), Color::White)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board.to_string();
        for (i, line) in board.lines().enumerate() {
            write!(f, "{line}")?;
            match i {
                0 => write!(f, "        FEN: {}", self.to_fen())?,
                1 => write!(f, "       Turn: {}", self.side_to_move)?,
                2 => write!(f, "     Status: {}", self.status)?,
                3 => write!(f, "      Moves: {}", self.history.len())?,
                _ => {}
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_fen(), self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut Game, moves: &[(&str, &str)]) {
        for (from, to) in moves {
            let (from, to) = (from.parse().unwrap(), to.parse().unwrap());
            assert!(game.is_legal(from, to), "{from}{to} is not legal in {game:?}");
            game.apply_move(from, to);
        }
    }

    #[test]
    fn test_fools_mate() {
        let mut game = Game::default();
        play(&mut game, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);

        assert_eq!(
            game.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        assert_eq!(game.side_to_move(), Color::White);
        assert!(game.all_legal_moves().is_empty());
        assert!(game.is_in_check(Color::White));
    }

    #[test]
    fn test_checkmate_and_stalemate_classification() {
        let mate = Game::from_fen("k7/1Q6/1K6/8/8/8/8/8 b").unwrap();
        assert_eq!(
            mate.status(),
            GameStatus::Checkmate {
                winner: Color::White
            }
        );

        let stalemate = Game::from_fen("k7/8/1Q6/8/8/8/8/7K b").unwrap();
        assert_eq!(stalemate.status(), GameStatus::Stalemate);
        assert!(!stalemate.is_in_check(Color::Black));
    }

    #[test]
    fn test_check_status() {
        let mut game = Game::default();
        play(&mut game, &[("e2", "e4"), ("f7", "f6"), ("d1", "h5")]);
        assert_eq!(game.status(), GameStatus::Check);
        assert!(!game.status().is_over());
    }

    #[test]
    fn test_turn_alternates() {
        let mut game = Game::default();
        for n in 0..12 {
            assert_eq!(game.side_to_move().is_white(), n % 2 == 0);
            assert_eq!(game.history().len(), n);

            let mv = game.all_legal_moves()[0];
            game.apply_move(mv.from(), mv.to());
        }
    }

    #[test]
    fn test_apply_records_capture_and_empty_origin_is_noop() {
        let mut game = Game::from_fen("4k3/8/8/3q4/8/2N5/8/4K3 w").unwrap();
        let before = game.clone();

        assert!(game.apply_move("e4".parse().unwrap(), "e5".parse().unwrap()).is_none());
        assert_eq!(game, before);

        let mv = game
            .apply_move("c3".parse().unwrap(), "d5".parse().unwrap())
            .unwrap();
        assert_eq!(mv.piece(), Piece::WHITE_KNIGHT);
        assert_eq!(mv.captured(), Some(Piece::BLACK_QUEEN));
        assert_eq!(game.history(), &[mv]);
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut game = Game::default();
        play(&mut game, &[("e2", "e4"), ("e7", "e5")]);
        game.reset();
        assert_eq!(game, Game::default());
        assert!(game.history().is_empty());
        assert_eq!(game.status(), GameStatus::Playing);
    }

    #[test]
    fn test_fen_side_to_move() {
        assert_eq!(Game::from_fen(Board::standard().to_fen().as_str()).unwrap(), Game::default());
        assert!(Game::from_fen("8/8/8/8/8/8/8/8 x").is_err());
        assert!(Game::from_fen("").is_err());
    }
}
