/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Piece, Square};

/// A list of moves, as produced by the move generator.
pub type MoveList = Vec<Move>;

/// Represents a single move: a piece travelling from one [`Square`] to another,
/// possibly capturing whatever stood on the destination.
///
/// There are no special move kinds; castling, en passant and promotion do not exist in this rule set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
}

impl Move {
    /// Creates a new [`Move`].
    #[inline(always)]
    pub const fn new(from: Square, to: Square, piece: Piece, captured: Option<Piece>) -> Self {
        Self {
            from,
            to,
            piece,
            captured,
        }
    }

    /// Fetches the source (or "from") part of this [`Move`].
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Fetches the destination (or "to") part of this [`Move`].
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// The piece that moved.
    #[inline(always)]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    /// The piece that stood on the destination square, if any.
    #[inline(always)]
    pub const fn captured(&self) -> Option<Piece> {
        self.captured
    }

    #[inline(always)]
    pub const fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Coordinate notation for this move, such as `e2e4`.
    pub fn to_coords(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl fmt::Display for Move {
    /// Displays this move in coordinate notation.
    ///
    /// The alternate formatter (`#`) also names the moving and captured pieces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#} {}-{}", self.piece, self.from, self.to)?;
            if let Some(captured) = self.captured {
                write!(f, " takes {captured:#}")?;
            }
            Ok(())
        } else {
            write!(f, "{}", self.to_coords())
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.captured {
            Some(captured) => write!(f, "{}{}x{}{}", self.piece, self.from, captured, self.to),
            None => write!(f, "{}{}-{}", self.piece, self.from, self.to),
        }
    }
}
