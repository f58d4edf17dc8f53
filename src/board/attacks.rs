/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Board, Color, Piece, PieceKind, Square};

/// Offsets a Knight can jump by.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Offsets a King can step by.
pub const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Directions a Rook slides in.
pub const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Directions a Bishop slides in.
pub const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Directions a Queen slides in: Rook directions, then Bishop directions.
pub const QUEEN_DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Returns `true` if `piece`, standing on `from`, attacks `target`.
///
/// This only considers the piece's movement pattern and, for sliders, whether the path is blocked.
/// It does not care whether `piece` is pinned, or what stands on `target`.
pub fn attacks(board: &Board, from: Square, piece: Piece, target: Square) -> bool {
    let (dr, dc) = from.delta(target);
    if dr == 0 && dc == 0 {
        return false;
    }

    match piece.kind() {
        PieceKind::Pawn => dr == piece.color().forward() && dc.abs() == 1,
        PieceKind::Knight => matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1)),
        PieceKind::Bishop => bishop_attacks(board, from, target),
        PieceKind::Rook => rook_attacks(board, from, target),
        PieceKind::Queen => rook_attacks(board, from, target) || bishop_attacks(board, from, target),
        PieceKind::King => dr.abs() <= 1 && dc.abs() <= 1,
    }
}

/// Same rank or file, with nothing in between.
#[inline(always)]
fn rook_attacks(board: &Board, from: Square, target: Square) -> bool {
    let (dr, dc) = from.delta(target);
    (dr == 0 || dc == 0) && is_path_clear(board, from, target)
}

/// Same diagonal, with nothing in between.
#[inline(always)]
fn bishop_attacks(board: &Board, from: Square, target: Square) -> bool {
    let (dr, dc) = from.delta(target);
    dr.abs() == dc.abs() && is_path_clear(board, from, target)
}

/// Returns `true` if every square strictly between `from` and `to` is empty.
///
/// `from` and `to` must share a rank, file or diagonal.
pub fn is_path_clear(board: &Board, from: Square, to: Square) -> bool {
    let (dr, dc) = from.delta(to);
    let step = (dr.signum(), dc.signum());

    let mut current = from.offset(step.0, step.1);
    while let Some(square) = current {
        if square == to {
            return true;
        }
        if !board.is_empty_at(square) {
            return false;
        }
        current = square.offset(step.0, step.1);
    }

    // Walked off the board without meeting `to`; the squares were not aligned.
    false
}

impl Board {
    /// Returns `true` if any piece of color `by` attacks `target`.
    pub fn is_square_attacked(&self, target: Square, by: Color) -> bool {
        self.pieces_of(by)
            .any(|(from, piece)| attacks(self, from, piece, target))
    }

    /// Returns `true` if `color`'s King is attacked by the opponent.
    ///
    /// A board without a King of `color` is never in check.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_square_attacked(king, color.opponent()))
    }
}
