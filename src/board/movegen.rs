/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    Board, Color, Move, MoveList, PieceKind, Square, BISHOP_DIRECTIONS, KING_OFFSETS,
    KNIGHT_OFFSETS, QUEEN_DIRECTIONS, ROOK_DIRECTIONS,
};

impl Board {
    /// Generates every destination the piece on `from` could reach, ignoring whether its own King is left in check.
    ///
    /// Returns an empty list if `from` is empty.
    pub fn pseudo_moves(&self, from: Square) -> Vec<Square> {
        let Some(piece) = self.piece_at(from) else {
            return Vec::new();
        };

        let mut moves = Vec::with_capacity(27);
        match piece.kind() {
            PieceKind::Pawn => self.pawn_moves(from, piece.color(), &mut moves),
            PieceKind::Knight => self.jumping_moves(from, piece.color(), &KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => self.sliding_moves(from, piece.color(), &BISHOP_DIRECTIONS, &mut moves),
            PieceKind::Rook => self.sliding_moves(from, piece.color(), &ROOK_DIRECTIONS, &mut moves),
            PieceKind::Queen => self.sliding_moves(from, piece.color(), &QUEEN_DIRECTIONS, &mut moves),
            PieceKind::King => self.jumping_moves(from, piece.color(), &KING_OFFSETS, &mut moves),
        }

        moves
    }

    /// Pushes, double pushes from the home row, and diagonal captures of enemy pieces.
    fn pawn_moves(&self, from: Square, color: Color, moves: &mut Vec<Square>) {
        let forward = color.forward();

        if let Some(one) = from.offset(forward, 0).filter(|sq| self.is_empty_at(*sq)) {
            moves.push(one);

            if from.row() == color.pawn_row() {
                if let Some(two) = one.offset(forward, 0).filter(|sq| self.is_empty_at(*sq)) {
                    moves.push(two);
                }
            }
        }

        for dc in [-1, 1] {
            let Some(target) = from.offset(forward, dc) else {
                continue;
            };
            if self.piece_at(target).is_some_and(|p| p.color() != color) {
                moves.push(target);
            }
        }
    }

    /// Single-step moves onto empty or enemy-occupied squares (Knight and King).
    fn jumping_moves(&self, from: Square, color: Color, offsets: &[(i8, i8)], moves: &mut Vec<Square>) {
        for &(dr, dc) in offsets {
            let Some(target) = from.offset(dr, dc) else {
                continue;
            };
            if self.piece_at(target).map_or(true, |p| p.color() != color) {
                moves.push(target);
            }
        }
    }

    /// Ray-casts in each direction, stopping at the edge or the first occupied square (included only if it is an enemy).
    fn sliding_moves(&self, from: Square, color: Color, directions: &[(i8, i8)], moves: &mut Vec<Square>) {
        for &(dr, dc) in directions {
            let mut current = from.offset(dr, dc);
            while let Some(target) = current {
                match self.piece_at(target) {
                    None => moves.push(target),
                    Some(blocker) => {
                        if blocker.color() != color {
                            moves.push(target);
                        }
                        break;
                    }
                }
                current = target.offset(dr, dc);
            }
        }
    }

    /// Returns `true` if moving the piece on `from` to `to` would leave that piece's own King in check.
    ///
    /// The move is made on this board in place and always undone before returning.
    pub fn would_result_in_check(&mut self, from: Square, to: Square) -> bool {
        let Some(piece) = self.piece_at(from) else {
            return false;
        };

        let probe = self.probe(from, to);
        probe.is_in_check(piece.color())
    }

    /// Generates every destination the piece on `from` can legally move to.
    ///
    /// Returns an empty list if `from` is empty.
    pub fn legal_moves(&mut self, from: Square) -> Vec<Square> {
        let mut moves = self.pseudo_moves(from);
        moves.retain(|&to| !self.would_result_in_check(from, to));
        moves
    }

    /// Generates every legal [`Move`] for `color`, scanning the board in row-major order.
    pub fn all_legal_moves(&mut self, color: Color) -> MoveList {
        let mut moves = MoveList::with_capacity(64);

        for from in Square::iter() {
            let Some(piece) = self.piece_at(from).filter(|p| p.color() == color) else {
                continue;
            };

            for to in self.legal_moves(from) {
                moves.push(Move::new(from, to, piece, self.piece_at(to)));
            }
        }

        moves
    }

    /// Returns `true` if `color` has at least one legal move.
    pub fn has_legal_move(&mut self, color: Color) -> bool {
        Square::iter().any(|from| {
            self.piece_at(from).is_some_and(|p| p.color() == color)
                && !self.legal_moves(from).is_empty()
        })
    }
}

/// Counts the leaf nodes of the legal move tree of `board`, with `side` to move, `depth` plies deep.
///
/// See <https://www.chessprogramming.org/Perft>.
pub fn perft(board: &Board, side: Color, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut scratch = *board;
    let moves = scratch.all_legal_moves(side);

    // Bulk counting at the frontier
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .into_iter()
        .map(|mv| perft(&board.with_move_made(mv.from(), mv.to()), side.opponent(), depth - 1))
        .sum()
}

/// Performs a split perft, printing the node count beneath every root move.
pub fn print_perft(board: &Board, side: Color, depth: usize) -> u64 {
    let mut scratch = *board;
    let mut total = 0;

    for mv in scratch.all_legal_moves(side) {
        let nodes = if depth == 0 {
            1
        } else {
            perft(&board.with_move_made(mv.from(), mv.to()), side.opponent(), depth - 1)
        };
        println!("{mv}: {nodes}");
        total += nodes;
    }

    println!("\n{total}");
    total
}
