/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Deref, str::FromStr};

use anyhow::{bail, Result};

use super::{Color, Piece, PieceKind, Square};

/// FEN piece placement of the standard starting position.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// An `8x8` grid of optional pieces.
///
/// A [`Board`] knows nothing about legality. It is cheap to copy, which the search relies on
/// when it needs several positions alive at once.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board([Option<Piece>; Square::COUNT]);

impl Board {
    /// Creates an empty [`Board`].
    #[inline(always)]
    pub const fn empty() -> Self {
        Self([None; Square::COUNT])
    }

    /// Creates a [`Board`] set up in the standard starting position.
    pub fn standard() -> Self {
        use PieceKind::*;
        const BACK_RANK: [PieceKind; 8] = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Self::empty();
        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            let col = col as u8;
            board.set(Square::new(0, col), Some(Piece::new(Color::Black, kind)));
            board.set(Square::new(1, col), Some(Piece::BLACK_PAWN));
            board.set(Square::new(6, col), Some(Piece::WHITE_PAWN));
            board.set(Square::new(7, col), Some(Piece::new(Color::White, kind)));
        }

        board
    }

    /// Creates a [`Board`] from the piece placement field of a FEN string.
    ///
    /// # Example
    /// ```
    /// # use rookie::{Board, FEN_STARTPOS};
    /// let board = Board::from_fen(FEN_STARTPOS).unwrap();
    /// assert_eq!(board, Board::standard());
    /// ```
    pub fn from_fen(placement: &str) -> Result<Self> {
        let mut board = Self::empty();

        let rows = placement.split('/').collect::<Vec<_>>();
        if rows.len() != Square::SIDE as usize {
            bail!(
                "FEN placement must have 8 ranks separated by '/'. Got {} in {placement:?}",
                rows.len()
            );
        }

        for (row, rank) in rows.into_iter().enumerate() {
            let mut col = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    if col >= Square::SIDE as usize {
                        bail!("Rank {rank:?} in FEN {placement:?} is longer than 8 squares");
                    }
                    let square = Square::new(row as u8, col as u8);
                    board.set(square, Some(Piece::from_char(c)?));
                    col += 1;
                }
            }

            if col != Square::SIDE as usize {
                bail!("Rank {rank:?} in FEN {placement:?} does not span 8 squares");
            }
        }

        Ok(board)
    }

    /// Generates the piece placement field of a FEN string for this board.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(72);

        for row in 0..Square::SIDE {
            let mut empty = 0;
            for col in 0..Square::SIDE {
                match self.piece_at(Square::new(row, col)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.char());
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row + 1 < Square::SIDE {
                fen.push('/');
            }
        }

        fen
    }

    /// Fetches the piece on `square`, if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.0[square.index()]
    }

    /// Places `piece` on `square`, or clears it if `piece` is `None`.
    #[inline(always)]
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.0[square.index()] = piece;
    }

    /// Returns `true` if there is no piece on `square`.
    #[inline(always)]
    pub const fn is_empty_at(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// Iterates over all occupied squares in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over all squares occupied by pieces of `color`, in row-major order.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color() == color)
    }

    /// Finds the square of `color`'s King, if it is on the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        self.pieces()
            .find_map(|(square, piece)| (piece == king).then_some(square))
    }

    /// Moves whatever is on `from` to `to`, overwriting `to`, and returns what was on `to`.
    #[inline(always)]
    pub fn shift(&mut self, from: Square, to: Square) -> Option<Piece> {
        let captured = self.piece_at(to);
        self.set(to, self.piece_at(from));
        self.set(from, None);
        captured
    }

    /// Copies `self` and returns a [`Board`] after having moved the piece on `from` to `to`.
    #[inline(always)]
    pub fn with_move_made(&self, from: Square, to: Square) -> Self {
        let mut copied = *self;
        copied.shift(from, to);
        copied
    }

    /// Temporarily moves the piece on `from` to `to`.
    ///
    /// The returned [`Probe`] dereferences to the altered board. When it goes out of scope,
    /// both touched squares are restored exactly, including any captured piece,
    /// even if the code inspecting the probe panics.
    #[inline(always)]
    pub fn probe(&mut self, from: Square, to: Square) -> Probe<'_> {
        let moved = self.piece_at(from);
        let captured = self.shift(from, to);
        Probe {
            board: self,
            from,
            to,
            moved,
            captured,
        }
    }
}

impl Default for Board {
    /// Standard starting position.
    #[inline(always)]
    fn default() -> Self {
        Self::standard()
    }
}

impl FromStr for Board {
    type Err = anyhow::Error;
    /// Wrapper for [`Board::from_fen`]
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..Square::SIDE {
            write!(f, "{}|", Square::SIDE - row)?;
            for col in 0..Square::SIDE {
                let piece = self.piece_at(Square::new(row, col));
                write!(f, " {}", piece.map(|p| p.char()).unwrap_or('.'))?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in 0..Square::SIDE {
            write!(f, "--")?;
        }
        write!(f, "\n  ")?;
        for file in 'a'..='h' {
            write!(f, " {file}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

/// A scoped, single-move alteration of a [`Board`].
///
/// Created by [`Board::probe`]. Restores the two touched squares on drop.
pub struct Probe<'a> {
    board: &'a mut Board,
    from: Square,
    to: Square,
    moved: Option<Piece>,
    captured: Option<Piece>,
}

impl Deref for Probe<'_> {
    type Target = Board;
    #[inline(always)]
    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl Drop for Probe<'_> {
    #[inline(always)]
    fn drop(&mut self) {
        self.board.set(self.from, self.moved);
        self.board.set(self.to, self.captured);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_round_trip() {
        let fens = [
            FEN_STARTPOS,
            "4k3/8/8/3q4/8/2N5/8/4K3",
            "k7/1Q6/1K6/8/8/8/8/8",
        ];
        for fen in fens {
            assert_eq!(Board::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_invalid_fens() {
        assert!(Board::from_fen("8/8/8").is_err());
        assert!(Board::from_fen("9/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("7/8/8/8/8/8/8/8").is_err());
        assert!(Board::from_fen("x7/8/8/8/8/8/8/8").is_err());
    }

    #[test]
    fn test_standard_layout() {
        let board = Board::standard();
        assert_eq!(board.piece_at("e1".parse().unwrap()), Some(Piece::WHITE_KING));
        assert_eq!(board.piece_at("d8".parse().unwrap()), Some(Piece::BLACK_QUEEN));
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.pieces_of(Color::White).count(), 16);
        assert_eq!(board.king_square(Color::Black), Some(Square::new(0, 4)));
    }

    #[test]
    fn test_probe_restores_capture() {
        let mut board = Board::from_fen("4k3/8/8/3q4/8/2N5/8/4K3").unwrap();
        let original = board;
        let (c3, d5) = ("c3".parse().unwrap(), "d5".parse().unwrap());

        {
            let probe = board.probe(c3, d5);
            assert_eq!(probe.piece_at(d5), Some(Piece::WHITE_KNIGHT));
            assert!(probe.is_empty_at(c3));
        }

        assert_eq!(board, original);
        assert_eq!(board.piece_at(d5), Some(Piece::BLACK_QUEEN));
    }

    #[test]
    fn test_probe_restores_on_panic() {
        let mut board = Board::standard();
        let original = board;
        let (e2, e4) = ("e2".parse().unwrap(), "e4".parse().unwrap());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _probe = board.probe(e2, e4);
            panic!("interrupted while probing");
        }));

        assert!(result.is_err());
        assert_eq!(board, original);
    }
}
