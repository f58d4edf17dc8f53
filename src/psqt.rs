/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, Piece, PieceKind, Square};

/// Piece-Square tables from the [Simplified Evaluation Function](https://www.chessprogramming.org/Simplified_Evaluation_Function).
///
/// Written from White's perspective, with Black's back rank on the first line.
#[rustfmt::skip]
const PAWN: Psqt = Psqt([
      0,   0,   0,   0,   0,   0,   0,   0,
     50,  50,  50,  50,  50,  50,  50,  50,
     10,  10,  20,  30,  30,  20,  10,  10,
      5,   5,  10,  25,  25,  10,   5,   5,
      0,   0,   0,  20,  20,   0,   0,   0,
      5,  -5, -10,   0,   0, -10,  -5,   5,
      5,  10,  10, -20, -20,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
]);

#[rustfmt::skip]
const KNIGHT: Psqt = Psqt([
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
]);

#[rustfmt::skip]
const BISHOP: Psqt = Psqt([
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
]);

#[rustfmt::skip]
const ROOK: Psqt = Psqt([
      0,   0,   0,   0,   0,   0,   0,   0,
      5,  10,  10,  10,  10,  10,  10,   5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      0,   0,   0,   5,   5,   0,   0,   0,
]);

#[rustfmt::skip]
const QUEEN: Psqt = Psqt([
    -20, -10, -10,  -5,  -5, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,  -5,
    -10,   5,   5,   5,   5,   5,   0, -10,
    -10,   0,   5,   0,   0,   0,   0, -10,
    -20, -10, -10,  -5,  -5, -10, -10, -20,
]);

/// Middle-game table only; there is no endgame taper.
#[rustfmt::skip]
const KING: Psqt = Psqt([
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
]);

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
///
/// Indexed by [`Square::index`] as seen from White. Black reads the table mirrored vertically.
#[derive(Debug, PartialEq, Eq)]
pub struct Psqt([i32; Square::COUNT]);

impl Psqt {
    /// Fetch the positional bonus for `piece` at `square`, from `piece`'s own point of view.
    ///
    /// This is never negated for Black; the caller decides the sign.
    #[inline(always)]
    pub fn bonus(piece: Piece, square: Square) -> i32 {
        Self::get_table_for(piece.kind()).get_relative(square, piece.color())
    }

    /// Fetch the Piece-Square Table for the provided [`PieceKind`].
    #[inline(always)]
    pub fn get_table_for(kind: PieceKind) -> &'static Self {
        match kind {
            PieceKind::Pawn => &PAWN,
            PieceKind::Knight => &KNIGHT,
            PieceKind::Bishop => &BISHOP,
            PieceKind::Rook => &ROOK,
            PieceKind::Queen => &QUEEN,
            PieceKind::King => &KING,
        }
    }

    /// Get the value of this PSQT at the provided square.
    #[inline(always)]
    pub const fn get(&self, square: Square) -> i32 {
        self.0[square.index()]
    }

    /// Get the value of this PSQT at the provided square, relative to `color`.
    #[inline(always)]
    pub const fn get_relative(&self, square: Square, color: Color) -> i32 {
        match color {
            Color::White => self.get(square),
            Color::Black => self.get(square.flipped()),
        }
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it in the same way it is written in the code (White's perspective).
    ///
    /// If the alternate formatter is used (`#`), it will print as if from Black's perspective.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = if f.alternate() {
            Color::Black
        } else {
            Color::White
        };

        for row in 0..Square::SIDE {
            write!(f, "{}| ", Square::SIDE - row)?;
            for col in 0..Square::SIDE {
                let value = self.get_relative(Square::new(row, col), color);
                write!(f, "{value:3} ")?;
            }
            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in 0..Square::SIDE {
            write!(f, "----")?;
        }
        write!(f, "\n    ")?;
        for file in 'a'..='h' {
            write!(f, "{file}   ")?;
        }

        Ok(())
    }
}
