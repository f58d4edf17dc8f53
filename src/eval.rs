/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Board, Piece, PieceKind, Psqt, Score, Square};

/// Encapsulates the logic of scoring a chess position.
///
/// A high score is good for White, and a low score is good for Black, regardless of whose turn it is.
/// The score is the sum, over every occupied square, of the piece's material value plus its positional bonus,
/// negated for Black pieces.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// The board whose position to evaluate.
    board: &'a Board,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for `board`.
    #[inline(always)]
    pub const fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Evaluate this position from White's perspective.
    ///
    /// # Example
    /// ```
    /// # use rookie::{Board, Evaluator, Score};
    /// // Both sides mirror each other in the starting position.
    /// assert_eq!(Evaluator::new(&Board::standard()).eval(), Score::DRAW);
    /// ```
    #[inline(always)]
    pub fn eval(&self) -> Score {
        self.board
            .pieces()
            .fold(Score::DRAW, |score, (square, piece)| {
                score + contribution(piece, square)
            })
    }

    /// Fetches the signed contribution of the piece on the specified square, if one exists.
    ///
    /// Only used when printing the evaluator
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<Score> {
        self.board
            .piece_at(square)
            .map(|piece| contribution(piece, square))
    }
}

/// Material plus positional bonus of `piece` standing on `square`, signed by its color.
#[inline(always)]
pub fn contribution(piece: Piece, square: Square) -> Score {
    let unsigned = value_of(piece.kind()) + Psqt::bonus(piece, square);
    Score(unsigned * piece.color().negation_multiplier())
}

impl fmt::Display for Evaluator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in 0..Square::SIDE {
            write!(f, "-------+")?;
        }
        writeln!(f)?;

        for row in 0..Square::SIDE {
            write!(f, "{} |", Square::SIDE - row)?;

            // Step 1: Write the piece char
            for col in 0..Square::SIDE {
                let piece = self.board.piece_at(Square::new(row, col));
                let piece_char = piece.map(|p| p.char()).unwrap_or(' ');
                write!(f, "   {piece_char}   |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for col in 0..Square::SIDE {
                let score = match self.value_at(Square::new(row, col)) {
                    // Kings cancel out, so only their positional part is interesting
                    Some(val) if val.abs() >= value_of(PieceKind::King) - 100 => {
                        let bonus = val.0 - value_of(PieceKind::King) * val.0.signum();
                        format!("{:^7}", format!("K{bonus:+}"))
                    }
                    Some(val) => format!("{:^7}", format!("{:+.2}", val.normalize())),
                    None => String::from("       "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in 0..Square::SIDE {
                write!(f, "-------+")?;
            }
            writeln!(f)?;
        }
        for file in 'a'..='h' {
            write!(f, "       {file}")?;
        }

        let score = self.eval();
        writeln!(f)?;
        writeln!(
            f,
            "\nWinning side: {}",
            score.favors().map(|c| c.name()).unwrap_or("N/A")
        )?;
        write!(f, "Score: {score}")
    }
}

/// Returns the material value of the provided `PieceKind`.
///
/// The King's value is large enough to dwarf everything else, but both Kings are always on the board,
/// so they cancel out in practice.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20_000,
    }
}
