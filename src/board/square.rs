/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Represents a single square on an `8x8` chess board, as a `(row, col)` pair.
///
/// Row `0` is the back rank nearest Black, row `7` the back rank nearest White.
/// Columns run from the a-file (`0`) to the h-file (`7`):
/// ```text
///          col
///      0 1 2 3 4 5 6 7
///  0 | r n b q k b n r   <- rank 8
///  1 | p p p p p p p p
///  ...
///  6 | P P P P P P P P
///  7 | R N B Q K B N R   <- rank 1
///      a b c d e f g h
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSquare", into = "RawSquare")]
pub struct Square {
    row: u8,
    col: u8,
}

/// Wire shape of a [`Square`], validated on the way in.
#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawSquare {
    row: u8,
    col: u8,
}

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Length of one side of the board.
    pub const SIDE: u8 = 8;

    /// Creates a new [`Square`] without checking that it lies on the board.
    ///
    /// # Panics
    /// If `row` or `col` are greater than `7` and debug assertions are enabled.
    #[inline(always)]
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < Self::SIDE && col < Self::SIDE);
        Self { row, col }
    }

    /// Creates a new [`Square`], returning `None` if it would be off the board.
    #[inline(always)]
    pub const fn checked(row: i8, col: i8) -> Option<Self> {
        if row >= 0 && row < Self::SIDE as i8 && col >= 0 && col < Self::SIDE as i8 {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.row
    }

    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.col
    }

    /// Returns `row * 8 + col`, useful for indexing into tables laid out top-to-bottom.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.row as usize * Self::SIDE as usize + self.col as usize
    }

    /// Returns the square `(dr, dc)` away from this one, if it is on the board.
    #[inline(always)]
    pub const fn offset(&self, dr: i8, dc: i8) -> Option<Self> {
        Self::checked(self.row as i8 + dr, self.col as i8 + dc)
    }

    /// Mirrors this square vertically, so that it reads from the opposite side's back rank.
    #[inline(always)]
    pub const fn flipped(&self) -> Self {
        Self::new(Self::SIDE - 1 - self.row, self.col)
    }

    /// Signed row and column distance from `self` to `other`.
    #[inline(always)]
    pub const fn delta(&self, other: Self) -> (i8, i8) {
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// Iterates over all squares in row-major order, starting at `a8`.
    #[inline(always)]
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..Self::COUNT as u8).map(|i| Self::new(i / Self::SIDE, i % Self::SIDE))
    }

    /// Creates a [`Square`] from algebraic coordinates, such as `e4`.
    ///
    /// # Example
    /// ```
    /// # use rookie::Square;
    /// let e2 = Square::from_algebraic("e2").unwrap();
    /// assert_eq!((e2.row(), e2.col()), (6, 4));
    /// ```
    pub fn from_algebraic(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            bail!("Square must be two characters, such as \"e4\". Got {s:?}");
        };

        let file = file.to_ascii_lowercase();
        if !('a'..='h').contains(&file) {
            bail!("Invalid file {file:?} in square {s:?}");
        }

        let rank = rank
            .to_digit(10)
            .filter(|r| (1..=8).contains(r))
            .with_context(|| format!("Invalid rank in square {s:?}"))?;

        Ok(Self::new(8 - rank as u8, file as u8 - b'a'))
    }

    /// Converts this [`Square`] to algebraic coordinates.
    pub fn to_algebraic(&self) -> String {
        format!(
            "{}{}",
            (b'a' + self.col) as char,
            Self::SIDE - self.row
        )
    }
}

impl TryFrom<RawSquare> for Square {
    type Error = anyhow::Error;
    fn try_from(raw: RawSquare) -> Result<Self, Self::Error> {
        Self::checked(raw.row as i8, raw.col as i8)
            .with_context(|| format!("Square ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl From<Square> for RawSquare {
    fn from(square: Square) -> Self {
        Self {
            row: square.row,
            col: square.col,
        }
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_algebraic(s)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.to_algebraic(), self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algebraic_matches_rows() {
        let a8: Square = "a8".parse().unwrap();
        assert_eq!((a8.row(), a8.col()), (0, 0));

        let h1: Square = "h1".parse().unwrap();
        assert_eq!((h1.row(), h1.col()), (7, 7));

        for square in Square::iter() {
            assert_eq!(square.to_algebraic().parse::<Square>().unwrap(), square);
        }
    }

    #[test]
    fn test_invalid_squares() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a0".parse::<Square>().is_err());
        assert!("e".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
    }

    #[test]
    fn test_offset_stays_on_board() {
        let a8 = Square::new(0, 0);
        assert_eq!(a8.offset(-1, 0), None);
        assert_eq!(a8.offset(0, -1), None);
        assert_eq!(a8.offset(1, 1), Some(Square::new(1, 1)));
        assert_eq!(Square::new(7, 7).offset(1, 0), None);
    }

    #[test]
    fn test_serde_validates_range() {
        let e2 = Square::new(6, 4);
        let json = serde_json::to_string(&e2).unwrap();
        assert_eq!(json, r#"{"row":6,"col":4}"#);
        assert_eq!(serde_json::from_str::<Square>(&json).unwrap(), e2);
        assert!(serde_json::from_str::<Square>(r#"{"row":8,"col":0}"#).is_err());
    }
}
