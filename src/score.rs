/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Color;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Scores are always from White's point of view: positive is good for White, negative is good for Black.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Larger than any score the search can produce.
    pub const INF: Self = Self(i32::MAX);

    /// Magnitude of the score given to a side with no legal moves.
    ///
    /// Stalemate receives this score too, so the search cannot tell it apart from checkmate.
    pub const MATE: Self = Self(20_000);

    /// An even position.
    pub const DRAW: Self = Self(0);

    /// Score of a node where `side` is to move and has no legal moves.
    ///
    /// Always bad for `side`, whether it is checkmated or stalemated.
    #[inline(always)]
    pub const fn no_moves_for(side: Color) -> Self {
        match side {
            Color::White => Self(-Self::MATE.0),
            Color::Black => Self::MATE,
        }
    }

    /// The worst possible score for `side`, used to seed a max/min reduction.
    #[inline(always)]
    pub const fn worst_for(side: Color) -> Self {
        match side {
            Color::White => Self(-Self::INF.0),
            Color::Black => Self::INF,
        }
    }

    /// Returns `true` if `self` is strictly better than `other` for `side`.
    #[inline(always)]
    pub fn is_better_for(self, other: Self, side: Color) -> bool {
        match side {
            Color::White => self > other,
            Color::Black => self < other,
        }
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// "Normalizes" a score so that it can be printed as a float.
    ///
    /// Presently, this just divides by 100, since a score represents a centipawn value.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }

    /// Returns the side this score favors, or `None` if it is even.
    #[inline(always)]
    pub fn favors(&self) -> Option<Color> {
        match self.0.signum() {
            1 => Some(Color::White),
            -1 => Some(Color::Black),
            _ => None,
        }
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl PartialEq<i32> for Score {
    fn eq(&self, other: &i32) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<i32> for Score {
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.abs() == Self::MATE {
            write!(f, "{} (no moves for {})", self.0, if self.0 > 0 { "black" } else { "white" })
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_moves_is_bad_for_the_stuck_side() {
        assert_eq!(Score::no_moves_for(Color::White), -20_000);
        assert_eq!(Score::no_moves_for(Color::Black), 20_000);

        for side in Color::all() {
            let stuck = Score::no_moves_for(side);
            assert!(Score::DRAW.is_better_for(stuck, side));
            assert!(stuck.is_better_for(Score::worst_for(side), side));
        }
    }

    #[test]
    fn test_favors() {
        assert_eq!(Score(35).favors(), Some(Color::White));
        assert_eq!(Score(-1).favors(), Some(Color::Black));
        assert_eq!(Score::DRAW.favors(), None);
        assert_eq!((Score(250) - 300).normalize(), -0.5);
    }
}
