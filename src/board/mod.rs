/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Attack detection for every piece kind.
mod attacks;

/// The game state machine: turns, history, and check / mate / stalemate classification.
mod game;

/// Pseudo-legal and legal move generation, plus perft.
mod movegen;

/// The [`Move`] type.
mod moves;

/// Colors, piece kinds, and pieces.
mod piece;

/// The `8x8` board and its FEN representation.
mod position;

/// Board coordinates.
mod square;

pub use attacks::*;
pub use game::*;
pub use movegen::*;
pub use moves::*;
pub use piece::*;
pub use position::*;
pub use square::*;
