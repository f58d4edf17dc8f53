/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// The rules of the game: board, moves, legality, and game state.
mod board;

/// Command-line and console command parsing.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Piece-Square tables.
mod psqt;

/// Centipawn scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// The controller that UI and network collaborators talk to.
mod session;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use session::*;
