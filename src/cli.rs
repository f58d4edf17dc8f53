/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::Parser;

use crate::{AiConfig, Color, Difficulty, GameMode, Piece, Square};

/// Command-line options, read once at startup.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// How deep the AI searches.
    #[arg(short, long, value_enum, default_value_t = Difficulty::Medium)]
    pub difficulty: Difficulty,

    /// Play against another human, or against the AI.
    #[arg(short, long, value_enum, default_value_t = GameMode::Human)]
    pub mode: GameMode,

    /// The side the AI plays in computer mode.
    #[arg(short, long, default_value_t = Color::Black)]
    pub ai_color: Color,

    /// Log filter used when `RUST_LOG` is not set, such as `info` or `rookie=debug`.
    #[arg(long, default_value = "warn")]
    pub log: String,
}

impl Cli {
    /// The AI settings selected on the command line.
    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            difficulty: self.difficulty,
            mode: self.mode,
            ai_color: self.ai_color,
        }
    }
}

/// A command to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(multicall = true, about, rename_all = "lower")]
pub enum EngineCommand {
    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print the state of the game and whose turn it is.
    Status,

    /// Print every move played so far.
    History,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves { square: Option<Square> },

    /// Click on a square: select a piece, move the selected piece, or clear the selection.
    Select { square: Square },

    /// Play a move for the side to move.
    Move { from: Square, to: Square },

    /// Apply a move as if it had arrived from the network opponent.
    #[command(name = "remote-move")]
    RemoteMove { from: Square, to: Square },

    /// Reset the game as if the network opponent had asked for it.
    #[command(name = "remote-reset")]
    RemoteReset,

    /// Start a new game.
    Reset,

    /// Ask the AI to move now, if it is its turn.
    Think,

    /// Search the current position and print the best move, without playing it.
    Go {
        /// Override the depth of the current difficulty.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Await the AI's move, blocking until it arrives.
    ///
    /// This is primarily used when piping commands in,
    /// to await the AI's reply before doing something else.
    Wait,

    /// Change the AI settings. Settings that are not supplied are left as they are.
    Set {
        #[arg(short, long, value_enum)]
        difficulty: Option<Difficulty>,

        #[arg(short, long, value_enum)]
        mode: Option<GameMode>,

        #[arg(short, long)]
        ai_color: Option<Color>,
    },

    /// Claim a color for a networked game. Without a color, either side may be moved.
    Seat { color: Option<Color> },

    /// Print the Piece-Square table for the provided piece, as that piece sees it.
    #[command(aliases = ["psq", "pst"])]
    Psqt { piece: Piece },

    /// Performs a split perft on the current position at the supplied depth.
    Perft { depth: usize },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let e2: Square = "e2".parse().unwrap();
        let e4: Square = "e4".parse().unwrap();

        assert_eq!("d".parse::<EngineCommand>().unwrap(), EngineCommand::Display);
        assert_eq!(
            "move e2 e4".parse::<EngineCommand>().unwrap(),
            EngineCommand::Move { from: e2, to: e4 }
        );
        assert_eq!(
            "remote-move e2 e4".parse::<EngineCommand>().unwrap(),
            EngineCommand::RemoteMove { from: e2, to: e4 }
        );
        assert_eq!(
            "go --depth 2".parse::<EngineCommand>().unwrap(),
            EngineCommand::Go { depth: Some(2) }
        );
        assert_eq!(
            "set --mode computer --ai-color white".parse::<EngineCommand>().unwrap(),
            EngineCommand::Set {
                difficulty: None,
                mode: Some(GameMode::Computer),
                ai_color: Some(Color::White)
            }
        );
        assert_eq!(
            "psqt N".parse::<EngineCommand>().unwrap(),
            EngineCommand::Psqt {
                piece: Piece::WHITE_KNIGHT
            }
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("move e2".parse::<EngineCommand>().is_err());
        assert!("move e2 e9".parse::<EngineCommand>().is_err());
        assert!("castle".parse::<EngineCommand>().is_err());
        assert!("set --difficulty impossible".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_startup_defaults() {
        let cli = Cli::try_parse_from(["rookie"]).unwrap();
        assert_eq!(cli.ai_config(), AiConfig::default());
        assert_eq!(cli.log, "warn");

        let cli = Cli::try_parse_from(["rookie", "-d", "expert", "-m", "computer", "-a", "white"])
            .unwrap();
        assert_eq!(cli.difficulty, Difficulty::Expert);
        assert_eq!(cli.ai_config().ai_color, Color::White);
    }
}
