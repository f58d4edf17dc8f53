/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::{
        atomic::AtomicBool,
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, error};

use crate::{
    print_perft, AiConfig, EngineCommand, Evaluator, Move, Notification, Psqt, Search,
    SearchOutcome, Selection, Session,
};

/// How long the event loop waits for a command before checking on the AI.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A console front-end for a [`Session`].
///
/// Commands arrive line by line on `stdin`. Outbound [`Notification`]s are printed as JSON,
/// standing in for the network layer that would otherwise transmit them.
#[derive(Debug)]
pub struct Engine {
    /// The game being played, along with the AI and network plumbing around it.
    session: Session,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Results of AI searches, to be handed back to the session.
    replies: Receiver<SearchOutcome>,

    /// Notifications the session wants sent to the network opponent.
    outbox: Receiver<Notification>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new(config: AiConfig) -> Self {
        let (sender, receiver) = channel();
        let (outbox_tx, outbox) = channel();
        let (replies_tx, replies) = channel();

        Self {
            session: Session::new(config, outbox_tx, replies_tx),
            sender,
            receiver,
            replies,
            outbox,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands,
    /// applying the AI's moves as they arrive.
    pub fn run(&mut self) -> Result<()> {
        println!("{}", self.name());
        println!("{}", self.session.config());

        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                debug!("Input handler thread stopping: {err}");
            }
        });

        loop {
            // Deliver any AI moves that finished in the meantime
            while let Ok(outcome) = self.replies.try_recv() {
                self.on_search_finished(outcome);
            }

            let cmd = match self.receiver.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => cmd,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if cmd == EngineCommand::Exit {
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                eprintln!("Error: {e:#}");
            }

            self.flush_outbox();
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`], printing its output.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        let game = self.session.game();

        match cmd {
            EngineCommand::Display => println!("{game}"),

            EngineCommand::Status => {
                println!("{}, {} to move", game.status(), game.side_to_move())
            }

            EngineCommand::History => {
                if game.history().is_empty() {
                    println!("(none)");
                }
                for (i, mv) in game.history().iter().enumerate() {
                    println!("{:>3}. {mv:#}", i + 1);
                }
            }

            EngineCommand::Fen => println!("{}", game.to_fen()),

            EngineCommand::Eval { pretty } => {
                let evaluator = Evaluator::new(game.board());
                if pretty {
                    println!("{evaluator}");
                } else {
                    println!("{}", evaluator.eval());
                }
            }

            EngineCommand::Moves { square } => {
                // Get the legal moves
                let moves = if let Some(square) = square {
                    game.legal_moves(square)
                        .into_iter()
                        .map(|to| to.to_string())
                        .collect::<Vec<_>>()
                } else {
                    game.all_legal_moves()
                        .into_iter()
                        .map(|mv| mv.to_string())
                        .collect()
                };

                // If there are none, print "(none)"
                if moves.is_empty() {
                    println!("(none)");
                } else {
                    println!("{}", moves.join(", "));
                }
            }

            EngineCommand::Select { square } => match self.session.on_square_selected(square) {
                Selection::Ignored => println!("ignored"),
                Selection::Cleared => println!("selection cleared"),
                Selection::Selected { square, moves } => {
                    let moves = moves.iter().map(|sq| sq.to_string()).collect::<Vec<_>>();
                    println!("selected {square}: {}", moves.join(", "));
                }
                Selection::Committed(mv) => self.print_committed(&mv),
            },

            EngineCommand::Move { from, to } => {
                let Some(mv) = self.session.commit_local_move(from, to) else {
                    bail!("{from}{to} cannot be played in {:?}", self.session.game());
                };
                self.print_committed(&mv);
            }

            EngineCommand::RemoteMove { from, to } => {
                let Some(mv) = self.session.apply_remote_move(from, to) else {
                    bail!("Remote move {from}{to} cannot be played in {:?}", self.session.game());
                };
                self.print_committed(&mv);
            }

            EngineCommand::RemoteReset => self.session.apply_remote_reset(),

            EngineCommand::Reset => self.session.reset(),

            EngineCommand::Think => {
                if !self.session.request_ai_move() {
                    let game = self.session.game();
                    bail!(
                        "The AI is not to move ({}; {} to move, {})",
                        self.session.config(),
                        game.side_to_move(),
                        game.status()
                    );
                }
            }

            EngineCommand::Go { depth } => {
                let mut config = self.session.config().search_config();
                if let Some(depth) = depth {
                    config.depth = depth;
                }

                let res = Search::new(
                    game.board(),
                    game.side_to_move(),
                    Arc::new(AtomicBool::new(true)),
                    config,
                )
                .run()?;

                match res.best_move {
                    Some(mv) => println!(
                        "bestmove {mv} score {} nodes {}",
                        res.score, res.nodes
                    ),
                    None => println!("bestmove (none)"),
                }
            }

            EngineCommand::Wait => {
                while self.session.is_thinking() {
                    match self.replies.recv_timeout(POLL_INTERVAL) {
                        Ok(outcome) => self.on_search_finished(outcome),

                        // The thread may have replied just before exiting
                        Err(RecvTimeoutError::Timeout) => {
                            let exited = self.session.search_thread_exited();
                            if let Ok(outcome) = self.replies.try_recv() {
                                self.on_search_finished(outcome);
                            } else if exited {
                                self.session.abandon_search();
                                bail!("AI search thread exited without a result");
                            }
                        }

                        Err(RecvTimeoutError::Disconnected) => {
                            bail!("AI search results channel closed")
                        }
                    }
                }
            }

            EngineCommand::Set {
                difficulty,
                mode,
                ai_color,
            } => {
                let mut config = self.session.config();
                config.difficulty = difficulty.unwrap_or(config.difficulty);
                config.mode = mode.unwrap_or(config.mode);
                config.ai_color = ai_color.unwrap_or(config.ai_color);

                self.session.set_config(config);
                println!("{config}");
            }

            EngineCommand::Seat { color } => {
                self.session.set_seat(color);
                match color {
                    Some(color) => println!("playing as {color}"),
                    None => println!("playing both sides"),
                }
            }

            EngineCommand::Psqt { piece } => {
                let table = Psqt::get_table_for(piece.kind());
                if piece.color().is_black() {
                    println!("{table:#}");
                } else {
                    println!("{table}");
                }
            }

            EngineCommand::Perft { depth } => {
                print_perft(game.board(), game.side_to_move(), depth);
            }

            EngineCommand::Exit => {}
        }

        Ok(())
    }

    /// Hands a finished search to the session, announcing the AI's move if one was played.
    fn on_search_finished(&mut self, outcome: SearchOutcome) {
        if let Some(mv) = self.session.on_search_finished(outcome) {
            println!("ai plays {mv:#}");
            let status = self.session.game().status();
            if status.is_over() {
                println!("{status}");
            }
        }
    }

    fn print_committed(&self, mv: &Move) {
        println!("{mv:#}");
        let status = self.session.game().status();
        if status.is_over() {
            println!("{status}");
        }
    }

    /// Prints every pending notification as a line of JSON.
    fn flush_outbox(&self) {
        while let Ok(notification) = self.outbox.try_recv() {
            match serde_json::to_string(&notification) {
                Ok(json) => println!("send {json}"),
                Err(e) => error!("Failed to serialize {notification:?}: {e}"),
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(AiConfig::default())
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines and comments
        if buf.is_empty() || buf.starts_with('#') {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Difficulty, GameMode, Square};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_wait_delivers_ai_move() {
        let mut engine = Engine::new(AiConfig {
            difficulty: Difficulty::Easy,
            mode: GameMode::Computer,
            ai_color: Color::Black,
        });

        engine
            .execute(EngineCommand::Move {
                from: sq("e2"),
                to: sq("e4"),
            })
            .unwrap();
        assert!(engine.session.is_thinking());

        engine.execute(EngineCommand::Wait).unwrap();
        assert!(!engine.session.is_thinking());
        assert_eq!(engine.session.game().history().len(), 2);
        assert_eq!(engine.session.game().side_to_move(), Color::White);
    }

    #[test]
    fn test_wait_without_search_returns() {
        let mut engine = Engine::default();
        engine.execute(EngineCommand::Wait).unwrap();
        assert!(engine.session.game().history().is_empty());
    }

    #[test]
    fn test_rejected_move_is_an_error() {
        let mut engine = Engine::default();
        let res = engine.execute(EngineCommand::Move {
            from: sq("e2"),
            to: sq("e5"),
        });
        assert!(res.is_err());
    }
}
