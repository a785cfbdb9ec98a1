/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{channel, Receiver, Sender},
        Arc,
    },
    thread::{self, JoinHandle},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, error, info, warn};
use uci_parser::{UciCommand, UciParseError, UciResponse};

use crate::{
    rules, Color, EngineCommand, EngineConfig, Evaluator, Game, MoveOutcome, Piece, Search,
    SearchConfig, SearchResult, Square,
};

/// The heron engine: a game against the computer, driven by text commands.
#[derive(Debug)]
pub struct Engine {
    /// The current game, as known to the engine.
    ///
    /// This is modified whenever moves are played or new positions are given,
    /// and is reset whenever the engine is told to start a new game.
    game: Game,

    /// Settings supplied on the command line.
    config: EngineConfig,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,

    /// Atomic flag to determine whether a search is currently running
    is_searching: Arc<AtomicBool>,

    /// Handle to the currently-running UCI search thread, if one exists.
    search_thread: Option<JoinHandle<SearchResult>>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new(config: EngineConfig) -> Self {
        let (sender, receiver) = channel();

        Self {
            game: Self::fresh_game(config),
            config,
            sender,
            receiver,
            is_searching: Arc::default(),
            search_thread: None,
        }
    }

    /// Returns a string of the engine's name and current version.
    pub fn name(&self) -> String {
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }

    /// Returns a string of all authors of this engine.
    pub fn authors(&self) -> String {
        // Split multiple authors by comma-space
        env!("CARGO_PKG_AUTHORS").replace(':', ", ")
    }

    /// The game the engine is currently playing.
    #[inline(always)]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) -> Result<()> {
        self.sender
            .send(command)
            .context("Failed to send command to engine")
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                debug!("input handler thread stopping: {err:#}");
            }
        });

        info!("{} ready; computer plays {}", self.name(), self.config.ai_color.name());

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            if matches!(cmd, EngineCommand::Exit) {
                self.stop_search();
                break;
            }

            // Keep running, even on error
            if let Err(e) = self.execute(cmd) {
                error!("{e:#}");
            }
        }

        Ok(())
    }

    /// Executes a single [`EngineCommand`], printing any output to stdout.
    ///
    /// `Exit` is handled by [`Engine::run`] and is a no-op here.
    pub fn execute(&mut self, cmd: EngineCommand) -> Result<()> {
        match cmd {
            EngineCommand::Ai { depth } => self.ai(depth.unwrap_or(self.config.depth))?,

            EngineCommand::AiColor { color } => {
                if let Some(color) = color {
                    self.game.set_ai_color(color);
                }
                println!("computer plays {}", self.game.ai_color().name());
            }

            EngineCommand::Check { from, to, piece } => self.check(from, to, piece)?,

            EngineCommand::Display => self.display(),

            EngineCommand::Eval { pretty } => self.eval(pretty),

            EngineCommand::Exit => {}

            EngineCommand::Fen => println!("{}", self.game.to_fen()),

            EngineCommand::Flip => self.game.toggle_side_to_move(),

            EngineCommand::Move { from, to } => self.make_move(from, to)?,

            EngineCommand::Moves { square } => {
                let position = self.game.position();
                let moves = if let Some(square) = square {
                    rules::legal_moves_from(position, square)
                } else {
                    rules::legal_moves(position, self.game.side_to_move())
                };

                // If there are none, print "(none)"
                let moves_string = if moves.is_empty() {
                    String::from("(none)")
                } else {
                    // Otherwise, join them by comma-space
                    moves
                        .into_iter()
                        .map(|mv| mv.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                println!("{moves_string}");
            }

            EngineCommand::Place { piece, square } => {
                self.game.place(piece, square);
            }

            EngineCommand::Take { square } => {
                if self.game.take(square).is_none() {
                    warn!("no piece to take on {square}");
                }
            }

            EngineCommand::Uci { cmd } => self.handle_uci_command(cmd)?,
        };

        Ok(())
    }

    /// Handle the execution of a single [`UciCommand`].
    fn handle_uci_command(&mut self, uci: UciCommand) -> Result<()> {
        use UciCommand::*;
        match uci {
            Uci => self.uci(),

            IsReady => println!("{}", UciResponse::<&str>::ReadyOk),

            UciNewGame => self.new_game(),

            Position { fen, moves } => self.position(fen, moves)?,

            Go(options) => {
                self.search_thread =
                    self.start_search(SearchConfig::new(options, self.config.depth));
            }

            Stop => self.set_is_searching(false),

            Quit => self.send_command(EngineCommand::Exit)?,

            _ => bail!(
                "{} does not support UCI command {uci:?}",
                env!("CARGO_PKG_NAME")
            ),
        }

        Ok(())
    }

    /// Executes the `check` command, printing the rules engine's verdict on a move.
    fn check(&self, from: Square, to: Square, piece: Option<Piece>) -> Result<()> {
        let position = self.game.position();
        let piece = match piece.or(position.piece_at(from)) {
            Some(piece) => piece,
            None => bail!("No piece found at {from}; supply one like `check {from} {to} wp`"),
        };

        let verdict = rules::evaluate(position, from, to, piece);
        println!(
            "{} {from} -> {to}: {}",
            piece.name(),
            if verdict { "legal" } else { "illegal" }
        );

        Ok(())
    }

    /// Executes the `move` command, then lets the computer reply if it is its turn.
    fn make_move(&mut self, from: Square, to: Square) -> Result<()> {
        match self.game.try_move(from, to)? {
            MoveOutcome::Played(played) => {
                println!("{}", played.mv);
                self.report_checks();

                if self.game.is_ai_turn() {
                    self.ai(self.config.depth)?;
                }
            }
            MoveOutcome::Rejected(reason) => println!("illegal move: {reason}"),
        }

        Ok(())
    }

    /// Executes the `ai` command, playing the computer's choice for the side to move.
    fn ai(&mut self, depth: usize) -> Result<()> {
        match self.game.play_best_move(depth)? {
            Some(played) => {
                println!("{} plays {}", played.piece.name(), played.mv);
                self.report_checks();
            }
            None => println!("{} has no moves", self.game.side_to_move().name()),
        }

        Ok(())
    }

    /// Prints a line for each side whose King can currently be captured.
    fn report_checks(&self) {
        for color in Color::all() {
            if self.game.is_in_check(color) {
                println!("{} is in check", color.name());
            }
        }
    }

    /// Executes the `display` command, printing the current game.
    fn display(&self) {
        println!("{}", self.game);
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(self.game.position());
        if pretty {
            println!("{evaluator}");
        } else {
            println!("{}", evaluator.eval_for(self.game.side_to_move()));
        }
    }

    /// Set the position to the supplied FEN string (defaults to the standard startpos if not supplied),
    /// and then apply `moves` one-by-one to the position.
    fn position<T: AsRef<str>>(
        &mut self,
        fen: Option<T>,
        moves: impl IntoIterator<Item = T>,
    ) -> Result<()> {
        let mut game = if let Some(fen) = fen {
            Game::from_fen(fen.as_ref())?
        } else {
            Game::new()
        };
        game.set_ai_color(self.game.ai_color());
        game.play_moves(moves)?;

        self.game = game;
        Ok(())
    }

    /// Resets the engine's internal game state, cancelling any ongoing search.
    fn new_game(&mut self) {
        self.set_is_searching(false);
        self.game = Self::fresh_game(self.config);
    }

    /// A new game with the computer playing the configured side.
    fn fresh_game(config: EngineConfig) -> Game {
        let mut game = Game::new();
        game.set_ai_color(config.ai_color);
        game
    }

    /// Sets the search flag to signal that the engine is starting/stopping a search.
    fn set_is_searching(&mut self, status: bool) {
        self.is_searching.store(status, Ordering::Relaxed);
    }

    /// Returns `true` if the engine is currently executing a search.
    fn is_searching(&self) -> bool {
        self.is_searching.load(Ordering::Relaxed)
    }

    /// Starts a search on the current position, given the parameters in `config`.
    ///
    /// The `bestmove` response is printed once the search concludes.
    fn start_search(&mut self, config: SearchConfig) -> Option<JoinHandle<SearchResult>> {
        // Cannot start a search if one is already running
        if self.is_searching() {
            warn!("A search is already running");
            return None;
        }
        self.set_is_searching(true);

        // Copy the parameters that will be sent into the thread
        let position = *self.game.position();
        let side = self.game.side_to_move();
        let is_searching = Arc::clone(&self.is_searching);

        let handle = thread::spawn(move || {
            let res = Search::new(&position, side, is_searching, config).start();

            let response = UciResponse::BestMove {
                bestmove: res.bestmove,
                ponder: None,
            };
            println!("{response}");

            res
        });

        Some(handle)
    }

    /// Cancels and awaits the current search thread, returning its result.
    fn stop_search(&mut self) -> Option<SearchResult> {
        let handle = self.search_thread.take()?;
        self.set_is_searching(false);

        // Attempt to join the thread handle to retrieve the result
        let id = handle.thread().id();
        let Ok(res) = handle.join() else {
            error!("Failed to join on thread {id:?}");
            return None;
        };

        Some(res)
    }

    /// Called when the engine receives the `uci` command.
    ///
    /// Prints engine's ID, version, and authors.
    fn uci(&self) {
        println!("id name {}\nid author {}\n", self.name(), self.authors());
        println!("{}", UciResponse::<&str>::UciOk)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
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
            .context("Failed to read line from stdin")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        // UCI commands are tried first, so `position` and `go` mean what a GUI expects
        match UciCommand::new(buf) {
            Ok(cmd) => sender
                .send(EngineCommand::Uci { cmd })
                .context("Failed to send UCI command to engine")?,

            // If it's not a UCI command, check if it's an engine-specific command
            Err(UciParseError::UnrecognizedCommand { cmd: _ }) => {
                match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
                    Ok(cmd) => sender
                        .send(cmd)
                        .context("Failed to send command to engine")?,

                    // If it wasn't a custom command, either, print an error.
                    Err(err) => eprintln!("{err}"),
                }
            }

            // If it was a UCI command, print a usage message.
            Err(uci_err) => eprintln!("{uci_err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(label: &str) -> Square {
        label.parse().unwrap()
    }

    #[test]
    fn test_move_triggers_reply() {
        let mut engine = Engine::new(EngineConfig {
            depth: 1,
            ai_color: Color::Black,
        });

        engine.execute("move e2 e4".parse().unwrap()).unwrap();
        assert_eq!(engine.game().side_to_move(), Color::White);
        assert_eq!(
            engine.game().position().iter().count(),
            32,
            "nothing can be captured on the first move"
        );
    }

    #[test]
    fn test_illegal_move_is_not_fatal() {
        let mut engine = Engine::default();
        engine.execute("move e2 e5".parse().unwrap()).unwrap();
        assert_eq!(*engine.game(), Game::new());

        assert!(engine.execute("move e4 e5".parse().unwrap()).is_err());
    }

    #[test]
    fn test_editing_commands() {
        let mut engine = Engine::default();
        engine.execute("take d1".parse().unwrap()).unwrap();
        engine.execute("place bq d1".parse().unwrap()).unwrap();
        engine.execute("flip".parse().unwrap()).unwrap();

        assert_eq!(engine.game().position().piece_at(sq("d1")), Some(Piece::BLACK_QUEEN));
        assert_eq!(engine.game().side_to_move(), Color::Black);
        assert!(engine.execute("check d5 d6".parse().unwrap()).is_err());
    }

    #[test]
    fn test_uci_position() {
        let mut engine = Engine::default();
        engine
            .execute("position startpos moves e2e4 e7e5".parse().unwrap())
            .unwrap();
        assert_eq!(
            engine.game().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w - - 0 2"
        );

        assert!(engine
            .execute("position startpos moves e2e5".parse().unwrap())
            .is_err());

        engine.execute("ucinewgame".parse().unwrap()).unwrap();
        assert_eq!(*engine.game(), Game::new());
    }

    #[test]
    fn test_ai_color_command() {
        let mut engine = Engine::default();
        engine.execute("aicolor w".parse().unwrap()).unwrap();
        assert!(engine.game().is_ai_turn());

        engine.execute("ai --depth 1".parse().unwrap()).unwrap();
        assert_eq!(engine.game().side_to_move(), Color::Black);
    }
}
