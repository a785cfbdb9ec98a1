/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use crate::{Color, Piece, Square, DEFAULT_DEPTH, MAX_DEPTH};
use clap::{Parser, Subcommand};
use uci_parser::UciCommand;

/// Default filter for log output, when neither `--log` nor `RUST_LOG` is supplied.
pub const DEFAULT_LOG_FILTER: &str = "heron=info";

/// Command-line arguments for the `heron` binary.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Depth, in plies, that the computer searches before choosing a move.
    #[arg(short, long, default_value_t = DEFAULT_DEPTH, value_parser = parse_depth)]
    pub depth: usize,

    /// The side played by the computer.
    #[arg(short, long, default_value = "black")]
    pub ai_color: Color,

    /// Log filter directives, such as `heron=debug`.
    ///
    /// Overrides `RUST_LOG`. Logs are always written to stderr.
    #[arg(long)]
    pub log: Option<String>,

    /// How to talk to the engine. Defaults to the interactive prompt.
    #[command(subcommand)]
    pub mode: Option<Mode>,
}

impl Cli {
    /// Resolves the settings the engine runs with.
    #[inline(always)]
    pub fn config(&self) -> EngineConfig {
        EngineConfig {
            depth: self.depth,
            ai_color: self.ai_color,
        }
    }
}

/// Parses a search depth in `[1, MAX_DEPTH]`.
fn parse_depth(s: &str) -> Result<usize, String> {
    let depth: usize = s.parse().map_err(|e| format!("{e}"))?;
    if (1..=MAX_DEPTH).contains(&depth) {
        Ok(depth)
    } else {
        Err(format!("depth must be in [1, {MAX_DEPTH}]. Got {depth}"))
    }
}

/// Ways of running the `heron` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Mode {
    /// Read engine and UCI commands from stdin, one per line.
    Repl,

    /// Answer opponent-move JSON documents from stdin, one per line, writing replies to stdout.
    Serve,
}

/// Settings shared by every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Default search depth for the computer's moves.
    pub depth: usize,

    /// The side the computer plays.
    pub ai_color: Color,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            ai_color: Color::Black,
        }
    }
}

/// A command to be executed by the engine.
#[derive(Debug, Clone, Parser)]
#[command(
    multicall = true,
    about,
    rename_all = "lower",
    override_usage("<ENGINE COMMAND> | <UCI COMMAND>")
)]
pub enum EngineCommand {
    /// Search for, and play, a move for the side to move.
    Ai {
        /// Override the default search depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Set or display the side played by the computer.
    #[command(alias = "side")]
    AiColor { color: Option<Color> },

    /// Judge whether a piece may move between two squares, without playing it.
    ///
    /// If no piece is given, the piece currently on `from` is used.
    Check {
        from: Square,
        to: Square,
        piece: Option<Piece>,
    },

    /// Print a visual representation of the current board.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, each piece's contribution is drawn on the board.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "q")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Flip the side-to-move.
    Flip,

    /// Play a move for the side to move, like `move e2 e4`.
    #[command(alias = "mv")]
    Move { from: Square, to: Square },

    /// Show all legal moves in the current position, or all moves of the piece on `square`.
    Moves { square: Option<Square> },

    /// Place a piece on the provided square, like `place wn c3`.
    Place { piece: Piece, square: Square },

    /// Remove the piece at the provided square.
    Take { square: Square },

    /// For internal use only.
    #[command(skip)]
    Uci { cmd: UciCommand },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    ///
    /// If this fails, it will attempt to parse it as a [`UciCommand`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::try_parse_from(s.split_ascii_whitespace()) {
            Ok(cmd) => Ok(cmd),
            Err(e) => {
                // If parsing failed, attempt to parse as a UciCommand
                if let Ok(cmd) = UciCommand::new(s) {
                    Ok(Self::Uci { cmd })
                } else {
                    Err(e)
                }
            }
        }
    }
}
