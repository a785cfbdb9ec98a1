/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Squares, pieces, moves, and the mailbox board they live on.
mod board;

/// Command-line arguments and the commands understood by the engine.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Errors produced when a move cannot be judged.
mod error;

/// Evaluation of chess positions.
mod eval;

/// A game between a human and the computer.
mod game;

/// The JSON document exchanged with a browser board.
pub mod protocol;

/// Movement rules of every piece, and the moves they permit.
pub mod rules;

/// Numerical scores of positions.
mod score;

/// Choosing a move for the computer.
mod search;

pub use board::*;
pub use cli::*;
pub use engine::*;
pub use error::*;
pub use eval::*;
pub use game::*;
pub use score::*;
pub use search::*;
