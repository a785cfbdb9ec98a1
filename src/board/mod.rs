/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// A relocation of a piece from one square to another.
mod moves;

/// Piece colors, kinds, and their two-character codes.
mod piece;

/// Mailbox representation of piece placement.
mod position;

/// Squares, files, ranks, and the label/coordinate conversions between them.
mod square;

/// Board-related constants.
mod utils;

pub use moves::*;
pub use piece::*;
pub use position::*;
pub use square::*;
pub use utils::*;
