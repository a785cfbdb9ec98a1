/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use anyhow::{bail, Result};

use super::{Color, File, Move, Piece, PieceKind, Rank, Square, FEN_STARTPOS};
use crate::LegalityResult;

/// Piece placement on an `8x8` board, stored as a mailbox indexed by [`Square`].
///
/// A [`Position`] knows nothing about whose turn it is. It is a plain mapping from
/// every square to its optional occupant, supplied to the rules engine by the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    squares: [Option<Piece>; Square::COUNT],
}

impl Position {
    /// Creates a new, empty [`Position`].
    ///
    /// If you want a [`Position`] with the standard setup, use [`Position::default`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            squares: [None; Square::COUNT],
        }
    }

    /// Constructs a [`Position`] from the placement field of a
    /// [FEN](https://www.chess.com/terms/fen-chess) string.
    ///
    /// Any fields after the placements are ignored.
    ///
    /// # Example
    /// ```
    /// # use heron::{Piece, Position, Square};
    /// let position = Position::from_fen("8/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    /// assert_eq!(position.piece_at("a1".parse::<Square>().unwrap()), Some(Piece::WHITE_ROOK));
    /// assert_eq!(position.iter().count(), 2);
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut position = Self::new();

        let placements = fen.split_whitespace().next().unwrap_or_default();

        if placements.matches('/').count() != 7 {
            bail!("FEN must have piece placements for all 8 ranks. Got {placements:?}");
        }

        // Ranks are listed from 8 down to 1
        for (rank, row) in placements.split('/').rev().enumerate() {
            let rank = Rank::new_unchecked(rank as u8);
            let mut file = 0u8;

            for c in row.chars() {
                if let Some(piece) = Piece::from_fen_char(c) {
                    if file > File::MAX {
                        bail!("FEN rank {rank} describes more than 8 files. Got {row:?}");
                    }

                    position.place(piece, Square::new(File::new_unchecked(file), rank));
                    file += 1;
                } else {
                    let Some(empty) = c.to_digit(10).filter(|n| (1..=8).contains(n)) else {
                        bail!("FEN placements must contain piece chars or digits [1, 8]. Got {c:?}");
                    };
                    file += empty as u8;
                }
            }

            if file != File::COUNT as u8 {
                bail!("FEN rank {rank} must describe exactly 8 files. Got {row:?}");
            }
        }

        Ok(position)
    }

    /// Generates the placement field of a FEN string for this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use heron::Position;
    /// assert_eq!(Position::default().to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR");
    /// ```
    pub fn to_fen(&self) -> String {
        let mut placements: Vec<String> = Vec::with_capacity(Rank::COUNT);

        for rank in Rank::iter().rev() {
            let mut row = String::with_capacity(File::COUNT);
            let mut empty = 0;

            for file in File::iter() {
                if let Some(piece) = self.piece_at(Square::new(file, rank)) {
                    if empty > 0 {
                        row += &empty.to_string();
                        empty = 0;
                    }
                    row.push(piece.fen_char());
                } else {
                    empty += 1;
                }
            }

            if empty > 0 {
                row += &empty.to_string();
            }

            placements.push(row);
        }

        placements.join("/")
    }

    /// Builds a [`Position`] from `(label, code)` pairs, the shape in which a browser
    /// board reports its state.
    ///
    /// A `None` code, or a label that never appears, leaves that square empty.
    /// Any malformed label or code fails the whole construction.
    ///
    /// # Example
    /// ```
    /// # use heron::{Position, Square};
    /// let position = Position::from_codes([("d1", Some("wr")), ("d5", Some("bp")), ("e4", None)]).unwrap();
    /// assert_eq!(position.iter().count(), 2);
    ///
    /// assert!(Position::from_codes([("d9", Some("wr"))]).is_err());
    /// assert!(Position::from_codes([("d1", Some("wx"))]).is_err());
    /// ```
    pub fn from_codes<I, L, C>(codes: I) -> LegalityResult<Self>
    where
        I: IntoIterator<Item = (L, Option<C>)>,
        L: AsRef<str>,
        C: AsRef<str>,
    {
        let mut position = Self::new();

        for (label, code) in codes {
            let square = Square::from_label(label.as_ref())?;
            position.squares[square] = code.map(|c| Piece::from_code(c.as_ref())).transpose()?;
        }

        Ok(position)
    }

    /// Converts this [`Position`] into `(label, code)` pairs for every square, from `a1` to `h8`.
    pub fn to_codes(&self) -> impl Iterator<Item = (String, Option<String>)> + '_ {
        Square::iter().map(|square| (square.label(), self.piece_at(square).map(|p| p.code())))
    }

    /// Fetches the [`Piece`] at `square`, if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    /// Fetches the [`Color`] of the piece at `square`, if there is one.
    #[inline(always)]
    pub const fn color_at(&self, square: Square) -> Option<Color> {
        match self.piece_at(square) {
            Some(piece) => Some(piece.color()),
            None => None,
        }
    }

    /// Fetches the [`PieceKind`] of the piece at `square`, if there is one.
    #[inline(always)]
    pub const fn kind_at(&self, square: Square) -> Option<PieceKind> {
        match self.piece_at(square) {
            Some(piece) => Some(piece.kind()),
            None => None,
        }
    }

    /// Returns `true` if there is a piece at `square`.
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    /// Places `piece` on `square`, returning whatever stood there before.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) -> Option<Piece> {
        self.squares[square].replace(piece)
    }

    /// Removes and returns the piece at `square`, if there is one.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares[square].take()
    }

    /// Removes every piece from the board.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.squares = [None; Square::COUNT];
    }

    /// Relocates whatever stands on `mv.from()` to `mv.to()`, returning the captured piece.
    ///
    /// No legality checks are performed. Moving from an empty square clears the destination.
    ///
    /// # Example
    /// ```
    /// # use heron::{Move, Piece, Position};
    /// let mut position = Position::default();
    /// let captured = position.make_move(Move::from_uci("e2e4").unwrap());
    /// assert_eq!(captured, None);
    /// assert_eq!(position.piece_at("e4".parse().unwrap()), Some(Piece::WHITE_PAWN));
    /// assert!(!position.has("e2".parse().unwrap()));
    /// ```
    pub fn make_move(&mut self, mv: Move) -> Option<Piece> {
        let moving = self.squares[mv.from()].take();
        std::mem::replace(&mut self.squares[mv.to()], moving)
    }

    /// Copies `self` and makes the provided move on the copy, returning the copy.
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// Fetches the square of `color`'s King, if one is on the board.
    ///
    /// If several are present, the lowest square is returned.
    pub fn king(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::iter().find(|&square| self.piece_at(square) == Some(king))
    }

    /// Iterates over every occupied square and its occupant, from `a1` to `h8`.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Iterates over every occupied square holding a piece of `color`.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter(move |(_, piece)| piece.color() == color)
    }
}

impl Default for Position {
    /// The standard chess setup.
    #[inline(always)]
    fn default() -> Self {
        // The standard setup is a compile-time constant string, so this cannot fail.
        Self::from_fen(FEN_STARTPOS).unwrap_or_else(|_| Self::new())
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    /// Wrapper for [`Position::from_fen`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Index<Square> for Position {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.squares[index]
    }
}

impl IndexMut<Square> for Position {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.squares[index]
    }
}

impl fmt::Display for Position {
    /// Renders the board with White at the bottom, one piece code (or `.`) per square.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;

            for file in File::iter() {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => write!(f, " {piece}")?,
                    None => write!(f, " ..")?,
                }
            }

            writeln!(f)?;
        }

        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "---")?;
        }
        writeln!(f)?;

        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, " {file} ")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}
