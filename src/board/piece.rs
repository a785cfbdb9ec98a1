/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, ops::Neg, str::FromStr};

use anyhow::bail;

use crate::{LegalityError, LegalityResult};

/// Represents the color of a player or piece.
///
/// White moves first, and therefore [`Color`] defaults to [`Color::White`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Number of color variants.
    pub const COUNT: usize = 2;

    /// An array of both colors, starting with White.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::White, Self::Black]
    }

    /// Returns the direction a pawn of this color advances in: `+1` rank for White, `-1` for Black.
    ///
    /// # Example
    /// ```
    /// # use heron::Color;
    /// assert_eq!(Color::White.forward(), 1);
    /// assert_eq!(Color::Black.forward(), -1);
    /// ```
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// Returns this [`Color`]'s opposite.
    ///
    /// # Example
    /// ```
    /// # use heron::Color;
    /// assert_eq!(Color::White.opponent(), Color::Black);
    /// assert_eq!(Color::Black.opponent(), Color::White);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }

    /// Returns this [`Color`] as a `usize`; `0` for White, `1` for Black.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Parses the color letter of a piece code: `'w'` or `'b'`.
    ///
    /// # Example
    /// ```
    /// # use heron::Color;
    /// assert_eq!(Color::from_char('b'), Some(Color::Black));
    /// assert_eq!(Color::from_char('x'), None);
    /// ```
    #[inline(always)]
    pub const fn from_char(color: char) -> Option<Self> {
        match color {
            'w' => Some(Self::White),
            'b' => Some(Self::Black),
            _ => None,
        }
    }

    /// Converts this [`Color`] to the letter used in piece codes.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    /// Fetches a human-readable name for this [`Color`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl Neg for Color {
    type Output = Self;
    /// Negating [`Color::White`] yields [`Color::Black`] and vice versa.
    #[inline(always)]
    fn neg(self) -> Self::Output {
        self.opponent()
    }
}

impl FromStr for Color {
    type Err = anyhow::Error;
    /// Accepts either the single letter (`w`, `b`) or the full name, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Self::White),
            "b" | "black" => Ok(Self::Black),
            _ => bail!("Color must be one of [w, b, white, black]. Got {s:?}"),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents the kind (or "role") that a chess piece can be.
///
/// These have no [`Color`] associated with them. See [`Piece`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Number of piece variants.
    pub const COUNT: usize = 6;

    /// An array of all 6 [`PieceKind`]s.
    ///
    /// In the order: `Pawn`, `Knight`, `Bishop`, `Rook`, `Queen`, `King`.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        use PieceKind::*;
        [Pawn, Knight, Bishop, Rook, Queen, King]
    }

    /// Parses the kind letter of a piece code. Only lowercase letters are accepted.
    ///
    /// # Example
    /// ```
    /// # use heron::PieceKind;
    /// assert_eq!(PieceKind::from_char('n'), Some(PieceKind::Knight));
    /// assert_eq!(PieceKind::from_char('x'), None);
    /// ```
    #[inline(always)]
    pub const fn from_char(kind: char) -> Option<Self> {
        match kind {
            'p' => Some(Self::Pawn),
            'n' => Some(Self::Knight),
            'b' => Some(Self::Bishop),
            'r' => Some(Self::Rook),
            'q' => Some(Self::Queen),
            'k' => Some(Self::King),
            _ => None,
        }
    }

    /// Converts this [`PieceKind`] to the (lowercase) letter used in piece codes.
    #[inline(always)]
    pub const fn char(&self) -> char {
        match self {
            Self::Pawn => 'p',
            Self::Knight => 'n',
            Self::Bishop => 'b',
            Self::Rook => 'r',
            Self::Queen => 'q',
            Self::King => 'k',
        }
    }

    /// Fetches a human-readable name for this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Rook => "rook",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents a chess piece: a [`Color`] and a [`PieceKind`].
///
/// Externally a piece is a two-character code, the color letter followed by the kind letter:
/// `"wp"` is a White pawn, `"bk"` is the Black king.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece {
    color: Color,
    kind: PieceKind,
}

impl Piece {
    pub const WHITE_PAWN: Self = Self::new(Color::White, PieceKind::Pawn);
    pub const WHITE_KNIGHT: Self = Self::new(Color::White, PieceKind::Knight);
    pub const WHITE_BISHOP: Self = Self::new(Color::White, PieceKind::Bishop);
    pub const WHITE_ROOK: Self = Self::new(Color::White, PieceKind::Rook);
    pub const WHITE_QUEEN: Self = Self::new(Color::White, PieceKind::Queen);
    pub const WHITE_KING: Self = Self::new(Color::White, PieceKind::King);

    pub const BLACK_PAWN: Self = Self::new(Color::Black, PieceKind::Pawn);
    pub const BLACK_KNIGHT: Self = Self::new(Color::Black, PieceKind::Knight);
    pub const BLACK_BISHOP: Self = Self::new(Color::Black, PieceKind::Bishop);
    pub const BLACK_ROOK: Self = Self::new(Color::Black, PieceKind::Rook);
    pub const BLACK_QUEEN: Self = Self::new(Color::Black, PieceKind::Queen);
    pub const BLACK_KING: Self = Self::new(Color::Black, PieceKind::King);

    /// Creates a new [`Piece`] from the given [`Color`] and [`PieceKind`].
    #[inline(always)]
    pub const fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// Fetches the [`Color`] of this [`Piece`].
    #[inline(always)]
    pub const fn color(&self) -> Color {
        self.color
    }

    /// Fetches the [`PieceKind`] of this [`Piece`].
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Fetches the [`Color`] and [`PieceKind`] of this [`Piece`].
    #[inline(always)]
    pub const fn parts(&self) -> (Color, PieceKind) {
        (self.color, self.kind)
    }

    /// Returns `true` if this [`Piece`] is a King.
    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Parses a two-character piece code such as `"wn"`.
    ///
    /// A code of the wrong length or with an unknown color letter yields
    /// [`LegalityError::InvalidPieceCode`]; an unknown kind letter yields
    /// [`LegalityError::UnknownPieceKind`].
    ///
    /// # Example
    /// ```
    /// # use heron::{Color, LegalityError, Piece, PieceKind};
    /// let knight = Piece::from_code("wn").unwrap();
    /// assert_eq!(knight.parts(), (Color::White, PieceKind::Knight));
    ///
    /// assert!(matches!(Piece::from_code("wx"), Err(LegalityError::UnknownPieceKind { .. })));
    /// assert!(matches!(Piece::from_code("xn"), Err(LegalityError::InvalidPieceCode { .. })));
    /// ```
    pub fn from_code(code: &str) -> LegalityResult<Self> {
        let mut chars = code.chars();
        let (Some(color), Some(kind), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(LegalityError::invalid_code(code));
        };

        let color = Color::from_char(color).ok_or_else(|| LegalityError::invalid_code(code))?;
        let kind = PieceKind::from_char(kind).ok_or_else(|| LegalityError::unknown_kind(code))?;

        Ok(Self::new(color, kind))
    }

    /// Converts this [`Piece`] into its two-character code.
    ///
    /// # Example
    /// ```
    /// # use heron::Piece;
    /// assert_eq!(Piece::BLACK_KING.code(), "bk");
    /// ```
    #[inline(always)]
    pub fn code(&self) -> String {
        format!("{}{}", self.color.char(), self.kind.char())
    }

    /// Creates a [`Piece`] from a [FEN](https://www.chess.com/terms/fen-chess) placement character,
    /// where uppercase is White and lowercase is Black.
    #[inline(always)]
    pub fn from_fen_char(piece: char) -> Option<Self> {
        let kind = PieceKind::from_char(piece.to_ascii_lowercase())?;
        let color = if piece.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        Some(Self::new(color, kind))
    }

    /// Converts this [`Piece`] into a FEN placement character.
    #[inline(always)]
    pub const fn fen_char(&self) -> char {
        match self.color {
            Color::White => self.kind.char().to_ascii_uppercase(),
            Color::Black => self.kind.char(),
        }
    }

    /// Fetches a human-readable name for this [`Piece`].
    ///
    /// # Example
    /// ```
    /// # use heron::Piece;
    /// assert_eq!(Piece::WHITE_QUEEN.name(), "white queen");
    /// ```
    #[inline(always)]
    pub fn name(&self) -> String {
        format!("{} {}", self.color.name(), self.kind.name())
    }
}

impl FromStr for Piece {
    type Err = LegalityError;
    /// Wrapper for [`Piece::from_code`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for Piece {
    /// A piece displays as its two-character code.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.char(), self.kind.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({self})", self.name())
    }
}
