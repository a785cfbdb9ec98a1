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

use crate::{Color, LegalityError, LegalityResult};

/// Represents a single square on an `8x8` chess board.
///
/// Internally encoded as `file + rank * 8`, with both parts zero-based:
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
///
/// Externally, a square is either a two-character label (`"e4"`) or a pair of
/// one-based coordinates (`(5, 4)`). See [`Square::from_label`] and [`Square::coords`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

impl Square {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 63;
    pub const COUNT: usize = 64;

    const FILE_MASK: u8 = 0b0000_0111;

    /// Returns an iterator over all squares, from `a1` to `h8`.
    ///
    /// # Example
    /// ```
    /// # use heron::Square;
    /// let mut iter = Square::iter();
    /// assert_eq!(iter.len(), 64);
    /// assert_eq!(iter.next().unwrap().to_string(), "a1");
    /// assert_eq!(iter.last().unwrap().to_string(), "h8");
    /// ```
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }

    /// Creates a new [`Square`] from the provided [`File`] and [`Rank`].
    #[inline(always)]
    pub const fn new(file: File, rank: Rank) -> Self {
        Self(file.0 | rank.0 << 3)
    }

    /// Creates a [`Square`] from one-based `(file, rank)` coordinates, where `(1, 1)` is `a1`.
    ///
    /// Returns `None` if either coordinate lies outside `[1, 8]`.
    ///
    /// # Example
    /// ```
    /// # use heron::Square;
    /// assert_eq!(Square::from_coords(5, 4).unwrap().to_string(), "e4");
    /// assert!(Square::from_coords(0, 4).is_none());
    /// assert!(Square::from_coords(5, 9).is_none());
    /// ```
    #[inline(always)]
    pub const fn from_coords(file: i8, rank: i8) -> Option<Self> {
        if file < 1 || file > 8 || rank < 1 || rank > 8 {
            return None;
        }

        Some(Self::new(
            File::new_unchecked(file as u8 - 1),
            Rank::new_unchecked(rank as u8 - 1),
        ))
    }

    /// Parses a two-character label such as `"e4"` into a [`Square`].
    ///
    /// Only lowercase files are accepted. Anything else (wrong length, a file outside `a..=h`,
    /// a rank outside `1..=8`) is rejected with [`LegalityError::InvalidSquare`].
    ///
    /// # Example
    /// ```
    /// # use heron::Square;
    /// let c4 = Square::from_label("c4").unwrap();
    /// assert_eq!(c4.coords(), (3, 4));
    ///
    /// assert!(Square::from_label("z0").is_err());
    /// assert!(Square::from_label("a9").is_err());
    /// assert!(Square::from_label("e44").is_err());
    /// ```
    pub fn from_label(label: &str) -> LegalityResult<Self> {
        let mut chars = label.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(LegalityError::invalid_square(label));
        };

        let file = File::from_char(file).ok_or_else(|| LegalityError::invalid_square(label))?;
        let rank = Rank::from_char(rank).ok_or_else(|| LegalityError::invalid_square(label))?;

        Ok(Self::new(file, rank))
    }

    /// Converts this [`Square`] into its two-character label.
    #[inline(always)]
    pub fn label(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    /// Fetches the one-based `(file, rank)` coordinates of this [`Square`].
    ///
    /// # Example
    /// ```
    /// # use heron::Square;
    /// assert_eq!(Square::from_label("a1").unwrap().coords(), (1, 1));
    /// assert_eq!(Square::from_label("h8").unwrap().coords(), (8, 8));
    /// ```
    #[inline(always)]
    pub const fn coords(&self) -> (i8, i8) {
        (self.file().0 as i8 + 1, self.rank().0 as i8 + 1)
    }

    /// Signed `(file, rank)` displacement needed to travel from `self` to `to`.
    ///
    /// # Example
    /// ```
    /// # use heron::Square;
    /// let b1 = Square::from_label("b1").unwrap();
    /// let c3 = Square::from_label("c3").unwrap();
    /// assert_eq!(b1.delta_to(c3), (1, 2));
    /// assert_eq!(c3.delta_to(b1), (-1, -2));
    /// ```
    #[inline(always)]
    pub const fn delta_to(&self, to: Self) -> (i8, i8) {
        (
            to.file().0 as i8 - self.file().0 as i8,
            to.rank().0 as i8 - self.rank().0 as i8,
        )
    }

    /// Fetches the [`File`] of this [`Square`].
    #[inline(always)]
    pub const fn file(&self) -> File {
        File(self.0 & Self::FILE_MASK)
    }

    /// Fetches the [`Rank`] of this [`Square`].
    #[inline(always)]
    pub const fn rank(&self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Fetches the inner index value of the [`Square`], casted to a [`usize`].
    ///
    /// Useful when using a [`Square`] to index into things.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Attempt to offset this [`Square`] by the file and rank offsets.
    ///
    /// If `self + offset` would leave the board, then `None` is returned.
    ///
    /// # Example
    /// ```
    /// # use heron::Square;
    /// let c4 = Square::from_label("c4").unwrap();
    /// assert_eq!(c4.offset(1, 1).unwrap().to_string(), "d5");
    /// assert_eq!(c4.offset(-1, -1).unwrap().to_string(), "b3");
    /// assert_eq!(Square::from_label("a1").unwrap().offset(-1, -1), None);
    /// ```
    #[inline(always)]
    pub const fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let Some(file) = self.file().offset(file_delta) else {
            return None;
        };

        let Some(rank) = self.rank().offset(rank_delta) else {
            return None;
        };

        Some(Self::new(file, rank))
    }
}

impl FromStr for Square {
    type Err = LegalityError;
    /// Wrapper for [`Square::from_label`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl TryFrom<&str> for Square {
    type Error = LegalityError;
    /// Wrapper for [`Square::from_label`].
    #[inline(always)]
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_label(value)
    }
}

impl<T> Index<Square> for [T; Square::COUNT] {
    type Output = T;
    /// A [`Square`] can be used to index into an array of 64 elements.
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self[index.index()]
    }
}

impl<T> IndexMut<Square> for [T; Square::COUNT] {
    /// A [`Square`] can be used to mutably index into an array of 64 elements.
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self[index.index()]
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    /// Displays the label and also the internal decimal value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}

/// Represents one of eight ranks on a chess board.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Rank(pub(crate) u8);

impl Rank {
    pub const ONE: Self = Self(0);
    pub const TWO: Self = Self(1);
    pub const THREE: Self = Self(2);
    pub const FOUR: Self = Self(3);
    pub const FIVE: Self = Self(4);
    pub const SIX: Self = Self(5);
    pub const SEVEN: Self = Self(6);
    pub const EIGHT: Self = Self(7);

    pub const MAX: u8 = 7;
    pub const COUNT: usize = 8;

    /// Returns an iterator over all ranks, in ascending order.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }

    /// Construct a new [`Rank`] from the provided value, ignoring safety checks.
    ///
    /// Do not use this unless you have previously guaranteed that the input value is within bounds.
    #[inline(always)]
    pub const fn new_unchecked(rank: u8) -> Self {
        Self(rank)
    }

    /// Back rank relative to `color`.
    #[inline(always)]
    pub const fn first(color: Color) -> Self {
        [Self::ONE, Self::EIGHT][color.index()]
    }

    /// Rank on which `color`'s pawns start, and the only rank they may advance two squares from.
    #[inline(always)]
    pub const fn second(color: Color) -> Self {
        [Self::TWO, Self::SEVEN][color.index()]
    }

    /// Parses a rank digit in `'1'..='8'`.
    #[inline(always)]
    pub fn from_char(rank: char) -> Option<Self> {
        let rank = rank.to_digit(10)?.checked_sub(1)?;
        (rank <= Self::MAX as u32).then_some(Self(rank as u8))
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'1') as char
    }

    /// Attempt to offset this [`Rank`] by the provided `delta`.
    ///
    /// If `self + delta` would exceed the bounds of this [`Rank`], then `None` is returned.
    #[inline(always)]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        if let Some(bits) = self.0.checked_add_signed(delta) {
            return if bits <= Self::MAX {
                Some(Self::new_unchecked(bits))
            } else {
                None
            };
        }

        None
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}

/// Represents one of eight files on a chess board.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct File(pub(crate) u8);

impl File {
    pub const A: Self = Self(0);
    pub const B: Self = Self(1);
    pub const C: Self = Self(2);
    pub const D: Self = Self(3);
    pub const E: Self = Self(4);
    pub const F: Self = Self(5);
    pub const G: Self = Self(6);
    pub const H: Self = Self(7);

    pub const MAX: u8 = 7;
    pub const COUNT: usize = 8;

    /// Returns an iterator over all files, in ascending order.
    #[inline(always)]
    pub fn iter() -> impl ExactSizeIterator<Item = Self> + DoubleEndedIterator<Item = Self> {
        (0..=Self::MAX).map(Self)
    }

    #[inline(always)]
    pub const fn new_unchecked(file: u8) -> Self {
        Self(file)
    }

    /// Parses a lowercase file letter in `'a'..='h'`.
    #[inline(always)]
    pub fn from_char(file: char) -> Option<Self> {
        ('a'..='h')
            .contains(&file)
            .then(|| Self(file as u8 - b'a'))
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn char(&self) -> char {
        (self.0 + b'a') as char
    }

    /// Attempt to offset this [`File`] by the provided `delta`.
    ///
    /// If `self + delta` would exceed the bounds of this [`File`], then `None` is returned.
    #[inline(always)]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        if let Some(bits) = self.0.checked_add_signed(delta) {
            return if bits <= Self::MAX {
                Some(Self::new_unchecked(bits))
            } else {
                None
            };
        }

        None
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.char(), self.0)
    }
}
