/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use uci_parser::UciScore;

/// A numerical representation of the evaluation of a position / move, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Capturing a King is scored as [`Score::WIN`], less the number of plies it took.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Larger than any score a search can produce.
    pub const INF: Self = Self(1_000_000);

    /// Score of capturing the enemy King on the very next move.
    pub const WIN: Self = Self(Self::INF.0 - 1);

    /// Score of an equal position.
    pub const DRAW: Self = Self(0);

    /// Lowest score that still counts as a forced King capture.
    pub const LOWEST_WIN: Self = Self(Self::WIN.0 - 1_000);

    /// Returns `true` if this score means a King capture is forced.
    #[inline(always)]
    pub fn is_win(&self) -> bool {
        self.abs() >= Self::LOWEST_WIN
    }

    /// Number of plies until the King is captured, if this is a winning (or losing) score.
    #[inline(always)]
    pub fn plies_to_win(&self) -> Option<i32> {
        self.is_win().then_some(Self::WIN.0 - self.0.abs())
    }

    /// Converts this [`Score`] into a [`UciScore`].
    ///
    /// Forced King captures are reported as mates, counted in full moves.
    #[inline(always)]
    pub fn into_uci(self) -> UciScore {
        match self.plies_to_win() {
            Some(plies) if self.0 > 0 => UciScore::mate((plies + 1) / 2),
            Some(plies) => UciScore::mate(-plies / 2),
            None => UciScore::cp(self.0),
        }
    }

    /// Returns the absolute value of this [`Score`].
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// "Normalizes" a score so that it can be printed as a float, in pawns.
    #[inline(always)]
    pub fn normalize(&self) -> f32 {
        self.0 as f32 / 100.0
    }
}

impl From<Score> for UciScore {
    #[inline(always)]
    fn from(value: Score) -> Self {
        value.into_uci()
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(std::ops::$trait::$fn(self.0, rhs))
            }
        }
    };
}

macro_rules! impl_binary_op_assign {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: Self) {
                std::ops::$trait::$fn(&mut self.0, rhs.0);
            }
        }

        impl std::ops::$trait<i32> for Score {
            #[inline(always)]
            fn $fn(&mut self, rhs: i32) {
                std::ops::$trait::$fn(&mut self.0, rhs);
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);

impl_binary_op_assign!(AddAssign, add_assign);
impl_binary_op_assign!(SubAssign, sub_assign);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plies_to_win() {
            Some(plies) => write!(f, "{} (king falls in {plies} plies)", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
