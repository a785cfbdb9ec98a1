/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Result};

use super::Square;

/// A proposed relocation of whatever piece stands on `from` to `to`.
///
/// A [`Move`] carries no piece, flags, or promotion; it is judged against a
/// [`Position`](super::Position) by [`crate::rules::evaluate`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    from: Square,
    to: Square,
}

impl Move {
    /// Creates a new [`Move`] from `from` to `to`.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    /// Fetches the source [`Square`] of this [`Move`].
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// Fetches the destination [`Square`] of this [`Move`].
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// Signed `(file, rank)` displacement of this [`Move`].
    #[inline(always)]
    pub const fn delta(&self) -> (i8, i8) {
        self.from.delta_to(self.to)
    }

    /// Parses a [`Move`] written as two concatenated square labels, like `"e2e4"`.
    ///
    /// # Example
    /// ```
    /// # use heron::Move;
    /// let mv = Move::from_uci("b1c3").unwrap();
    /// assert_eq!(mv.from().to_string(), "b1");
    /// assert_eq!(mv.to().to_string(), "c3");
    /// assert!(Move::from_uci("b1c9").is_err());
    /// ```
    pub fn from_uci(uci: &str) -> Result<Self> {
        if uci.len() != 4 {
            bail!("Move str must be exactly 4 characters, like \"e2e4\". Got {uci:?}");
        }

        let from = uci.get(0..2).ok_or(anyhow!(
            "Move str must contain a `from` square. Got {uci:?}"
        ))?;
        let to = uci
            .get(2..4)
            .ok_or(anyhow!("Move str must contain a `to` square. Got {uci:?}"))?;

        Ok(Self::new(Square::from_label(from)?, Square::from_label(to)?))
    }

    /// Converts this [`Move`] into its four-character text form.
    #[inline(always)]
    pub fn to_uci(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;
    /// Wrapper for [`Move::from_uci`].
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Move {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
