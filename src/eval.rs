/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Color, File, PieceKind, Position, Rank, Score, Square};

/// Encapsulates the logic of scoring a chess position.
///
/// Scoring is pure material balance. During a negamax search, positions are evaluated
/// from the perspective of the side being searched for, so a positive number is good for that side.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    /// The position to evaluate.
    position: &'a Position,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for `position`.
    #[inline(always)]
    pub const fn new(position: &'a Position) -> Self {
        Self { position }
    }

    /// Evaluate this position from `color`'s perspective.
    ///
    /// A positive number is good for `color`, a negative number is better for the opponent,
    /// and `0` is considered equal.
    ///
    /// # Example
    /// ```
    /// # use heron::{Color, Evaluator, Position, Score};
    /// let position = Position::from_fen("4k3/8/8/8/8/8/8/3QK3").unwrap();
    /// assert_eq!(Evaluator::new(&position).eval_for(Color::White), Score(900));
    /// assert_eq!(Evaluator::new(&position).eval_for(Color::Black), Score(-900));
    /// ```
    pub fn eval_for(&self, color: Color) -> Score {
        self.position
            .iter()
            .fold(Score::DRAW, |score, (_, piece)| {
                let value = value_of(piece.kind());
                if piece.color() == color {
                    score + value
                } else {
                    score - value
                }
            })
    }

    /// Fetches the signed value of the piece on `square`, positive for White.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<i32> {
        self.position.piece_at(square).map(|piece| match piece.color() {
            Color::White => value_of(piece.kind()),
            Color::Black => -value_of(piece.kind()),
        })
    }
}

impl fmt::Display for Evaluator<'_> {
    /// Draws the board with each piece's contribution beneath it, followed by the overall score.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "--------+")?;
        }
        writeln!(f)?;

        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;
            for file in File::iter() {
                let piece = self.position.piece_at(Square::new(file, rank));
                let code = piece.map(|p| p.code()).unwrap_or_default();
                write!(f, "{code:^8}|")?;
            }
            writeln!(f)?;

            write!(f, "  |")?;
            for file in File::iter() {
                let value = match self.value_at(Square::new(file, rank)) {
                    Some(v) if v > 0 => format!("+{v}"),
                    Some(v) => v.to_string(),
                    None => String::new(),
                };
                write!(f, "{value:^8}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "--------+")?;
            }
            writeln!(f)?;
        }

        write!(f, "  ")?;
        for file in File::iter() {
            write!(f, "    {file}    ")?;
        }

        let score = self.eval_for(Color::White);
        let winning_side = if score > Score::DRAW {
            Color::White.name()
        } else if score < Score::DRAW {
            Color::Black.name()
        } else {
            "N/A"
        };

        writeln!(f, "\n\nWinning side: {winning_side}")?;
        write!(f, "Score (white): {score}")
    }
}

/// Returns the material value of the provided [`PieceKind`].
///
/// The King is worth far more than everything else combined, so that losing it dominates any score.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 20_000,
    }
}
