/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

/// Reasons the legality engine refuses to produce a verdict.
///
/// An illegal move is *not* an error; it is an ordinary `false` verdict.
/// These variants only describe malformed input, which the engine cannot judge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegalityError {
    /// A square label was not a file in `a..=h` followed by a rank in `1..=8`.
    #[error("Invalid square {label:?}: must be a file [a, h] followed by a rank [1, 8]")]
    InvalidSquare { label: String },

    /// A piece code's kind letter was not one of `p`, `r`, `b`, `q`, `n`, `k`.
    #[error("Unknown piece kind in {code:?}: kind must be one of [p, r, b, q, n, k]")]
    UnknownPieceKind { code: String },

    /// A piece code was not two characters long, or its color letter was not `w` or `b`.
    #[error("Malformed piece code {code:?}: must be a color [w, b] followed by a kind")]
    InvalidPieceCode { code: String },
}

impl LegalityError {
    pub(crate) fn invalid_square(label: impl Into<String>) -> Self {
        Self::InvalidSquare {
            label: label.into(),
        }
    }

    pub(crate) fn unknown_kind(code: impl Into<String>) -> Self {
        Self::UnknownPieceKind { code: code.into() }
    }

    pub(crate) fn invalid_code(code: impl Into<String>) -> Self {
        Self::InvalidPieceCode { code: code.into() }
    }
}

/// Alias for results produced by the legality engine.
pub type LegalityResult<T> = Result<T, LegalityError>;
