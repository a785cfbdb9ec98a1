/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use thiserror::Error;
use tracing::debug;

use crate::{rules, Color, Move, Piece, Position, Search, SearchResult, Square};

/// A move that was accepted and applied to a [`Game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Played {
    /// The move itself.
    pub mv: Move,

    /// The piece that moved.
    pub piece: Piece,

    /// The piece that stood on the destination, if any.
    pub captured: Option<Piece>,
}

/// Why a [`Game`] refused a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("it is {}'s turn to move, not {}'s", .expected.name(), .found.name())]
    WrongTurn { expected: Color, found: Color },

    #[error("{} cannot move from {from} to {to}", .piece.name())]
    Illegal {
        piece: Piece,
        from: Square,
        to: Square,
    },
}

/// Result of asking a [`Game`] to play a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Played(Played),
    Rejected(Rejection),
}

impl MoveOutcome {
    /// Returns `true` if the move was applied.
    #[inline(always)]
    pub const fn is_played(&self) -> bool {
        matches!(self, Self::Played(_))
    }
}

/// A game between a human and the computer.
///
/// Tracks the board, whose turn it is, and which side the computer plays.
/// Moves are checked for turn order and then by the rules engine before they are applied.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Game {
    position: Position,
    side_to_move: Color,
    ai_color: Color,
    fullmove: usize,
}

impl Game {
    /// The standard setup, White to move, with the computer playing Black.
    #[inline(always)]
    pub fn new() -> Self {
        Self::from_position(Position::default(), Color::White)
    }

    /// Wraps an existing [`Position`], with `side_to_move` to play and the computer playing Black.
    #[inline(always)]
    pub const fn from_position(position: Position, side_to_move: Color) -> Self {
        Self {
            position,
            side_to_move,
            ai_color: Color::Black,
            fullmove: 1,
        }
    }

    /// Parses a FEN string. Only the placements, side to move, and fullmove fields are read.
    ///
    /// # Example
    /// ```
    /// # use heron::{Color, Game};
    /// let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 12").unwrap();
    /// assert_eq!(game.side_to_move(), Color::Black);
    /// assert_eq!(game.to_fen(), "4k3/8/8/8/8/8/8/4K3 b - - 0 12");
    /// ```
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut split = fen.split_whitespace();
        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;

        let position = Position::from_fen(placements)?;
        let side_to_move = Color::from_str(split.next().unwrap_or("w"))?;

        // Castling, en passant and halfmove fields are not modelled
        let fullmove = split.nth(3).unwrap_or("1");
        let fullmove = fullmove.parse().or(Err(anyhow!(
            "FEN string must have valid fullmove counter. Got {fullmove:?}"
        )))?;

        Ok(Self {
            fullmove,
            ..Self::from_position(position, side_to_move)
        })
    }

    /// Generates a FEN string for this game.
    pub fn to_fen(&self) -> String {
        format!(
            "{} {} - - 0 {}",
            self.position.to_fen(),
            self.side_to_move,
            self.fullmove
        )
    }

    /// The current board.
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// The side whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// The side the computer plays.
    #[inline(always)]
    pub const fn ai_color(&self) -> Color {
        self.ai_color
    }

    /// Changes the side the computer plays.
    #[inline(always)]
    pub fn set_ai_color(&mut self, color: Color) {
        self.ai_color = color;
    }

    /// Returns `true` if it is the computer's turn.
    #[inline(always)]
    pub fn is_ai_turn(&self) -> bool {
        self.side_to_move == self.ai_color
    }

    /// Passes the turn without moving.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Puts `piece` on `square`, replacing whatever was there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) -> Option<Piece> {
        self.position.place(piece, square)
    }

    /// Removes the piece on `square`.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.position.take(square)
    }

    /// Returns `true` if `color`'s King could be captured by the opponent.
    #[inline(always)]
    pub fn is_in_check(&self, color: Color) -> bool {
        rules::is_in_check(&self.position, color)
    }

    /// Attempts to move the piece on `from` to `to`.
    ///
    /// Fails outright if `from` is empty. Otherwise the move is rejected if the piece does not
    /// belong to the side to move, or if the rules forbid it. A played move passes the turn.
    ///
    /// # Example
    /// ```
    /// # use heron::{Color, Game, MoveOutcome};
    /// let mut game = Game::new();
    /// let e2 = "e2".parse().unwrap();
    /// let e4 = "e4".parse().unwrap();
    ///
    /// assert!(game.try_move(e2, e4).unwrap().is_played());
    /// assert_eq!(game.side_to_move(), Color::Black);
    ///
    /// // It is no longer White's turn
    /// let d2 = "d2".parse().unwrap();
    /// let d4 = "d4".parse().unwrap();
    /// assert!(matches!(game.try_move(d2, d4).unwrap(), MoveOutcome::Rejected(_)));
    /// ```
    pub fn try_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome> {
        let Some(piece) = self.position.piece_at(from) else {
            bail!("No piece found at {from}");
        };

        if piece.color() != self.side_to_move {
            let rejection = Rejection::WrongTurn {
                expected: self.side_to_move,
                found: piece.color(),
            };
            debug!("rejected {from}{to}: {rejection}");
            return Ok(MoveOutcome::Rejected(rejection));
        }

        if !rules::evaluate(&self.position, from, to, piece) {
            let rejection = Rejection::Illegal { piece, from, to };
            debug!("rejected {from}{to}: {rejection}");
            return Ok(MoveOutcome::Rejected(rejection));
        }

        Ok(MoveOutcome::Played(self.play(Move::new(from, to), piece)))
    }

    /// Plays every move in `moves` in order, such as the move list of a UCI `position` command.
    ///
    /// Stops at the first move that cannot be played.
    pub fn play_moves<I, S>(&mut self, moves: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for mv in moves {
            let mv = Move::from_uci(mv.as_ref())?;
            match self
                .try_move(mv.from(), mv.to())
                .with_context(|| format!("Failed to play {mv}"))?
            {
                MoveOutcome::Played(_) => {}
                MoveOutcome::Rejected(reason) => bail!("Failed to play {mv}: {reason}"),
            }
        }

        Ok(())
    }

    /// Searches for the best move for the side to move, without playing it.
    #[inline(always)]
    pub fn search(&self, depth: usize) -> SearchResult {
        Search::run(&self.position, self.side_to_move, depth)
    }

    /// Searches for, and plays, a move for the side to move.
    ///
    /// Returns `None` if that side has no moves.
    pub fn play_best_move(&mut self, depth: usize) -> Result<Option<Played>> {
        let Some(mv) = self.search(depth).bestmove else {
            debug!("{} has no moves", self.side_to_move.name());
            return Ok(None);
        };

        match self.try_move(mv.from(), mv.to())? {
            MoveOutcome::Played(played) => Ok(Some(played)),
            MoveOutcome::Rejected(reason) => bail!("Search produced a move that was rejected: {reason}"),
        }
    }

    /// Applies a move that has already been judged legal.
    fn play(&mut self, mv: Move, piece: Piece) -> Played {
        let captured = self.position.make_move(mv);

        debug!(
            "{} played {mv}{}",
            piece.name(),
            captured
                .map(|p| format!(", capturing {}", p.name()))
                .unwrap_or_default()
        );

        if self.side_to_move == Color::Black {
            self.fullmove += 1;
        }
        self.toggle_side_to_move();

        Played {
            mv,
            piece,
            captured,
        }
    }
}

impl Default for Game {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.position)?;
        writeln!(f)?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        write!(f, "Side to move: {}", self.side_to_move.name())?;

        for color in Color::all() {
            if self.is_in_check(color) {
                write!(f, "\n{} is in check", color.name())?;
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FEN_STARTPOS;

    fn sq(label: &str) -> Square {
        label.parse().unwrap()
    }

    #[test]
    fn test_startpos_fen() {
        assert_eq!(Game::from_fen(FEN_STARTPOS).unwrap(), Game::new());
        assert_eq!(Game::new().to_fen(), FEN_STARTPOS);
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.ai_color(), Color::Black);
        assert!(!game.is_ai_turn());
        assert_eq!(*game.position(), Position::default());
    }

    #[test]
    fn test_moves_alternate() {
        let mut game = Game::new();
        assert!(game.try_move(sq("e2"), sq("e4")).unwrap().is_played());
        assert!(game.is_ai_turn());
        assert!(game.try_move(sq("e7"), sq("e5")).unwrap().is_played());
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(
            game.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w - - 0 2"
        );
    }

    #[test]
    fn test_rejections() {
        let mut game = Game::new();

        assert_eq!(
            game.try_move(sq("e7"), sq("e5")).unwrap(),
            MoveOutcome::Rejected(Rejection::WrongTurn {
                expected: Color::White,
                found: Color::Black
            })
        );

        assert_eq!(
            game.try_move(sq("e2"), sq("e5")).unwrap(),
            MoveOutcome::Rejected(Rejection::Illegal {
                piece: Piece::WHITE_PAWN,
                from: sq("e2"),
                to: sq("e5")
            })
        );

        // Nothing changed
        assert_eq!(game, Game::new());

        assert!(game.try_move(sq("e4"), sq("e5")).is_err());
    }

    #[test]
    fn test_captures_are_reported() {
        let mut game = Game::from_fen("4k3/8/8/3p4/8/8/8/3RK3 w").unwrap();
        let MoveOutcome::Played(played) = game.try_move(sq("d1"), sq("d5")).unwrap() else {
            panic!("d1d5 should be legal");
        };
        assert_eq!(played.piece, Piece::WHITE_ROOK);
        assert_eq!(played.captured, Some(Piece::BLACK_PAWN));
    }

    #[test]
    fn test_check_is_detected_after_move() {
        let mut game = Game::from_fen("4k3/8/8/8/8/8/8/3RK3 w").unwrap();
        assert!(!game.is_in_check(Color::Black));
        assert!(game.try_move(sq("d1"), sq("d8")).unwrap().is_played());
        assert!(game.is_in_check(Color::Black));
        assert!(!game.is_in_check(Color::White));
    }

    #[test]
    fn test_play_moves() {
        let mut game = Game::new();
        game.play_moves(["e2e4", "e7e5", "g1f3"]).unwrap();
        assert_eq!(game.side_to_move(), Color::Black);
        assert!(game.play_moves(["e8e6"]).is_err());
        assert!(game.play_moves(["zz99"]).is_err());
    }

    #[test]
    fn test_ai_replies() {
        let mut game = Game::new();
        game.try_move(sq("e2"), sq("e4")).unwrap();
        assert!(game.is_ai_turn());

        let played = game.play_best_move(2).unwrap().unwrap();
        assert_eq!(played.piece.color(), Color::Black);
        assert!(!game.is_ai_turn());
    }

    #[test]
    fn test_ai_with_no_moves() {
        let mut game = Game::from_fen("8/8/8/8/8/8/8/8 b").unwrap();
        assert_eq!(game.play_best_move(3).unwrap(), None);
        assert_eq!(game.side_to_move(), Color::Black);
    }

    #[test]
    fn test_editing() {
        let mut game = Game::new();
        assert_eq!(game.take(sq("d1")), Some(Piece::WHITE_QUEEN));
        assert_eq!(game.place(Piece::BLACK_KNIGHT, sq("d1")), None);
        game.set_ai_color(Color::White);
        assert!(game.is_ai_turn());
        game.toggle_side_to_move();
        assert!(!game.is_ai_turn());
    }
}
