/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Movement rules for every kind of chess piece.
//!
//! Everything here is a pure function of a [`Position`] and a claimed move.
//! Turn order, check, castling, en passant and promotion are not considered.

use crate::{Color, LegalityResult, Move, Piece, PieceKind, Position, Rank, Square};

/// Translates a square label into one-based `(file, rank)` coordinates.
///
/// # Example
/// ```
/// # use heron::rules::to_coords;
/// assert_eq!(to_coords("a1"), Ok((1, 1)));
/// assert_eq!(to_coords("e4"), Ok((5, 4)));
/// assert!(to_coords("z9").is_err());
/// ```
#[inline(always)]
pub fn to_coords(label: &str) -> LegalityResult<(i8, i8)> {
    Ok(Square::from_label(label)?.coords())
}

/// Returns `true` if every square strictly between `from` and `to` is empty.
///
/// The walk steps by the signs of `file_delta` and `rank_delta`, starting one step past
/// `from` and stopping on reaching `to`. Neither endpoint is inspected, and the shape of
/// the line is not validated; callers are expected to pass a straight or diagonal line.
pub fn is_path_clear(
    position: &Position,
    from: Square,
    to: Square,
    file_delta: i8,
    rank_delta: i8,
) -> bool {
    let (file_step, rank_step) = (file_delta.signum(), rank_delta.signum());
    if file_step == 0 && rank_step == 0 {
        return true;
    }

    let mut current = from;
    while let Some(next) = current.offset(file_step, rank_step) {
        if next == to {
            return true;
        }

        if position.has(next) {
            return false;
        }

        current = next;
    }

    // Walked off the board without meeting `to`
    true
}

/// Pawns move forward only: one square onto an empty square, two squares from their
/// starting rank through and onto empty squares, or one square diagonally onto an enemy.
pub fn pawn_move(position: &Position, from: Square, to: Square, color: Color) -> bool {
    let (file_delta, rank_delta) = from.delta_to(to);

    match (file_delta.abs(), rank_delta * color.forward()) {
        (0, 1) => !position.has(to),

        (0, 2) => {
            from.rank() == Rank::second(color)
                && is_path_clear(position, from, to, file_delta, rank_delta)
                && !position.has(to)
        }

        (1, 1) => position.color_at(to) == Some(color.opponent()),

        _ => false,
    }
}

/// Rooks move any distance along a single file or rank, without jumping.
pub fn rook_move(position: &Position, from: Square, to: Square, _color: Color) -> bool {
    let (file_delta, rank_delta) = from.delta_to(to);

    (file_delta == 0) != (rank_delta == 0)
        && is_path_clear(position, from, to, file_delta, rank_delta)
}

/// Bishops move any distance along a diagonal, without jumping.
pub fn bishop_move(position: &Position, from: Square, to: Square, _color: Color) -> bool {
    let (file_delta, rank_delta) = from.delta_to(to);

    file_delta != 0
        && file_delta.abs() == rank_delta.abs()
        && is_path_clear(position, from, to, file_delta, rank_delta)
}

/// Queens move as either a rook or a bishop.
pub fn queen_move(position: &Position, from: Square, to: Square, color: Color) -> bool {
    rook_move(position, from, to, color) || bishop_move(position, from, to, color)
}

/// Knights move in an "L" and ignore everything in between.
pub fn knight_move(_position: &Position, from: Square, to: Square, _color: Color) -> bool {
    let (file_delta, rank_delta) = from.delta_to(to);
    matches!((file_delta.abs(), rank_delta.abs()), (1, 2) | (2, 1))
}

/// Kings move exactly one square in any direction. Castling is not supported.
pub fn king_move(_position: &Position, from: Square, to: Square, _color: Color) -> bool {
    let (file_delta, rank_delta) = from.delta_to(to);
    from != to && file_delta.abs() <= 1 && rank_delta.abs() <= 1
}

/// Decides whether `piece`, standing on `from`, may move to `to` in `position`.
///
/// A destination held by a piece of the mover's own color is always illegal, as is a
/// move that goes nowhere. Otherwise the verdict of the predicate for `piece`'s kind is returned.
///
/// # Example
/// ```
/// # use heron::{rules::evaluate, Piece, Position};
/// let position = Position::default();
/// assert!(evaluate(&position, "e2".parse().unwrap(), "e4".parse().unwrap(), Piece::WHITE_PAWN));
/// assert!(!evaluate(&position, "e1".parse().unwrap(), "e2".parse().unwrap(), Piece::WHITE_KING));
/// ```
pub fn evaluate(position: &Position, from: Square, to: Square, piece: Piece) -> bool {
    let color = piece.color();

    if position.color_at(to) == Some(color) || from == to {
        return false;
    }

    match piece.kind() {
        PieceKind::Pawn => pawn_move(position, from, to, color),
        PieceKind::Rook => rook_move(position, from, to, color),
        PieceKind::Bishop => bishop_move(position, from, to, color),
        PieceKind::Queen => queen_move(position, from, to, color),
        PieceKind::Knight => knight_move(position, from, to, color),
        PieceKind::King => king_move(position, from, to, color),
    }
}

/// Label-level wrapper for [`evaluate`]: squares are labels like `"e2"` and the piece is a code like `"wp"`.
///
/// # Example
/// ```
/// # use heron::{rules::evaluate_codes, LegalityError, Position};
/// let position = Position::default();
/// assert_eq!(evaluate_codes(&position, "b1", "c3", "wn"), Ok(true));
/// assert_eq!(evaluate_codes(&position, "a1", "a8", "wr"), Ok(false));
/// assert!(matches!(
///     evaluate_codes(&position, "b1", "c3", "wz"),
///     Err(LegalityError::UnknownPieceKind { .. })
/// ));
/// ```
pub fn evaluate_codes(
    position: &Position,
    from: &str,
    to: &str,
    piece: &str,
) -> LegalityResult<bool> {
    let from = Square::from_label(from)?;
    let to = Square::from_label(to)?;
    let piece = Piece::from_code(piece)?;

    Ok(evaluate(position, from, to, piece))
}

/// Judges `mv` using whatever piece stands on its source square.
///
/// Moving from an empty square is never legal.
#[inline(always)]
pub fn evaluate_move(position: &Position, mv: Move) -> bool {
    position
        .piece_at(mv.from())
        .is_some_and(|piece| evaluate(position, mv.from(), mv.to(), piece))
}

/// All moves the piece on `square` may make, in square order of their destinations.
///
/// Empty if `square` is unoccupied.
pub fn legal_moves_from(position: &Position, square: Square) -> Vec<Move> {
    let Some(piece) = position.piece_at(square) else {
        return Vec::new();
    };

    Square::iter()
        .filter(|&to| evaluate(position, square, to, piece))
        .map(|to| Move::new(square, to))
        .collect()
}

/// All moves available to `color`'s pieces.
///
/// These are the moves the rules permit, with no regard for the safety of `color`'s King.
pub fn legal_moves(position: &Position, color: Color) -> Vec<Move> {
    position
        .pieces(color)
        .flat_map(|(square, _)| legal_moves_from(position, square))
        .collect()
}

/// Returns `true` if any of `by`'s pieces could legally move onto `square`.
pub fn is_attacked(position: &Position, square: Square, by: Color) -> bool {
    position
        .pieces(by)
        .any(|(from, piece)| evaluate(position, from, square, piece))
}

/// Returns `true` if `color`'s King could be captured by an opposing piece.
///
/// A side without a King on the board is never in check.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    position
        .king(color)
        .is_some_and(|king| is_attacked(position, king, color.opponent()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(label: &str) -> Square {
        label.parse().unwrap()
    }

    fn fen(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    /// Every piece of both colors.
    fn all_pieces() -> impl Iterator<Item = Piece> {
        Color::all()
            .into_iter()
            .flat_map(|c| PieceKind::all().map(|k| Piece::new(c, k)))
    }

    #[test]
    fn test_standard_position_scenarios() {
        let position = Position::default();

        let cases = [
            ("e2", "e4", "wp", true),
            ("e2", "e5", "wp", false),
            ("a1", "a8", "wr", false),
            ("b1", "c3", "wn", true),
            ("e1", "e2", "wk", false),
            ("e7", "e5", "bp", true),
            ("g8", "f6", "bn", true),
            ("c1", "e3", "wb", false),
            ("d1", "d3", "wq", false),
        ];

        for (from, to, piece, expected) in cases {
            assert_eq!(
                evaluate_codes(&position, from, to, piece),
                Ok(expected),
                "{piece} {from}{to}"
            );
        }
    }

    #[test]
    fn test_rook_captures_through_cleared_file() {
        let position = Position::from_codes([
            ("d1", Some("wr")),
            ("d5", Some("bp")),
            ("d2", None),
            ("d3", None),
            ("d4", None),
        ])
        .unwrap();

        assert_eq!(evaluate_codes(&position, "d1", "d5", "wr"), Ok(true));
        assert_eq!(evaluate_codes(&position, "d1", "d6", "wr"), Ok(false));
    }

    #[test]
    fn test_zero_displacement_is_illegal() {
        let position = Position::new();
        for piece in all_pieces() {
            for square in Square::iter() {
                assert!(!evaluate(&position, square, square, piece), "{piece:?} at {square}");
            }
        }
    }

    #[test]
    fn test_own_capture_is_illegal() {
        for piece in all_pieces() {
            let mut position = Position::new();
            let from = sq("d4");
            position.place(piece, from);

            for to in Square::iter().filter(|&to| to != from) {
                let mut blocked = position;
                blocked.place(Piece::new(piece.color(), PieceKind::Pawn), to);
                assert!(!evaluate(&blocked, from, to, piece), "{piece:?} onto {to}");
            }
        }
    }

    #[test]
    fn test_blockers_stop_sliders() {
        let lines = [
            ("a1", "a8", "wr"),
            ("h8", "h1", "br"),
            ("a1", "h8", "wb"),
            ("h1", "a8", "bb"),
            ("d1", "d8", "wq"),
            ("a4", "h4", "bq"),
            ("b2", "g7", "wq"),
        ];

        for (from, to, code) in lines {
            let (from, to) = (sq(from), sq(to));
            let piece = Piece::from_code(code).unwrap();
            let mut position = Position::new();
            position.place(piece, from);
            assert!(evaluate(&position, from, to, piece), "{piece:?} {from}{to} on empty board");

            let (file_delta, rank_delta) = from.delta_to(to);
            let (file_step, rank_step) = (file_delta.signum(), rank_delta.signum());
            let mut between = from.offset(file_step, rank_step).unwrap();
            while between != to {
                let mut blocked = position;
                blocked.place(Piece::BLACK_KNIGHT, between);
                assert!(
                    !evaluate(&blocked, from, to, piece),
                    "{piece:?} {from}{to} should be blocked by {between}"
                );
                between = between.offset(file_step, rank_step).unwrap();
            }
        }
    }

    #[test]
    fn test_blockers_stop_pawn_double_advance() {
        let mut position = Position::default();
        assert!(evaluate(&position, sq("e2"), sq("e4"), Piece::WHITE_PAWN));

        position.place(Piece::BLACK_KNIGHT, sq("e3"));
        assert!(!evaluate(&position, sq("e2"), sq("e4"), Piece::WHITE_PAWN));

        let mut position = Position::default();
        position.place(Piece::WHITE_KNIGHT, sq("d6"));
        assert!(!evaluate(&position, sq("d7"), sq("d5"), Piece::BLACK_PAWN));
    }

    #[test]
    fn test_pawn_double_advance_needs_empty_destination() {
        let mut position = Position::default();
        position.place(Piece::BLACK_PAWN, sq("e4"));
        assert!(!evaluate(&position, sq("e2"), sq("e4"), Piece::WHITE_PAWN));
    }

    #[test]
    fn test_pawn_double_advance_only_from_home_rank() {
        let position = fen("8/8/8/8/8/4P3/8/8");
        assert!(evaluate(&position, sq("e3"), sq("e4"), Piece::WHITE_PAWN));
        assert!(!evaluate(&position, sq("e3"), sq("e5"), Piece::WHITE_PAWN));

        let position = fen("8/8/4p3/8/8/8/8/8");
        assert!(evaluate(&position, sq("e6"), sq("e5"), Piece::BLACK_PAWN));
        assert!(!evaluate(&position, sq("e6"), sq("e4"), Piece::BLACK_PAWN));
    }

    #[test]
    fn test_pawns_never_move_backwards_or_sideways() {
        let position = fen("8/8/8/3p4/3P4/8/8/8");
        assert!(!evaluate(&position, sq("d4"), sq("d3"), Piece::WHITE_PAWN));
        assert!(!evaluate(&position, sq("d4"), sq("e4"), Piece::WHITE_PAWN));
        assert!(!evaluate(&position, sq("d5"), sq("d6"), Piece::BLACK_PAWN));
        assert!(!evaluate(&position, sq("d5"), sq("c5"), Piece::BLACK_PAWN));
    }

    #[test]
    fn test_pawn_straight_advance_onto_piece_is_illegal() {
        let position = fen("8/8/8/3p4/3P4/8/8/8");
        assert!(!evaluate(&position, sq("d4"), sq("d5"), Piece::WHITE_PAWN));
        assert!(!evaluate(&position, sq("d5"), sq("d4"), Piece::BLACK_PAWN));
    }

    #[test]
    fn test_pawn_diagonals() {
        let position = fen("8/8/8/2p5/3P4/8/8/8");

        // Onto an enemy, one rank forward
        assert!(evaluate(&position, sq("d4"), sq("c5"), Piece::WHITE_PAWN));
        assert!(evaluate(&position, sq("c5"), sq("d4"), Piece::BLACK_PAWN));

        // Onto empty squares
        assert!(!evaluate(&position, sq("d4"), sq("e5"), Piece::WHITE_PAWN));
        assert!(!evaluate(&position, sq("c5"), sq("b4"), Piece::BLACK_PAWN));

        // Backwards diagonal onto an enemy
        let position = fen("8/8/8/8/3P4/2p5/8/8");
        assert!(!evaluate(&position, sq("d4"), sq("c3"), Piece::WHITE_PAWN));
    }

    #[test]
    fn test_knights_jump() {
        let position = Position::default();
        let knight_moves = legal_moves_from(&position, sq("g1"));
        let targets: Vec<_> = knight_moves.iter().map(|mv| mv.to().label()).collect();
        assert_eq!(targets, ["f3", "h3"]);

        // Surrounding the knight changes nothing
        let open = fen("8/8/8/8/3N4/8/8/8");
        let mut crowded = open;
        for (file, rank) in [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
            crowded.place(Piece::BLACK_PAWN, sq("d4").offset(file, rank).unwrap());
        }

        for to in Square::iter() {
            if open.has(to) || crowded.has(to) {
                continue;
            }
            assert_eq!(
                evaluate(&open, sq("d4"), to, Piece::WHITE_KNIGHT),
                evaluate(&crowded, sq("d4"), to, Piece::WHITE_KNIGHT),
                "d4{to}"
            );
        }
        assert_eq!(legal_moves_from(&crowded, sq("d4")).len(), 8);
    }

    #[test]
    fn test_king_moves_one_square() {
        let position = fen("8/8/8/8/3K4/8/8/8");
        assert_eq!(legal_moves_from(&position, sq("d4")).len(), 8);
        assert!(!evaluate(&position, sq("d4"), sq("d6"), Piece::WHITE_KING));
        assert!(!evaluate(&position, sq("e1"), sq("g1"), Piece::WHITE_KING));
    }

    #[test]
    fn test_queen_combines_rook_and_bishop() {
        let position = Position::new();
        let from = sq("d4");
        for to in Square::iter() {
            let queen = evaluate(&position, from, to, Piece::WHITE_QUEEN);
            let rook = evaluate(&position, from, to, Piece::WHITE_ROOK);
            let bishop = evaluate(&position, from, to, Piece::WHITE_BISHOP);
            assert_eq!(queen, rook || bishop, "d4{to}");
        }
        assert_eq!(legal_moves_from(&fen("8/8/8/8/3Q4/8/8/8"), from).len(), 27);
    }

    #[test]
    fn test_path_clearance_excludes_endpoints() {
        let position = fen("8/8/8/8/8/8/8/R6r");
        assert!(is_path_clear(&position, sq("a1"), sq("h1"), 7, 0));

        let position = fen("8/8/8/8/8/8/8/R2p3r");
        assert!(!is_path_clear(&position, sq("a1"), sq("h1"), 7, 0));
        assert!(is_path_clear(&position, sq("a1"), sq("d1"), 3, 0));
        assert!(is_path_clear(&position, sq("a1"), sq("b1"), 1, 0));
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let position = Position::default();
        assert!(evaluate_codes(&position, "e9", "e4", "wp").is_err());
        assert!(evaluate_codes(&position, "e2", "", "wp").is_err());
        assert!(evaluate_codes(&position, "e2", "e4", "wx").is_err());
        assert!(evaluate_codes(&position, "e2", "e4", "xp").is_err());
    }

    #[test]
    fn test_startpos_move_count() {
        let position = Position::default();
        assert_eq!(legal_moves(&position, Color::White).len(), 20);
        assert_eq!(legal_moves(&position, Color::Black).len(), 20);
    }

    #[test]
    fn test_check_detection() {
        assert!(!is_in_check(&Position::default(), Color::White));

        let position = fen("4k3/8/8/8/8/8/8/4R1K1");
        assert!(is_in_check(&position, Color::Black));
        assert!(!is_in_check(&position, Color::White));

        let position = fen("4k3/4p3/8/8/8/8/8/4R1K1");
        assert!(!is_in_check(&position, Color::Black));

        let position = fen("8/8/8/8/8/8/3p4/4K3");
        assert!(is_in_check(&position, Color::White));

        // Pawns do not check straight ahead
        let position = fen("8/8/8/8/8/8/4p3/4K3");
        assert!(!is_in_check(&position, Color::White));

        assert!(!is_in_check(&Position::new(), Color::White));
    }
}
