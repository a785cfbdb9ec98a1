/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use heron::{rules::evaluate_codes, LegalityError, Position};

fn test_verdict(fen: &str, from: &str, to: &str, piece: &str, expected: bool) {
    let position = Position::from_fen(fen).unwrap();
    let verdict = evaluate_codes(&position, from, to, piece).unwrap();
    assert_eq!(
        verdict, expected,
        "{piece} {from}{to} on {fen} should be {}",
        if expected { "legal" } else { "illegal" }
    );
}

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

#[cfg(test)]
mod standard_position {
    use super::*;

    #[test]
    fn test_pawn_double_advance() {
        test_verdict(STARTPOS, "e2", "e4", "wp", true);
    }

    #[test]
    fn test_pawn_triple_advance() {
        test_verdict(STARTPOS, "e2", "e5", "wp", false);
    }

    #[test]
    fn test_rook_blocked_by_own_pawn() {
        test_verdict(STARTPOS, "a1", "a8", "wr", false);
    }

    #[test]
    fn test_knight_jumps_pawns() {
        test_verdict(STARTPOS, "b1", "c3", "wn", true);
    }

    #[test]
    fn test_king_onto_own_pawn() {
        test_verdict(STARTPOS, "e1", "e2", "wk", false);
    }

    #[test]
    fn test_black_replies() {
        test_verdict(STARTPOS, "d7", "d5", "bp", true);
        test_verdict(STARTPOS, "b8", "a6", "bn", true);
        test_verdict(STARTPOS, "f8", "c5", "bb", false);
    }
}

#[cfg(test)]
mod open_lines {
    use super::*;

    #[test]
    fn test_rook_captures_down_open_file() {
        test_verdict("4k3/8/8/3p4/8/8/8/3RK3 w - - 0 1", "d1", "d5", "wr", true);
    }

    #[test]
    fn test_rook_cannot_pass_capture() {
        test_verdict("4k3/8/8/3p4/8/8/8/3RK3 w - - 0 1", "d1", "d7", "wr", false);
    }

    #[test]
    fn test_bishop_long_diagonal() {
        test_verdict("4k3/8/8/8/8/8/8/B3K3 w - - 0 1", "a1", "h8", "wb", true);
        test_verdict("4k3/8/8/8/3P4/8/8/B3K3 w - - 0 1", "a1", "h8", "wb", false);
    }

    #[test]
    fn test_queen_is_not_a_knight() {
        test_verdict("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1", "d4", "e6", "wq", false);
        test_verdict("4k3/8/8/8/3Q4/8/8/4K3 w - - 0 1", "d4", "h8", "wq", true);
    }
}

#[cfg(test)]
mod pawn_edge_cases {
    use super::*;

    #[test]
    fn test_diagonal_onto_empty() {
        test_verdict(STARTPOS, "e2", "f3", "wp", false);
    }

    #[test]
    fn test_diagonal_capture() {
        test_verdict("4k3/8/8/8/5p2/4P3/8/4K3 w - - 0 1", "e3", "f4", "wp", true);
        test_verdict("4k3/8/8/8/5p2/4P3/8/4K3 b - - 0 1", "f4", "e3", "bp", true);
    }

    #[test]
    fn test_double_advance_onto_piece() {
        test_verdict("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1", "e2", "e4", "wp", false);
    }

    #[test]
    fn test_double_advance_through_piece() {
        test_verdict("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1", "e2", "e4", "wp", false);
    }
}

#[cfg(test)]
mod malformed_input {
    use super::*;

    #[test]
    fn test_bad_labels() {
        let position = Position::default();
        for label in ["i1", "a0", "a9", "", "a", "a10"] {
            assert_eq!(
                evaluate_codes(&position, label, "a3", "wp"),
                Err(LegalityError::InvalidSquare {
                    label: String::from(label)
                })
            );
        }
    }

    #[test]
    fn test_bad_codes() {
        let position = Position::default();
        assert!(matches!(
            evaluate_codes(&position, "a2", "a3", "wz"),
            Err(LegalityError::UnknownPieceKind { .. })
        ));
        assert!(matches!(
            evaluate_codes(&position, "a2", "a3", "gp"),
            Err(LegalityError::InvalidPieceCode { .. })
        ));
    }
}
