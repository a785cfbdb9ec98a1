/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! The opponent-move document exchanged with a browser board.
//!
//! The board posts the position after the human's move; the reply carries the computer's
//! answer and whether either King is now in check.

use std::{
    collections::BTreeMap,
    io::{BufRead, Write},
    str::FromStr,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{Color, Game, Move, Position, Square};

/// The move the human just made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub from: String,
    pub to: String,
}

/// Sent by the board after the human moves.
///
/// `board_state` maps square labels to piece codes, with `null` (or absence) for an empty square.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentMoveRequest {
    pub board_state: BTreeMap<String, Option<String>>,

    /// Color letter of the side that just moved.
    pub current_player: String,

    #[serde(default)]
    pub last_move: Option<LastMove>,
}

impl OpponentMoveRequest {
    /// Builds a request describing `position` right after `mover` played `last_move`.
    pub fn new(position: &Position, mover: Color, last_move: Option<Move>) -> Self {
        Self {
            board_state: position.to_codes().collect(),
            current_player: mover.char().to_string(),
            last_move: last_move.map(|mv| LastMove {
                from: mv.from().label(),
                to: mv.to().label(),
            }),
        }
    }
}

/// Outcome of an [`OpponentMoveRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// A reply move was found and is included.
    Ok,

    /// The computer's side has nothing to move.
    NoMove,

    /// The request could not be understood; see `message`.
    Error,
}

/// Reply to an [`OpponentMoveRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentMoveResponse {
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_square: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_square: Option<String>,

    /// Code of the piece that moved, like `"bn"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_code: Option<String>,

    pub white_in_check: bool,
    pub black_in_check: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OpponentMoveResponse {
    /// A response for a request that could not be handled.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            from_square: None,
            to_square: None,
            piece_code: None,
            white_in_check: false,
            black_in_check: false,
            message: Some(message.into()),
        }
    }
}

/// Computes the computer's reply to `request`, searching `depth` plies.
///
/// The computer plays the opposite color of `current_player`. Malformed requests produce a
/// response with [`Status::Error`] rather than an `Err`.
///
/// # Example
/// ```
/// # use heron::{protocol::{respond, OpponentMoveRequest, Status}, Color, Move, Position};
/// let mut position = Position::default();
/// let mv = Move::from_uci("e2e4").unwrap();
/// position.make_move(mv);
///
/// let request = OpponentMoveRequest::new(&position, Color::White, Some(mv));
/// let response = respond(&request, 2);
/// assert_eq!(response.status, Status::Ok);
/// assert!(response.piece_code.unwrap().starts_with('b'));
/// ```
pub fn respond(request: &OpponentMoveRequest, depth: usize) -> OpponentMoveResponse {
    match try_respond(request, depth) {
        Ok(response) => response,
        Err(e) => {
            warn!("rejecting opponent-move request: {e:#}");
            OpponentMoveResponse::error(format!("{e:#}"))
        }
    }
}

fn try_respond(request: &OpponentMoveRequest, depth: usize) -> Result<OpponentMoveResponse> {
    let position = Position::from_codes(
        request
            .board_state
            .iter()
            .map(|(label, code)| (label, code.as_deref())),
    )
    .context("Invalid boardState")?;

    let mover = Color::from_str(&request.current_player).context("Invalid currentPlayer")?;

    if let Some(last) = &request.last_move {
        let from = Square::from_label(&last.from).context("Invalid lastMove.from")?;
        let to = Square::from_label(&last.to).context("Invalid lastMove.to")?;

        if position.color_at(to) != Some(mover) {
            warn!("lastMove {from}{to} did not leave a {} piece on {to}", mover.name());
        }
        debug!("{} played {from}{to}", mover.name());
    }

    let mut game = Game::from_position(position, mover.opponent());
    game.set_ai_color(mover.opponent());

    let played = game.play_best_move(depth)?;

    let white_in_check = game.is_in_check(Color::White);
    let black_in_check = game.is_in_check(Color::Black);

    let response = match played {
        Some(played) => OpponentMoveResponse {
            status: Status::Ok,
            from_square: Some(played.mv.from().label()),
            to_square: Some(played.mv.to().label()),
            piece_code: Some(played.piece.code()),
            white_in_check,
            black_in_check,
            message: None,
        },
        None => OpponentMoveResponse {
            status: Status::NoMove,
            from_square: None,
            to_square: None,
            piece_code: None,
            white_in_check,
            black_in_check,
            message: None,
        },
    };

    Ok(response)
}

/// Answers newline-delimited JSON requests from `reader`, writing one JSON response per line to `writer`.
///
/// Blank lines are skipped. Returns once `reader` is exhausted.
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W, depth: usize) -> Result<()> {
    info!("serving opponent-move requests at depth {depth}");

    for line in reader.lines() {
        let line = line.context("Failed to read request")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<OpponentMoveRequest>(line) {
            Ok(request) => respond(&request, depth),
            Err(e) => {
                warn!("malformed request: {e}");
                OpponentMoveResponse::error(format!("Malformed request: {e}"))
            }
        };

        let json = serde_json::to_string(&response).context("Failed to encode response")?;
        writeln!(writer, "{json}").context("Failed to write response")?;
        writer.flush().context("Failed to flush response")?;
    }

    info!("request stream closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_decoding() {
        let request: OpponentMoveRequest = serde_json::from_value(json!({
            "boardState": { "e1": "wk", "e8": "bk", "d5": null },
            "currentPlayer": "w",
            "lastMove": { "from": "e2", "to": "e1" }
        }))
        .unwrap();

        assert_eq!(request.board_state.len(), 3);
        assert_eq!(request.board_state["d5"], None);
        assert_eq!(request.last_move.unwrap().to, "e1");
    }

    #[test]
    fn test_response_field_names() {
        let value = serde_json::to_value(OpponentMoveResponse {
            status: Status::NoMove,
            from_square: None,
            to_square: None,
            piece_code: None,
            white_in_check: true,
            black_in_check: false,
            message: None,
        })
        .unwrap();

        assert_eq!(
            value,
            json!({ "status": "no_move", "white_in_check": true, "black_in_check": false })
        );
    }

    #[test]
    fn test_reply_to_opening_move() {
        let mut position = Position::default();
        let mv = Move::from_uci("e2e4").unwrap();
        position.make_move(mv);

        let response = respond(&OpponentMoveRequest::new(&position, Color::White, Some(mv)), 2);
        assert_eq!(response.status, Status::Ok);

        let from = response.from_square.unwrap();
        let code = response.piece_code.unwrap();
        assert_eq!(
            position.piece_at(from.parse().unwrap()).map(|p| p.code()),
            Some(code)
        );
        assert!(!response.white_in_check);
        assert!(!response.black_in_check);
    }

    #[test]
    fn test_reply_takes_the_king() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/r3K3").unwrap();
        let response = respond(&OpponentMoveRequest::new(&position, Color::White, None), 3);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.from_square.as_deref(), Some("a1"));
        assert_eq!(response.to_square.as_deref(), Some("e1"));
        assert_eq!(response.piece_code.as_deref(), Some("br"));
    }

    #[test]
    fn test_reply_reports_check() {
        // Taking the rook on e4 also checks the White King
        let position = Position::from_fen("k7/8/8/8/1q2R3/8/3P4/4K3").unwrap();
        let response = respond(&OpponentMoveRequest::new(&position, Color::White, None), 1);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.from_square.as_deref(), Some("b4"));
        assert_eq!(response.to_square.as_deref(), Some("e4"));
        assert_eq!(response.piece_code.as_deref(), Some("bq"));
        assert!(response.white_in_check);
        assert!(!response.black_in_check);
    }

    #[test]
    fn test_reply_escapes_check() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4RK2").unwrap();
        let response = respond(&OpponentMoveRequest::new(&position, Color::White, None), 2);
        assert_eq!(response.status, Status::Ok);
        assert_eq!(response.piece_code.as_deref(), Some("bk"));
        assert!(!response.black_in_check);
    }

    #[test]
    fn test_no_move() {
        let position = Position::from_fen("8/8/8/8/8/8/8/4K3").unwrap();
        let response = respond(&OpponentMoveRequest::new(&position, Color::White, None), 3);
        assert_eq!(response.status, Status::NoMove);
        assert_eq!(response.from_square, None);
    }

    #[test]
    fn test_bad_requests() {
        let mut request = OpponentMoveRequest::new(&Position::default(), Color::White, None);
        request
            .board_state
            .insert(String::from("z9"), Some(String::from("wp")));
        assert_eq!(respond(&request, 1).status, Status::Error);

        let mut request = OpponentMoveRequest::new(&Position::default(), Color::White, None);
        request.current_player = String::from("green");
        assert_eq!(respond(&request, 1).status, Status::Error);

        let mut request = OpponentMoveRequest::new(&Position::default(), Color::White, None);
        request
            .board_state
            .insert(String::from("e4"), Some(String::from("wx")));
        let response = respond(&request, 1);
        assert_eq!(response.status, Status::Error);
        assert!(response.message.unwrap().contains("wx"));
    }

    #[test]
    fn test_serve_lines() {
        let mut position = Position::default();
        position.make_move(Move::from_uci("d2d4").unwrap());
        let request = serde_json::to_string(&OpponentMoveRequest::new(&position, Color::White, None)).unwrap();

        let input = format!("{request}\n\nnot json\n");
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, 1).unwrap();

        let output = String::from_utf8(output).unwrap();
        let responses: Vec<OpponentMoveResponse> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].status, Status::Ok);
        assert_eq!(responses[1].status, Status::Error);
    }
}
