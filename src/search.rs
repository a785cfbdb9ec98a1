/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    cmp::Reverse,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::{bail, Result};
use tracing::{debug, info};
use uci_parser::UciSearchOptions;

use crate::{rules, value_of, Color, Evaluator, Move, Position, Score};

/// Depth searched when none is requested.
pub const DEFAULT_DEPTH: usize = 3;

/// Maximum depth that can be searched.
pub const MAX_DEPTH: usize = 32;

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    pub bestmove: Option<Move>,

    /// Evaluation of the position after `bestmove` is made, from the searching side's perspective.
    pub score: Score,

    /// Deepest fully-completed search depth.
    pub depth: usize,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: -Score::INF,
            depth: 0,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    pub max_depth: usize,

    /// Node allowance.
    ///
    /// If the search exceeds this many nodes, it will exit as quickly as possible.
    pub max_nodes: u64,
}

impl SearchConfig {
    /// Constructs a [`SearchConfig`] that searches to `depth`, clamped to `[1, MAX_DEPTH]`.
    #[inline(always)]
    pub fn with_depth(depth: usize) -> Self {
        Self {
            max_depth: depth.clamp(1, MAX_DEPTH),
            ..Default::default()
        }
    }

    /// Constructs a new [`SearchConfig`] from the provided UCI options.
    ///
    /// Only `depth` and `nodes` are honored; anything time-related is ignored.
    pub fn new(options: UciSearchOptions, default_depth: usize) -> Self {
        let mut config = Self::with_depth(default_depth);

        if let Some(depth) = options.depth {
            config.max_depth = (depth as usize).clamp(1, MAX_DEPTH);
        }

        if let Some(nodes) = options.nodes {
            config.max_nodes = nodes as u64;
        }

        config
    }
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            max_nodes: u64::MAX,
        }
    }
}

/// Executes a fixed-depth search for `side` on the provided position.
pub struct Search<'a> {
    /// The position to search on.
    ///
    /// This position will be copied when moves are applied to it.
    position: &'a Position,

    /// The side to find a move for.
    side: Color,

    /// The result of the search, updated as-needed during search.
    result: SearchResult,

    /// An atomic flag to determine if the search should be cancelled at any time.
    ///
    /// If this is ever `false`, the search will exit as soon as possible.
    is_searching: Arc<AtomicBool>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to find a move for `side` on `position`.
    #[inline(always)]
    pub fn new(
        position: &'a Position,
        side: Color,
        is_searching: Arc<AtomicBool>,
        config: SearchConfig,
    ) -> Self {
        let moves = ordered_moves(position, side);

        let result = SearchResult {
            // Initialize `bestmove` to the first move available
            bestmove: moves.first().copied(),
            score: if moves.is_empty() {
                Evaluator::new(position).eval_for(side)
            } else {
                -Score::INF
            },
            ..Default::default()
        };

        Self {
            position,
            side,
            result,
            is_searching,
            config,
        }
    }

    /// Convenience wrapper that runs an uncancellable search to `depth`.
    ///
    /// # Example
    /// ```
    /// # use heron::{Color, Position, Search};
    /// // White can take the undefended queen
    /// let position = Position::from_fen("4k3/8/8/Q7/8/2q5/8/7K").unwrap();
    /// let res = Search::run(&position, Color::White, 2);
    /// assert_eq!(res.bestmove.unwrap().to_string(), "a5c3");
    /// ```
    pub fn run(position: &Position, side: Color, depth: usize) -> SearchResult {
        let is_searching = Arc::new(AtomicBool::new(true));
        Search::new(position, side, is_searching, SearchConfig::with_depth(depth)).start()
    }

    /// Start the search, returning its results.
    ///
    /// This is the entrypoint of the search. It logs progress, calls [`Self::iterative_deepening`],
    /// and clears the `is_searching` flag on exit.
    pub fn start(mut self) -> SearchResult {
        debug!(
            side = self.side.name(),
            depth = self.config.max_depth,
            "starting search on {}",
            self.position.to_fen()
        );

        let starttime = Instant::now();
        let res = self.iterative_deepening();

        info!(
            bestmove = %res.bestmove.map(|mv| mv.to_string()).unwrap_or_else(|| String::from("(none)")),
            score = res.score.0,
            depth = res.depth,
            nodes = res.nodes,
            ms = starttime.elapsed().as_millis() as u64,
            "search finished"
        );

        // Search has concluded, alert other threads that we are no longer searching
        self.is_searching.store(false, Ordering::Relaxed);

        res
    }

    /// Performs [iterative deepening](https://www.chessprogramming.org/Iterative_Deepening) on the Search's position.
    ///
    /// Each depth from `1` to the configured maximum is searched in turn. If a depth is cancelled
    /// part-way through, the result of the last fully-completed depth is returned.
    fn iterative_deepening(&mut self) -> SearchResult {
        let mut res = self.result;

        if res.bestmove.is_none() {
            return res;
        }

        let mut depth = 1;
        while self.is_searching.load(Ordering::Relaxed) && depth <= self.config.max_depth {
            self.result.score = -Score::INF;

            if let Err(e) = self.negamax(*self.position, self.side, depth, 0, -Score::INF, Score::INF)
            {
                debug!("search cancelled during depth {depth}: {e}");
                break;
            }

            self.result.depth = depth;
            res = self.result;

            debug!(
                depth,
                nodes = res.nodes,
                score = ?res.score,
                "completed depth with bestmove {:?}",
                res.bestmove
            );

            // No point searching deeper once the King falls.
            if res.score.is_win() {
                break;
            }

            depth += 1;
        }

        res.nodes = self.result.nodes;
        res
    }

    /// Primary location of search logic.
    ///
    /// Uses the [negamax](https://www.chessprogramming.org/Negamax) algorithm with
    /// [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta).
    /// `side` is the side to move in `position`.
    fn negamax(
        &mut self,
        position: Position,
        side: Color,
        depth: usize,
        ply: i32,
        mut alpha: Score,
        beta: Score,
    ) -> Result<Score> {
        self.result.nodes += 1;

        // Our King was captured on the previous ply. Prefer losing it later.
        if position.king(side).is_none() {
            return Ok(-Score::WIN + ply);
        }

        // If we've reached a terminal node, evaluate the position
        if depth == 0 {
            return Ok(Evaluator::new(&position).eval_for(side));
        }

        let moves = ordered_moves(&position, side);

        // Stalemate and checkmate are not recognized; a side with no moves is just scored.
        if moves.is_empty() {
            return Ok(Evaluator::new(&position).eval_for(side));
        }

        let mut best = -Score::INF;

        for mv in moves {
            // The search was stopped by an external factor, like the `stop` command
            if !self.is_searching.load(Ordering::Relaxed) {
                bail!("cancelled by external command");
            }

            if self.result.nodes >= self.config.max_nodes {
                let nodes = self.config.max_nodes;
                bail!("exceeded node allowance of {nodes} nodes");
            }

            // Copy-make the new position
            let new_position = position.with_move_made(mv);

            let score = -self.negamax(
                new_position,
                side.opponent(),
                depth - 1,
                ply + 1,
                -beta,
                -alpha,
            )?;

            if score > best {
                best = score;

                if ply == 0 {
                    self.result.bestmove = Some(mv);
                    self.result.score = score;
                }
            }

            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        Ok(best)
    }
}

/// Every move available to `side`, most valuable captures first.
///
/// Non-captures keep their generation order, so results are deterministic.
fn ordered_moves(position: &Position, side: Color) -> Vec<Move> {
    let mut moves = rules::legal_moves(position, side);
    moves.sort_by_key(|mv| Reverse(position.kind_at(mv.to()).map_or(0, value_of)));
    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain negamax without pruning.
    fn minimax(position: Position, side: Color, depth: usize, ply: i32) -> Score {
        if position.king(side).is_none() {
            return -Score::WIN + ply;
        }
        let moves = rules::legal_moves(&position, side);
        if depth == 0 || moves.is_empty() {
            return Evaluator::new(&position).eval_for(side);
        }

        moves
            .into_iter()
            .map(|mv| -minimax(position.with_move_made(mv), side.opponent(), depth - 1, ply + 1))
            .max()
            .unwrap()
    }

    #[test]
    fn test_captures_hanging_queen() {
        let position: Position = "4k3/8/8/Q7/8/2q5/8/7K".parse().unwrap();
        let res = Search::run(&position, Color::Black, 1);
        assert_eq!(res.bestmove.unwrap().to_string(), "c3a5");
        assert_eq!(res.score, Score(900));
    }

    #[test]
    fn test_captures_king_when_possible() {
        let position: Position = "4k3/8/8/8/8/8/8/r3K3".parse().unwrap();
        let res = Search::run(&position, Color::Black, 3);
        assert_eq!(res.bestmove.unwrap().to_string(), "a1e1");
        assert!(res.score.is_win());
        assert_eq!(res.score.plies_to_win(), Some(1));
    }

    #[test]
    fn test_no_moves() {
        let position: Position = "8/8/8/8/8/8/8/8".parse().unwrap();
        let res = Search::run(&position, Color::White, 3);
        assert_eq!(res.bestmove, None);
        assert_eq!(res.nodes, 0);
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        let fens = [
            "4k3/8/8/Q7/8/2q5/8/7K",
            "r3k3/1p6/8/3N4/8/8/8/4K2R",
            "4k3/3p4/8/1B6/8/8/8/4K3",
        ];

        for fen in fens {
            let position: Position = fen.parse().unwrap();
            for side in Color::all() {
                let res = Search::run(&position, side, 2);
                let expected = minimax(position, side, 2, 0);
                assert_eq!(res.score, expected, "{fen} for {side:?}");
            }
        }
    }

    #[test]
    fn test_stopped_search_keeps_first_move() {
        let position = Position::default();
        let is_searching = Arc::new(AtomicBool::new(false));
        let res = Search::new(&position, Color::White, is_searching, SearchConfig::default()).start();
        assert!(res.bestmove.is_some());
        assert_eq!(res.depth, 0);
    }

    #[test]
    fn test_node_allowance() {
        let position = Position::default();
        let config = SearchConfig {
            max_depth: 6,
            max_nodes: 500,
        };
        let is_searching = Arc::new(AtomicBool::new(true));
        let res = Search::new(&position, Color::White, is_searching, config).start();
        assert!(res.depth < 6);
        assert!(res.bestmove.is_some());
    }
}
