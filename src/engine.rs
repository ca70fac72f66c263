//! Single-ply heuristic move evaluation. Every legal move is scored once by a
//! weighted sum of hand-written terms; no tree search happens. How heavily each
//! term counts is governed by a [`Difficulty`], which grows with the player's
//! progress.
use crate::attacks::*;
use crate::boards::*;
use crate::config::DifficultyCurve;
use crate::game_state::*;
use crate::movegen::*;
use crate::moves::*;
use crate::pieces::*;
use crate::positions::*;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Novice,
    Hard,
    Expert,
}

/// Weights derived from a difficulty level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Difficulty {
    pub level: u32,
    pub multiplier: f64,
    pub tier: Tier,
    /// Bonus for moving a piece for the first time, before the multiplier.
    pub development: f64,
}

impl Difficulty {
    pub fn at(level: u32, curve: &DifficultyCurve) -> Difficulty {
        let multiplier = (curve.base_multiplier + curve.multiplier_step * level as f64)
            .min(curve.max_multiplier);
        let tier = if level >= curve.expert_level {
            Tier::Expert
        } else if level >= curve.hard_level {
            Tier::Hard
        } else {
            Tier::Novice
        };
        let development = (curve.development_base - curve.development_step * level as f64)
            .max(curve.development_floor);
        Difficulty {
            level,
            multiplier,
            tier,
            development,
        }
    }

    fn by_tier(&self, novice: f64, hard: f64, expert: f64) -> f64 {
        match self.tier {
            Tier::Novice => novice,
            Tier::Hard => hard,
            Tier::Expert => expert,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMove {
    pub mv: Move,
    pub score: f64,
}

/// Scores moves for the side to move of a game state.
pub struct Evaluator<'a> {
    state: &'a GameState,
    endgame_threshold: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(state: &'a GameState, endgame_threshold: usize) -> Self {
        Evaluator {
            state,
            endgame_threshold,
        }
    }

    /// Heuristic value of `mv`, higher is better. `noise` in [0, 1) is the
    /// only source of randomness; weaker difficulties let it count for more.
    pub fn score(&self, mv: &Move, difficulty: &Difficulty, noise: f64) -> f64 {
        let board = self.state.board();
        let piece = match board.get(mv.start) {
            Some(piece) => piece,
            None => return f64::NEG_INFINITY,
        };
        let color = piece.color;
        let enemy = color.opposite();
        let m = difficulty.multiplier;
        let hard = difficulty.tier >= Tier::Hard;
        let expert = difficulty.tier == Tier::Expert;
        let after = self.state.preview(mv);
        let attacked_after = is_square_attacked(&after, mv.end, enemy);

        let mut score = noise * 8.0 / m;

        if let Some(captured) = mv.captured_kind() {
            let mut capture = captured.value() as f64 * m;
            if hard && attacked_after {
                let trade = captured.value() as f64 - piece.value() as f64;
                capture += if trade > 0.0 { trade * 0.8 } else { trade * 1.2 };
            }
            score += capture;
        }

        let centrality = 7.0 - mv.end.segment_center_distance();
        if hard {
            score += centrality * 3.0 * m;
            score += coordination(board, mv, color) * m;
            score += king_proximity(board, mv, piece) * 2.0 * m;
        } else {
            score += centrality * 2.0 * m;
        }

        if !piece.has_moved {
            score += difficulty.development * m;
        }

        if gives_check(&after, color) {
            score += difficulty.by_tier(40.0, 60.0, 80.0) * m;
        }

        if attacked_after {
            let mut danger = piece.value() as f64 * m / 2.0;
            if expert && !mv.is_capture() {
                danger *= 2.0;
            }
            score -= danger;
        }

        if hard {
            if piece.kind == PieceType::Knight && forks(board, mv.end, enemy) {
                score += 40.0 * m;
            }
            if piece.kind == PieceType::Pawn {
                score += pawn_structure(board, mv, color) * m;
            }
            score += mobility(&after, mv.end) as f64 * m;
        }

        if expert {
            if is_key_square(board, mv.end, enemy) {
                score += 15.0 * m;
            }
            if board.count() < self.endgame_threshold {
                score += endgame(mv, piece.kind) * m;
            }
        }

        if piece.kind == PieceType::King && attacked_after {
            score -= difficulty.by_tier(20.0, 40.0, 60.0) * m;
        }

        score
    }
}

/// Five points for every other friendly piece covering the destination.
fn coordination(board: &Board, mv: &Move, color: Color) -> f64 {
    attackers(board, mv.end, color, Some(mv.start)) as f64 * 5.0
}

/// Rewards staying close to the mover's own king.
fn king_proximity(board: &Board, mv: &Move, piece: &Piece) -> f64 {
    board
        .kings(piece.color)
        .find(|(_, king)| king.army == piece.army)
        .map(|(king, _)| (8.0 - mv.end.manhattan(king) as f64).max(0.0))
        .unwrap_or(0.0)
}

fn gives_check(after: &Board, color: Color) -> bool {
    after
        .kings(color.opposite())
        .any(|(king, _)| is_square_attacked(after, king, color))
}

/// Would a knight on `square` hit at least two of the enemy's king, queens
/// and rooks?
fn forks(board: &Board, square: Position, enemy: Color) -> bool {
    let targets = KNIGHT_OFFSETS
        .iter()
        .filter_map(|offset| square + offset)
        .filter_map(|pos| board.get(pos))
        .filter(|p| p.color == enemy && (p.kind == PieceType::King || p.kind.is_major()))
        .count();
    targets >= 2
}

fn pawn_structure(board: &Board, mv: &Move, color: Color) -> f64 {
    let mut structure = 0.0;
    let advance = mv.end.row() as i16 - mv.start.row() as i16;
    if advance.signum() == color.forward() {
        structure += 10.0;
    }

    let col = mv.end.col() as i16;
    let supported = board.pieces_of(color).any(|(pos, p)| {
        p.kind == PieceType::Pawn && (pos.col() as i16 - col).abs() == 1
    });
    if !supported {
        structure -= 5.0;
    }
    structure
}

/// The four centre squares of the destination's segment, and every square
/// touching an enemy king.
fn is_key_square(board: &Board, square: Position, enemy: Color) -> bool {
    let segment_row = square.row() % SEGMENT_ROWS;
    if (3..=4).contains(&segment_row) && (3..=4).contains(&square.col()) {
        return true;
    }
    board.kings(enemy).any(|(king, _)| {
        king.row_distance(square) <= 1 && king.col().abs_diff(square.col()) <= 1
    })
}

fn endgame(mv: &Move, kind: PieceType) -> f64 {
    match kind {
        PieceType::King => (7.0 - mv.end.segment_center_distance()) * 5.0,
        PieceType::Rook | PieceType::Queen => 10.0,
        _ => 0.0,
    }
}

/// Draws uniformly among the moves sharing the highest score.
pub fn pick_best<R: Rng>(scored: Vec<ScoredMove>, rng: &mut R) -> Option<ScoredMove> {
    let best = scored
        .iter()
        .map(|s| s.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let top: Vec<ScoredMove> = scored.into_iter().filter(|s| s.score == best).collect();
    top.choose(rng).cloned()
}

/// Scores every legal move of the side to move, each with a fresh noise draw,
/// and picks the best. Each move is weighed at the difficulty of the piece
/// making it, so armies of different depth play at different strengths.
/// None when there is nothing to play.
pub fn select_move<R, F>(
    state: &GameState,
    difficulty_of: F,
    endgame_threshold: usize,
    rng: &mut R,
) -> Option<ScoredMove>
where
    R: Rng,
    F: Fn(&Piece) -> Difficulty,
{
    let evaluator = Evaluator::new(state, endgame_threshold);
    let scored: Vec<ScoredMove> = state
        .all_legal_moves()
        .into_iter()
        .filter_map(|mv| {
            let difficulty = difficulty_of(state.board().get(mv.start)?);
            let score = evaluator.score(&mv, &difficulty, rng.gen::<f64>());
            trace!(%mv, score, "scored move");
            Some(ScoredMove { mv, score })
        })
        .collect();
    pick_best(scored, rng)
}
