//! The roguelike layer on top of the rules: which armies White faces, what
//! White keeps between boards and what it earns for clearing one.
use crate::boards::*;
use crate::chess_errors::*;
use crate::config::ProgressionMode;
use crate::pieces::*;
use crate::positions::*;
use lazy_static::lazy_static;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::fmt::{self, Display};
use tracing::warn;

pub const BACK_ROW: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

// ---------------------------------------------
// Reinforcements
// ---------------------------------------------

const REINFORCEMENT_POOL: [(PieceType, u32); 6] = [
    (PieceType::Pawn, 30),
    (PieceType::Rook, 20),
    (PieceType::Knight, 20),
    (PieceType::Bishop, 20),
    (PieceType::Queen, 8),
    (PieceType::King, 2),
];

lazy_static! {
    static ref REINFORCEMENT_WEIGHTS: WeightedIndex<u32> =
        WeightedIndex::new(REINFORCEMENT_POOL.iter().map(|(_, weight)| *weight))
            .expect("reinforcement weights are positive");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn of(kind: PieceType) -> Rarity {
        match kind {
            PieceType::Queen => Rarity::Rare,
            PieceType::King => Rarity::Legendary,
            _ => Rarity::Common,
        }
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rarity::Common => write!(f, "common"),
            Rarity::Rare => write!(f, "rare"),
            Rarity::Legendary => write!(f, "legendary"),
        }
    }
}

/// Draws `count` distinct piece types by weight, redrawing repeats. Asking
/// for more than there are types returns every type.
pub fn draw_reinforcements<R: Rng>(rng: &mut R, count: usize) -> Vec<PieceType> {
    let count = count.min(REINFORCEMENT_POOL.len());
    let mut drawn = Vec::with_capacity(count);
    while drawn.len() < count {
        let (kind, _) = REINFORCEMENT_POOL[REINFORCEMENT_WEIGHTS.sample(rng)];
        if !drawn.contains(&kind) {
            drawn.push(kind);
        }
    }
    drawn
}

// ---------------------------------------------
// Survivor roster
// ---------------------------------------------

/// Rows at the bottom of a standard board that White sets up on.
const HOME_ROWS: u8 = 2;

/// Where a White piece is placed when a new board is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// One of the original sixteen, returning to its starting square.
    Home(Position),
    /// Earned between boards; takes the first free square.
    Reward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enlisted {
    pub id: PieceId,
    pub kind: PieceType,
    pub origin: Origin,
}

/// The White pieces still alive across boards, by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    members: Vec<Enlisted>,
}

impl Roster {
    /// Enlists every White piece on the board. Pieces on White's two home
    /// rows keep their square; anything further up the board is placed like
    /// a reward, since a fresh Black army will stand there.
    pub fn from_board(board: &Board) -> Roster {
        Roster {
            members: board
                .pieces_of(Color::White)
                .map(|(pos, p)| Enlisted {
                    id: p.id,
                    kind: p.kind,
                    origin: if pos.row() < HOME_ROWS {
                        Origin::Home(pos)
                    } else {
                        Origin::Reward
                    },
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enlisted> {
        self.members.iter()
    }

    pub fn contains(&self, id: PieceId) -> bool {
        self.members.iter().any(|e| e.id == id)
    }

    /// Drops a fallen piece. Returns whether it was enlisted.
    pub fn remove(&mut self, id: PieceId) -> bool {
        let before = self.members.len();
        self.members.retain(|e| e.id != id);
        self.members.len() != before
    }

    /// Records a promotion.
    pub fn set_kind(&mut self, id: PieceId, kind: PieceType) {
        if let Some(member) = self.members.iter_mut().find(|e| e.id == id) {
            member.kind = kind;
        }
    }

    pub fn enlist_reward(&mut self, id: PieceId, kind: PieceType) {
        self.members.push(Enlisted {
            id,
            kind,
            origin: Origin::Reward,
        });
    }

    pub fn ids(&self) -> impl Iterator<Item = &PieceId> {
        self.members.iter().map(|e| &e.id)
    }
}

// ---------------------------------------------
// Board setup
// ---------------------------------------------

/// Sets up a fresh Black army in segment `army`: pawns on row `8·army + 6`,
/// pieces on row `8·army + 7`.
pub fn muster_black_army(board: &mut Board, army: u8, ids: &mut IdSource) -> ChessResult<()> {
    let base = army
        .checked_mul(SEGMENT_ROWS)
        .filter(|base| *base <= u8::MAX - (SEGMENT_ROWS - 1))
        .ok_or(ChessError::OffBoard(Position::new(u8::MAX, 0)))?;
    for (col, kind) in BACK_ROW.iter().enumerate() {
        let col = col as u8;
        board.place(
            Position::new(base + 6, col),
            Piece::new(PieceType::Pawn, Color::Black, ids.next_id()).in_army(army),
        )?;
        board.place(
            Position::new(base + 7, col),
            Piece::new(*kind, Color::Black, ids.next_id()).in_army(army),
        )?;
    }
    Ok(())
}

/// The opening position of a session: White's standard army on rows 0 and 1
/// and one Black army per segment.
pub fn opening_board(mode: ProgressionMode, ids: &mut IdSource) -> ChessResult<Board> {
    let armies = mode.armies();
    let mut board = Board::empty(armies * SEGMENT_ROWS);
    for (col, kind) in BACK_ROW.iter().enumerate() {
        let col = col as u8;
        board.place(
            Position::new(0, col),
            Piece::new(*kind, Color::White, ids.next_id()),
        )?;
        board.place(
            Position::new(1, col),
            Piece::new(PieceType::Pawn, Color::White, ids.next_id()),
        )?;
    }
    for army in 0..armies {
        muster_black_army(&mut board, army, ids)?;
    }
    Ok(board)
}

/// The next standard board: a fresh Black army, then the roster replayed.
/// Originals return home, rewards fill the first free squares scanning from
/// White's back rank upwards, a to h. Every replayed piece starts unmoved.
pub fn next_board(roster: &Roster, ids: &mut IdSource) -> ChessResult<Board> {
    let mut board = Board::empty(SEGMENT_ROWS);
    muster_black_army(&mut board, 0, ids)?;

    let (originals, rewards): (Vec<&Enlisted>, Vec<&Enlisted>) = roster
        .iter()
        .partition(|e| matches!(e.origin, Origin::Home(_)));

    for member in originals {
        if let Origin::Home(pos) = member.origin {
            let piece = Piece {
                kind: member.kind,
                color: Color::White,
                has_moved: false,
                id: member.id,
                army: 0,
            };
            board.place(pos, piece)?;
        }
    }

    for member in rewards {
        let free = board.positions().find(|pos| board.is_empty_at(*pos));
        match free {
            Some(pos) => {
                let piece = Piece {
                    kind: member.kind,
                    color: Color::White,
                    has_moved: false,
                    id: member.id,
                    army: 0,
                };
                board.place(pos, piece)?;
            }
            None => warn!(kind = %member.kind, "no free square left for reinforcement"),
        }
    }
    Ok(board)
}

/// Armies with at least one piece within `distance` rows of some White piece.
pub fn armies_in_reach(board: &Board, distance: u8) -> Vec<u8> {
    let whites: Vec<Position> = board.pieces_of(Color::White).map(|(pos, _)| pos).collect();
    let mut armies: Vec<u8> = board
        .pieces_of(Color::Black)
        .filter(|(pos, _)| whites.iter().any(|w| w.row_distance(*pos) <= distance))
        .map(|(_, p)| p.army)
        .collect();
    armies.sort_unstable();
    armies.dedup();
    armies
}

/// Black armies with pieces left on the board.
pub fn remaining_armies(board: &Board) -> Vec<u8> {
    let mut armies: Vec<u8> = board.pieces_of(Color::Black).map(|(_, p)| p.army).collect();
    armies.sort_unstable();
    armies.dedup();
    armies
}

/// Difficulty level of the army to move: boards cleared so far when
/// resetting, the army's depth on the extended board otherwise.
pub fn difficulty_level(
    mode: ProgressionMode,
    cleared: u32,
    army: u8,
    army_level_step: u32,
) -> u32 {
    match mode {
        ProgressionMode::ResetAndReinforce => cleared,
        ProgressionMode::PersistentArmies { .. } => army as u32 * army_level_step,
    }
}
