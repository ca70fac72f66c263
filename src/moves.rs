//! Describing the moves that can be done on a board.
use crate::pieces::*;
use crate::positions::*;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub start: Position,
    pub end: Position,
    pub piece: PieceType,
    pub kind: MoveType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveType {
    Standard,
    Capture(PieceType),
    PawnTwostep,
    /// Captures the pawn that just passed by with a two-step advance.
    EnPassant,
    Castle(CastleSide),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// Column of the rook taking part in the castle.
    pub fn rook_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 7,
            CastleSide::Queenside => 0,
        }
    }

    /// Column the rook ends up on.
    pub fn rook_target_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 5,
            CastleSide::Queenside => 3,
        }
    }

    /// Column the king ends up on.
    pub fn king_target_col(self) -> u8 {
        match self {
            CastleSide::Kingside => 6,
            CastleSide::Queenside => 2,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MoveType::Castle(CastleSide::Kingside) => write!(f, "O-O"),
            MoveType::Castle(CastleSide::Queenside) => write!(f, "O-O-O"),
            _ => write!(
                f,
                "{}{}{}{}",
                self.piece.algebraic(),
                self.start,
                if self.is_capture() { "x" } else { "-" },
                self.end
            ),
        }
    }
}

impl Move {
    pub fn new(start: Position, end: Position, piece: PieceType, kind: MoveType) -> Self {
        Move {
            start,
            end,
            piece,
            kind,
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self.kind, MoveType::Capture(_) | MoveType::EnPassant)
    }

    /// Square of the piece this move takes, if any. Differs from `end` only
    /// for en passant.
    pub fn capture_square(&self) -> Option<Position> {
        match self.kind {
            MoveType::Capture(_) => Some(self.end),
            MoveType::EnPassant => Some(Position::new(self.start.row(), self.end.col())),
            _ => None,
        }
    }

    /// Kind of the piece this move takes, if any.
    pub fn captured_kind(&self) -> Option<PieceType> {
        match self.kind {
            MoveType::Capture(kind) => Some(kind),
            MoveType::EnPassant => Some(PieceType::Pawn),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        s.parse().unwrap()
    }

    #[test]
    fn test_display() {
        let mv = Move::new(sq("g1"), sq("f3"), PieceType::Knight, MoveType::Standard);
        assert_eq!(mv.to_string(), "Ng1-f3");
        let mv = Move::new(
            sq("e4"),
            sq("d5"),
            PieceType::Pawn,
            MoveType::Capture(PieceType::Pawn),
        );
        assert_eq!(mv.to_string(), "e4xd5");
        let mv = Move::new(
            sq("e1"),
            sq("c1"),
            PieceType::King,
            MoveType::Castle(CastleSide::Queenside),
        );
        assert_eq!(mv.to_string(), "O-O-O");
    }

    #[test]
    fn test_en_passant_capture_square() {
        let mv = Move::new(sq("e5"), sq("d6"), PieceType::Pawn, MoveType::EnPassant);
        assert_eq!(mv.capture_square(), Some(sq("d5")));
        assert_eq!(mv.captured_kind(), Some(PieceType::Pawn));
        assert!(mv.is_capture());
    }
}
