use crate::pieces::{Color, PieceType};
use crate::positions::Position;
use thiserror::Error;

// ---------------------------------------------
// Error Handling
// ---------------------------------------------

/// Everything the engine can refuse to do. Apart from `MissingKing`, every
/// variant is a rejection: nothing was mutated and the caller may simply
/// re-prompt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChessError {
    #[error("Illegal move {from} → {to}")]
    IllegalMove { from: Position, to: Position },

    #[error("No piece on {0}")]
    NoPieceSelected(Position),

    #[error("Piece on {0} does not belong to the side to move")]
    WrongSideSelected(Position),

    /// The board lost a king it structurally needs. Check detection has no
    /// meaning without one, so the game instance cannot continue.
    #[error("No {0} king on the board")]
    MissingKing(Color),

    #[error("A choice has to be made before play continues")]
    ChoicePending,

    #[error("No choice is pending")]
    NoChoicePending,

    #[error("{0} is not one of the offered choices")]
    InvalidChoice(PieceType),

    #[error("The game is over")]
    GameOver,

    #[error("Square {0} is off the board")]
    OffBoard(Position),

    #[error("Square {0} is already occupied")]
    Occupied(Position),

    #[error("Could not parse {0:?}")]
    Parse(String),
}

pub type ChessResult<T> = std::result::Result<T, ChessError>;

impl ChessError {
    /// Fatal errors end the current game instance; all others are plain
    /// rejections.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ChessError::MissingKing(_))
    }

    /// Clicking an empty square or an enemy piece is a deselection, not a
    /// failure worth reporting.
    pub fn is_deselection(&self) -> bool {
        matches!(
            self,
            ChessError::NoPieceSelected(_) | ChessError::WrongSideSelected(_)
        )
    }
}
