use crate::chess_errors::*;
use std::fmt::{self, Display};
use std::str::FromStr;

// ---------------------------------------------
// Pieces
// ---------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

/// Opaque identity of a piece. Stable for the piece's whole life, including
/// across board resets, and unrelated to where the piece stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u32);

/// Hands out fresh piece ids for one game.
#[derive(Debug, Clone, Default)]
pub struct IdSource(u32);

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
    pub has_moved: bool,
    pub id: PieceId,
    /// Index of the Black army this piece belongs to. Always 0 for White.
    pub army: u8,
}

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Pieces a pawn may turn into.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Material value used by the evaluation engine.
    pub fn value(self) -> u32 {
        use PieceType::*;
        match self {
            Pawn => 10,
            Knight => 30,
            Bishop => 30,
            Rook => 50,
            Queen => 90,
            King => 1000,
        }
    }

    pub fn name(self) -> &'static str {
        use PieceType::*;
        match self {
            Pawn => "pawn",
            Knight => "knight",
            Bishop => "bishop",
            Rook => "rook",
            Queen => "queen",
            King => "king",
        }
    }

    /// Letter used in move notation. Pawns have none.
    pub fn algebraic(self) -> &'static str {
        use PieceType::*;
        match self {
            Pawn => "",
            Knight => "N",
            Bishop => "B",
            Rook => "R",
            Queen => "Q",
            King => "K",
        }
    }

    pub fn is_major(self) -> bool {
        matches!(self, PieceType::Rook | PieceType::Queen)
    }
}

impl Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            write!(f, "{}{}", first.to_ascii_uppercase(), chars.as_str())?;
        }
        Ok(())
    }
}

impl FromStr for PieceType {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use PieceType::*;
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "pawn" => Ok(Pawn),
            "n" | "knight" => Ok(Knight),
            "b" | "bishop" => Ok(Bishop),
            "r" | "rook" => Ok(Rook),
            "q" | "queen" => Ok(Queen),
            "k" | "king" => Ok(King),
            _ => Err(ChessError::Parse(s.to_string())),
        }
    }
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    /// Row direction in which this color's pawns advance.
    pub fn forward(self) -> i16 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

impl IdSource {
    /// An id source that will never hand out an id already used by `taken`.
    pub fn following<'a, I>(taken: I) -> IdSource
    where
        I: IntoIterator<Item = &'a PieceId>,
    {
        IdSource(taken.into_iter().map(|id| id.0 + 1).max().unwrap_or(0))
    }

    pub fn next_id(&mut self) -> PieceId {
        let id = PieceId(self.0);
        self.0 += 1;
        id
    }
}

impl Piece {
    pub fn new(kind: PieceType, color: Color, id: PieceId) -> Piece {
        Piece {
            kind,
            color,
            has_moved: false,
            id,
            army: 0,
        }
    }

    pub fn in_army(mut self, army: u8) -> Piece {
        self.army = army;
        self
    }

    pub fn value(&self) -> u32 {
        self.kind.value()
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use PieceType::*;
        let symbol = match (self.color, self.kind) {
            (Color::White, King) => '\u{2654}',
            (Color::White, Queen) => '\u{2655}',
            (Color::White, Rook) => '\u{2656}',
            (Color::White, Bishop) => '\u{2657}',
            (Color::White, Knight) => '\u{2658}',
            (Color::White, Pawn) => '\u{2659}',
            (Color::Black, King) => '\u{265a}',
            (Color::Black, Queen) => '\u{265b}',
            (Color::Black, Rook) => '\u{265c}',
            (Color::Black, Bishop) => '\u{265d}',
            (Color::Black, Knight) => '\u{265e}',
            (Color::Black, Pawn) => '\u{265f}',
        };
        write!(f, "{}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_type_names() {
        assert_eq!(PieceType::Knight.to_string(), "Knight");
        assert_eq!("queen".parse::<PieceType>().unwrap(), PieceType::Queen);
        assert_eq!("N".parse::<PieceType>().unwrap(), PieceType::Knight);
        assert!("dragon".parse::<PieceType>().is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdSource::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);

        let mut after = IdSource::following([a, b].iter());
        let c = after.next_id();
        assert!(c > a && c > b);
    }

    #[test]
    fn test_colors() {
        assert_eq!(Color::White.opposite(), Color::Black);
        assert_eq!(Color::White.forward(), -Color::Black.forward());
    }
}
