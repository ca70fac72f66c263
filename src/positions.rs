use crate::chess_errors::*;
use std::fmt::{self, Display};
use std::ops;
use std::str::FromStr;

// Squares on a board that is always eight files wide but may be taller than
// eight rows (the extended board stacks several armies on top of each other).
//
// Row 0 is White's back rank, so row and printed rank differ by one:
//
//     a   b   c   d   e   f   g   h
//   --------------------------------
// 8 | 7,0 7,1 7,2 7,3 7,4 7,5 7,6 7,7 | 8
// 7 | 6,0 ...                         | 7
// ...
// 2 | 1,0 ...                         | 2
// 1 | 0,0 0,1 0,2 0,3 0,4 0,5 0,6 0,7 | 1
//   --------------------------------
//     a   b   c   d   e   f   g   h
//
// ---------------------------------------------
// Positions
// ---------------------------------------------

pub const FILES: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    row: u8,
    col: u8,
}

/// A step on the board, saved as (row, col).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Delta(pub i16, pub i16);

impl Position {
    pub const fn new(row: u8, col: u8) -> Position {
        Position { row, col }
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    pub fn manhattan(self, other: Position) -> u16 {
        (self.row as i16 - other.row as i16).unsigned_abs()
            + (self.col as i16 - other.col as i16).unsigned_abs()
    }

    pub fn row_distance(self, other: Position) -> u8 {
        self.row.abs_diff(other.row)
    }

    /// Manhattan distance from the centre of the eight-row segment containing
    /// this square. For a standard board that is the board centre (3.5, 3.5).
    pub fn segment_center_distance(self) -> f64 {
        let segment_row = (self.row % 8) as f64;
        (3.5 - segment_row).abs() + (3.5 - self.col as f64).abs()
    }
}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Error is rather big, so we use a closure to avoid copies
        let err_closure = || -> ChessError { ChessError::Parse(s.to_string()) };
        let mut chars = s.trim().chars();

        let file = chars.next().ok_or_else(err_closure)?.to_ascii_lowercase();
        let col = FILES
            .iter()
            .position(|f| *f == file)
            .ok_or_else(err_closure)?;
        let rank: u16 = chars.as_str().parse().map_err(|_| err_closure())?;

        if rank == 0 || rank > u8::MAX as u16 {
            return Err(err_closure());
        }
        Ok(Position::new((rank - 1) as u8, col as u8))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match FILES.get(self.col as usize) {
            Some(file) => write!(f, "{}{}", file, self.row as u16 + 1),
            None => write!(f, "?{}", self.row as u16 + 1),
        }
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self, self.row, self.col)
    }
}

// Stepping off the edge of the u8 range yields None. Whether the result is on
// the board is for the board to decide.
impl_op_ex!(+ |a: &Position, b: &Delta| -> Option<Position> {
    let row = a.row as i16 + b.0;
    let col = a.col as i16 + b.1;
    if row < 0 || col < 0 || row > u8::MAX as i16 || col > u8::MAX as i16 {
        None
    } else {
        Some(Position::new(row as u8, col as u8))
    }
});

impl ops::Mul<i16> for Delta {
    type Output = Delta;

    fn mul(self, rhs: i16) -> Delta {
        Delta(self.0 * rhs, self.1 * rhs)
    }
}
