use crate::chess_errors::*;
use crate::pieces::*;
use crate::positions::*;
use std::fmt::{self, Display};

// ---------------------------------------------
// Board Types
// ---------------------------------------------

pub const BOARD_WIDTH: u8 = 8;
/// Rows making up one army's board. The extended board is a stack of these.
pub const SEGMENT_ROWS: u8 = 8;
/// Most armies that fit on one board with rows counted in a `u8`.
pub const MAX_ARMIES: u8 = u8::MAX / SEGMENT_ROWS;

/// Mailbox board: one cell per square, each empty or owning one piece.
/// Cloning deep-copies every piece, so a clone can be played on freely.
#[derive(Clone, PartialEq, Debug)]
pub struct Board {
    rows: u8,
    squares: Vec<Option<Piece>>,
}

impl Board {
    pub fn empty(rows: u8) -> Board {
        Board {
            rows,
            squares: vec![None; rows as usize * BOARD_WIDTH as usize],
        }
    }

    /// Builds a board from a diagram, top row first. Uppercase letters are
    /// White, lowercase Black, '.' an empty square. Black pieces belong to the
    /// army of the segment they stand in. Pawns off their home row count as
    /// moved; everything else starts unmoved.
    pub fn from_ascii(diagram: &[&str], ids: &mut IdSource) -> ChessResult<Board> {
        let rows = diagram.len() as u8;
        let mut board = Board::empty(rows);

        for (i, line) in diagram.iter().enumerate() {
            let row = rows - 1 - i as u8;
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != BOARD_WIDTH as usize {
                return Err(ChessError::Parse(line.to_string()));
            }
            for (col, c) in cells.into_iter().enumerate() {
                if c == '.' {
                    continue;
                }
                let kind: PieceType = c.to_string().parse()?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let mut piece = Piece::new(kind, color, ids.next_id());
                if color == Color::Black {
                    piece.army = row / SEGMENT_ROWS;
                }
                if kind == PieceType::Pawn {
                    let home_row = match color {
                        Color::White => 1,
                        Color::Black => (row / SEGMENT_ROWS) * SEGMENT_ROWS + 6,
                    };
                    piece.has_moved = row != home_row;
                }
                board.place(Position::new(row, col as u8), piece)?;
            }
        }
        Ok(board)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row() < self.rows && pos.col() < BOARD_WIDTH
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.row() as usize * BOARD_WIDTH as usize + pos.col() as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Piece> {
        self.index(pos).and_then(|i| self.squares[i].as_ref())
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Piece> {
        match self.index(pos) {
            Some(i) => self.squares[i].as_mut(),
            None => None,
        }
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.contains(pos) && self.get(pos).is_none()
    }

    /// Puts a piece on an empty square.
    pub fn place(&mut self, pos: Position, piece: Piece) -> ChessResult<()> {
        let i = self.index(pos).ok_or(ChessError::OffBoard(pos))?;
        let current = &mut self.squares[i];
        if current.is_some() {
            Err(ChessError::Occupied(pos))
        } else {
            *current = Some(piece);
            Ok(())
        }
    }

    /// Puts a piece on a square, handing back whatever stood there. Squares
    /// off the board give the piece straight back.
    pub fn put(&mut self, pos: Position, piece: Piece) -> Option<Piece> {
        match self.index(pos) {
            Some(i) => self.squares[i].replace(piece),
            None => Some(piece),
        }
    }

    pub fn take(&mut self, pos: Position) -> Option<Piece> {
        self.index(pos).and_then(|i| self.squares[i].take())
    }

    /// Iterates over all squares, White's back rank first.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let rows = self.rows;
        (0..rows).flat_map(|row| (0..BOARD_WIDTH).map(move |col| Position::new(row, col)))
    }

    pub fn pieces(&self) -> impl Iterator<Item = (Position, &Piece)> + '_ {
        self.positions().filter_map(move |pos| self.get(pos).map(|p| (pos, p)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Position, &Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.color == color)
    }

    pub fn kings(&self, color: Color) -> impl Iterator<Item = (Position, &Piece)> + '_ {
        self.pieces_of(color)
            .filter(|(_, p)| p.kind == PieceType::King)
    }

    pub fn find(&self, id: PieceId) -> Option<Position> {
        self.pieces().find(|(_, p)| p.id == id).map(|(pos, _)| pos)
    }

    pub fn count(&self) -> usize {
        self.squares.iter().filter(|s| s.is_some()).count()
    }

    /// Row a pawn of `color` promotes on.
    pub fn promotion_row(&self, color: Color) -> u8 {
        match color {
            Color::White => self.rows - 1,
            Color::Black => 0,
        }
    }

    /// Removes every piece matching `pred`, returning them.
    pub fn remove_where<F>(&mut self, pred: F) -> Vec<Piece>
    where
        F: Fn(&Piece) -> bool,
    {
        let mut removed = Vec::new();
        for square in self.squares.iter_mut() {
            if square.as_ref().map_or(false, &pred) {
                removed.extend(square.take());
            }
        }
        removed
    }

    pub fn ids(&self) -> Vec<PieceId> {
        self.pieces().map(|(_, p)| p.id).collect()
    }
}

// Displays the board in a chessboard style, top row first:
//
//    a b c d e f g h
//  8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8
//  7 ....
//
impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in FILES.iter() {
            write!(f, " {}", c)?;
        }
        for row in (0..self.rows).rev() {
            write!(f, "\n{:>3} ", row as u16 + 1)?;
            for col in 0..BOARD_WIDTH {
                match self.get(Position::new(row, col)) {
                    Some(piece) => write!(f, "{} ", piece)?,
                    None => write!(f, "· ")?,
                }
            }
            write!(f, "{}", row as u16 + 1)?;
        }
        write!(f, "\n   ")?;
        for c in FILES.iter() {
            write!(f, " {}", c)?;
        }
        Ok(())
    }
}
