use crate::boards::*;
use crate::pieces::*;
use crate::positions::*;

// For most of this, a board with positions will be helpful for visualizations.
// Offsets are saved as (row, col), row growing towards Black:
//
//        -2  -1   0  +1  +2
//   +2 |  .   N   .   N   .
//   +1 |  N   K   K   K   N
//    0 |  .   K   x   K   .
//   -1 |  N   K   K   K   N
//   -2 |  .   N   .   N   .

// ---------------------------------------------------------------------
// Jumping pieces
// ---------------------------------------------------------------------

pub const KNIGHT_OFFSETS: [Delta; 8] = [
    Delta(1, 2),
    Delta(2, 1),
    Delta(-1, 2),
    Delta(2, -1),
    Delta(1, -2),
    Delta(-2, 1),
    Delta(-1, -2),
    Delta(-2, -1),
];

pub const KING_OFFSETS: [Delta; 8] = [
    Delta(0, 1),
    Delta(1, 0),
    Delta(0, -1),
    Delta(-1, 0),
    Delta(1, 1),
    Delta(-1, -1),
    Delta(-1, 1),
    Delta(1, -1),
];

// ---------------------------------------------------------------------
// Sliding pieces
// ---------------------------------------------------------------------

pub const ROOK_DIRECTIONS: [Delta; 4] = [Delta(0, 1), Delta(1, 0), Delta(0, -1), Delta(-1, 0)];

pub const BISHOP_DIRECTIONS: [Delta; 4] = [Delta(1, 1), Delta(1, -1), Delta(-1, 1), Delta(-1, -1)];

/// Walks the straight line between `from` and `to` (exclusive on both ends)
/// and reports whether every square on it is empty. Both squares must share a
/// row, a column or a diagonal.
fn path_clear(board: &Board, from: Position, to: Position) -> bool {
    let step = Delta(
        (to.row() as i16 - from.row() as i16).signum(),
        (to.col() as i16 - from.col() as i16).signum(),
    );
    let mut current = from + step;
    while let Some(pos) = current {
        if pos == to {
            return true;
        }
        if board.get(pos).is_some() {
            return false;
        }
        current = pos + step;
    }
    false
}

/// Can `piece`, standing on `from`, attack `target` on this board? Uses the
/// raw movement rules: pawns only ever attack diagonally forward, kings a
/// single step (castling never attacks), sliders need a clear line.
pub fn attacks_square(board: &Board, from: Position, piece: &Piece, target: Position) -> bool {
    if from == target {
        return false;
    }
    let d_row = target.row() as i16 - from.row() as i16;
    let d_col = target.col() as i16 - from.col() as i16;

    match piece.kind {
        PieceType::Pawn => d_row == piece.color.forward() && d_col.abs() == 1,
        PieceType::Knight => {
            (d_row.abs() == 2 && d_col.abs() == 1) || (d_row.abs() == 1 && d_col.abs() == 2)
        }
        PieceType::King => d_row.abs() <= 1 && d_col.abs() <= 1,
        PieceType::Bishop => d_row.abs() == d_col.abs() && path_clear(board, from, target),
        PieceType::Rook => (d_row == 0 || d_col == 0) && path_clear(board, from, target),
        PieceType::Queen => {
            (d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs())
                && path_clear(board, from, target)
        }
    }
}

/// Is `square` attacked by any piece of color `by` on the given board? The
/// board may be a hypothetical one.
pub fn is_square_attacked(board: &Board, square: Position, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, piece)| attacks_square(board, from, piece, square))
}

/// Number of pieces of color `by` attacking `square`, not counting the piece
/// standing on `exclude`.
pub fn attackers(board: &Board, square: Position, by: Color, exclude: Option<Position>) -> usize {
    board
        .pieces_of(by)
        .filter(|(from, _)| Some(*from) != exclude)
        .filter(|(from, piece)| attacks_square(board, *from, piece, square))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn board(diagram: &[&str]) -> Board {
        Board::from_ascii(diagram, &mut IdSource::default()).unwrap()
    }

    #[test]
    fn test_pawn_attacks_diagonally_only() {
        let b = board(&[
            "....k...", //
            "........", //
            "........", //
            "....p...", //
            "....P...", //
            "........", //
            "........", //
            "....K...", //
        ]);
        // The white pawn is blocked, but still covers both diagonals.
        assert!(is_square_attacked(&b, sq("d5"), Color::White));
        assert!(is_square_attacked(&b, sq("f5"), Color::White));
        assert!(!is_square_attacked(&b, sq("e5"), Color::White));
        // Black pawns attack downwards.
        assert!(is_square_attacked(&b, sq("d4"), Color::Black));
        assert!(!is_square_attacked(&b, sq("d6"), Color::Black));
    }

    #[test]
    fn test_sliders_stop_at_blockers() {
        let b = board(&[
            "....k...", //
            "........", //
            "........", //
            "........", //
            "R..n....", //
            "........", //
            "........", //
            "B...K...", //
        ]);
        assert!(is_square_attacked(&b, sq("c4"), Color::White));
        assert!(is_square_attacked(&b, sq("d4"), Color::White));
        assert!(!is_square_attacked(&b, sq("e4"), Color::White));
        // Bishop on a1 sees up the long diagonal until the knight.
        assert!(is_square_attacked(&b, sq("c3"), Color::White));
        assert!(!is_square_attacked(&b, sq("e5"), Color::White));
    }

    #[test]
    fn test_knight_and_king() {
        let b = board(&[
            "....k...", //
            "........", //
            "........", //
            "........", //
            "........", //
            "........", //
            "........", //
            ".N..K...", //
        ]);
        assert!(is_square_attacked(&b, sq("c3"), Color::White));
        assert!(is_square_attacked(&b, sq("d2"), Color::White));
        assert!(is_square_attacked(&b, sq("f2"), Color::White));
        assert!(!is_square_attacked(&b, sq("e3"), Color::White));
        assert!(is_square_attacked(&b, sq("d7"), Color::Black));
    }

    #[test]
    fn test_hypothetical_board() {
        let b = board(&[
            "....k...", //
            "........", //
            "........", //
            "........", //
            "........", //
            "........", //
            "....B...", //
            "....K...", //
        ]);
        assert!(!is_square_attacked(&b, sq("e1"), Color::Black));

        let mut what_if = b.clone();
        let mut rook = what_if.take(sq("e8")).unwrap();
        rook.kind = PieceType::Rook;
        what_if.put(sq("e8"), rook);
        what_if.take(sq("e2"));
        assert!(is_square_attacked(&what_if, sq("e1"), Color::Black));
        // The original board is untouched.
        assert!(!is_square_attacked(&b, sq("e1"), Color::Black));
    }

    #[test]
    fn test_attackers_count() {
        let b = board(&[
            "....k...", //
            "........", //
            "........", //
            "........", //
            "...P.P..", //
            "........", //
            "........", //
            "....K...", //
        ]);
        assert_eq!(attackers(&b, sq("e5"), Color::White, None), 2);
        assert_eq!(attackers(&b, sq("e5"), Color::White, Some(sq("d4"))), 1);
    }
}
