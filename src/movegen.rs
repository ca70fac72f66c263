//! Pseudo-legal move generation: what each piece could do under its movement
//! rules, before anyone checks whether its own king survives the move.
use crate::attacks::*;
use crate::boards::*;
use crate::moves::*;
use crate::pieces::*;
use crate::positions::*;

/// All moves the piece on `from` may make by its movement rules alone.
/// `last_move` is the previous ply, needed for en passant. An empty square
/// yields no moves.
pub fn pseudo_legal_moves(board: &Board, from: Position, last_move: Option<&Move>) -> Vec<Move> {
    let piece = match board.get(from) {
        Some(piece) => piece,
        None => return Vec::new(),
    };
    let mut moves = Vec::new();

    match piece.kind {
        PieceType::Pawn => pawn_moves(board, from, piece, last_move, &mut moves),
        PieceType::Knight => offset_moves(board, from, piece, &KNIGHT_OFFSETS, &mut moves),
        PieceType::Bishop => sliding_moves(board, from, piece, &BISHOP_DIRECTIONS, &mut moves),
        PieceType::Rook => sliding_moves(board, from, piece, &ROOK_DIRECTIONS, &mut moves),
        PieceType::Queen => {
            sliding_moves(board, from, piece, &ROOK_DIRECTIONS, &mut moves);
            sliding_moves(board, from, piece, &BISHOP_DIRECTIONS, &mut moves);
        }
        PieceType::King => {
            offset_moves(board, from, piece, &KING_OFFSETS, &mut moves);
            castling_moves(board, from, piece, &mut moves);
        }
    }
    moves
}

/// Number of pseudo-legal moves available to the piece on `from`.
pub fn mobility(board: &Board, from: Position) -> usize {
    pseudo_legal_moves(board, from, None).len()
}

/// Classifies a step onto `to`: `None` if the square is off the board or
/// holds a friendly piece.
fn step_kind(board: &Board, piece: &Piece, to: Position) -> Option<MoveType> {
    if !board.contains(to) {
        return None;
    }
    match board.get(to) {
        None => Some(MoveType::Standard),
        Some(other) if other.color != piece.color => Some(MoveType::Capture(other.kind)),
        Some(_) => None,
    }
}

fn offset_moves(
    board: &Board,
    from: Position,
    piece: &Piece,
    offsets: &[Delta],
    moves: &mut Vec<Move>,
) {
    for offset in offsets {
        if let Some(to) = from + offset {
            if let Some(kind) = step_kind(board, piece, to) {
                moves.push(Move::new(from, to, piece.kind, kind));
            }
        }
    }
}

fn sliding_moves(
    board: &Board,
    from: Position,
    piece: &Piece,
    directions: &[Delta],
    moves: &mut Vec<Move>,
) {
    for dir in directions {
        let mut current = from + dir;
        while let Some(to) = current {
            match step_kind(board, piece, to) {
                Some(MoveType::Standard) => {
                    moves.push(Move::new(from, to, piece.kind, MoveType::Standard));
                }
                Some(kind) => {
                    moves.push(Move::new(from, to, piece.kind, kind));
                    break;
                }
                None => break,
            }
            current = to + dir;
        }
    }
}

fn pawn_moves(
    board: &Board,
    from: Position,
    piece: &Piece,
    last_move: Option<&Move>,
    moves: &mut Vec<Move>,
) {
    let forward = piece.color.forward();

    if let Some(one) = from + Delta(forward, 0) {
        if board.is_empty_at(one) {
            moves.push(Move::new(from, one, PieceType::Pawn, MoveType::Standard));
            if !piece.has_moved {
                if let Some(two) = one + Delta(forward, 0) {
                    if board.is_empty_at(two) {
                        moves.push(Move::new(from, two, PieceType::Pawn, MoveType::PawnTwostep));
                    }
                }
            }
        }
    }

    for side in [-1, 1] {
        let to = match from + Delta(forward, side) {
            Some(to) if board.contains(to) => to,
            _ => continue,
        };
        if let Some(other) = board.get(to) {
            if other.color != piece.color {
                moves.push(Move::new(from, to, PieceType::Pawn, MoveType::Capture(other.kind)));
            }
        } else if passed_by_enemy_pawn(board, from, piece, to, last_move) {
            moves.push(Move::new(from, to, PieceType::Pawn, MoveType::EnPassant));
        }
    }
}

/// Did the previous ply move an enemy pawn two squares to land right beside
/// `from`, in the file of `to`?
fn passed_by_enemy_pawn(
    board: &Board,
    from: Position,
    piece: &Piece,
    to: Position,
    last_move: Option<&Move>,
) -> bool {
    let last = match last_move {
        Some(last) if last.kind == MoveType::PawnTwostep => last,
        _ => return false,
    };
    let beside = Position::new(from.row(), to.col());
    if last.end != beside {
        return false;
    }
    matches!(
        board.get(beside),
        Some(other) if other.kind == PieceType::Pawn && other.color != piece.color
    )
}

fn castling_moves(board: &Board, from: Position, king: &Piece, moves: &mut Vec<Move>) {
    if king.has_moved || from.col() != 4 {
        return;
    }
    let enemy = king.color.opposite();
    if is_square_attacked(board, from, enemy) {
        return;
    }

    for side in [CastleSide::Kingside, CastleSide::Queenside] {
        let rook_square = Position::new(from.row(), side.rook_col());
        let rook_ready = matches!(
            board.get(rook_square),
            Some(rook)
                if rook.kind == PieceType::Rook && rook.color == king.color && !rook.has_moved
        );
        if !rook_ready {
            continue;
        }

        let (low, high) = if side.rook_col() < from.col() {
            (side.rook_col() + 1, from.col())
        } else {
            (from.col() + 1, side.rook_col())
        };
        if (low..high).any(|col| !board.is_empty_at(Position::new(from.row(), col))) {
            continue;
        }

        // The king may not pass over or land on an attacked square.
        let target = side.king_target_col();
        let (first, last) = if target < from.col() {
            (target, from.col() - 1)
        } else {
            (from.col() + 1, target)
        };
        let contested = (first..=last)
            .any(|col| is_square_attacked(board, Position::new(from.row(), col), enemy));
        if contested {
            continue;
        }

        moves.push(Move::new(
            from,
            Position::new(from.row(), target),
            PieceType::King,
            MoveType::Castle(side),
        ));
    }
}
