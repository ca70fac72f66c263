use crate::attacks::*;
use crate::boards::*;
use crate::chess_errors::*;
use crate::movegen::*;
use crate::moves::*;
use crate::pieces::*;
use crate::positions::*;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// White ran out of pieces.
    Defeat,
    /// Every Black army was cleared.
    Victory,
    /// The board broke an invariant (a required king went missing).
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    ToMove(Color),
    Check(Color),
    Checkmate { winner: Color },
    Stalemate,
    GameOver(Outcome),
}

impl Status {
    pub fn is_check(self) -> bool {
        matches!(self, Status::Check(_) | Status::Checkmate { .. })
    }

    pub fn is_checkmate(self) -> bool {
        matches!(self, Status::Checkmate { .. })
    }

    pub fn is_stalemate(self) -> bool {
        self == Status::Stalemate
    }

    /// No further moves will be accepted. A mate delivered by White is not
    /// terminal: the mated army falls on Black's turn and play goes on.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Status::Checkmate {
                winner: Color::Black
            } | Status::Stalemate
                | Status::GameOver(_)
        )
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::ToMove(color) => write!(f, "{} to move", color),
            Status::Check(color) => write!(f, "{} is in check", color),
            Status::Checkmate { winner } => write!(f, "Checkmate, {} wins", winner),
            Status::Stalemate => write!(f, "Stalemate"),
            Status::GameOver(Outcome::Defeat) => write!(f, "Game over: defeat"),
            Status::GameOver(Outcome::Victory) => write!(f, "Game over: victory"),
            Status::GameOver(Outcome::Aborted) => write!(f, "Game over: aborted"),
        }
    }
}

/// Plays `mv` on `board` with all of its side effects (en passant removal,
/// castling rook relocation) and returns the captured piece. Used both for the
/// real board and for throwaway clones when asking "what if".
pub fn play_on_board(board: &mut Board, mv: &Move) -> Option<Piece> {
    let captured = mv.capture_square().and_then(|square| board.take(square));

    if let MoveType::Castle(side) = mv.kind {
        let row = mv.start.row();
        if let Some(mut rook) = board.take(Position::new(row, side.rook_col())) {
            rook.has_moved = true;
            board.put(Position::new(row, side.rook_target_col()), rook);
        }
    }

    if let Some(mut piece) = board.take(mv.start) {
        piece.has_moved = true;
        board.put(mv.end, piece);
    }
    captured
}

/// A Game State is the rules core: the board, whose turn it is, the last move
/// played and which Black armies are awake. Knows how to generate legal moves,
/// apply them and tell check, mate and stalemate apart. Knows nothing about
/// captured collections, rosters or the AI.
#[derive(Clone, PartialEq, Debug)]
pub struct GameState {
    board: Board,
    current_player: Color,
    last_move: Option<Move>,
    turn_count: u32,
    awake: Vec<bool>,
    status: Status,
}

impl GameState {
    /// Sets up a game on `board` with `to_move` to play. Only the first Black
    /// army starts awake.
    pub fn new(board: Board, to_move: Color) -> ChessResult<GameState> {
        let armies = (board.rows() / SEGMENT_ROWS).max(1) as usize;
        let mut awake = vec![false; armies];
        awake[0] = true;

        let mut state = GameState {
            board,
            current_player: to_move,
            last_move: None,
            turn_count: 0,
            awake,
            status: Status::ToMove(to_move),
        };
        state.status = state.compute_status()?;
        Ok(state)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn armies(&self) -> usize {
        self.awake.len()
    }

    pub fn is_army_awake(&self, army: u8) -> bool {
        self.awake.get(army as usize).copied().unwrap_or(false)
    }

    /// White pieces are always awake; Black pieces only when their army is.
    pub fn is_awake(&self, piece: &Piece) -> bool {
        match piece.color {
            Color::White => true,
            Color::Black => self.is_army_awake(piece.army),
        }
    }

    /// Wakes an army, returning true if it was dormant before.
    pub fn wake(&mut self, army: u8) -> bool {
        match self.awake.get_mut(army as usize) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        }
    }

    pub fn has_awake_pieces(&self, color: Color) -> bool {
        self.board.pieces_of(color).any(|(_, p)| self.is_awake(p))
    }

    /// Kings whose safety constrains `color`'s moves: every White king, and
    /// the kings of awake Black armies.
    pub fn guarded_kings(&self, color: Color) -> Vec<Position> {
        guarded_kings_on(&self.board, color, &self.awake)
    }

    pub fn in_check(&self, color: Color) -> bool {
        self.guarded_kings(color)
            .into_iter()
            .any(|king| is_square_attacked(&self.board, king, color.opposite()))
    }

    /// Legal moves of the piece on `from`. Empty if the square is empty, holds
    /// a piece of the side not to move or a piece of a dormant army.
    pub fn legal_moves(&self, from: Position) -> Vec<Move> {
        let piece = match self.board.get(from) {
            Some(piece) if piece.color == self.current_player && self.is_awake(piece) => piece,
            _ => return Vec::new(),
        };
        let color = piece.color;

        pseudo_legal_moves(&self.board, from, self.last_move.as_ref())
            .into_iter()
            .filter(|mv| self.keeps_kings_safe(mv, color))
            .collect()
    }

    /// Every legal move of the side to move.
    pub fn all_legal_moves(&self) -> Vec<Move> {
        self.board
            .pieces_of(self.current_player)
            .flat_map(|(pos, _)| self.legal_moves(pos))
            .collect()
    }

    pub fn has_legal_move(&self) -> bool {
        self.board
            .pieces_of(self.current_player)
            .any(|(pos, _)| !self.legal_moves(pos).is_empty())
    }

    /// Looks the move from `start` to `end` up among the legal moves. Returns
    /// None if it is not among them.
    pub fn find_move(&self, start: Position, end: Position) -> Option<Move> {
        self.legal_moves(start).into_iter().find(|m| m.end == end)
    }

    /// The board after `mv`, leaving this state untouched.
    pub fn preview(&self, mv: &Move) -> Board {
        let mut board = self.board.clone();
        play_on_board(&mut board, mv);
        board
    }

    fn keeps_kings_safe(&self, mv: &Move, color: Color) -> bool {
        let after = self.preview(mv);
        guarded_kings_on(&after, color, &self.awake)
            .into_iter()
            .all(|king| !is_square_attacked(&after, king, color.opposite()))
    }

    /// Applies a move to the board and records it as the last move. The side
    /// to move stays the same until `advance_turn`.
    pub fn make_move(&mut self, mv: &Move) -> Option<Piece> {
        let captured = play_on_board(&mut self.board, mv);
        self.last_move = Some(mv.clone());
        self.turn_count = self.turn_count.saturating_add(1);
        captured
    }

    /// Hands the turn to the other side and recomputes the status.
    pub fn advance_turn(&mut self) -> ChessResult<Status> {
        self.current_player = self.current_player.opposite();
        self.status = self.compute_status()?;
        Ok(self.status)
    }

    /// Turns the pawn on `pos` into `kind`.
    pub fn promote(&mut self, pos: Position, kind: PieceType) -> ChessResult<()> {
        if !PieceType::PROMOTIONS.contains(&kind) {
            return Err(ChessError::InvalidChoice(kind));
        }
        match self.board.get_mut(pos) {
            Some(piece) if piece.kind == PieceType::Pawn => {
                piece.kind = kind;
                Ok(())
            }
            _ => Err(ChessError::NoPieceSelected(pos)),
        }
    }

    /// Removes a single piece from the board.
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        self.board.take(pos)
    }

    /// Removes every piece of a Black army from the board and puts it to
    /// sleep for good.
    pub fn remove_army(&mut self, army: u8) -> Vec<Piece> {
        if let Some(flag) = self.awake.get_mut(army as usize) {
            *flag = false;
        }
        self.board
            .remove_where(|p| p.color == Color::Black && p.army == army)
    }

    /// Recomputes the status for the side to move from scratch.
    pub fn refresh_status(&mut self) -> ChessResult<Status> {
        self.status = self.compute_status()?;
        Ok(self.status)
    }

    fn compute_status(&self) -> ChessResult<Status> {
        let color = self.current_player;
        self.require_kings(color)?;
        // A side with nothing awake simply passes; that is not stalemate.
        if !self.has_awake_pieces(color) {
            return Ok(Status::ToMove(color));
        }

        let status = match (self.in_check(color), self.has_legal_move()) {
            (true, true) => Status::Check(color),
            (true, false) => Status::Checkmate {
                winner: color.opposite(),
            },
            (false, true) => Status::ToMove(color),
            (false, false) => Status::Stalemate,
        };
        Ok(status)
    }

    /// White always needs a king; each awake Black army with pieces left
    /// needs its own.
    fn require_kings(&self, color: Color) -> ChessResult<()> {
        match color {
            Color::White => {
                if self.board.kings(Color::White).next().is_none() {
                    return Err(ChessError::MissingKing(Color::White));
                }
            }
            Color::Black => {
                for army in 0..self.armies() as u8 {
                    if !self.is_army_awake(army) {
                        continue;
                    }
                    let mut pieces = self
                        .board
                        .pieces_of(Color::Black)
                        .filter(|(_, p)| p.army == army)
                        .peekable();
                    if pieces.peek().is_none() {
                        continue;
                    }
                    if !pieces.any(|(_, p)| p.kind == PieceType::King) {
                        return Err(ChessError::MissingKing(Color::Black));
                    }
                }
            }
        }
        Ok(())
    }
}

fn guarded_kings_on(board: &Board, color: Color, awake: &[bool]) -> Vec<Position> {
    board
        .kings(color)
        .filter(|(_, king)| match color {
            Color::White => true,
            Color::Black => awake.get(king.army as usize).copied().unwrap_or(false),
        })
        .map(|(pos, _)| pos)
        .collect()
}

impl Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Turn: {}  Player: {}  ({})\n{}",
            self.turn_count, self.current_player, self.status, self.board
        )
    }
}
