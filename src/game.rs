use crate::attacks::is_square_attacked;
use crate::boards::*;
use crate::chess_errors::*;
use crate::config::*;
use crate::engine::*;
use crate::game_state::*;
use crate::move_log::*;
use crate::moves::*;
use crate::pieces::*;
use crate::positions::*;
use crate::progression::*;
use array_init::array_init;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info};

/// A choice the human has to make before play can go on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// A White pawn reached the last rank on this square.
    Promotion(Position),
    /// The board was cleared; pick one of these to join the army.
    Reinforcement(Vec<PieceType>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    pub mv: Move,
    pub captured: Option<Piece>,
    pub status: Status,
    pub pending: Option<Pending>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiTurn {
    Moved(MoveOutcome),
    /// The side to move was mated and its king(s) were taken off the board.
    MateResolved,
    /// Nothing of the side to move is awake, so the turn passes.
    Passed,
    /// Nothing to do: the game is over or a choice is pending.
    Idle,
}

/// One play session: the rules state plus everything the roguelike layer
/// keeps across boards.
pub struct Game {
    config: GameConfig,
    state: GameState,
    /// Captured pieces, indexed by the color of the piece taken.
    captured: [Vec<Piece>; 2],
    log: MoveLog,
    cleared: u32,
    roster: Roster,
    pending: Option<Pending>,
    ids: IdSource,
    rng: SmallRng,
}

fn session_rng(config: &GameConfig) -> SmallRng {
    match config.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

impl Game {
    pub fn new(config: GameConfig) -> ChessResult<Game> {
        let mut ids = IdSource::default();
        let board = opening_board(config.mode, &mut ids)?;
        let mut game = Game::assemble(config, board, Color::White, ids)?;
        game.log.record_event("=== Board 1 ===");
        Ok(game)
    }

    /// A session starting from an arbitrary position. Every White piece on
    /// the board is enlisted where it stands.
    pub fn with_board(config: GameConfig, board: Board, to_move: Color) -> ChessResult<Game> {
        let ids = IdSource::following(board.ids().iter());
        Game::assemble(config, board, to_move, ids)
    }

    fn assemble(
        config: GameConfig,
        board: Board,
        to_move: Color,
        ids: IdSource,
    ) -> ChessResult<Game> {
        let roster = Roster::from_board(&board);
        let state = GameState::new(board, to_move)?;
        let rng = session_rng(&config);
        Ok(Game {
            config,
            state,
            captured: array_init(|_| Vec::new()),
            log: MoveLog::new(),
            cleared: 0,
            roster,
            pending: None,
            ids,
            rng,
        })
    }

    /// Starts over from the opening position with the same configuration.
    pub fn reset_game(&mut self) -> ChessResult<()> {
        *self = Game::new(self.config.clone())?;
        Ok(())
    }
}

// Observers
impl Game {
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        self.state.board()
    }

    pub fn current_player(&self) -> Color {
        self.state.current_player()
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn is_check(&self) -> bool {
        self.status().is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.status().is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.status().is_stalemate()
    }

    pub fn is_over(&self) -> bool {
        self.status().is_terminal()
    }

    /// Pieces of `color` that have been taken.
    pub fn captured(&self, color: Color) -> &[Piece] {
        &self.captured[color.index()]
    }

    pub fn log(&self) -> &MoveLog {
        &self.log
    }

    pub fn boards_cleared(&self) -> u32 {
        self.cleared
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn pending(&self) -> Option<&Pending> {
        self.pending.as_ref()
    }

    /// Difficulty the engine plays `piece` at.
    pub fn difficulty_for(&self, piece: &Piece) -> Difficulty {
        let level = difficulty_level(
            self.config.mode,
            self.cleared,
            piece.army,
            self.config.army_level_step,
        );
        Difficulty::at(level, &self.config.curve)
    }

    fn side_label(&self, piece: &Piece) -> String {
        match (piece.color, self.config.mode) {
            (Color::White, _) => "White".to_string(),
            (Color::Black, ProgressionMode::ResetAndReinforce) => {
                format!("Board {} Black", self.cleared + 1)
            }
            (Color::Black, ProgressionMode::PersistentArmies { .. }) => {
                format!("Army {} Black", piece.army as u32 + 1)
            }
        }
    }

    fn describe(&self, piece: &Piece, mv: &Move, victim: Option<&Piece>) -> String {
        let mut text = format!(
            "{} {} {}→{}",
            self.side_label(piece),
            piece.kind,
            mv.start,
            mv.end
        );
        if let Some(victim) = victim {
            text.push_str(&format!(" captures {} {}", self.side_label(victim), victim.kind));
        }
        match mv.kind {
            MoveType::EnPassant => text.push_str(" en passant"),
            MoveType::Castle(_) => text.push_str(&format!(" ({})", mv)),
            _ => {}
        }
        text
    }
}

// Playing
impl Game {
    fn ensure_can_move(&self) -> ChessResult<()> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        if self.pending.is_some() {
            return Err(ChessError::ChoicePending);
        }
        Ok(())
    }

    /// Legal destinations for the piece on `square`. Empty squares and the
    /// opponent's pieces are reported as errors so a front end can deselect.
    pub fn select(&self, square: Position) -> ChessResult<Vec<Move>> {
        self.ensure_can_move()?;
        match self.board().get(square) {
            None => Err(ChessError::NoPieceSelected(square)),
            Some(piece) if piece.color != self.current_player() => {
                Err(ChessError::WrongSideSelected(square))
            }
            Some(_) => Ok(self.state.legal_moves(square)),
        }
    }

    pub fn legal_moves(&self, square: Position) -> Vec<Move> {
        self.state.legal_moves(square)
    }

    /// Plays the move from `from` to `to` for the side to move. Nothing changes
    /// when the move is rejected.
    pub fn apply_move(&mut self, from: Position, to: Position) -> ChessResult<MoveOutcome> {
        self.ensure_can_move()?;
        let piece = self
            .board()
            .get(from)
            .ok_or(ChessError::NoPieceSelected(from))?;
        if piece.color != self.current_player() {
            return Err(ChessError::WrongSideSelected(from));
        }
        let mv = self
            .state
            .find_move(from, to)
            .ok_or(ChessError::IllegalMove { from, to })?;
        self.play(mv)
    }

    fn play(&mut self, mv: Move) -> ChessResult<MoveOutcome> {
        let mover = match self.board().get(mv.start) {
            Some(piece) => piece.clone(),
            None => return Err(ChessError::NoPieceSelected(mv.start)),
        };
        let victim = mv
            .capture_square()
            .and_then(|square| self.board().get(square))
            .cloned();
        let text = self.describe(&mover, &mv, victim.as_ref());
        self.log.record_move(text);

        let captured = self.state.make_move(&mv);
        if let Some(victim) = &captured {
            if victim.color == Color::White {
                self.roster.remove(victim.id);
            }
            self.captured[victim.color.index()].push(victim.clone());

            if victim.kind == PieceType::King && victim.color == Color::Black {
                match self.config.mode {
                    ProgressionMode::ResetAndReinforce => {
                        self.board_cleared();
                        return Ok(self.outcome(mv, captured));
                    }
                    ProgressionMode::PersistentArmies { .. } => {
                        self.army_cleared(victim.army);
                        if self.is_over() {
                            return Ok(self.outcome(mv, captured));
                        }
                    }
                }
            }
        }

        let promoting = mover.kind == PieceType::Pawn
            && mv.end.row() == self.board().promotion_row(mover.color);
        if promoting {
            match mover.color {
                Color::White => {
                    self.pending = Some(Pending::Promotion(mv.end));
                    return Ok(self.outcome(mv, captured));
                }
                Color::Black => {
                    self.state.promote(mv.end, PieceType::Queen)?;
                    self.log
                        .record_event(format!("Black pawn promoted to queen at {}", mv.end));
                }
            }
        }

        self.finish_turn()?;
        Ok(self.outcome(mv, captured))
    }

    fn outcome(&self, mv: Move, captured: Option<Piece>) -> MoveOutcome {
        MoveOutcome {
            mv,
            captured,
            status: self.status(),
            pending: self.pending.clone(),
        }
    }

    /// Wakes armies White has come close to, then hands over the turn.
    fn finish_turn(&mut self) -> ChessResult<Status> {
        if self.roster.is_empty() {
            self.game_over(Outcome::Defeat);
            return Ok(self.status());
        }

        if self.current_player() == Color::White {
            if let ProgressionMode::PersistentArmies { .. } = self.config.mode {
                for army in armies_in_reach(self.board(), self.config.activation_distance) {
                    if self.state.wake(army) {
                        info!(army, "army awakens");
                        self.log.record_event(format!("Army {} awakens!", army as u32 + 1));
                    }
                }
            }
        }

        match self.state.advance_turn() {
            Ok(status) => Ok(status),
            Err(e) => Err(self.abort(e)),
        }
    }

    fn abort(&mut self, e: ChessError) -> ChessError {
        error!(%e, "aborting game");
        self.state.set_status(Status::GameOver(Outcome::Aborted));
        self.log.record_event(format!("Game aborted: {}", e));
        e
    }

    fn game_over(&mut self, outcome: Outcome) {
        self.state.set_status(Status::GameOver(outcome));
        let text = match self.config.mode {
            ProgressionMode::ResetAndReinforce => {
                format!("Game Over - {} boards cleared", self.cleared)
            }
            ProgressionMode::PersistentArmies { .. } => match outcome {
                Outcome::Victory => format!("Victory - all {} armies cleared", self.cleared),
                _ => format!("Game Over - {} armies cleared", self.cleared),
            },
        };
        info!(?outcome, cleared = self.cleared, "game over");
        self.log.record_event(text);
    }

    /// The Black army of a standard board fell: offer reinforcements.
    fn board_cleared(&mut self) {
        self.cleared += 1;
        let choices = draw_reinforcements(&mut self.rng, self.config.reinforcement_choices);
        info!(cleared = self.cleared, ?choices, "board cleared");
        self.log
            .record_event(format!("Board {} cleared!", self.cleared));
        self.pending = Some(Pending::Reinforcement(choices));
    }

    /// One army of the extended board fell: take the rest of it off.
    fn army_cleared(&mut self, army: u8) {
        let removed = self.state.remove_army(army);
        self.cleared += 1;
        info!(army, removed = removed.len(), "army cleared");
        self.log
            .record_event(format!("Army {} defeated!", army as u32 + 1));
        if remaining_armies(self.board()).is_empty() {
            self.game_over(Outcome::Victory);
        }
    }

    /// Settles a pending pawn promotion and continues the turn.
    pub fn choose_promotion(&mut self, kind: PieceType) -> ChessResult<Status> {
        let square = match self.pending {
            Some(Pending::Promotion(square)) => square,
            _ => return Err(ChessError::NoChoicePending),
        };
        if !PieceType::PROMOTIONS.contains(&kind) {
            return Err(ChessError::InvalidChoice(kind));
        }
        self.state.promote(square, kind)?;
        if let Some(piece) = self.board().get(square) {
            let id = piece.id;
            self.roster.set_kind(id, kind);
        }
        self.pending = None;
        self.log.record_event(format!(
            "White pawn promoted to {} at {}",
            kind.name(),
            square
        ));
        self.finish_turn()
    }

    /// Adds the chosen reinforcement to the army and sets up the next board.
    pub fn choose_reinforcement(&mut self, kind: PieceType) -> ChessResult<Status> {
        let offered = match &self.pending {
            Some(Pending::Reinforcement(choices)) => choices,
            _ => return Err(ChessError::NoChoicePending),
        };
        if !offered.contains(&kind) {
            return Err(ChessError::InvalidChoice(kind));
        }

        // Nothing is committed until the next board stands.
        let mut ids = self.ids.clone();
        let mut roster = self.roster.clone();
        roster.enlist_reward(ids.next_id(), kind);
        let board = next_board(&roster, &mut ids)?;
        let state = match GameState::new(board, Color::White) {
            Ok(state) => state,
            Err(e) => return Err(self.abort(e)),
        };

        self.ids = ids;
        self.roster = roster;
        self.state = state;
        self.pending = None;
        self.log
            .record_event(format!("Added {} to your army!", kind.name()));
        self.log
            .record_event(format!("=== Board {} ===", self.cleared + 1));
        Ok(self.status())
    }

    /// The engine's pick for the side to move. Pure apart from `rng`.
    pub fn compute_ai_move<R: Rng>(&self, rng: &mut R) -> Option<ScoredMove> {
        select_move(
            &self.state,
            |piece| self.difficulty_for(piece),
            self.config.endgame_threshold,
            rng,
        )
    }

    /// Plays the side to move with the engine: resolves a mate delivered by
    /// White, passes when nothing is awake, otherwise picks and plays a move.
    pub fn play_ai_turn(&mut self) -> ChessResult<AiTurn> {
        if self.pending.is_some() || self.is_over() {
            return Ok(AiTurn::Idle);
        }
        if let Status::Checkmate {
            winner: Color::White,
        } = self.status()
        {
            self.resolve_mate()?;
            return Ok(AiTurn::MateResolved);
        }
        if !self.state.has_awake_pieces(self.current_player()) {
            self.log.record_event(format!(
                "{} armies dormant... {}'s turn",
                self.current_player(),
                self.current_player().opposite()
            ));
            self.finish_turn()?;
            return Ok(AiTurn::Passed);
        }

        let mut rng = self.rng.clone();
        let choice = self.compute_ai_move(&mut rng);
        self.rng = rng;

        match choice {
            Some(best) => {
                debug!(mv = %best.mv, score = best.score, "engine move");
                Ok(AiTurn::Moved(self.play(best.mv)?))
            }
            None => Ok(AiTurn::Idle),
        }
    }

    /// Takes the mated Black king(s) off the board. The army falls with them.
    fn resolve_mate(&mut self) -> ChessResult<()> {
        let mated: Vec<Position> = self
            .state
            .guarded_kings(Color::Black)
            .into_iter()
            .filter(|king| is_square_attacked(self.board(), *king, Color::White))
            .collect();

        for square in mated {
            let king = match self.state.remove_piece(square) {
                Some(king) => king,
                None => continue,
            };
            self.log.record_event(format!(
                "{} King checkmated at {}",
                self.side_label(&king),
                square
            ));
            let army = king.army;
            self.captured[Color::Black.index()].push(king);

            match self.config.mode {
                ProgressionMode::ResetAndReinforce => {
                    self.board_cleared();
                    return Ok(());
                }
                ProgressionMode::PersistentArmies { .. } => {
                    self.army_cleared(army);
                    if self.is_over() {
                        return Ok(());
                    }
                }
            }
        }

        match self.state.refresh_status() {
            Ok(_) => Ok(()),
            Err(e) => Err(self.abort(e)),
        }
    }
}

/// An agent is an object that can play one side of a session.
pub trait Agent {
    fn take_turn(&mut self, game: &mut Game) -> ChessResult<()>;
}

/// Runs a session between two agents. White's agent also handles every
/// pending choice.
pub struct Match<W: Agent, B: Agent> {
    white: W,
    black: B,
    game: Game,
}

impl<W: Agent, B: Agent> Match<W, B> {
    pub fn new(white: W, black: B, game: Game) -> Match<W, B> {
        Match { white, black, game }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Plays until the game is over or `max_turns` turns were taken.
    /// `on_turn` sees the session after every turn.
    pub fn play<F>(&mut self, max_turns: Option<u32>, mut on_turn: F) -> ChessResult<Status>
    where
        F: FnMut(&Game),
    {
        let mut turns = 0;
        while !self.game.is_over() {
            if max_turns.map_or(false, |max| turns >= max) {
                break;
            }
            if self.game.pending().is_some() || self.game.current_player() == Color::White {
                self.white.take_turn(&mut self.game)?;
            } else {
                self.black.take_turn(&mut self.game)?;
            }
            turns += 1;
            on_turn(&self.game);
        }
        Ok(self.game.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Position {
        s.parse().unwrap()
    }

    fn seeded() -> GameConfig {
        GameConfig::default().with_seed(42)
    }

    fn game_from(config: GameConfig, diagram: &[&str], to_move: Color) -> Game {
        let board = Board::from_ascii(diagram, &mut IdSource::default()).unwrap();
        Game::with_board(config, board, to_move).unwrap()
    }

    fn tall(top: &[&str], bottom: &[&str]) -> Vec<String> {
        top.iter().chain(bottom.iter()).map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_game() {
        let game = Game::new(seeded()).unwrap();
        assert_eq!(game.board().count(), 32);
        assert_eq!(game.status(), Status::ToMove(Color::White));
        assert_eq!(game.roster().len(), 16);
        assert_eq!(game.boards_cleared(), 0);
        assert_eq!(game.log().latest().unwrap().text, "=== Board 1 ===");
        assert!(game.pending().is_none());
    }

    #[test]
    fn test_rejections_leave_state_alone() {
        let mut game = Game::new(seeded()).unwrap();
        let before = game.state().clone();
        assert_eq!(
            game.apply_move(sq("e4"), sq("e5")),
            Err(ChessError::NoPieceSelected(sq("e4")))
        );
        assert_eq!(
            game.apply_move(sq("e7"), sq("e5")),
            Err(ChessError::WrongSideSelected(sq("e7")))
        );
        assert_eq!(
            game.apply_move(sq("e2"), sq("e5")),
            Err(ChessError::IllegalMove {
                from: sq("e2"),
                to: sq("e5")
            })
        );
        assert!(game.select(sq("e7")).unwrap_err().is_deselection());
        assert_eq!(game.select(sq("g1")).unwrap().len(), 2);
        assert_eq!(game.state(), &before);
        assert_eq!(game.log().len(), 1);
    }

    #[test]
    fn test_moves_are_logged() {
        let mut game = Game::new(seeded()).unwrap();
        let outcome = game.apply_move(sq("e2"), sq("e4")).unwrap();
        assert_eq!(outcome.status, Status::ToMove(Color::Black));
        assert_eq!(outcome.mv.kind, MoveType::PawnTwostep);
        assert_eq!(game.log().latest().unwrap().text, "White Pawn e2→e4");
        assert!(!game.log().latest().unwrap().is_event);

        match game.play_ai_turn().unwrap() {
            AiTurn::Moved(outcome) => assert_eq!(outcome.status, Status::ToMove(Color::White)),
            other => panic!("expected a move, got {:?}", other),
        }
        assert!(game.log().latest().unwrap().text.starts_with("Board 1 Black"));
        assert_eq!(game.current_player(), Color::White);
    }

    #[test]
    fn test_king_capture_clears_board() {
        let mut game = game_from(
            seeded(),
            &[
                "....k...", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "....Q...", //
                "K.......", //
            ],
            Color::White,
        );
        let outcome = game.apply_move(sq("e2"), sq("e8")).unwrap();
        assert_eq!(outcome.captured.unwrap().kind, PieceType::King);
        assert_eq!(game.boards_cleared(), 1);
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(game.captured(Color::Black).len(), 1);

        let choices = match game.pending() {
            Some(Pending::Reinforcement(choices)) => choices.clone(),
            other => panic!("expected reinforcements, got {:?}", other),
        };
        assert_eq!(choices.len(), 3);
        assert!(choices[0] != choices[1] && choices[1] != choices[2] && choices[0] != choices[2]);
        assert_eq!(game.apply_move(sq("a1"), sq("a2")), Err(ChessError::ChoicePending));
        assert_eq!(game.play_ai_turn().unwrap(), AiTurn::Idle);

        let not_offered = PieceType::ALL
            .iter()
            .copied()
            .find(|k| !choices.contains(k))
            .unwrap();
        assert_eq!(
            game.choose_reinforcement(not_offered),
            Err(ChessError::InvalidChoice(not_offered))
        );

        let status = game.choose_reinforcement(choices[0]).unwrap();
        assert_eq!(status, Status::ToMove(Color::White));
        assert!(game.pending().is_none());
        assert_eq!(game.roster().len(), 3);
        assert_eq!(game.board().pieces_of(Color::Black).count(), 16);
        assert_eq!(game.board().pieces_of(Color::White).count(), 3);
        // Originals go home, the queen to e2 where it was enlisted.
        assert_eq!(game.board().get(sq("e2")).unwrap().kind, PieceType::Queen);
        let reward = game.board().get(sq("b1")).unwrap();
        assert_eq!(reward.kind, choices[0]);
        assert!(!reward.has_moved);
        assert_eq!(game.log().latest().unwrap().text, "=== Board 2 ===");
        assert_eq!(game.state().turn_count(), 0);
        // Captures carry over between boards.
        assert_eq!(game.captured(Color::Black).len(), 1);
    }

    #[test]
    fn test_human_promotion_waits_for_choice() {
        let mut game = game_from(
            seeded(),
            &[
                ".......k", //
                "P.......", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "....K...", //
            ],
            Color::White,
        );
        let outcome = game.apply_move(sq("a7"), sq("a8")).unwrap();
        assert_eq!(outcome.pending, Some(Pending::Promotion(sq("a8"))));
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(game.apply_move(sq("e1"), sq("e2")), Err(ChessError::ChoicePending));
        assert_eq!(
            game.choose_promotion(PieceType::King),
            Err(ChessError::InvalidChoice(PieceType::King))
        );
        assert_eq!(
            game.choose_reinforcement(PieceType::Queen),
            Err(ChessError::NoChoicePending)
        );

        let status = game.choose_promotion(PieceType::Knight).unwrap();
        assert_eq!(status, Status::ToMove(Color::Black));
        let knight = game.board().get(sq("a8")).unwrap();
        assert_eq!(knight.kind, PieceType::Knight);
        assert!(game
            .roster()
            .iter()
            .any(|e| e.id == knight.id && e.kind == PieceType::Knight));
        assert_eq!(
            game.log().latest().unwrap().text,
            "White pawn promoted to knight at a8"
        );
    }

    #[test]
    fn test_ai_promotes_to_queen() {
        let mut game = game_from(
            seeded(),
            &[
                ".......k", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                ".p......", //
                "....K...", //
            ],
            Color::Black,
        );
        let outcome = game.apply_move(sq("b2"), sq("b1")).unwrap();
        assert!(outcome.pending.is_none());
        assert_eq!(game.board().get(sq("b1")).unwrap().kind, PieceType::Queen);
        assert_eq!(
            game.log().latest().unwrap().text,
            "Black pawn promoted to queen at b1"
        );
        assert!(game.is_check());
    }

    #[test]
    fn test_en_passant_drops_roster_entry() {
        let mut game = game_from(
            seeded(),
            &[
                "....k...", //
                "........", //
                "........", //
                "........", //
                "...p....", //
                "........", //
                "....P...", //
                "K.......", //
            ],
            Color::White,
        );
        assert_eq!(game.roster().len(), 2);
        game.apply_move(sq("e2"), sq("e4")).unwrap();
        let outcome = game.apply_move(sq("d4"), sq("e3")).unwrap();
        assert_eq!(outcome.mv.kind, MoveType::EnPassant);
        assert_eq!(game.captured(Color::White).len(), 1);
        assert_eq!(game.roster().len(), 1);
        assert!(game.board().get(sq("e4")).is_none());
        assert!(game.log().latest().unwrap().text.ends_with("en passant"));
    }

    #[test]
    fn test_mate_is_resolved_on_blacks_turn() {
        let mut game = game_from(
            seeded(),
            &[
                ".......k", //
                "......Q.", //
                ".....K..", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
            ],
            Color::Black,
        );
        assert_eq!(
            game.status(),
            Status::Checkmate {
                winner: Color::White
            }
        );
        assert!(!game.is_over());
        assert_eq!(game.play_ai_turn().unwrap(), AiTurn::MateResolved);
        assert_eq!(game.boards_cleared(), 1);
        assert_eq!(game.board().kings(Color::Black).count(), 0);
        assert!(matches!(game.pending(), Some(Pending::Reinforcement(_))));
    }

    #[test]
    fn test_reinforcement_after_mate_sets_up_next_board() {
        let mut game = game_from(
            seeded(),
            &[
                ".......k", //
                "......Q.", //
                ".....K..", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
            ],
            Color::Black,
        );
        assert_eq!(game.play_ai_turn().unwrap(), AiTurn::MateResolved);
        let choices = match game.pending() {
            Some(Pending::Reinforcement(choices)) => choices.clone(),
            other => panic!("expected a reinforcement, got {:?}", other),
        };
        let reward = choices[0];

        assert_eq!(
            game.choose_reinforcement(reward).unwrap(),
            Status::ToMove(Color::White)
        );
        assert!(game.pending().is_none());
        assert_eq!(game.roster().len(), 3);
        // Both survivors stood on Black's side of the board, so they are
        // placed from a1 like the reward.
        assert_eq!(game.board().get(sq("a1")).unwrap().kind, PieceType::King);
        assert_eq!(game.board().get(sq("b1")).unwrap().kind, PieceType::Queen);
        assert_eq!(game.board().get(sq("c1")).unwrap().kind, reward);
        assert_eq!(game.board().pieces_of(Color::Black).count(), 16);
    }

    #[test]
    fn test_checkmate_of_white_ends_the_game() {
        let mut game = Game::new(seeded()).unwrap();
        game.apply_move(sq("f2"), sq("f3")).unwrap();
        game.apply_move(sq("e7"), sq("e5")).unwrap();
        game.apply_move(sq("g2"), sq("g4")).unwrap();
        let outcome = game.apply_move(sq("d8"), sq("h4")).unwrap();
        assert_eq!(
            outcome.status,
            Status::Checkmate {
                winner: Color::Black
            }
        );
        assert!(game.is_over() && game.is_checkmate());
        assert_eq!(game.apply_move(sq("a2"), sq("a3")), Err(ChessError::GameOver));
        assert_eq!(game.play_ai_turn().unwrap(), AiTurn::Idle);
    }

    #[test]
    fn test_persistent_army_clearing() {
        let diagram = tall(
            &[
                ".......k", //
                "........", //
                "........", //
                "........", //
                ".......R", //
                "........", //
                "........", //
                "........", //
            ],
            &[
                "....k...", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "K.......", //
            ],
        );
        let rows: Vec<&str> = diagram.iter().map(|s| s.as_str()).collect();
        let mut game = game_from(GameConfig::persistent(2).with_seed(1), &rows, Color::White);
        assert!(!game.state().is_army_awake(1));

        let outcome = game.apply_move(sq("h12"), sq("h16")).unwrap();
        assert_eq!(outcome.captured.unwrap().army, 1);
        assert_eq!(game.boards_cleared(), 1);
        assert!(game.pending().is_none());
        assert_eq!(game.current_player(), Color::Black);
        assert_eq!(game.status(), Status::ToMove(Color::Black));
        assert!(game
            .log()
            .recent()
            .any(|e| e.is_event && e.text == "Army 2 defeated!"));
    }

    #[test]
    fn test_persistent_victory() {
        let mut game = game_from(
            GameConfig::persistent(1).with_seed(1),
            &[
                "....k...", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "....R...", //
                "K.......", //
            ],
            Color::White,
        );
        game.apply_move(sq("e2"), sq("e8")).unwrap();
        assert_eq!(game.status(), Status::GameOver(Outcome::Victory));
        assert!(game.is_over());
    }

    #[test]
    fn test_armies_awaken_as_white_advances() {
        let diagram = tall(
            &[
                ".......k", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
            ],
            &[
                "....k...", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "......R.", //
                "K.......", //
            ],
        );
        let rows: Vec<&str> = diagram.iter().map(|s| s.as_str()).collect();
        let mut game = game_from(GameConfig::persistent(2).with_seed(1), &rows, Color::White);

        game.apply_move(sq("g2"), sq("g12")).unwrap();
        assert!(game.state().is_army_awake(1));
        assert!(game
            .log()
            .recent()
            .any(|e| e.is_event && e.text == "Army 2 awakens!"));
        assert_eq!(game.status(), Status::ToMove(Color::Black));
        assert!(!game.legal_moves(sq("h16")).is_empty());
    }

    #[test]
    fn test_dormant_black_passes() {
        let diagram = tall(
            &[
                ".......k", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
            ],
            &[
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "........", //
                "K.......", //
            ],
        );
        let rows: Vec<&str> = diagram.iter().map(|s| s.as_str()).collect();
        let mut game = game_from(GameConfig::persistent(2).with_seed(1), &rows, Color::Black);

        assert_eq!(game.play_ai_turn().unwrap(), AiTurn::Passed);
        assert_eq!(game.current_player(), Color::White);
        assert_eq!(
            game.log().latest().unwrap().text,
            "Black armies dormant... White's turn"
        );
    }

    #[test]
    fn test_missing_king_is_rejected() {
        let board = Board::from_ascii(
            &[
                "....k...", "........", "........", "........", "........", "........",
                "........", "R.......",
            ],
            &mut IdSource::default(),
        )
        .unwrap();
        let err = Game::with_board(seeded(), board, Color::White).err().unwrap();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_reset_game() {
        let mut game = Game::new(seeded()).unwrap();
        game.apply_move(sq("e2"), sq("e4")).unwrap();
        game.play_ai_turn().unwrap();
        game.reset_game().unwrap();
        assert_eq!(game.state().turn_count(), 0);
        assert_eq!(game.log().len(), 1);
        assert_eq!(game.captured(Color::White).len(), 0);
        assert_eq!(game.status(), Status::ToMove(Color::White));
    }

    #[test]
    fn test_seeded_sessions_repeat() {
        let run = || {
            let mut game = Game::new(seeded()).unwrap();
            for _ in 0..6 {
                game.play_ai_turn().unwrap();
            }
            game.state().clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_engine_against_itself() {
        for seed in 0..3 {
            let mut game = Game::new(GameConfig::default().with_seed(seed)).unwrap();
            for _ in 0..150 {
                if game.is_over() {
                    break;
                }
                match game.pending().cloned() {
                    Some(Pending::Promotion(_)) => {
                        game.choose_promotion(PieceType::Queen).unwrap();
                    }
                    Some(Pending::Reinforcement(choices)) => {
                        game.choose_reinforcement(choices[0]).unwrap();
                    }
                    None => {
                        game.play_ai_turn().unwrap();
                    }
                }
                assert_eq!(
                    game.roster().len(),
                    game.board().pieces_of(Color::White).count(),
                    "\n{}",
                    game.state()
                );
            }
        }
    }
}
