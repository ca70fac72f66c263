/// Differing kinds of agents that can play the game
use crate::chess_errors::*;
use crate::game::{Agent, Game, Pending};
use crate::pieces::PieceType;
use crate::positions::Position;
use crate::progression::Rarity;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::io::{stdout, Write};
use std::time::Duration;
use text_io::read;

/// Reads moves and choices from stdin. Bad input is reported and asked for
/// again; only fatal errors are passed on.
pub struct HumanAgent {}

impl HumanAgent {
    pub fn new() -> Self {
        HumanAgent {}
    }

    fn prompt(text: &str) -> String {
        print!("{}", text);
        let _ = stdout().flush();
        let line: String = read!("{}\n");
        line.trim().to_string()
    }

    fn parse_move(line: &str) -> ChessResult<(Position, Position)> {
        let squares: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|s| !s.is_empty())
            .collect();
        match squares.as_slice() {
            [from, to] => Ok((from.parse()?, to.parse()?)),
            _ => Err(ChessError::Parse(line.to_string())),
        }
    }

    fn attempt(game: &mut Game) -> ChessResult<()> {
        match game.pending().cloned() {
            Some(Pending::Promotion(square)) => {
                let line = HumanAgent::prompt(&format!(
                    "Promote the pawn on {} to (queen/rook/bishop/knight): ",
                    square
                ));
                game.choose_promotion(line.parse()?)?;
            }
            Some(Pending::Reinforcement(choices)) => {
                println!("Board {} cleared! Choose a reinforcement:", game.boards_cleared());
                for kind in &choices {
                    println!("  {} ({})", kind, Rarity::of(*kind));
                }
                let line = HumanAgent::prompt("Reinforcement: ");
                game.choose_reinforcement(line.parse()?)?;
            }
            None => {
                let line = HumanAgent::prompt("Your move (e.g. e2 e4): ");
                let (from, to) = HumanAgent::parse_move(&line)?;
                game.apply_move(from, to)?;
            }
        }
        Ok(())
    }
}

impl Default for HumanAgent {
    fn default() -> Self {
        HumanAgent::new()
    }
}

impl Agent for HumanAgent {
    fn take_turn(&mut self, game: &mut Game) -> ChessResult<()> {
        loop {
            match HumanAgent::attempt(game) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_fatal() || e == ChessError::GameOver => return Err(e),
                Err(e) if e.is_deselection() => println!("{}, pick one of your pieces.", e),
                Err(e) => println!("{}", e),
            }
        }
    }
}

/// Lets the heuristic engine play. Promotes to a queen and takes the first
/// reinforcement offered.
pub struct HeuristicAgent {}

impl HeuristicAgent {
    pub fn new() -> Self {
        HeuristicAgent {}
    }
}

impl Default for HeuristicAgent {
    fn default() -> Self {
        HeuristicAgent::new()
    }
}

impl Agent for HeuristicAgent {
    fn take_turn(&mut self, game: &mut Game) -> ChessResult<()> {
        match game.pending().cloned() {
            Some(Pending::Promotion(_)) => {
                game.choose_promotion(PieceType::Queen)?;
            }
            Some(Pending::Reinforcement(choices)) => {
                if let Some(kind) = choices.first() {
                    game.choose_reinforcement(*kind)?;
                }
            }
            None => {
                game.play_ai_turn()?;
            }
        }
        Ok(())
    }
}

/// Plays a uniformly random legal move and random choices.
pub struct RandomAgent {
    rng: SmallRng,
}

impl RandomAgent {
    pub fn new(rng: SmallRng) -> Self {
        RandomAgent { rng }
    }
}

impl Agent for RandomAgent {
    fn take_turn(&mut self, game: &mut Game) -> ChessResult<()> {
        match game.pending().cloned() {
            Some(Pending::Promotion(_)) => {
                let kind = *PieceType::PROMOTIONS
                    .choose(&mut self.rng)
                    .unwrap_or(&PieceType::Queen);
                game.choose_promotion(kind)?;
            }
            Some(Pending::Reinforcement(choices)) => {
                if let Some(kind) = choices.choose(&mut self.rng) {
                    game.choose_reinforcement(*kind)?;
                }
            }
            None => {
                let moves = game.state().all_legal_moves();
                match moves.choose(&mut self.rng) {
                    Some(mv) => {
                        game.apply_move(mv.start, mv.end)?;
                    }
                    // Mates to resolve and dormant turns to pass.
                    None => {
                        game.play_ai_turn()?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Waits before letting the inner agent play, so moves can be followed.
pub struct SlowAgent<A: Agent> {
    inner: A,
    delay: Duration,
}

impl<A: Agent> SlowAgent<A> {
    pub fn new(agent: A, delay: Duration) -> Self {
        SlowAgent { inner: agent, delay }
    }
}

impl<A: Agent> Agent for SlowAgent<A> {
    fn take_turn(&mut self, game: &mut Game) -> ChessResult<()> {
        std::thread::sleep(self.delay);
        self.inner.take_turn(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Match;
    use crate::pieces::Color;
    use rand::SeedableRng;

    #[test]
    fn test_parse_move() {
        let (from, to) = HumanAgent::parse_move("e2 e4").unwrap();
        assert_eq!((from.to_string(), to.to_string()), ("e2".into(), "e4".into()));
        assert!(HumanAgent::parse_move("g1-f3").is_ok());
        assert!(HumanAgent::parse_move("e2").is_err());
        assert!(HumanAgent::parse_move("e2 z9").is_err());
    }

    #[test]
    fn test_random_against_engine() {
        let game = Game::new(GameConfig::default().with_seed(8)).unwrap();
        let white = RandomAgent::new(SmallRng::seed_from_u64(8));
        let black = SlowAgent::new(HeuristicAgent::new(), Duration::from_millis(0));
        let mut m = Match::new(white, black, game);

        let mut turns = 0;
        m.play(Some(60), |_| turns += 1).unwrap();
        assert!(turns <= 60);
        assert!(turns == 60 || m.game().is_over());
        assert!(!m.game().log().is_empty());
    }

    #[test]
    fn test_engine_against_engine_in_persistent_mode() {
        let game = Game::new(GameConfig::persistent(2).with_seed(3)).unwrap();
        assert_eq!(game.board().rows(), 16);
        let mut m = Match::new(HeuristicAgent::new(), HeuristicAgent::new(), game);
        m.play(Some(80), |g| {
            assert_eq!(
                g.roster().len(),
                g.board().pieces_of(Color::White).count()
            );
        })
        .unwrap();
    }
}
