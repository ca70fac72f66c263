use clap::Parser;
use roguechess::agents::{HeuristicAgent, HumanAgent, SlowAgent};
use roguechess::boards::MAX_ARMIES;
use roguechess::chess_errors::ChessResult;
use roguechess::config::GameConfig;
use roguechess::game::{Agent, Game, Match};
use roguechess::game_state::Status;
use roguechess::pieces::Color;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------
// Command line
// ---------------------------------------------

/// Roguelike chess: clear board after board against a stronger engine.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Stack this many Black armies on one tall board instead of resetting
    /// after every cleared board.
    #[arg(
        long,
        value_name = "ARMIES",
        value_parser = clap::value_parser!(u8).range(1..=MAX_ARMIES as i64)
    )]
    persistent: Option<u8>,

    /// Seed for the engine's tie-breaks and the reinforcement draws.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause before each engine move, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Let the engine play White as well.
    #[arg(long)]
    autoplay: bool,

    /// Stop after this many turns.
    #[arg(long)]
    max_plies: Option<u32>,
}

impl Args {
    fn config(&self) -> GameConfig {
        let mut config = match self.persistent {
            Some(armies) => GameConfig::persistent(armies),
            None => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(ms) = self.delay_ms {
            config = config.with_ai_delay(Duration::from_millis(ms));
        }
        config
    }
}

fn show(game: &Game) {
    println!("{}", game.board());
    for entry in game.log().recent().take(4) {
        println!("  {}", entry);
    }
    println!("{}", game.status());
}

fn run<W: Agent>(white: W, config: GameConfig, max_plies: Option<u32>) -> ChessResult<Status> {
    let black = SlowAgent::new(HeuristicAgent::new(), config.ai_delay);
    let game = Game::new(config)?;
    show(&game);
    let mut session = Match::new(white, black, game);
    let status = session.play(max_plies, show)?;
    println!(
        "{} boards cleared, {} Black pieces captured",
        session.game().boards_cleared(),
        session.game().captured(Color::Black).len()
    );
    Ok(status)
}

// ---------------------------------------------
// Main
// ---------------------------------------------

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let config = args.config();
    info!(mode = ?config.mode, seed = ?config.seed, "starting session");

    let result = if args.autoplay {
        run(HeuristicAgent::new(), config, args.max_plies)
    } else {
        run(HumanAgent::new(), config, args.max_plies)
    };
    match result {
        Ok(status) => println!("{}", status),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
