use crate::boards::{MAX_ARMIES, SEGMENT_ROWS};
use std::time::Duration;

/// Which roguelike variant a session plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionMode {
    /// One standard board at a time; each cleared board earns a
    /// reinforcement and a fresh Black army.
    ResetAndReinforce,
    /// A single board stacking `armies` Black armies that wake up as White
    /// advances.
    PersistentArmies { armies: u8 },
}

impl ProgressionMode {
    /// Number of Black armies on the board, clamped to `1..=MAX_ARMIES`.
    pub fn armies(self) -> u8 {
        match self {
            ProgressionMode::ResetAndReinforce => 1,
            ProgressionMode::PersistentArmies { armies } => armies.clamp(1, MAX_ARMIES),
        }
    }
}

/// Constants turning a difficulty level into engine weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyCurve {
    pub base_multiplier: f64,
    pub multiplier_step: f64,
    pub max_multiplier: f64,
    pub hard_level: u32,
    pub expert_level: u32,
    pub development_base: f64,
    pub development_step: f64,
    pub development_floor: f64,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        DifficultyCurve {
            base_multiplier: 0.3,
            multiplier_step: 0.4,
            max_multiplier: 5.0,
            hard_level: 3,
            expert_level: 6,
            development_base: 20.0,
            development_step: 2.0,
            development_floor: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub mode: ProgressionMode,
    pub curve: DifficultyCurve,
    /// Below this many pieces on the board the engine plays an endgame.
    pub endgame_threshold: usize,
    /// Row distance at which a dormant army notices White.
    pub activation_distance: u8,
    /// Difficulty levels between consecutive armies in persistent mode.
    pub army_level_step: u32,
    pub reinforcement_choices: usize,
    pub ai_delay: Duration,
    /// Fixed seed for the session's random source; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            mode: ProgressionMode::ResetAndReinforce,
            curve: DifficultyCurve::default(),
            endgame_threshold: 12,
            activation_distance: 4,
            army_level_step: 2,
            reinforcement_choices: 3,
            ai_delay: Duration::from_millis(500),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn persistent(armies: u8) -> Self {
        GameConfig::default().with_mode(ProgressionMode::PersistentArmies {
            armies: armies.clamp(1, MAX_ARMIES),
        })
    }

    pub fn with_mode(mut self, mode: ProgressionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_ai_delay(mut self, delay: Duration) -> Self {
        self.ai_delay = delay;
        self
    }

    pub fn with_activation_distance(mut self, rows: u8) -> Self {
        self.activation_distance = rows;
        self
    }

    /// Rows of the board this configuration plays on.
    pub fn board_rows(&self) -> u8 {
        self.mode.armies() * SEGMENT_ROWS
    }
}
