#[macro_use]
extern crate impl_ops;

pub mod agents;
pub mod attacks;
pub mod boards;
pub mod chess_errors;
pub mod config;
pub mod engine;
pub mod game;
pub mod game_state;
pub mod move_log;
pub mod movegen;
pub mod moves;
pub mod pieces;
pub mod positions;
pub mod progression;
