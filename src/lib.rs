//! Falling-block puzzle engine.
//!
//! [`game::Game`] owns the board, the active piece and the score. Callers
//! drive it with moves, rotations and gravity ticks, and read back a
//! [`game::GameSnapshot`] plus a queue of [`game::GameEvent`]s.
//! [`driver::Driver`] adds the gravity clock and held-key repeat on top.

pub mod board;
pub mod config;
pub mod driver;
pub mod game;
pub mod high_score;
pub mod piece;
pub mod shape;
pub mod spawner;
