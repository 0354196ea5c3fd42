//! Tick-based Snake simulation engine and the thin adapters around it.
//!
//! [`engine::GameCore`] owns every piece of mutable game state. The other
//! modules only drive it (session, input, protocol), persist around it
//! (score) or draw what it exposes (renderer).

pub mod config;
pub mod engine;
pub mod food;
pub mod input;
pub mod protocol;
pub mod renderer;
pub mod score;
pub mod session;
pub mod snake;
pub mod snapshot;
pub mod terminal_runtime;
