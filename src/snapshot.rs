use serde::Serialize;

use crate::config::GridSize;
use crate::engine::Phase;
use crate::input::Direction;
use crate::snake::Position;

/// Score and terminal flag, the minimal view polled by remote clients.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct StateSummary {
    pub score: u32,
    pub game_over: bool,
}

/// Immutable copy of everything a presentation adapter needs to draw a frame.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub grid: GridSize,
    pub block_size: u16,
    /// Body segments from head to tail.
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub direction: Option<Direction>,
    pub score: u32,
    pub target_length: usize,
    pub speed: u32,
    pub phase: Phase,
    pub game_over: bool,
}

impl Snapshot {
    #[must_use]
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            score: self.score,
            game_over: self.game_over,
        }
    }
}
