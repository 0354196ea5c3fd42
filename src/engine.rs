use std::time::Duration;

use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::{ConfigError, EngineConfig, GridSize, tick_interval_for_speed};
use crate::food;
use crate::input::{Direction, direction_change_is_valid};
use crate::snake::{Position, Snake};
use crate::snapshot::{Snapshot, StateSummary};

/// Why a round ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Wall,
    SelfCollision,
    /// The snake covers every cell, so no food can be placed.
    BoardFull,
}

/// Round lifecycle as seen from outside the engine.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Running,
    Over { reason: EndReason },
}

/// What a single [`GameCore::tick`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// Nothing moved: the round has not started or is already over.
    Idle,
    Moved,
    Ate,
    Ended(EndReason),
}

/// Complete mutable game state for one round, plus the rules it runs under.
#[derive(Debug, Clone)]
pub struct GameCore {
    config: EngineConfig,
    grid: GridSize,
    snake: Snake,
    direction: Option<Direction>,
    food: Option<Position>,
    score: u32,
    speed: u32,
    end_reason: Option<EndReason>,
    rng: StdRng,
}

impl GameCore {
    /// Creates an engine seeded from OS entropy.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a deterministic engine for tests and reproducible runs.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = config.grid();
        let mut core = Self {
            config,
            grid,
            snake: Snake::new(center(grid)),
            direction: None,
            food: None,
            score: 0,
            speed: config.initial_speed,
            end_reason: None,
            rng,
        };
        core.reset();
        Ok(core)
    }

    /// Starts a fresh round: one segment at the center, no direction, score 0.
    pub fn reset(&mut self) {
        self.snake = Snake::new(center(self.grid));
        self.direction = None;
        self.score = 0;
        self.speed = self.config.initial_speed;
        self.end_reason = None;
        self.food = self.place_food();
    }

    /// Requests a turn. Ignored when it stays on the current axis or the round is over.
    pub fn set_direction(&mut self, requested: Direction) {
        if self.is_over() {
            return;
        }

        if direction_change_is_valid(self.direction, requested) {
            self.direction = Some(requested);
        }
    }

    /// Advances the simulation by one cell.
    pub fn tick(&mut self) -> TickOutcome {
        if self.is_over() {
            return TickOutcome::Idle;
        }
        let Some(direction) = self.direction else {
            return TickOutcome::Idle;
        };

        let head = self.snake.head().step(direction);
        self.snake.push_head(head);

        let ate = self.food == Some(head);
        if ate {
            self.score += 1;
            self.snake.extend_target();
            if self.score % self.config.speed_up_interval == 0 {
                self.speed = self.speed.saturating_add(self.config.speed_increment);
                debug!("score {} reached, speed now {}", self.score, self.speed);
            }
            self.food = self.place_food();
        } else {
            self.snake.trim_to_target();
        }

        // Collisions are judged against the body after the trim, so the head
        // may enter the cell the tail leaves on this same tick.
        let end_reason = if !head.is_within_bounds(self.grid) {
            Some(EndReason::Wall)
        } else if self.snake.head_overlaps_body() {
            Some(EndReason::SelfCollision)
        } else if self.food.is_none() {
            Some(EndReason::BoardFull)
        } else {
            None
        };

        if let Some(reason) = end_reason {
            debug!(
                "round over ({reason:?}) with score {} and length {}",
                self.score,
                self.snake.len()
            );
            self.end_reason = Some(reason);
            return TickOutcome::Ended(reason);
        }

        if ate {
            TickOutcome::Ate
        } else {
            TickOutcome::Moved
        }
    }

    /// Returns the score and game-over flag.
    #[must_use]
    pub fn get_state(&self) -> StateSummary {
        StateSummary {
            score: self.score,
            game_over: self.is_over(),
        }
    }

    /// Copies the full state for presentation.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid,
            block_size: self.config.block_size,
            snake: self.snake.segments().copied().collect(),
            food: self.food,
            direction: self.direction,
            score: self.score,
            target_length: self.snake.target_len(),
            speed: self.speed,
            phase: self.phase(),
            game_over: self.is_over(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.end_reason, self.direction) {
            (Some(reason), _) => Phase::Over { reason },
            (None, None) => Phase::NotStarted,
            (None, Some(_)) => Phase::Running,
        }
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.end_reason.is_some()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Advisory moves per second for whoever drives [`Self::tick`].
    #[must_use]
    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Time between ticks at the current advisory speed.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        tick_interval_for_speed(self.speed)
    }

    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    #[must_use]
    pub fn food(&self) -> Option<Position> {
        self.food
    }

    #[must_use]
    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    /// Replaces the snake; later ticks run against the new body.
    pub fn set_snake(&mut self, snake: Snake) {
        self.snake = snake;
    }

    /// Moves the food; `None` leaves the board without food.
    pub fn set_food(&mut self, food: Option<Position>) {
        self.food = food;
    }

    fn place_food(&mut self) -> Option<Position> {
        food::spawn_position(
            &mut self.rng,
            self.grid,
            &self.snake,
            self.config.max_placement_attempts,
        )
    }
}

/// Center cell, rounded toward the top-left.
fn center(grid: GridSize) -> Position {
    Position {
        x: i32::from(grid.width / 2),
        y: i32::from(grid.height / 2),
    }
}
