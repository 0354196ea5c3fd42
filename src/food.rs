use log::warn;
use rand::Rng;

use crate::config::GridSize;
use crate::snake::{Position, Snake};

/// Picks a cell for new food that no snake segment occupies.
///
/// Draws x and y uniformly and independently, redrawing on overlap, for up to
/// `max_attempts` draws. After that it picks uniformly among the free cells.
/// Returns `None` only when the snake covers the whole grid.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
    max_attempts: u32,
) -> Option<Position> {
    if bounds.width == 0 || bounds.height == 0 {
        return None;
    }

    for _ in 0..max_attempts {
        let candidate = Position {
            x: rng.gen_range(0..i32::from(bounds.width)),
            y: rng.gen_range(0..i32::from(bounds.height)),
        };
        if !snake.occupies(candidate) {
            return Some(candidate);
        }
    }

    if max_attempts > 0 {
        warn!(
            "food placement missed {max_attempts} random draws with {} of {} cells occupied; scanning free cells",
            snake.len(),
            bounds.total_cells()
        );
    }

    let candidates = free_cells(bounds, snake);
    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}

/// Lists every cell not covered by the snake, row by row.
#[must_use]
pub fn free_cells(bounds: GridSize, snake: &Snake) -> Vec<Position> {
    let mut candidates = Vec::with_capacity(bounds.total_cells().saturating_sub(snake.len()));

    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    candidates
}
