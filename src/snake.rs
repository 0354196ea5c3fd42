use std::collections::VecDeque;

use serde::Serialize;

use crate::config::GridSize;
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns the neighbouring cell one step towards `direction`.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Returns the top-left pixel corner of this cell.
    #[must_use]
    pub fn to_pixels(self, block_size: u16) -> (i32, i32) {
        let block = i32::from(block_size);
        (self.x * block, self.y * block)
    }
}

/// Snake body (front is head) and the length it is growing towards.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    target_len: usize,
}

impl Snake {
    /// Creates a one-cell snake at `start`.
    #[must_use]
    pub fn new(start: Position) -> Self {
        let mut body = VecDeque::new();
        body.push_front(start);

        Self {
            body,
            target_len: 1,
        }
    }

    /// Creates a snake from explicit body segments (front is head), already at
    /// its target length.
    ///
    /// # Panics
    ///
    /// Panics when `segments` is empty.
    #[must_use]
    pub fn from_segments(segments: Vec<Position>) -> Self {
        assert!(!segments.is_empty(), "snake needs at least one segment");

        let target_len = segments.len();
        Self {
            body: VecDeque::from(segments),
            target_len,
        }
    }

    /// Prepends a new head; the body is one longer until the next trim.
    pub fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Raises the target length by one segment.
    pub fn extend_target(&mut self) {
        self.target_len += 1;
    }

    /// Drops the tail segment when the body is longer than its target.
    pub fn trim_to_target(&mut self) {
        if self.body.len() > self.target_len {
            let _ = self.body.pop_back();
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns true if the head overlaps any non-head segment.
    #[must_use]
    pub fn head_overlaps_body(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    #[must_use]
    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::GridSize;
    use crate::input::Direction;

    use super::{Position, Snake};

    #[test]
    fn step_moves_one_cell_with_y_growing_down() {
        let origin = Position::new(5, 5);

        assert_eq!(origin.step(Direction::Up), Position::new(5, 4));
        assert_eq!(origin.step(Direction::Down), Position::new(5, 6));
        assert_eq!(origin.step(Direction::Left), Position::new(4, 5));
        assert_eq!(origin.step(Direction::Right), Position::new(6, 5));
    }

    #[test]
    fn bounds_exclude_the_far_edges() {
        let bounds = GridSize {
            width: 30,
            height: 20,
        };

        assert!(Position::new(0, 0).is_within_bounds(bounds));
        assert!(Position::new(29, 19).is_within_bounds(bounds));
        assert!(!Position::new(30, 0).is_within_bounds(bounds));
        assert!(!Position::new(0, -1).is_within_bounds(bounds));
    }

    #[test]
    fn pixel_coordinates_are_block_multiples() {
        assert_eq!(Position::new(15, 10).to_pixels(20), (300, 200));
        assert_eq!(Position::new(-1, 0).to_pixels(20), (-20, 0));
    }

    #[test]
    fn trim_keeps_body_at_target_length() {
        let mut snake = Snake::new(Position::new(5, 5));

        snake.push_head(Position::new(6, 5));
        assert_eq!(snake.len(), 2);

        snake.trim_to_target();
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), Position::new(6, 5));
    }

    #[test]
    fn extended_target_skips_one_trim() {
        let mut snake = Snake::new(Position::new(5, 5));

        snake.push_head(Position::new(6, 5));
        snake.extend_target();
        snake.trim_to_target();

        assert_eq!(snake.len(), 2);
        assert_eq!(snake.target_len(), 2);
        assert!(snake.occupies(Position::new(5, 5)));
    }

    #[test]
    fn head_overlap_ignores_the_head_itself() {
        let single = Snake::new(Position::new(1, 1));
        let looped = Snake::from_segments(vec![
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(2, 2),
            Position::new(1, 2),
            Position::new(1, 1),
        ]);

        assert!(!single.head_overlaps_body());
        assert!(looped.head_overlaps_body());
    }
}
