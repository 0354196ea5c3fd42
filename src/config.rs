use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playfield width in pixels.
pub const DEFAULT_WIDTH: u16 = 600;

/// Playfield height in pixels.
pub const DEFAULT_HEIGHT: u16 = 400;

/// Edge length of one grid cell in pixels.
pub const DEFAULT_BLOCK_SIZE: u16 = 20;

/// Moves per second at the start of a round.
pub const DEFAULT_INITIAL_SPEED: u32 = 10;

/// Score needed per speed increase.
pub const DEFAULT_SPEED_UP_INTERVAL: u32 = 5;

/// Moves per second added at each speed increase.
pub const DEFAULT_SPEED_INCREMENT: u32 = 2;

/// Random draws tried before food placement scans for a free cell.
pub const DEFAULT_MAX_PLACEMENT_ATTEMPTS: u32 = 256;

/// Logical grid dimensions in cells.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("block_size must be non-zero")]
    ZeroBlockSize,
    #[error("a {width}x{height} px field with block size {block_size} holds fewer than two cells")]
    GridTooSmall {
        width: u16,
        height: u16,
        block_size: u16,
    },
    #[error("initial_speed must be non-zero")]
    ZeroInitialSpeed,
    #[error("speed_up_interval must be non-zero")]
    ZeroSpeedUpInterval,
}

/// Fixed rules of one game, in the pixel units of the playfield.
///
/// Missing JSON fields fall back to the defaults; unknown fields are rejected
/// so a typo does not silently run with the default value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub width: u16,
    pub height: u16,
    pub block_size: u16,
    pub initial_speed: u32,
    pub speed_up_interval: u32,
    pub speed_increment: u32,
    pub max_placement_attempts: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            block_size: DEFAULT_BLOCK_SIZE,
            initial_speed: DEFAULT_INITIAL_SPEED,
            speed_up_interval: DEFAULT_SPEED_UP_INTERVAL,
            speed_increment: DEFAULT_SPEED_INCREMENT,
            max_placement_attempts: DEFAULT_MAX_PLACEMENT_ATTEMPTS,
        }
    }
}

impl EngineConfig {
    /// Reads, parses and validates a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Parses and validates a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.grid().total_cells() < 2 {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                block_size: self.block_size,
            });
        }
        if self.initial_speed == 0 {
            return Err(ConfigError::ZeroInitialSpeed);
        }
        if self.speed_up_interval == 0 {
            return Err(ConfigError::ZeroSpeedUpInterval);
        }
        Ok(())
    }

    /// Returns the logical grid; partial cells at the right and bottom edges are dropped.
    #[must_use]
    pub fn grid(&self) -> GridSize {
        let block = self.block_size.max(1);
        GridSize {
            width: self.width / block,
            height: self.height / block,
        }
    }
}

/// Returns the wall-clock time between ticks at `speed` moves per second.
#[must_use]
pub fn tick_interval_for_speed(speed: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(speed.max(1)))
}

/// A color theme applied to all visual elements.
#[derive(Debug)]
pub struct Theme {
    pub name: &'static str,
    pub snake_head: Color,
    pub snake_body: Color,
    pub food: Color,
    pub play_bg: Color,
    pub border_fg: Color,
    pub hud: Color,
    pub game_over: Color,
}

/// Green snake on black.
pub const THEME_CLASSIC: Theme = Theme {
    name: "Classic",
    snake_head: Color::LightGreen,
    snake_body: Color::Green,
    food: Color::Red,
    play_bg: Color::Black,
    border_fg: Color::White,
    hud: Color::White,
    game_over: Color::Red,
};

/// Yellow snake on a dark blue field.
pub const THEME_NIGHT: Theme = Theme {
    name: "Night",
    snake_head: Color::LightYellow,
    snake_body: Color::Yellow,
    food: Color::LightRed,
    play_bg: Color::Rgb(30, 30, 60),
    border_fg: Color::Cyan,
    hud: Color::Cyan,
    game_over: Color::LightRed,
};

/// Dark green snake on a light field.
pub const THEME_LIGHT: Theme = Theme {
    name: "Light",
    snake_head: Color::Rgb(0, 80, 0),
    snake_body: Color::Rgb(0, 120, 0),
    food: Color::Rgb(200, 0, 0),
    play_bg: Color::Rgb(240, 240, 240),
    border_fg: Color::DarkGray,
    hud: Color::White,
    game_over: Color::Rgb(200, 0, 0),
};

/// All available themes in cycle order.
pub const THEMES: &[Theme] = &[THEME_CLASSIC, THEME_NIGHT, THEME_LIGHT];

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ConfigError, EngineConfig, GridSize, THEMES, tick_interval_for_speed};

    #[test]
    fn default_config_yields_thirty_by_twenty_grid() {
        let config = EngineConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(
            config.grid(),
            GridSize {
                width: 30,
                height: 20,
            }
        );
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = EngineConfig::from_json(r#"{ "initial_speed": 4 }"#)
            .expect("partial config should parse");

        assert_eq!(config.initial_speed, 4);
        assert_eq!(config.block_size, 20);
        assert_eq!(config.speed_up_interval, 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = EngineConfig::from_json(r#"{ "speeed": 4 }"#);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn single_cell_grid_is_invalid() {
        let config = EngineConfig {
            width: 20,
            height: 20,
            block_size: 20,
            ..EngineConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn zero_values_are_rejected() {
        let zero_block = EngineConfig {
            block_size: 0,
            ..EngineConfig::default()
        };
        let zero_interval = EngineConfig {
            speed_up_interval: 0,
            ..EngineConfig::default()
        };
        let zero_speed = EngineConfig {
            initial_speed: 0,
            ..EngineConfig::default()
        };

        assert!(matches!(zero_block.validate(), Err(ConfigError::ZeroBlockSize)));
        assert!(matches!(
            zero_interval.validate(),
            Err(ConfigError::ZeroSpeedUpInterval)
        ));
        assert!(matches!(
            zero_speed.validate(),
            Err(ConfigError::ZeroInitialSpeed)
        ));
    }

    #[test]
    fn tick_interval_shrinks_as_speed_grows() {
        assert_eq!(tick_interval_for_speed(10), Duration::from_millis(100));
        assert_eq!(tick_interval_for_speed(20), Duration::from_millis(50));
        assert_eq!(tick_interval_for_speed(0), Duration::from_millis(1000));
    }

    #[test]
    fn themes_cycle_classic_night_light() {
        let names: Vec<_> = THEMES.iter().map(|theme| theme.name).collect();
        assert_eq!(names, ["Classic", "Night", "Light"]);
    }
}
