use std::time::Duration;

use thiserror::Error;

use crate::shape::MAX_SHAPE_SIZE;

pub const GRID_WIDTH: usize = 10;
pub const GRID_HEIGHT: usize = 20;

/// Largest width or height accepted. Keeps board coordinates within `i16`
/// and the terminal layout within `u16`.
pub const MAX_BOARD_SIZE: usize = 1024;

// Timing (in milliseconds)
pub const TICK_MS: u64 = 500;
pub const REPEAT_MS: u64 = 100;
pub const RELEASE_TIMEOUT_MS: u64 = 150;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("board width {0} is too small, pieces need at least 4 columns")]
    BoardTooNarrow(usize),
    #[error("board height {0} is too small, pieces need at least 4 rows")]
    BoardTooShort(usize),
    #[error("board width {0} is too large, at most 1024 columns are supported")]
    BoardTooWide(usize),
    #[error("board height {0} is too large, at most 1024 rows are supported")]
    BoardTooTall(usize),
    #[error("{name} must be greater than zero")]
    ZeroInterval { name: &'static str },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
        }
    }
}

impl GameConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.width < MAX_SHAPE_SIZE {
            return Err(ConfigError::BoardTooNarrow(self.width));
        }
        if self.height < MAX_SHAPE_SIZE {
            return Err(ConfigError::BoardTooShort(self.height));
        }
        if self.width > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooWide(self.width));
        }
        if self.height > MAX_BOARD_SIZE {
            return Err(ConfigError::BoardTooTall(self.height));
        }
        Ok(self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DriverConfig {
    /// Gravity period.
    pub tick_interval: Duration,
    /// Period of repeated moves while a key is held.
    pub repeat_interval: Duration,
    /// A hold with no refreshing press for this long counts as released.
    pub release_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(TICK_MS),
            repeat_interval: Duration::from_millis(REPEAT_MS),
            release_timeout: Duration::from_millis(RELEASE_TIMEOUT_MS),
        }
    }
}

impl DriverConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval {
                name: "tick interval",
            });
        }
        if self.repeat_interval.is_zero() {
            return Err(ConfigError::ZeroInterval {
                name: "repeat interval",
            });
        }
        Ok(self)
    }
}
