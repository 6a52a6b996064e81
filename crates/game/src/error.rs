//! Game layer errors.

use thiserror::Error;

use crate::level::LevelId;

/// Errors returned by the level catalog, progress checks and config loading.
#[derive(Debug, Error)]
pub enum GameError {
    /// No level is registered under this name.
    #[error("unknown level '{0}'")]
    UnknownLevel(String),

    /// The level needs more stars than have been collected.
    #[error("level {level} is locked: {needed} more stars needed")]
    LevelLocked { level: LevelId, needed: u32 },

    /// The tuning file is not valid JSON for [`SimulationConfig`](crate::SimulationConfig).
    #[error("invalid tuning file: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    /// The tuning file parsed but holds an unusable value.
    #[error("invalid tuning value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Result alias for the game crate.
pub type GameResult<T> = Result<T, GameError>;
