//! Error types for game orchestration

use thiserror::Error;
use turing_core::{CoreError, GameId};

/// Errors surfaced by the game engine and driver
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Session not found: {0}")]
    SessionNotFound(GameId),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
