//! Error types for core configuration

use thiserror::Error;

/// Errors raised while building core values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Palette needs at least 3 distinct colors, got {0}")]
    PaletteTooSmall(usize),
    #[error("Duplicate palette color: {0}")]
    DuplicateColor(String),
    #[error("Unknown identity index: {0}")]
    UnknownIdentity(usize),
}
