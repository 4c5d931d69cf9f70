//! # Turing Core
//!
//! Core types shared by every Turing Game crate:
//! - [`Identity`]: the three session seats (detector, player1, player2)
//! - [`Color`] and [`Palette`]: pseudonyms and the color assigner
//! - [`PerSeat`]: a fixed map from identity to value
//! - [`Message`]: typed role/content chat record
//! - [`RandomSource`] and [`Clock`]: injectable randomness and time

pub mod clock;
pub mod error;
pub mod identity;
pub mod message;
pub mod random;

pub use clock::{Clock, ManualClock, TokioClock};
pub use error::CoreError;
pub use identity::{Color, GameId, Identity, Palette, PerSeat, SeatColors, DEFAULT_PALETTE};
pub use message::{Message, Role};
pub use random::{RandomSource, ScriptedRandom, StdRandom};
