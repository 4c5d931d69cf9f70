//! Accusation outcome codes and the payoff table
//!
//! Scores games where the two human players accuse one another or the bot
//! from inside the chat, as the live chat server does. The detector-only
//! experiment run by the driver never produces player accusations, so it
//! reports its verdicts through the accusation ledger instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use turing_core::Color;

/// What a player's accusation amounted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum AccusationCode {
    /// No accusation made
    None = 0,
    /// Accused the bot
    Bot = 1,
    /// Accused the other human
    Human = 2,
}

impl AccusationCode {
    /// Classify an accused color from one player's point of view
    ///
    /// Any color other than the bot's or the other player's counts as no
    /// accusation.
    pub fn classify(accused: Option<&Color>, bot: &Color, other_player: &Color) -> Self {
        match accused {
            Some(color) if color.matches(bot.as_str()) => Self::Bot,
            Some(color) if color.matches(other_player.as_str()) => Self::Human,
            _ => Self::None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for AccusationCode {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::None),
            1 => Ok(Self::Bot),
            2 => Ok(Self::Human),
            other => Err(other),
        }
    }
}

/// Points awarded for one finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub player1: u32,
    pub player2: u32,
    pub bot: u32,
}

impl Scores {
    pub const fn new(player1: u32, player2: u32, bot: u32) -> Self {
        Self {
            player1,
            player2,
            bot,
        }
    }
}

/// Deterministic payoff table
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    /// Score a pair of accusations
    ///
    /// When both players accuse the bot, the earlier accuser gets 10 and the
    /// other 7. A missing timestamp never counts as earlier.
    pub fn score(
        p1: AccusationCode,
        p2: AccusationCode,
        p1_time: Option<DateTime<Utc>>,
        p2_time: Option<DateTime<Utc>>,
    ) -> Scores {
        use AccusationCode::*;
        match (p1, p2) {
            (None, None) => Scores::new(0, 0, 10),
            (None, Bot) => Scores::new(0, 10, 6),
            (Bot, None) => Scores::new(10, 0, 6),
            (None, Human) | (Human, None) => Scores::new(0, 0, 10),
            (Bot, Bot) => {
                let p1_earlier = matches!((p1_time, p2_time), (Some(a), Some(b)) if a < b);
                if p1_earlier {
                    Scores::new(10, 7, 0)
                } else {
                    Scores::new(7, 10, 0)
                }
            }
            (Bot, Human) => Scores::new(10, 0, 8),
            (Human, Bot) => Scores::new(0, 10, 8),
            (Human, Human) => Scores::new(0, 0, 10),
        }
    }

    /// Score raw stored codes; anything outside `{0, 1, 2}` scores zero
    pub fn score_codes(
        p1: u8,
        p2: u8,
        p1_time: Option<DateTime<Utc>>,
        p2_time: Option<DateTime<Utc>>,
    ) -> Scores {
        match (AccusationCode::try_from(p1), AccusationCode::try_from(p2)) {
            (Ok(a), Ok(b)) => Self::score(a, b, p1_time, p2_time),
            _ => Scores::default(),
        }
    }
}

/// Unordered pair of accusation codes, as grouped by analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccusationPattern {
    low: AccusationCode,
    high: AccusationCode,
}

impl AccusationPattern {
    pub fn new(a: AccusationCode, b: AccusationCode) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        use AccusationCode::*;
        match (self.low, self.high) {
            (None, None) => "No accusations",
            (None, Bot) => "One player accused bot",
            (None, Human) => "One player accused human",
            (Bot, Bot) => "Both players accused bot",
            (Bot, Human) => "One player accused bot, one player accused human",
            (Human, Human) => "Both players accused each other",
            // low <= high by construction
            _ => "Unknown pattern",
        }
    }
}

impl fmt::Display for AccusationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.low.code(), self.high.code())
    }
}
