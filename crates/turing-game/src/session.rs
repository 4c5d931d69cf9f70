//! Mutable state for one game

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use turing_core::{GameId, Identity, Message, PerSeat, SeatColors};

use crate::fanout::FanOut;
use crate::scheduler::TurnScheduler;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Ended,
}

/// State tying colors, histories and scheduling together for one game
///
/// Histories hold only fanned-out chat entries; each seat's system message
/// is kept separately and prepended when the seat is asked to reply. All
/// three histories have the same length after every fan-out.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: GameId,
    colors: SeatColors,
    system_messages: PerSeat<String>,
    pub(crate) histories: PerSeat<Vec<Message>>,
    pub(crate) scheduler: TurnScheduler,
    pub(crate) silence_strikes: PerSeat<u32>,
    status: SessionStatus,
    started_at: DateTime<Utc>,
}

impl GameSession {
    pub fn new(
        id: GameId,
        colors: SeatColors,
        system_messages: PerSeat<String>,
        max_rounds: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            colors,
            system_messages,
            histories: PerSeat::default(),
            scheduler: TurnScheduler::new(max_rounds),
            silence_strikes: PerSeat::default(),
            status: SessionStatus::Active,
            started_at,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn colors(&self) -> &SeatColors {
        &self.colors
    }

    pub fn system_message(&self, who: Identity) -> &str {
        &self.system_messages[who]
    }

    pub fn history(&self, who: Identity) -> &[Message] {
        &self.histories[who]
    }

    /// Drawn turns so far (icebreaker excluded)
    pub fn round(&self) -> u32 {
        self.scheduler.rounds_played()
    }

    pub fn max_rounds(&self) -> u32 {
        self.scheduler.max_rounds()
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn silence_strikes(&self, who: Identity) -> u32 {
        self.silence_strikes[who]
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Full request context for `who`: system message, then its history
    pub fn context_for(&self, who: Identity) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.histories[who].len() + 1);
        messages.push(Message::system(self.system_messages[who].clone()));
        messages.extend(self.histories[who].iter().cloned());
        messages
    }

    pub(crate) fn fan_out(&mut self, speaker: Identity, text: &str) -> String {
        FanOut::new(speaker, text, &self.colors).append_to(&mut self.histories)
    }

    pub(crate) fn end(&mut self) {
        self.status = SessionStatus::Ended;
    }
}
