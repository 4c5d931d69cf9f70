//! Turn scheduling among the three seats
//!
//! The first utterance of a session always belongs to the detector (the
//! icebreaker). Every later turn draws `x` uniformly from `{0, 1}`; if `x`
//! equals the previous speaker's index it becomes `2`. A previous speaker of
//! `2` therefore never changes the raw draw. The icebreaker does not count
//! toward `max_rounds`.

use serde::{Deserialize, Serialize};
use turing_core::{Identity, RandomSource};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    NotStarted,
    InRound,
    Finished,
}

/// Decides who speaks next, round by round
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    state: SchedulerState,
    previous: Identity,
    rounds_played: u32,
    max_rounds: u32,
}

impl TurnScheduler {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            state: SchedulerState::NotStarted,
            previous: Identity::Detector,
            rounds_played: 0,
            max_rounds,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == SchedulerState::Finished
    }

    /// Drawn turns taken so far (icebreaker excluded)
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn previous(&self) -> Identity {
        self.previous
    }

    /// Force the opening turn to the detector
    pub fn icebreaker(&mut self) -> Identity {
        self.previous = Identity::Detector;
        self.state = if self.max_rounds == 0 {
            SchedulerState::Finished
        } else {
            SchedulerState::InRound
        };
        Identity::Detector
    }

    /// Next speaker, or `None` once the session is finished
    ///
    /// Calling this before the icebreaker runs the icebreaker.
    pub fn next_speaker(&mut self, rng: &mut dyn RandomSource) -> Option<Identity> {
        match self.state {
            SchedulerState::Finished => None,
            SchedulerState::NotStarted => Some(self.icebreaker()),
            SchedulerState::InRound => {
                let mut index = rng.below(2);
                if index == self.previous.index() {
                    index = 2;
                }
                let speaker = Identity::from_index(index).ok()?;
                self.previous = speaker;
                self.rounds_played += 1;
                if self.rounds_played >= self.max_rounds {
                    self.state = SchedulerState::Finished;
                }
                Some(speaker)
            }
        }
    }
}
