//! # Turing Game
//!
//! Session orchestration for the Turing Game experiment: a detector and two
//! players chat under color pseudonyms, and at the end the detector names the
//! color it believes is the bot.
//!
//! ## Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`scheduler`] | who speaks next (icebreaker, reroll-to-2 draws) |
//! | [`fanout`] | one utterance into three recipient-specific entries |
//! | [`humanize`] | silence, blocked words, typos, typing latency |
//! | [`engine`] | the session store: start, reply, fan out, end |
//! | [`accusation`] | analysis parsing and running aggregates |
//! | [`scoring`] | payoff table for player accusations |
//! | [`driver`] | multi-game experiment loop with a transcript |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use turing_core::{ManualClock, PerSeat, StdRandom};
//! use turing_game::{GameEngine, Seat, SeatRole};
//! use turing_llm::{KeyPool, MockProvider, RetryingCompleter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let clock = Arc::new(ManualClock::default());
//!     let completer = Arc::new(RetryingCompleter::new(
//!         Arc::new(MockProvider::smart()),
//!         Arc::new(KeyPool::default()),
//!         clock.clone(),
//!         "llama3.2",
//!     ));
//!     let seats = PerSeat::from_fn(|who| Seat::new(SeatRole::of(who), "", completer.clone()));
//!     let mut engine = GameEngine::new(seats, Box::new(StdRandom::seeded(1)), clock)
//!         .with_max_rounds(4);
//!
//!     engine.start_game(42, "Red".into(), "Blue".into(), "Green".into());
//!     engine.icebreaker(42).unwrap();
//!     while let Some(_turn) = engine.play_turn(42).await.unwrap() {}
//!     let verdict = engine.end_game(42).await.unwrap();
//!     assert!(verdict.target_color().is_some());
//! }
//! ```

pub mod accusation;
pub mod driver;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod humanize;
pub mod prompts;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod transcript;

pub use accusation::{
    analysis_request, parse_analysis, AccusationLedger, AccusationResult, AggregateStat, Verdict,
    ANALYSIS_PROMPT, NO_ANALYSIS,
};
pub use driver::{ExperimentConfig, ExperimentDriver, ExperimentSummary, GameReport};
pub use engine::{GameEngine, Seat, TurnOutcome, DEFAULT_MAX_ROUNDS, ICEBREAKER};
pub use error::{GameError, GameResult};
pub use fanout::FanOut;
pub use humanize::{HumanizationConfig, HumanizationPipeline, TypoKind};
pub use prompts::{system_message, PromptSet, SeatRole};
pub use scheduler::{SchedulerState, TurnScheduler};
pub use scoring::{AccusationCode, AccusationPattern, Scores, ScoringEngine};
pub use session::{GameSession, SessionStatus};
pub use transcript::{FileTranscript, MemoryTranscript, TranscriptSink};
