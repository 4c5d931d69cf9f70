//! The session store
//!
//! [`GameEngine`] owns every live [`GameSession`] together with the three
//! seats and the injected randomness and clock. All state changes go through
//! its methods; an unknown or ended game id yields
//! [`GameError::SessionNotFound`].

use std::collections::HashMap;
use std::sync::Arc;
use turing_core::{Clock, Color, GameId, Identity, Message, Palette, PerSeat, RandomSource, SeatColors};
use turing_llm::RetryingCompleter;

use crate::accusation::{analysis_request, parse_analysis, Verdict, NO_ANALYSIS};
use crate::error::{GameError, GameResult};
use crate::humanize::{HumanizationConfig, HumanizationPipeline};
use crate::prompts::{system_message, SeatRole};
use crate::scheduler::SchedulerState;
use crate::session::GameSession;

/// Forced opening line of every game
pub const ICEBREAKER: &str = "Hey guys, what's up?";

/// Default number of drawn turns per game
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Binding of an identity to its prompt, completer and humanization flag
#[derive(Debug, Clone)]
pub struct Seat {
    pub role: SeatRole,
    pub prompt: String,
    pub completer: Arc<RetryingCompleter>,
    pub humanized: bool,
}

impl Seat {
    /// Players are humanized, the detector is not
    pub fn new(role: SeatRole, prompt: &str, completer: Arc<RetryingCompleter>) -> Self {
        Self {
            role,
            prompt: prompt.to_string(),
            completer,
            humanized: role == SeatRole::Player,
        }
    }

    pub fn with_humanized(mut self, humanized: bool) -> Self {
        self.humanized = humanized;
        self
    }
}

/// What happened on one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub speaker: Identity,
    /// Reply text; empty when the seat stayed silent
    pub text: String,
    /// `"{color}: {text}"` when the reply was fanned out
    pub colored: Option<String>,
}

impl TurnOutcome {
    pub fn is_silent(&self) -> bool {
        self.colored.is_none()
    }
}

/// Owner of all live sessions
#[derive(Debug)]
pub struct GameEngine {
    sessions: HashMap<GameId, GameSession>,
    seats: PerSeat<Seat>,
    rng: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
    humanizer: HumanizationPipeline,
    max_rounds: u32,
}

impl GameEngine {
    pub fn new(seats: PerSeat<Seat>, rng: Box<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: HashMap::new(),
            seats,
            rng,
            clock,
            humanizer: HumanizationPipeline::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_humanization(mut self, config: HumanizationConfig) -> Self {
        self.humanizer = HumanizationPipeline::new(config);
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Rounds given to sessions started from now on
    pub fn set_max_rounds(&mut self, max_rounds: u32) {
        self.max_rounds = max_rounds;
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn seat(&self, who: Identity) -> &Seat {
        &self.seats[who]
    }

    /// Draw three distinct colors with the engine's random source
    pub fn assign_colors(&mut self, palette: &Palette) -> SeatColors {
        palette.assign(self.rng.as_mut())
    }

    pub fn active_games(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_active(&self, game_id: GameId) -> bool {
        self.sessions.contains_key(&game_id)
    }

    /// Read access to a live session
    pub fn session(&self, game_id: GameId) -> GameResult<&GameSession> {
        self.sessions
            .get(&game_id)
            .ok_or(GameError::SessionNotFound(game_id))
    }

    fn session_mut(&mut self, game_id: GameId) -> GameResult<&mut GameSession> {
        self.sessions
            .get_mut(&game_id)
            .ok_or(GameError::SessionNotFound(game_id))
    }

    /// Create a session; the detector seat wears `bot_color`
    ///
    /// Starting an id that is already live replaces that session.
    pub fn start_game(
        &mut self,
        game_id: GameId,
        bot_color: Color,
        player1_color: Color,
        player2_color: Color,
    ) {
        let colors = SeatColors::new(bot_color, player1_color, player2_color);
        let system_messages = PerSeat::from_fn(|who| {
            let seat = &self.seats[who];
            system_message(seat.role, &seat.prompt, who, &colors)
        });

        tracing::info!(game_id, colors = %colors, "Starting game");
        let session = GameSession::new(
            game_id,
            colors,
            system_messages,
            self.max_rounds,
            self.clock.now(),
        );
        if self.sessions.insert(game_id, session).is_some() {
            tracing::warn!(game_id, "Replaced a live session with the same id");
        }
    }

    /// Produce `who`'s reply to `chat_history`
    ///
    /// Humanized seats may stay silent (empty string). Otherwise the seat's
    /// system message and the history go to its completer; the reply is
    /// cleaned and, for humanized seats, passed through the humanization
    /// pipeline and held back for a simulated typing delay.
    pub async fn on_message(
        &mut self,
        game_id: GameId,
        who: Identity,
        chat_history: &[Message],
    ) -> GameResult<String> {
        let session = self
            .sessions
            .get_mut(&game_id)
            .ok_or(GameError::SessionNotFound(game_id))?;
        let seat = &self.seats[who];

        if seat.humanized
            && self
                .humanizer
                .should_stay_silent(&mut session.silence_strikes[who], self.rng.as_mut())
        {
            tracing::info!(
                game_id,
                identity = %who,
                strikes = session.silence_strikes[who],
                "Seat stays silent this turn"
            );
            return Ok(String::new());
        }

        let mut messages = Vec::with_capacity(chat_history.len() + 1);
        messages.push(Message::system(session.system_message(who)));
        messages.extend_from_slice(chat_history);

        let own_color = session.colors()[who].clone();
        let completer = Arc::clone(&seat.completer);
        let humanized = seat.humanized;

        let raw = completer.reply(messages).await;
        let cleaned = HumanizationPipeline::clean_reply(&raw, &own_color);
        if !humanized {
            return Ok(cleaned);
        }

        let text = self.humanizer.humanize(&cleaned, self.rng.as_mut());
        let delay = self.humanizer.typing_delay(&text, self.rng.as_mut());
        tracing::debug!(
            game_id,
            identity = %who,
            delay_ms = delay.as_millis() as u64,
            "Applying typing delay"
        );
        self.clock.sleep(delay).await;
        Ok(text)
    }

    /// Append `speaker`'s utterance to all three histories
    pub fn fan_out(&mut self, game_id: GameId, speaker: Identity, text: &str) -> GameResult<String> {
        let colored = self.session_mut(game_id)?.fan_out(speaker, text);
        tracing::debug!(game_id, identity = %speaker, content = %colored, "Fanned out");
        Ok(colored)
    }

    /// The detector's forced opener, fanned out as-is
    pub fn icebreaker(&mut self, game_id: GameId) -> GameResult<String> {
        self.session_mut(game_id)?.scheduler.icebreaker();
        self.fan_out(game_id, Identity::Detector, ICEBREAKER)
    }

    /// Run the next scheduled turn, or `None` once the game is finished
    pub async fn play_turn(&mut self, game_id: GameId) -> GameResult<Option<TurnOutcome>> {
        let session = self
            .sessions
            .get_mut(&game_id)
            .ok_or(GameError::SessionNotFound(game_id))?;

        if session.scheduler.state() == SchedulerState::NotStarted {
            let colored = self.icebreaker(game_id)?;
            return Ok(Some(TurnOutcome {
                speaker: Identity::Detector,
                text: ICEBREAKER.to_string(),
                colored: Some(colored),
            }));
        }

        let Some(speaker) = session.scheduler.next_speaker(self.rng.as_mut()) else {
            return Ok(None);
        };
        let history = session.histories[speaker].clone();
        tracing::debug!(game_id, identity = %speaker, round = session.round(), "Turn drawn");

        let text = self.on_message(game_id, speaker, &history).await?;
        if text.is_empty() {
            return Ok(Some(TurnOutcome {
                speaker,
                text,
                colored: None,
            }));
        }

        let colored = self.fan_out(game_id, speaker, &text)?;
        Ok(Some(TurnOutcome {
            speaker,
            text,
            colored: Some(colored),
        }))
    }

    /// Ask the detector for its verdict and remove the session
    pub async fn end_game(&mut self, game_id: GameId) -> GameResult<Verdict> {
        let mut session = self
            .sessions
            .remove(&game_id)
            .ok_or(GameError::SessionNotFound(game_id))?;
        session.end();

        let mut messages = session.context_for(Identity::Detector);
        messages.push(analysis_request());

        let completer = Arc::clone(&self.seats[Identity::Detector].completer);
        let verdict = match completer.complete_messages(messages).await {
            Ok(response) => parse_analysis(&response.content, session.colors()),
            Err(e) => {
                tracing::warn!(game_id, error = %e, "Analysis request failed");
                Verdict::Unstructured(NO_ANALYSIS.to_string())
            }
        };

        match &verdict {
            Verdict::Accusation(result) => tracing::info!(
                game_id,
                target_color = %result.target_color,
                confidence = result.confidence,
                "Game ended with an accusation"
            ),
            Verdict::Unstructured(_) => {
                tracing::warn!(game_id, "Game ended without a structured analysis")
            }
        }
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turing_core::{ManualClock, ScriptedRandom};
    use turing_llm::{KeyPool, MockProvider};

    fn engine_with(mock: MockProvider, script: Vec<f64>) -> GameEngine {
        let clock: Arc<ManualClock> = Arc::new(ManualClock::default());
        let completer = Arc::new(RetryingCompleter::new(
            Arc::new(mock),
            Arc::new(KeyPool::default()),
            clock.clone(),
            "test-model",
        ));
        let seats = PerSeat::from_fn(|who| Seat::new(SeatRole::of(who), "prompt", completer.clone()));
        GameEngine::new(seats, Box::new(ScriptedRandom::new(script)), clock)
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let mut engine = engine_with(MockProvider::constant("hi"), vec![]);
        assert!(matches!(
            engine.fan_out(9, Identity::Detector, "x"),
            Err(GameError::SessionNotFound(9))
        ));
        assert!(matches!(
            engine.end_game(9).await,
            Err(GameError::SessionNotFound(9))
        ));
        assert!(engine.session(9).is_err());
    }

    #[tokio::test]
    async fn test_detector_reply_is_not_humanized() {
        let mut engine = engine_with(MockProvider::constant("Red: what's up?\nanyone"), vec![]);
        engine.start_game(1, "Red".into(), "Blue".into(), "Green".into());
        let reply = engine.on_message(1, Identity::Detector, &[]).await.unwrap();
        assert_eq!(reply, "what's up? anyone");
    }

    #[tokio::test]
    async fn test_end_game_removes_session() {
        let mut engine = engine_with(MockProvider::smart(), vec![]);
        engine.start_game(3, "Red".into(), "Blue".into(), "Green".into());
        let verdict = engine.end_game(3).await.unwrap();
        assert_eq!(verdict.target_color(), Some(&Color::from("Blue")));
        assert!(!engine.is_active(3));
        assert!(engine.end_game(3).await.is_err());
    }

    #[tokio::test]
    async fn test_restart_replaces_session() {
        let mut engine = engine_with(MockProvider::constant("hi"), vec![]);
        engine.start_game(5, "Red".into(), "Blue".into(), "Green".into());
        engine.icebreaker(5).unwrap();
        engine.start_game(5, "Orange".into(), "Blue".into(), "Green".into());
        let session = engine.session(5).unwrap();
        assert!(session.history(Identity::Detector).is_empty());
        assert_eq!(session.colors()[Identity::Detector], Color::from("Orange"));
        assert_eq!(engine.active_games(), 1);
    }
}
