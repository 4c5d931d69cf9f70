//! Experiment driver
//!
//! Plays a fixed number of games back to back against one [`GameEngine`],
//! writing every utterance and verdict to a [`TranscriptSink`] and folding
//! accusations into an [`AccusationLedger`].

use std::time::Duration;
use turing_core::{Color, GameId, Palette, SeatColors, DEFAULT_PALETTE};

use crate::accusation::{format_number, AccusationLedger, Verdict};
use crate::engine::{GameEngine, DEFAULT_MAX_ROUNDS};
use crate::error::GameResult;
use crate::transcript::TranscriptSink;

/// Run parameters
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub max_games: u32,
    pub max_rounds: u32,
    /// Colors to draw pseudonyms from; validated when the run starts
    pub colors: Vec<Color>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            max_games: 10,
            max_rounds: DEFAULT_MAX_ROUNDS,
            colors: DEFAULT_PALETTE.iter().map(|c| Color::from(*c)).collect(),
        }
    }
}

/// Record of one finished game
#[derive(Debug, Clone)]
pub struct GameReport {
    pub game_id: GameId,
    pub colors: SeatColors,
    /// Utterances fanned out, icebreaker included
    pub utterances: u32,
    /// Turns a seat spent silent
    pub silences: u32,
    pub verdict: Verdict,
}

/// Result of a full run
#[derive(Debug, Clone)]
pub struct ExperimentSummary {
    pub games: Vec<GameReport>,
    pub ledger: AccusationLedger,
    pub elapsed: Duration,
}

/// Loops games until `max_games` is reached
pub struct ExperimentDriver<S: TranscriptSink> {
    engine: GameEngine,
    sink: S,
    config: ExperimentConfig,
    ledger: AccusationLedger,
    game_id: GameId,
}

impl<S: TranscriptSink> ExperimentDriver<S> {
    pub fn new(mut engine: GameEngine, sink: S, config: ExperimentConfig) -> Self {
        engine.set_max_rounds(config.max_rounds);
        Self {
            engine,
            sink,
            config,
            ledger: AccusationLedger::new(),
            game_id: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Play every game, then write the run summary
    ///
    /// Fails only when the configured palette is invalid.
    pub async fn run(&mut self) -> GameResult<ExperimentSummary> {
        let palette = Palette::new(self.config.colors.clone())?;
        let started = self.engine.clock().now();
        let mut games = Vec::with_capacity(self.config.max_games as usize);

        for _ in 0..self.config.max_games {
            games.push(self.run_game(&palette).await?);
        }

        let elapsed = (self.engine.clock().now() - started)
            .to_std()
            .unwrap_or_default();
        for line in self.ledger.summary_lines() {
            self.emit(&line);
        }
        self.emit("");
        self.emit(&format!(
            "Game session ended in {:.3} seconds.",
            elapsed.as_secs_f64()
        ));
        self.emit("");
        self.flush();

        tracing::info!(
            games = games.len(),
            elapsed_secs = elapsed.as_secs_f64(),
            "Experiment finished"
        );
        Ok(ExperimentSummary {
            games,
            ledger: self.ledger.clone(),
            elapsed,
        })
    }

    async fn run_game(&mut self, palette: &Palette) -> GameResult<GameReport> {
        self.game_id += 1;
        let game_id = self.game_id;
        let colors = self.engine.assign_colors(palette);
        let [detector, player1, player2] = colors.clone().into_array();

        self.engine.start_game(game_id, detector, player1, player2);
        self.emit(&format!("Game {} started: {}", game_id, colors));

        let opener = self.engine.icebreaker(game_id)?;
        self.emit(&format!("### {}", opener));
        let mut utterances = 1;
        let mut silences = 0;

        while let Some(turn) = self.engine.play_turn(game_id).await? {
            match &turn.colored {
                Some(colored) => {
                    self.emit(&format!("### {}", colored));
                    utterances += 1;
                }
                None => silences += 1,
            }
        }

        let verdict = self.engine.end_game(game_id).await?;
        if let Verdict::Accusation(result) = &verdict {
            self.ledger.record(result);
        }

        let target = verdict
            .target_color()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "None".to_string());
        let confidence = format_number(verdict.confidence().unwrap_or(0.0));
        self.emit("");
        self.emit(&format!("### TARGET COLOR: ||{}||", target));
        self.emit(&format!("### CONFIDENCE: ||{}||", confidence));
        self.emit(&format!("### Detector's analysis:\n{}", verdict.rationale()));
        self.emit(&format!("Game {} ended.", game_id));
        self.emit("");
        self.emit("");
        self.flush();

        Ok(GameReport {
            game_id,
            colors,
            utterances,
            silences,
            verdict,
        })
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = self.sink.write_line(line) {
            tracing::warn!(game_id = self.game_id, error = %e, "Transcript write failed");
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(error = %e, "Transcript flush failed");
        }
    }
}
