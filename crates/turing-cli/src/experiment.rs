//! Wiring from command-line arguments to a running experiment

use anyhow::{Context, Result};
use std::sync::Arc;
use turing_core::{Clock, PerSeat, RandomSource, StdRandom, TokioClock};
use turing_game::{
    ExperimentConfig, ExperimentDriver, ExperimentSummary, FileTranscript, GameEngine, PromptSet,
    Seat, SeatRole, TranscriptSink,
};
use turing_llm::{LlmConfig, RetryingCompleter};

use crate::Cli;

/// Environment configuration with command-line overrides applied
pub fn llm_config(cli: &Cli) -> LlmConfig {
    let mut config = LlmConfig::from_env();
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(keys) = &cli.keys {
        config.api_keys_file = Some(keys.clone());
    }
    if let Some(url) = &cli.base_url {
        config.base_url = Some(url.clone());
    }
    config
}

/// Build an engine whose three seats share one completer
pub fn build_engine(
    config: &LlmConfig,
    prompts: &PromptSet,
    rng: Box<dyn RandomSource>,
    clock: Arc<dyn Clock>,
) -> GameEngine {
    let keys = Arc::new(config.key_pool());
    if config.uses_keys() && keys.is_empty() {
        tracing::error!(
            provider = %config.provider,
            "No API keys loaded, requests will be unauthenticated"
        );
    }

    let completer = Arc::new(
        RetryingCompleter::new(config.build_provider(), keys, clock.clone(), &config.model)
            .with_config(config.retry_config())
            .with_temperature(config.temperature),
    );
    let seats =
        PerSeat::from_fn(|who| Seat::new(SeatRole::of(who), prompts.get(who), completer.clone()));

    GameEngine::new(seats, rng, clock)
}

/// Play the configured number of games into `sink`
pub async fn run_with_sink<S: TranscriptSink>(cli: &Cli, sink: S) -> Result<ExperimentSummary> {
    let config = llm_config(cli);
    tracing::info!(
        provider = %config.provider,
        model = %config.model,
        games = cli.games,
        rounds = cli.rounds,
        "Starting experiment"
    );

    let prompts = PromptSet::load(&cli.detector_prompt, &cli.player1_prompt, &cli.player2_prompt);
    let rng: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(StdRandom::seeded(seed)),
        None => Box::new(StdRandom::new()),
    };
    let engine = build_engine(&config, &prompts, rng, Arc::new(TokioClock));

    let experiment = ExperimentConfig {
        max_games: cli.games,
        max_rounds: cli.rounds,
        ..ExperimentConfig::default()
    };
    let mut driver = ExperimentDriver::new(engine, sink, experiment);
    let summary = driver.run().await.context("experiment aborted")?;
    Ok(summary)
}

/// Play the configured number of games into the transcript file
pub async fn run(cli: &Cli) -> Result<ExperimentSummary> {
    let sink = FileTranscript::open(&cli.file)
        .with_context(|| format!("failed to open transcript {}", cli.file.display()))?;
    run_with_sink(cli, sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use turing_game::MemoryTranscript;
    use turing_core::Identity;
    use turing_llm::ProviderKind;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["turing-experiment"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.games, 10);
        assert_eq!(cli.rounds, 10);
        assert_eq!(cli.file, std::path::PathBuf::from("game_session.log"));
        assert_eq!(
            cli.player2_prompt,
            std::path::PathBuf::from("prompts/system_prompt_v00_bad.txt")
        );
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "-m",
            "llama-3.1-8b-instant",
            "--provider",
            "ollama",
            "--base-url",
            "http://gpu-box:11434",
            "-g",
            "3",
            "-r",
            "5",
            "-vv",
        ]);
        let config = llm_config(&cli);
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.provider, ProviderKind::Ollama);
        assert_eq!(config.base_url.as_deref(), Some("http://gpu-box:11434"));
        assert!(!config.uses_keys());
        assert_eq!((cli.games, cli.rounds, cli.verbose), (3, 5, 2));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let argv = ["turing-experiment", "--provider", "carrier-pigeon"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[tokio::test]
    async fn test_mock_run_writes_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.txt");
        let missing = missing.to_str().unwrap();
        let cli = parse(&[
            "--provider",
            "mock",
            "-g",
            "1",
            "-r",
            "0",
            "--seed",
            "9",
            "--detector-prompt",
            missing,
            "--player1-prompt",
            missing,
            "--player2-prompt",
            missing,
        ]);

        let summary = run_with_sink(&cli, MemoryTranscript::new()).await.unwrap();
        assert_eq!(summary.games.len(), 1);
        assert_eq!(summary.games[0].utterances, 1);
        let accused = summary.ledger.bucket(Identity::Player1).unwrap();
        assert_eq!(accused.guess_count, 1);
    }
}
