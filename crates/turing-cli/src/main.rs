//! Turing Game experiment runner
//!
//! # Usage
//!
//! ```bash
//! # Ten games of ten rounds against Groq, keys read from groq_api_keys.txt
//! turing-experiment -m llama3.2 -f game_session.log
//!
//! # Offline dry run with the built-in mock backend
//! turing-experiment --provider mock -g 2 -r 4 --seed 7 -v
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use turing_llm::ProviderKind;

mod experiment;

/// Run back-to-back Turing Game sessions and log them to a transcript
#[derive(Parser, Debug)]
#[command(
    name = "turing-experiment",
    version,
    about = "Turing Game experiment runner",
    long_about = "Plays a detector against two players, all backed by chat-completion\n\
                  models, and appends every utterance and verdict to a transcript."
)]
pub struct Cli {
    /// Model identifier passed to the backend
    #[arg(short, long, env = "TURING_MODEL")]
    model: Option<String>,

    /// Transcript file (appended to)
    #[arg(short = 'f', long = "file", default_value = "game_session.log")]
    file: PathBuf,

    /// Number of games to play
    #[arg(short = 'g', long = "games", default_value_t = 10)]
    games: u32,

    /// Turns per game, icebreaker excluded
    #[arg(short = 'r', long = "rounds", default_value_t = 10)]
    rounds: u32,

    /// Completion backend: groq, openai, ollama or mock
    #[arg(long, env = "TURING_PROVIDER")]
    provider: Option<ProviderKind>,

    /// Newline-separated API key file
    #[arg(long, env = "TURING_API_KEYS_FILE")]
    keys: Option<PathBuf>,

    /// Override the backend base URL
    #[arg(long, env = "TURING_BASE_URL")]
    base_url: Option<String>,

    /// Detector system prompt
    #[arg(long, default_value = "prompts/detector_prompt.txt")]
    detector_prompt: PathBuf,

    /// Player 1 system prompt
    #[arg(long, default_value = "prompts/system_prompt.txt")]
    player1_prompt: PathBuf,

    /// Player 2 system prompt
    #[arg(long, default_value = "prompts/system_prompt_v00_bad.txt")]
    player2_prompt: PathBuf,

    /// Seed the random source to replay a run
    #[arg(long)]
    seed: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let summary = experiment::run(&cli).await?;
    println!(
        "Played {} games in {:.3}s, transcript at {}",
        summary.games.len(),
        summary.elapsed.as_secs_f64(),
        cli.file.display()
    );
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
