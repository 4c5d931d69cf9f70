//! Role prompts and per-seat system messages

use serde::{Deserialize, Serialize};
use std::path::Path;
use turing_core::{Identity, PerSeat, SeatColors};

/// How a seat behaves in the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatRole {
    /// Chats along while looking for the bot; analyses at the end
    Detector,
    /// Chats along; replies are humanized
    Player,
}

impl SeatRole {
    /// Role of the seat at `who` in the standard line-up
    pub fn of(who: Identity) -> Self {
        match who {
            Identity::Detector => SeatRole::Detector,
            Identity::Player1 | Identity::Player2 => SeatRole::Player,
        }
    }
}

/// Prompt text blob for each seat
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSet {
    pub prompts: PerSeat<String>,
}

impl PromptSet {
    pub fn new(detector: &str, player1: &str, player2: &str) -> Self {
        Self {
            prompts: PerSeat::new(detector.to_string(), player1.to_string(), player2.to_string()),
        }
    }

    /// Read each prompt from a file
    ///
    /// Trailing whitespace is dropped. A missing or unreadable file is
    /// logged and leaves that prompt empty.
    pub fn load(
        detector: impl AsRef<Path>,
        player1: impl AsRef<Path>,
        player2: impl AsRef<Path>,
    ) -> Self {
        Self {
            prompts: PerSeat::new(
                read_prompt(detector.as_ref()),
                read_prompt(player1.as_ref()),
                read_prompt(player2.as_ref()),
            ),
        }
    }

    pub fn get(&self, who: Identity) -> &str {
        &self.prompts[who]
    }
}

fn read_prompt(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Cannot read prompt file, using an empty prompt"
            );
            String::new()
        }
    }
}

/// Compose the system message that opens `who`'s history
pub fn system_message(role: SeatRole, prompt: &str, who: Identity, colors: &SeatColors) -> String {
    let own = &colors[who];
    let [a, b] = who.others().map(|other| &colors[other]);
    match role {
        SeatRole::Detector => format!(
            "{prompt}\n\
             Your color is {own}. Your opponents' colors are {a} and {b}.\n\
             At the end of the game, you will be asked to identify which player is the bot.\n\
             IMPORTANT RULES:\n\
             1. Keep responses short and casual, with 1-2 sentences\n\
             2. NEVER use 'Assistant' or any similar terms\n\
             3. Only analyze internally - never reveal detective work\n\
             4. Match the casual tone of other participants\n\
             5. Use contractions (I'm, don't, etc.)\n\
             6. Keep responses focused and direct"
        ),
        SeatRole::Player => format!(
            "{prompt}. Your color is {own}, your opponents' colors are {a} and {b}. \
             Never refer to your own color. But you can occasionally use others' colors \
             to mention them. Provide your response with at most 2 sentences."
        ),
    }
}
