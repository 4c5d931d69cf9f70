//! Per-recipient history fan-out
//!
//! One utterance becomes three history entries. The speaker sees it as its
//! own `assistant` message without a label; the two others see it as a
//! `user` message prefixed with the speaker's color.

use turing_core::{Identity, Message, PerSeat, SeatColors};

/// The three entries produced by one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOut {
    /// `"{color}: {text}"`, used for logs and transcripts
    pub colored: String,
    pub entries: PerSeat<Message>,
}

impl FanOut {
    /// Build the per-recipient entries for `speaker` saying `text`
    pub fn new(speaker: Identity, text: &str, colors: &SeatColors) -> Self {
        let colored = format!("{}: {}", colors[speaker], text);
        let entries = PerSeat::from_fn(|recipient| {
            if recipient == speaker {
                Message::assistant(text)
            } else {
                Message::user(colored.clone())
            }
        });
        Self { colored, entries }
    }

    /// Append one entry to each history and return the colored content
    pub fn append_to(self, histories: &mut PerSeat<Vec<Message>>) -> String {
        let FanOut { colored, entries } = self;
        let [detector, player1, player2] = entries.into_array();
        histories[Identity::Detector].push(detector);
        histories[Identity::Player1].push(player1);
        histories[Identity::Player2].push(player2);
        debug_assert!(
            histories[Identity::Detector].len() == histories[Identity::Player1].len()
                && histories[Identity::Player1].len() == histories[Identity::Player2].len(),
            "histories diverged after fan-out"
        );
        colored
    }
}
