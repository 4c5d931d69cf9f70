//! Text humanization for bot-controlled seats
//!
//! A generated reply passes through, in order:
//!
//! 1. a silence roll (at most `max_silence_strikes` per seat and session)
//! 2. blocked-word stripping
//! 3. trailing-question removal
//! 4. at most one typo or style mutation
//!
//! and is then delayed by a simulated typing time. Replies shorter than
//! `min_mutation_len` characters skip steps 3 and 4.

use std::time::Duration;
use turing_core::{Color, RandomSource};

/// One kind of typing slip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypoKind {
    /// Swap two neighbouring characters
    SwapAdjacent,
    /// Repeat a letter two or three times
    RepeatLetter,
    /// Delete a space
    RemoveSpace,
    /// Insert a space between two non-space characters
    AddSpace,
    /// Delete a letter that is neither first nor last
    RemoveLetter,
    /// Double one of `. , ! ?`
    DoublePunctuation,
    /// Uppercase a letter after the first character
    CapitalizeLetter,
}

/// Tunables for [`HumanizationPipeline`]
#[derive(Debug, Clone)]
pub struct HumanizationConfig {
    /// Silence when a roll in `[0, 100)` falls below this
    pub silence_percent: usize,
    /// Silences allowed per seat and session
    pub max_silence_strikes: u32,
    /// Substrings removed case-insensitively from replies
    pub blocked_words: Vec<String>,
    /// Chance of dropping a trailing `?`
    pub question_drop_probability: f64,
    /// Typo kinds tried in order with their probabilities
    pub typo_chain: Vec<(TypoKind, f64)>,
    /// Shorter replies get no question drop and no typo
    pub min_mutation_len: usize,
    /// Typing speed range in characters per second
    pub chars_per_second: (f64, f64),
    /// Thinking time range in seconds
    pub thinking_secs: (f64, f64),
    /// Upper bound on the total delay in seconds
    pub max_delay_secs: f64,
}

impl Default for HumanizationConfig {
    fn default() -> Self {
        Self {
            silence_percent: 20,
            max_silence_strikes: 3,
            blocked_words: ["iParam", "abi", "wbu", "hbu"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
            question_drop_probability: 0.7,
            typo_chain: vec![
                (TypoKind::SwapAdjacent, 0.15),
                (TypoKind::RepeatLetter, 0.12),
                (TypoKind::RemoveSpace, 0.10),
                (TypoKind::AddSpace, 0.08),
                (TypoKind::RemoveLetter, 0.08),
                (TypoKind::DoublePunctuation, 0.07),
                (TypoKind::CapitalizeLetter, 0.06),
            ],
            min_mutation_len: 3,
            chars_per_second: (3.0, 5.0),
            thinking_secs: (0.5, 2.0),
            max_delay_secs: 6.0,
        }
    }
}

/// Post-processing applied to generated replies
#[derive(Debug, Clone, Default)]
pub struct HumanizationPipeline {
    config: HumanizationConfig,
}

impl HumanizationPipeline {
    pub fn new(config: HumanizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HumanizationConfig {
        &self.config
    }

    /// Roll for silence, consuming a strike when the seat stays quiet
    ///
    /// The roll is drawn even when no strikes remain.
    pub fn should_stay_silent(&self, strikes: &mut u32, rng: &mut dyn RandomSource) -> bool {
        let roll = rng.below(100);
        if roll < self.config.silence_percent && *strikes < self.config.max_silence_strikes {
            *strikes += 1;
            true
        } else {
            false
        }
    }

    /// Normalize a raw model reply
    ///
    /// Removes every `"{own_color}:"` label and every bare mention of the
    /// seat's own color, then collapses whitespace (newlines included) to
    /// single spaces. Other seats' colors are left alone.
    pub fn clean_reply(raw: &str, own_color: &Color) -> String {
        let own = own_color.as_str();
        if own.is_empty() {
            return raw.split_whitespace().collect::<Vec<_>>().join(" ");
        }
        let label = format!("{}:", own);
        raw.replace(&label, "")
            .replace(own, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Steps 2 to 4: blocked words, trailing question, one typo
    pub fn humanize(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        let stripped = self.strip_blocked(text);
        if stripped.chars().count() < self.config.min_mutation_len {
            return stripped;
        }
        let trimmed = self.drop_trailing_question(stripped, rng);
        self.inject_typo(&trimmed, rng)
    }

    /// Remove every blocked word, longest first
    ///
    /// Matching ignores case; the surrounding text keeps its casing. After a
    /// deletion the scan resumes at the deletion point.
    pub fn strip_blocked(&self, text: &str) -> String {
        let mut words: Vec<Vec<char>> = self
            .config
            .blocked_words
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| w.chars().map(fold).collect())
            .collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut chars: Vec<char> = text.chars().collect();
        for word in &words {
            let mut start = 0;
            while let Some(idx) = find_folded(&chars, word, start) {
                chars.drain(idx..idx + word.len());
                start = idx;
            }
        }
        chars.into_iter().collect()
    }

    /// Drop a trailing `?` with the configured probability
    pub fn drop_trailing_question(&self, mut text: String, rng: &mut dyn RandomSource) -> String {
        if text.ends_with('?') && rng.chance(self.config.question_drop_probability) {
            text.pop();
        }
        text
    }

    /// Apply at most one typo
    ///
    /// Kinds are tried in chain order. The first successful roll applies
    /// its mutation and ends the chain, even when the mutation finds
    /// nothing to change.
    pub fn inject_typo(&self, text: &str, rng: &mut dyn RandomSource) -> String {
        let mut chars: Vec<char> = text.chars().collect();
        for &(kind, probability) in &self.config.typo_chain {
            if rng.chance(probability) {
                apply_typo(kind, &mut chars, rng);
                break;
            }
        }
        chars.into_iter().collect()
    }

    /// Simulated typing time for `text`
    pub fn typing_delay(&self, text: &str, rng: &mut dyn RandomSource) -> Duration {
        let (slow, fast) = self.config.chars_per_second;
        let (think_min, think_max) = self.config.thinking_secs;
        let speed = rng.uniform(slow, fast);
        let thinking = rng.uniform(think_min, think_max);
        let secs = (text.chars().count() as f64 / speed + thinking).min(self.config.max_delay_secs);
        Duration::from_secs_f64(secs.max(0.0))
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find_folded(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| {
        haystack[i..i + needle.len()]
            .iter()
            .zip(needle)
            .all(|(h, n)| fold(*h) == *n)
    })
}

fn pick(positions: &[usize], rng: &mut dyn RandomSource) -> Option<usize> {
    if positions.is_empty() {
        None
    } else {
        positions.get(rng.below(positions.len())).copied()
    }
}

fn apply_typo(kind: TypoKind, chars: &mut Vec<char>, rng: &mut dyn RandomSource) {
    let n = chars.len();
    if n == 0 {
        return;
    }
    match kind {
        TypoKind::SwapAdjacent => {
            if n < 2 {
                return;
            }
            let i = rng.below(n - 1);
            chars.swap(i, i + 1);
        }
        TypoKind::RepeatLetter => {
            let i = rng.below(n);
            let c = chars[i];
            if !c.is_alphabetic() {
                return;
            }
            let count = 2 + rng.below(2);
            chars.splice(i..i + 1, std::iter::repeat(c).take(count));
        }
        TypoKind::RemoveSpace => {
            let spaces: Vec<usize> = (0..n).filter(|&i| chars[i] == ' ').collect();
            if let Some(i) = pick(&spaces, rng) {
                chars.remove(i);
            }
        }
        TypoKind::AddSpace => {
            let gaps: Vec<usize> = (1..n)
                .filter(|&i| !chars[i - 1].is_whitespace() && !chars[i].is_whitespace())
                .collect();
            if let Some(i) = pick(&gaps, rng) {
                chars.insert(i, ' ');
            }
        }
        TypoKind::RemoveLetter => {
            let letters: Vec<usize> = (1..n.saturating_sub(1))
                .filter(|&i| chars[i].is_alphabetic())
                .collect();
            if let Some(i) = pick(&letters, rng) {
                chars.remove(i);
            }
        }
        TypoKind::DoublePunctuation => {
            let marks: Vec<usize> = (0..n)
                .filter(|&i| matches!(chars[i], '.' | ',' | '!' | '?'))
                .collect();
            if let Some(i) = pick(&marks, rng) {
                chars.insert(i, chars[i]);
            }
        }
        TypoKind::CapitalizeLetter => {
            let letters: Vec<usize> = (1..n).filter(|&i| chars[i].is_alphabetic()).collect();
            if let Some(i) = pick(&letters, rng) {
                let upper: Vec<char> = chars[i].to_uppercase().collect();
                chars.splice(i..i + 1, upper);
            }
        }
    }
}
