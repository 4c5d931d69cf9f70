//! End-of-game analysis parsing and accusation aggregates
//!
//! The detector answers a fixed instruction with free text. [`parse_analysis`]
//! pulls out the target color and confidence; anything it cannot read is kept
//! verbatim as a [`Verdict::Unstructured`]. [`AccusationLedger`] keeps running
//! per-player aggregates across games.

use serde::{Deserialize, Serialize};
use turing_core::{Color, Identity, Message, SeatColors};

/// Instruction appended to the detector history when a game ends
pub const ANALYSIS_PROMPT: &str = "The game is over. Based on your hidden analysis, which color is the bot?\n\n\
Target Color: [Color]\n\
Confidence: [0-100%]\n\
Key Indicators:\n\
1. [Primary observation]\n\
2. [Secondary observation]\n\
3. [Tertiary observation]\n\
Analysis Summary: [2-3 sentence explanation]";

/// Rationale used when the analysis request itself fails
pub const NO_ANALYSIS: &str = "No analysis available";

const TARGET_PREFIX: &str = "Target Color:";
const CONFIDENCE_PREFIX: &str = "Confidence:";
const INDICATORS_MARKER: &str = "Key Indicators:";

/// The analysis request message
pub fn analysis_request() -> Message {
    Message::user(ANALYSIS_PROMPT)
}

/// A parsed accusation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccusationResult {
    pub target_color: Color,
    /// Percentage in `[0, 100]`
    pub confidence: f64,
    /// Analysis text, starting at `Key Indicators:` when present
    pub rationale: String,
    /// Colors of the session the accusation was made in
    pub colors: SeatColors,
}

/// Outcome of `end_game`
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accusation(AccusationResult),
    /// Unparseable analysis, or the fallback text when no analysis came back
    Unstructured(String),
}

impl Verdict {
    pub fn target_color(&self) -> Option<&Color> {
        match self {
            Verdict::Accusation(result) => Some(&result.target_color),
            Verdict::Unstructured(_) => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Verdict::Accusation(result) => Some(result.confidence),
            Verdict::Unstructured(_) => None,
        }
    }

    pub fn rationale(&self) -> &str {
        match self {
            Verdict::Accusation(result) => &result.rationale,
            Verdict::Unstructured(raw) => raw,
        }
    }
}

/// Parse the detector's final analysis
pub fn parse_analysis(text: &str, colors: &SeatColors) -> Verdict {
    let target = field(text, TARGET_PREFIX).filter(|t| !t.is_empty());
    let confidence = field(text, CONFIDENCE_PREFIX)
        .and_then(|c| c.trim_end_matches('%').trim().parse::<f64>().ok())
        .filter(|c| c.is_finite());

    match (target, confidence) {
        (Some(target), Some(confidence)) => {
            let rationale = match text.find(INDICATORS_MARKER) {
                Some(idx) => &text[idx..],
                None => text,
            };
            Verdict::Accusation(AccusationResult {
                target_color: Color::from(target),
                confidence: confidence.clamp(0.0, 100.0),
                rationale: rationale.to_string(),
                colors: colors.clone(),
            })
        }
        _ => Verdict::Unstructured(text.to_string()),
    }
}

/// Value after the first line starting with `prefix`
fn field<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    text.lines()
        .map(str::trim_start)
        .find_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
}

/// Running aggregate for one accused seat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStat {
    pub guess_count: u32,
    pub running_mean_confidence: f64,
    pub rationales: Vec<String>,
}

impl AggregateStat {
    /// Fold one more accusation into the mean
    pub fn record(&mut self, confidence: f64, rationale: &str) {
        let n = f64::from(self.guess_count);
        self.running_mean_confidence = (n * self.running_mean_confidence + confidence) / (n + 1.0);
        self.guess_count += 1;
        self.rationales.push(rationale.to_string());
    }
}

/// Per-player accusation aggregates across a run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccusationLedger {
    player1: AggregateStat,
    player2: AggregateStat,
}

impl AccusationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate for a player seat; `None` for the detector
    pub fn bucket(&self, who: Identity) -> Option<&AggregateStat> {
        match who {
            Identity::Player1 => Some(&self.player1),
            Identity::Player2 => Some(&self.player2),
            Identity::Detector => None,
        }
    }

    /// Record an accusation against whichever player wears the target color
    ///
    /// Returns the accused seat, or `None` when the color matches neither
    /// player (logged and skipped).
    pub fn record(&mut self, result: &AccusationResult) -> Option<Identity> {
        let accused = result.colors.identity_of(result.target_color.as_str());
        let bucket = match accused {
            Some(Identity::Player1) => &mut self.player1,
            Some(Identity::Player2) => &mut self.player2,
            _ => {
                tracing::warn!(
                    target_color = %result.target_color,
                    colors = %result.colors,
                    "Accused color matches neither player, skipping"
                );
                return None;
            }
        };
        bucket.record(result.confidence, &result.rationale);
        accused
    }

    /// End-of-run summary, one transcript line per entry
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for who in [Identity::Player1, Identity::Player2] {
            let guesses = self.bucket(who).map(|b| b.guess_count).unwrap_or(0);
            lines.push(format!("Detector's guess for {}: {}", who.transcript_key(), guesses));
        }
        for who in [Identity::Player1, Identity::Player2] {
            let mean = self
                .bucket(who)
                .map(|b| b.running_mean_confidence)
                .unwrap_or(0.0);
            lines.push(format!(
                "Target confidence for {}: {}",
                who.transcript_key(),
                format_number(mean)
            ));
        }
        for who in [Identity::Player1, Identity::Player2] {
            lines.push(String::new());
            lines.push(format!("Detector's analysis for {}:", who.transcript_key()));
            if let Some(bucket) = self.bucket(who) {
                lines.extend(bucket.rationales.iter().cloned());
            }
        }
        lines
    }
}

/// Render a float the way the transcript has always shown it (`70.0`, `62.5`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors() -> SeatColors {
        SeatColors::new("Red".into(), "Blue".into(), "Green".into())
    }

    const ANALYSIS: &str = "Target Color: Blue\nConfidence: 80%\nKey Indicators:\n1. Fast replies\n2. No typos\n3. Formal tone\nAnalysis Summary: Blue felt scripted.";

    #[test]
    fn test_parse_structured() {
        let verdict = parse_analysis(ANALYSIS, &colors());
        let Verdict::Accusation(result) = verdict else {
            panic!("expected structured verdict");
        };
        assert_eq!(result.target_color, Color::from("Blue"));
        assert_eq!(result.confidence, 80.0);
        assert!(result.rationale.starts_with("Key Indicators:\n1. Fast replies"));
        assert!(result.rationale.ends_with("Blue felt scripted."));
    }

    #[test]
    fn test_parse_without_indicators_keeps_full_text() {
        let text = "Target Color: Green\nConfidence: 55.5";
        let verdict = parse_analysis(text, &colors());
        assert_eq!(verdict.confidence(), Some(55.5));
        assert_eq!(verdict.rationale(), text);
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let verdict = parse_analysis("Target Color: Green\nConfidence: 140%", &colors());
        assert_eq!(verdict.confidence(), Some(100.0));
    }

    #[test]
    fn test_malformed_is_unstructured() {
        let text = "I think it's Blue, pretty sure.";
        assert_eq!(
            parse_analysis(text, &colors()),
            Verdict::Unstructured(text.to_string())
        );
        let text = "Target Color: Blue\nConfidence: very high";
        assert!(matches!(parse_analysis(text, &colors()), Verdict::Unstructured(_)));
    }

    #[test]
    fn test_running_mean() {
        let mut ledger = AccusationLedger::new();
        let Verdict::Accusation(mut result) = parse_analysis(ANALYSIS, &colors()) else {
            panic!("expected structured verdict");
        };
        assert_eq!(ledger.record(&result), Some(Identity::Player1));
        let first = ledger.bucket(Identity::Player1).unwrap();
        assert_eq!(first.running_mean_confidence, 80.0);

        result.confidence = 60.0;
        ledger.record(&result);
        let stat = ledger.bucket(Identity::Player1).unwrap();
        assert_eq!(stat.guess_count, 2);
        assert_eq!(stat.running_mean_confidence, 70.0);
        assert_eq!(stat.rationales.len(), 2);
        assert_eq!(ledger.bucket(Identity::Player2).unwrap().guess_count, 0);
    }

    #[test]
    fn test_unknown_or_detector_color_skipped() {
        let mut ledger = AccusationLedger::new();
        for target in ["Purple", "Red"] {
            let result = AccusationResult {
                target_color: Color::from(target),
                confidence: 90.0,
                rationale: "hunch".into(),
                colors: colors(),
            };
            assert_eq!(ledger.record(&result), None);
        }
        assert_eq!(ledger.bucket(Identity::Player1).unwrap().guess_count, 0);
        assert_eq!(ledger.bucket(Identity::Player2).unwrap().guess_count, 0);
    }

    #[test]
    fn test_summary_lines() {
        let mut ledger = AccusationLedger::new();
        ledger.record(&AccusationResult {
            target_color: Color::from("Green"),
            confidence: 62.5,
            rationale: "Key Indicators: stiff".into(),
            colors: colors(),
        });
        let lines = ledger.summary_lines();
        assert_eq!(lines[0], "Detector's guess for chatbot1: 0");
        assert_eq!(lines[1], "Detector's guess for chatbot2: 1");
        assert_eq!(lines[2], "Target confidence for chatbot1: 0.0");
        assert_eq!(lines[3], "Target confidence for chatbot2: 62.5");
        assert_eq!(lines[5], "Detector's analysis for chatbot1:");
        assert_eq!(lines[8], "Key Indicators: stiff");
    }
}
