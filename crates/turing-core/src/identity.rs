//! Session seats and their color pseudonyms
//!
//! Every game has exactly three seats. The detector always sits at index 0,
//! the two players at 1 and 2. Each seat is known to the others only by a
//! color drawn from a [`Palette`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::CoreError;
use crate::random::RandomSource;

/// Identifier of one game session
pub type GameId = u64;

/// The six colors of the standard palette
pub const DEFAULT_PALETTE: [&str; 6] = ["Orange", "Purple", "Blue", "Red", "Green", "Black"];

/// One of the three seats in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identity {
    Detector,
    Player1,
    Player2,
}

impl Identity {
    /// All seats in index order
    pub const ALL: [Identity; 3] = [Identity::Detector, Identity::Player1, Identity::Player2];

    pub fn index(self) -> usize {
        match self {
            Identity::Detector => 0,
            Identity::Player1 => 1,
            Identity::Player2 => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self, CoreError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(CoreError::UnknownIdentity(index))
    }

    /// Whether this seat is one of the two players under test
    pub fn is_player(self) -> bool {
        !matches!(self, Identity::Detector)
    }

    /// Key used for this seat in persisted transcripts
    pub fn transcript_key(self) -> &'static str {
        match self {
            Identity::Detector => "detector",
            Identity::Player1 => "chatbot1",
            Identity::Player2 => "chatbot2",
        }
    }

    /// The two other seats, in index order
    pub fn others(self) -> [Identity; 2] {
        match self {
            Identity::Detector => [Identity::Player1, Identity::Player2],
            Identity::Player1 => [Identity::Detector, Identity::Player2],
            Identity::Player2 => [Identity::Detector, Identity::Player1],
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Identity::Detector => "detector",
            Identity::Player1 => "player1",
            Identity::Player2 => "player2",
        };
        f.write_str(name)
    }
}

/// A color pseudonym
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(String);

impl Color {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against free text (e.g. model output)
    pub fn matches(&self, text: &str) -> bool {
        self.0.eq_ignore_ascii_case(text.trim())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Color {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Color {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A value for each of the three seats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSeat<T> {
    seats: [T; 3],
}

impl<T> PerSeat<T> {
    pub fn new(detector: T, player1: T, player2: T) -> Self {
        Self {
            seats: [detector, player1, player2],
        }
    }

    pub fn from_fn(mut f: impl FnMut(Identity) -> T) -> Self {
        Self::new(
            f(Identity::Detector),
            f(Identity::Player1),
            f(Identity::Player2),
        )
    }

    /// Iterate seats in index order
    pub fn iter(&self) -> impl Iterator<Item = (Identity, &T)> {
        Identity::ALL.into_iter().zip(self.seats.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Identity, &mut T)> {
        Identity::ALL.into_iter().zip(self.seats.iter_mut())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Identity, &T) -> U) -> PerSeat<U> {
        PerSeat::from_fn(|who| f(who, &self.seats[who.index()]))
    }

    /// Values in index order: detector, player1, player2
    pub fn into_array(self) -> [T; 3] {
        self.seats
    }
}

impl<T: Default> Default for PerSeat<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Identity> for PerSeat<T> {
    type Output = T;

    fn index(&self, who: Identity) -> &T {
        &self.seats[who.index()]
    }
}

impl<T> IndexMut<Identity> for PerSeat<T> {
    fn index_mut(&mut self, who: Identity) -> &mut T {
        &mut self.seats[who.index()]
    }
}

/// The colors bound to each seat of one session
pub type SeatColors = PerSeat<Color>;

impl PerSeat<Color> {
    /// Seat wearing `color`, if any (case-insensitive)
    pub fn identity_of(&self, color: &str) -> Option<Identity> {
        self.iter()
            .find(|(_, c)| c.matches(color))
            .map(|(who, _)| who)
    }
}

/// Renders as `{'detector': 'Red', 'chatbot1': 'Blue', 'chatbot2': 'Green'}`,
/// the form downstream transcript analytics expect.
impl fmt::Display for PerSeat<Color> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (who, color)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{}': '{}'", who.transcript_key(), color)?;
        }
        f.write_str("}")
    }
}

/// Fixed set of colors that sessions draw their pseudonyms from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    /// Validate a palette: at least 3 colors, no duplicates
    pub fn new(colors: Vec<Color>) -> Result<Self, CoreError> {
        if colors.len() < 3 {
            return Err(CoreError::PaletteTooSmall(colors.len()));
        }
        for (i, color) in colors.iter().enumerate() {
            if colors[..i].iter().any(|c| c.matches(color.as_str())) {
                return Err(CoreError::DuplicateColor(color.to_string()));
            }
        }
        Ok(Self { colors })
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Draw three distinct colors uniformly without replacement
    ///
    /// The first draw goes to the detector, then player1, then player2.
    pub fn assign(&self, rng: &mut dyn RandomSource) -> SeatColors {
        // Partial Fisher-Yates over palette indices
        let mut order: Vec<usize> = (0..self.colors.len()).collect();
        for k in 0..3 {
            let j = k + rng.below(order.len() - k);
            order.swap(k, j);
        }
        PerSeat::from_fn(|who| self.colors[order[who.index()]].clone())
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_PALETTE.iter().map(|c| Color::from(*c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, StdRandom};
    use std::collections::HashSet;

    #[test]
    fn test_identity_roundtrip() {
        for who in Identity::ALL {
            assert_eq!(Identity::from_index(who.index()).unwrap(), who);
        }
        assert_eq!(Identity::from_index(3), Err(CoreError::UnknownIdentity(3)));
    }

    #[test]
    fn test_palette_rejects_small_and_duplicate() {
        let small = Palette::new(vec!["Red".into(), "Blue".into()]);
        assert_eq!(small, Err(CoreError::PaletteTooSmall(2)));

        let dup = Palette::new(vec!["Red".into(), "Blue".into(), "red".into()]);
        assert_eq!(dup, Err(CoreError::DuplicateColor("red".to_string())));
    }

    #[test]
    fn test_assign_scripted() {
        let palette = Palette::default();
        // Orange Purple Blue Red Green Black
        // k=0: j = 0 + floor(0.5*6) = 3 -> Red
        // k=1: j = 1 + floor(0.0*5) = 1 -> Purple
        // k=2: j = 2 + floor(0.99*4) = 5 -> Black
        let mut rng = ScriptedRandom::new([0.5, 0.0, 0.99]);
        let colors = palette.assign(&mut rng);
        assert_eq!(colors[Identity::Detector].as_str(), "Red");
        assert_eq!(colors[Identity::Player1].as_str(), "Purple");
        assert_eq!(colors[Identity::Player2].as_str(), "Black");
    }

    proptest::proptest! {
        #[test]
        fn test_assign_always_distinct(seed in proptest::prelude::any::<u64>()) {
            let palette = Palette::default();
            let mut rng = StdRandom::seeded(seed);
            let colors = palette.assign(&mut rng);
            let set: HashSet<_> = colors.iter().map(|(_, c)| c.clone()).collect();
            proptest::prop_assert_eq!(set.len(), 3);
        }
    }

    #[test]
    fn test_assign_is_roughly_uniform() {
        let palette = Palette::default();
        let mut rng = StdRandom::seeded(3);
        let mut detector_counts = [0usize; 6];
        let trials = 6000;
        for _ in 0..trials {
            let colors = palette.assign(&mut rng);
            let idx = palette
                .colors()
                .iter()
                .position(|c| c == &colors[Identity::Detector])
                .unwrap();
            detector_counts[idx] += 1;
        }
        for count in detector_counts {
            assert!((800..1200).contains(&count), "count {count} out of band");
        }
    }

    #[test]
    fn test_seat_colors_display_and_lookup() {
        let colors = SeatColors::new("Red".into(), "Blue".into(), "Green".into());
        assert_eq!(
            colors.to_string(),
            "{'detector': 'Red', 'chatbot1': 'Blue', 'chatbot2': 'Green'}"
        );
        assert_eq!(colors.identity_of(" blue "), Some(Identity::Player1));
        assert_eq!(colors.identity_of("Purple"), None);
    }
}
