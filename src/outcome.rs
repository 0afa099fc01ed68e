use std::fmt;

use serde::{Deserialize, Serialize};

// Declaration order is the tie-break precedence: 1 before X before 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn symbol(self) -> char {
        match self {
            Outcome::Home => '1',
            Outcome::Draw => 'X',
            Outcome::Away => '2',
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Concatenates symbols without separators, e.g. `[Home, Draw]` -> `"1X"`.
pub fn outcomes_to_string(outcomes: &[Outcome]) -> String {
    outcomes.iter().map(|o| o.symbol()).collect()
}
