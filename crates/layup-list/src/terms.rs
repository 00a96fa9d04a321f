//! Academic term identifiers and their chronological ordering.
//!
//! Terms are written as a two-digit year followed by a season letter
//! (`16F`, `17W`). Years outside 2000-2099 keep all their digits (`1999F`).
//! Sorting the raw strings does not follow the calendar, so
//! every consumer orders terms through [`Term::ordering_key`] instead.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sub-period of an academic year, declared in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'W' => Some(Self::Winter),
            'S' => Some(Self::Spring),
            'X' => Some(Self::Summer),
            'F' => Some(Self::Fall),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Self::Winter => 'W',
            Self::Spring => 'S',
            Self::Summer => 'X',
            Self::Fall => 'F',
        }
    }

    fn rank(self) -> u32 {
        match self {
            Self::Winter => 1,
            Self::Spring => 2,
            Self::Summer => 3,
            Self::Fall => 4,
        }
    }
}

/// A parsed academic term. Field order makes the derived `Ord` chronological.
const CENTURY: std::ops::RangeInclusive<u16> = 2000..=2099;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    year: u16,
    season: Season,
}

impl Term {
    pub fn new(year: u16, season: Season) -> Self {
        Self { year, season }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Single comparable integer: `year * 10 + season`. Distinct terms never
    /// share a key and later terms always have larger keys.
    pub fn ordering_key(&self) -> u32 {
        u32::from(self.year) * 10 + self.season.rank()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized term '{0}'")]
pub struct TermError(pub String);

impl FromStr for Term {
    type Err = TermError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase();
        let unrecognized = || TermError(raw.to_string());

        let season_letter = normalized.chars().last().ok_or_else(unrecognized)?;
        let season = Season::from_letter(season_letter).ok_or_else(unrecognized)?;
        let digits = &normalized[..normalized.len() - season_letter.len_utf8()];

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(unrecognized());
        }

        let year = match digits.len() {
            2 => 2000 + digits.parse::<u16>().map_err(|_| unrecognized())?,
            4 | 5 => digits.parse::<u16>().map_err(|_| unrecognized())?,
            _ => return Err(unrecognized()),
        };

        Ok(Self { year, season })
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if CENTURY.contains(&self.year) {
            write!(f, "{:02}{}", self.year % 100, self.season.letter())
        } else {
            write!(f, "{:04}{}", self.year, self.season.letter())
        }
    }
}

impl Serialize for Term {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Term {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordering key for a raw term identifier.
pub fn numeric_value_of_term(raw: &str) -> Result<u32, TermError> {
    raw.parse::<Term>().map(|term| term.ordering_key())
}
