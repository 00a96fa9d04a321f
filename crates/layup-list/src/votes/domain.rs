use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::catalog::{CourseId, UserId};

use super::service::VoteError;

/// The two independent questions a student can vote on for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteCategory {
    Quality,
    Difficulty,
}

impl VoteCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Difficulty => "difficulty",
        }
    }
}

impl FromStr for VoteCategory {
    type Err = VoteError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "difficulty" => Ok(Self::Difficulty),
            _ => Err(VoteError::InvalidVoteValue(format!(
                "unknown vote category '{raw}'"
            ))),
        }
    }
}

impl fmt::Display for VoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Uniqueness key: at most one live vote exists per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoteKey {
    pub user: UserId,
    pub course: CourseId,
    pub category: VoteCategory,
}

impl VoteKey {
    pub fn new(user: UserId, course: CourseId, category: VoteCategory) -> Self {
        Self {
            user,
            course,
            category,
        }
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.user, self.category, self.course)
    }
}

/// A live vote as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteRecord {
    pub value: i32,
    pub cast_at: DateTime<Utc>,
}

/// What a cast did to the live vote for its key, with the score delta it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VoteTransition {
    Created { delta: i64 },
    Removed { delta: i64 },
    Changed { delta: i64 },
}

impl VoteTransition {
    /// Transition produced by casting `value` over the current live vote.
    pub fn resolve(current: Option<i32>, value: i32) -> Self {
        match current {
            None => Self::Created {
                delta: i64::from(value),
            },
            Some(existing) if existing == value => Self::Removed {
                delta: -i64::from(value),
            },
            Some(existing) => Self::Changed {
                delta: i64::from(value) - i64::from(existing),
            },
        }
    }

    pub fn delta(&self) -> i64 {
        match *self {
            Self::Created { delta } | Self::Removed { delta } | Self::Changed { delta } => delta,
        }
    }

    pub fn is_unvote(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    /// Live value left behind once the transition is applied.
    pub fn next_value(&self, value: i32) -> Option<i32> {
        if self.is_unvote() {
            None
        } else {
            Some(value)
        }
    }
}

/// Result of a committed cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CastOutcome {
    pub transition: VoteTransition,
    pub new_score: i64,
}

impl CastOutcome {
    pub fn was_unvote(&self) -> bool {
        self.transition.is_unvote()
    }
}

/// Per-course aggregate: the sum of live votes in each category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CourseScore {
    #[serde(rename = "quality_score")]
    pub quality: i64,
    #[serde(rename = "difficulty_score")]
    pub difficulty: i64,
}

impl CourseScore {
    pub fn get(&self, category: VoteCategory) -> i64 {
        match category {
            VoteCategory::Quality => self.quality,
            VoteCategory::Difficulty => self.difficulty,
        }
    }

    pub(crate) fn get_mut(&mut self, category: VoteCategory) -> &mut i64 {
        match category {
            VoteCategory::Quality => &mut self.quality,
            VoteCategory::Difficulty => &mut self.difficulty,
        }
    }
}

/// A user's live votes on one course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserVotes {
    pub difficulty: Option<i32>,
    pub quality: Option<i32>,
}

impl UserVotes {
    pub fn get(&self, category: VoteCategory) -> Option<i32> {
        match category {
            VoteCategory::Quality => self.quality,
            VoteCategory::Difficulty => self.difficulty,
        }
    }
}

/// Which vote magnitudes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotePolicy {
    pub max_magnitude: i32,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self { max_magnitude: 1 }
    }
}

impl VotePolicy {
    pub fn validate(&self, value: i32) -> Result<(), VoteError> {
        if value == 0 || value.unsigned_abs() > self.max_magnitude.unsigned_abs() {
            return Err(VoteError::InvalidVoteValue(format!(
                "vote value {value} must be non-zero with magnitude at most {}",
                self.max_magnitude
            )));
        }
        Ok(())
    }
}
