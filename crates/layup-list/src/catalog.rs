//! Read-only catalog records: courses, students, grade medians, and recommendations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::terms::Term;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub u64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "course {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {}", self.0)
    }
}

/// Catalog entry for a course, including the terms it was offered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub department: String,
    pub number: String,
    pub title: String,
    pub distribs: Vec<String>,
    pub offered: Vec<Term>,
}

impl Course {
    pub fn short_name(&self) -> String {
        format!("{} {}", self.department, self.number)
    }

    pub fn is_offered_in(&self, term: &Term) -> bool {
        self.offered.contains(term)
    }

    /// Case-insensitive match against the course's distribution tags.
    pub fn satisfies_distrib(&self, distrib: &str) -> bool {
        let wanted = distrib.trim();
        self.distribs
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(wanted))
    }

    pub fn last_offered(&self) -> Option<Term> {
        self.offered.iter().copied().max_by_key(Term::ordering_key)
    }
}

/// One section's registrar median. Term and grade stay raw because
/// reference data may contain values the normalizers do not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMedianRecord {
    pub course_id: CourseId,
    pub term: String,
    pub section: u32,
    pub median: String,
    pub enrollment: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationCreator {
    DocumentSimilarity,
    #[serde(other)]
    Other,
}

impl RecommendationCreator {
    pub fn is_similarity(self) -> bool {
        matches!(self, Self::DocumentSimilarity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub course_id: CourseId,
    pub target_id: CourseId,
    pub weight: f64,
    pub creator: RecommendationCreator,
}
