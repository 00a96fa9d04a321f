//! Persistence boundary for votes, scores, and read-only catalog data.
//!
//! The engine only relies on the traits in this module. Vote writes go
//! through [`VoteRepository::commit`], a compare-and-swap that applies the
//! vote change and the matching score delta as one unit.

pub mod loader;
pub mod memory;

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::catalog::{Course, CourseId, CourseMedianRecord, Recommendation, UserId};
use crate::terms::Term;
use crate::votes::{CourseScore, UserVotes, VoteKey, VoteRecord};

pub use loader::{load_catalog_dir, CatalogLoadError, CatalogSnapshot, VoteSeed};
pub use memory::{InMemoryCatalog, InMemoryVoteStore};

/// A vote write conditioned on the live value still being `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteCommit {
    pub key: VoteKey,
    pub expected: Option<i32>,
    pub next: Option<i32>,
    pub cast_at: DateTime<Utc>,
}

impl VoteCommit {
    /// Score change implied by replacing `expected` with `next`.
    pub fn delta(&self) -> i64 {
        i64::from(self.next.unwrap_or(0)) - i64::from(self.expected.unwrap_or(0))
    }
}

/// Storage for live votes and the aggregate scores derived from them.
pub trait VoteRepository: Send + Sync {
    fn live_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, RepositoryError>;

    /// Apply the vote write and its score delta atomically, returning the
    /// course's score after the commit. Fails with
    /// [`RepositoryError::Conflict`] without writing anything when the live
    /// vote no longer matches `commit.expected`.
    fn commit(&self, commit: VoteCommit) -> Result<CourseScore, RepositoryError>;

    fn user_votes(&self, course: CourseId, user: UserId) -> Result<UserVotes, RepositoryError>;

    fn score(&self, course: CourseId) -> Result<CourseScore, RepositoryError>;

    fn scores(&self, courses: &[CourseId])
        -> Result<HashMap<CourseId, CourseScore>, RepositoryError>;
}

/// Read-only catalog lookups.
pub trait CatalogRepository: Send + Sync {
    fn course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError>;
    fn courses_offered_in(&self, term: &Term) -> Result<Vec<Course>, RepositoryError>;
    fn student_exists(&self, user: UserId) -> Result<bool, RepositoryError>;
    fn medians(&self, course: CourseId) -> Result<Vec<CourseMedianRecord>, RepositoryError>;
    fn recommendations(&self, course: CourseId) -> Result<Vec<Recommendation>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("live vote changed since it was read")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
