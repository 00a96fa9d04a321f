use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{Course, CourseId, UserId};
use crate::store::{CatalogRepository, RepositoryError, VoteCommit, VoteRepository};

use super::domain::{CastOutcome, UserVotes, VoteCategory, VoteKey, VotePolicy, VoteTransition};

/// Bounded retry for compare-and-swap conflicts with linear backoff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 5,
        }
    }
}

impl RetryPolicy {
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

/// Entity a cast referred to that the catalog does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingEntity {
    User(UserId),
    Course(CourseId),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingEntity::User(user) => user.fmt(f),
            MissingEntity::Course(course) => course.fmt(f),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VoteError {
    #[error("invalid vote: {0}")]
    InvalidVoteValue(String),
    #[error("{0} not found")]
    NotFound(MissingEntity),
    #[error("vote for {key} still contended after {attempts} attempts")]
    TransientContention { key: VoteKey, attempts: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Casts votes and reads back a user's vote state.
pub struct VoteService<V, C> {
    votes: Arc<V>,
    catalog: Arc<C>,
    policy: VotePolicy,
    retry: RetryPolicy,
}

impl<V, C> VoteService<V, C>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    pub fn new(votes: Arc<V>, catalog: Arc<C>, policy: VotePolicy, retry: RetryPolicy) -> Self {
        Self {
            votes,
            catalog,
            policy,
            retry,
        }
    }

    /// Cast `value` for `user` on one category of `course`.
    ///
    /// With no live vote the value is recorded. Re-casting the same value
    /// removes the vote; a different value replaces it. The vote write and
    /// the score update commit together, so a failed cast leaves both as
    /// they were.
    pub fn cast(
        &self,
        user: UserId,
        course: CourseId,
        category: VoteCategory,
        value: i32,
    ) -> Result<CastOutcome, VoteError> {
        self.policy.validate(value)?;

        if !self.catalog.student_exists(user)? {
            return Err(VoteError::NotFound(MissingEntity::User(user)));
        }
        if self.catalog.course(course)?.is_none() {
            return Err(VoteError::NotFound(MissingEntity::Course(course)));
        }

        let key = VoteKey::new(user, course, category);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let current = self.votes.live_vote(&key)?.map(|record| record.value);
            let transition = VoteTransition::resolve(current, value);
            let commit = VoteCommit {
                key,
                expected: current,
                next: transition.next_value(value),
                cast_at: Utc::now(),
            };

            match self.votes.commit(commit) {
                Ok(score) => {
                    let outcome = CastOutcome {
                        transition,
                        new_score: score.get(category),
                    };
                    info!(
                        user = user.0,
                        course = course.0,
                        %category,
                        delta = transition.delta(),
                        new_score = outcome.new_score,
                        unvote = outcome.was_unvote(),
                        "vote committed"
                    );
                    return Ok(outcome);
                }
                Err(RepositoryError::Conflict) if attempt < self.retry.max_attempts => {
                    debug!(%key, attempt, "vote conflicted, retrying");
                    std::thread::sleep(self.retry.delay_for_attempt(attempt));
                }
                Err(RepositoryError::Conflict) => {
                    warn!(%key, attempts = attempt, "vote contention exhausted retries");
                    return Err(VoteError::TransientContention {
                        key,
                        attempts: attempt,
                    });
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// The user's live difficulty and quality votes on a course.
    pub fn votes_for(&self, course: CourseId, user: UserId) -> Result<UserVotes, VoteError> {
        Ok(self.votes.user_votes(course, user)?)
    }

    /// Pair each course with the user's live vote in one category.
    pub fn votes_for_courses<'a>(
        &self,
        user: UserId,
        courses: impl IntoIterator<Item = &'a Course>,
        category: VoteCategory,
    ) -> Result<Vec<(CourseId, Option<i32>)>, VoteError> {
        courses
            .into_iter()
            .map(|course| {
                let key = VoteKey::new(user, course.id, category);
                let vote = self.votes.live_vote(&key)?.map(|record| record.value);
                Ok((course.id, vote))
            })
            .collect()
    }
}
