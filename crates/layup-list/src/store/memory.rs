use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLock};

use crate::catalog::{Course, CourseId, CourseMedianRecord, Recommendation, UserId};
use crate::terms::Term;
use crate::votes::{
    CourseScore, ScoreAggregator, UserVotes, VoteCategory, VoteKey, VoteRecord,
};

use super::{CatalogRepository, RepositoryError, VoteCommit, VoteRepository};

const DEFAULT_SHARDS: usize = 16;

/// Votes and scores for the courses that hash to one shard. A course's
/// votes and its score always live in the same shard, so a commit needs
/// exactly one write lock.
#[derive(Debug, Default)]
struct Shard {
    votes: HashMap<VoteKey, VoteRecord>,
    aggregator: ScoreAggregator,
}

/// Vote store sharded by course. Casts on courses in different shards never
/// contend; readers take a shard read lock and see whole commits only.
#[derive(Debug)]
pub struct InMemoryVoteStore {
    shards: Vec<RwLock<Shard>>,
}

impl Default for InMemoryVoteStore {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("vote shard lock poisoned".to_string())
}

impl InMemoryVoteStore {
    pub fn with_shards(count: usize) -> Self {
        let shards = (0..count.max(1))
            .map(|_| RwLock::new(Shard::default()))
            .collect();
        Self { shards }
    }

    fn shard(&self, course: CourseId) -> &RwLock<Shard> {
        let mut hasher = DefaultHasher::new();
        course.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Recomputes a score from the live votes instead of the running total.
    pub fn live_vote_sum(
        &self,
        course: CourseId,
        category: VoteCategory,
    ) -> Result<i64, RepositoryError> {
        let shard = self.shard(course).read().map_err(poisoned)?;
        Ok(shard
            .votes
            .iter()
            .filter(|(key, _)| key.course == course && key.category == category)
            .map(|(_, record)| i64::from(record.value))
            .sum())
    }
}

impl VoteRepository for InMemoryVoteStore {
    fn live_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, RepositoryError> {
        let shard = self.shard(key.course).read().map_err(poisoned)?;
        Ok(shard.votes.get(key).copied())
    }

    fn commit(&self, commit: VoteCommit) -> Result<CourseScore, RepositoryError> {
        let mut shard = self.shard(commit.key.course).write().map_err(poisoned)?;

        let current = shard.votes.get(&commit.key).map(|record| record.value);
        if current != commit.expected {
            return Err(RepositoryError::Conflict);
        }

        match commit.next {
            Some(value) => {
                shard.votes.insert(
                    commit.key,
                    VoteRecord {
                        value,
                        cast_at: commit.cast_at,
                    },
                );
            }
            None => {
                shard.votes.remove(&commit.key);
            }
        }

        shard
            .aggregator
            .apply_delta(commit.key.course, commit.key.category, commit.delta());
        Ok(shard.aggregator.score(commit.key.course))
    }

    fn user_votes(&self, course: CourseId, user: UserId) -> Result<UserVotes, RepositoryError> {
        let shard = self.shard(course).read().map_err(poisoned)?;
        let value = |category| {
            shard
                .votes
                .get(&VoteKey::new(user, course, category))
                .map(|record| record.value)
        };
        Ok(UserVotes {
            difficulty: value(VoteCategory::Difficulty),
            quality: value(VoteCategory::Quality),
        })
    }

    fn score(&self, course: CourseId) -> Result<CourseScore, RepositoryError> {
        let shard = self.shard(course).read().map_err(poisoned)?;
        Ok(shard.aggregator.score(course))
    }

    fn scores(
        &self,
        courses: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseScore>, RepositoryError> {
        courses
            .iter()
            .map(|course| Ok((*course, self.score(*course)?)))
            .collect()
    }
}

/// Immutable catalog held in memory after ingest.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    courses: BTreeMap<CourseId, Course>,
    students: HashSet<UserId>,
    medians: HashMap<CourseId, Vec<CourseMedianRecord>>,
    recommendations: HashMap<CourseId, Vec<Recommendation>>,
}

impl InMemoryCatalog {
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.insert(course.id, course);
        self
    }

    pub fn with_student(mut self, user: UserId) -> Self {
        self.students.insert(user);
        self
    }

    pub fn with_median(mut self, record: CourseMedianRecord) -> Self {
        self.medians.entry(record.course_id).or_default().push(record);
        self
    }

    pub fn with_recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendations
            .entry(recommendation.course_id)
            .or_default()
            .push(recommendation);
        self
    }

    pub fn course_count(&self) -> usize {
        self.courses.len()
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn course(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        Ok(self.courses.get(&id).cloned())
    }

    fn courses_offered_in(&self, term: &Term) -> Result<Vec<Course>, RepositoryError> {
        Ok(self
            .courses
            .values()
            .filter(|course| course.is_offered_in(term))
            .cloned()
            .collect())
    }

    fn student_exists(&self, user: UserId) -> Result<bool, RepositoryError> {
        Ok(self.students.contains(&user))
    }

    fn medians(&self, course: CourseId) -> Result<Vec<CourseMedianRecord>, RepositoryError> {
        Ok(self.medians.get(&course).cloned().unwrap_or_default())
    }

    fn recommendations(&self, course: CourseId) -> Result<Vec<Recommendation>, RepositoryError> {
        Ok(self.recommendations.get(&course).cloned().unwrap_or_default())
    }
}
