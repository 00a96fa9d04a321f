use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::catalog::{Course, CourseId, UserId};
use crate::store::{
    InMemoryCatalog, InMemoryVoteStore, RepositoryError, VoteCommit, VoteRepository,
};
use crate::votes::{
    CourseScore, RetryPolicy, UserVotes, VoteKey, VotePolicy, VoteRecord, VoteService,
};

pub(super) const ALICE: UserId = UserId(1);
pub(super) const BOB: UserId = UserId(2);
pub(super) const COURSE: CourseId = CourseId(10);

pub(super) fn catalog_course(id: CourseId) -> Course {
    Course {
        id,
        department: "PSYC".to_string(),
        number: id.0.to_string(),
        title: "Introduction to Psychology".to_string(),
        distribs: vec!["SOC".to_string()],
        offered: vec!["16W".parse().expect("valid term")],
    }
}

pub(super) fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::default()
        .with_student(ALICE)
        .with_student(BOB)
        .with_course(catalog_course(COURSE))
}

pub(super) fn retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_backoff_ms: 0,
    }
}

pub(super) fn build_service() -> (
    VoteService<InMemoryVoteStore, InMemoryCatalog>,
    Arc<InMemoryVoteStore>,
) {
    let store = Arc::new(InMemoryVoteStore::default());
    let service = VoteService::new(
        store.clone(),
        Arc::new(catalog()),
        VotePolicy::default(),
        retry(),
    );
    (service, store)
}

/// Rejects every commit as stale and counts the attempts.
#[derive(Default)]
pub(super) struct ConflictRepository {
    pub(super) commits: AtomicUsize,
}

impl VoteRepository for ConflictRepository {
    fn live_vote(&self, _key: &VoteKey) -> Result<Option<VoteRecord>, RepositoryError> {
        Ok(None)
    }

    fn commit(&self, _commit: VoteCommit) -> Result<CourseScore, RepositoryError> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        Err(RepositoryError::Conflict)
    }

    fn user_votes(&self, _course: CourseId, _user: UserId) -> Result<UserVotes, RepositoryError> {
        Ok(UserVotes::default())
    }

    fn score(&self, _course: CourseId) -> Result<CourseScore, RepositoryError> {
        Ok(CourseScore::default())
    }

    fn scores(
        &self,
        _courses: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseScore>, RepositoryError> {
        Ok(HashMap::new())
    }
}

/// Conflicts on the first commit only, then delegates to a real store.
pub(super) struct FlakyRepository {
    pub(super) inner: InMemoryVoteStore,
    pub(super) conflicts_left: AtomicUsize,
}

impl VoteRepository for FlakyRepository {
    fn live_vote(&self, key: &VoteKey) -> Result<Option<VoteRecord>, RepositoryError> {
        self.inner.live_vote(key)
    }

    fn commit(&self, commit: VoteCommit) -> Result<CourseScore, RepositoryError> {
        if self
            .conflicts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
        {
            return Err(RepositoryError::Conflict);
        }
        self.inner.commit(commit)
    }

    fn user_votes(&self, course: CourseId, user: UserId) -> Result<UserVotes, RepositoryError> {
        self.inner.user_votes(course, user)
    }

    fn score(&self, course: CourseId) -> Result<CourseScore, RepositoryError> {
        self.inner.score(course)
    }

    fn scores(
        &self,
        courses: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseScore>, RepositoryError> {
        self.inner.scores(courses)
    }
}

pub(super) struct UnavailableRepository;

impl VoteRepository for UnavailableRepository {
    fn live_vote(&self, _key: &VoteKey) -> Result<Option<VoteRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn commit(&self, _commit: VoteCommit) -> Result<CourseScore, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn user_votes(&self, _course: CourseId, _user: UserId) -> Result<UserVotes, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn score(&self, _course: CourseId) -> Result<CourseScore, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn scores(
        &self,
        _courses: &[CourseId],
    ) -> Result<HashMap<CourseId, CourseScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
