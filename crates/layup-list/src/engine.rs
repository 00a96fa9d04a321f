use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::courses::CourseDirectory;
use crate::medians::MedianSummarizer;
use crate::ranking::{Paginator, RankingView};
use crate::store::{CatalogRepository, VoteRepository, VoteSeed};
use crate::terms::Term;
use crate::votes::{VoteError, VoteService};

/// Everything the request layer calls into, sharing one vote store and catalog.
pub struct LayupEngine<V, C> {
    votes: VoteService<V, C>,
    rankings: RankingView<V, C>,
    medians: MedianSummarizer<C>,
    courses: CourseDirectory<V, C>,
    paginator: Paginator,
    current_term: Term,
}

impl<V, C> LayupEngine<V, C>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    pub fn new(store: Arc<V>, catalog: Arc<C>, config: &EngineConfig) -> Self {
        Self {
            votes: VoteService::new(
                store.clone(),
                catalog.clone(),
                config.votes,
                config.retry.clone(),
            ),
            rankings: RankingView::new(store.clone(), catalog.clone()),
            medians: MedianSummarizer::new(catalog.clone()),
            courses: CourseDirectory::new(store, catalog),
            paginator: Paginator::new(config.page_size),
            current_term: config.current_term,
        }
    }

    pub fn votes(&self) -> &VoteService<V, C> {
        &self.votes
    }

    pub fn rankings(&self) -> &RankingView<V, C> {
        &self.rankings
    }

    pub fn medians(&self) -> &MedianSummarizer<C> {
        &self.medians
    }

    pub fn courses(&self) -> &CourseDirectory<V, C> {
        &self.courses
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    pub fn current_term(&self) -> Term {
        self.current_term
    }

    /// Replay recorded votes through `cast`. Rows the engine rejects are
    /// logged and skipped; storage failures abort the replay.
    pub fn replay(&self, seeds: &[VoteSeed]) -> Result<usize, VoteError> {
        let mut applied = 0;
        for seed in seeds {
            match self
                .votes
                .cast(seed.user_id, seed.course_id, seed.category, seed.value)
            {
                Ok(_) => applied += 1,
                Err(err @ (VoteError::InvalidVoteValue(_) | VoteError::NotFound(_))) => {
                    warn!(user = seed.user_id.0, course = seed.course_id.0, %err, "skipping recorded vote");
                }
                Err(err) => return Err(err),
            }
        }
        info!(applied, total = seeds.len(), "replayed recorded votes");
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, CourseId, UserId};
    use crate::store::{InMemoryCatalog, InMemoryVoteStore, VoteRepository};
    use crate::votes::VoteCategory;

    fn seed(user: u64, course: u64, value: i32) -> VoteSeed {
        VoteSeed {
            user_id: UserId(user),
            course_id: CourseId(course),
            category: VoteCategory::Quality,
            value,
        }
    }

    #[test]
    fn replay_skips_rejected_rows() {
        let catalog = InMemoryCatalog::default()
            .with_student(UserId(1))
            .with_student(UserId(2))
            .with_course(Course {
                id: CourseId(5),
                department: "HIST".to_string(),
                number: "5".to_string(),
                title: "Pre-Colonial Africa".to_string(),
                distribs: vec!["NW".to_string()],
                offered: vec!["16W".parse().expect("valid term")],
            });
        let store = Arc::new(InMemoryVoteStore::default());
        let engine = LayupEngine::new(
            store.clone(),
            Arc::new(catalog),
            &EngineConfig::default(),
        );

        let seeds = [
            seed(1, 5, 1),
            seed(2, 5, 0),
            seed(3, 5, 1),
            seed(2, 9, 1),
            seed(2, 5, 1),
        ];
        let applied = engine.replay(&seeds).expect("replay");

        assert_eq!(applied, 2);
        assert_eq!(store.score(CourseId(5)).expect("score").quality, 2);
    }
}
