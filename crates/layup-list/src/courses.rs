//! Course detail assembly: catalog row, scores, viewer votes, and similar courses.

use serde::Serialize;
use std::sync::Arc;

use crate::catalog::{Course, CourseId, Recommendation, UserId};
use crate::store::{CatalogRepository, RepositoryError, VoteRepository};
use crate::terms::Term;
use crate::votes::{CourseScore, UserVotes};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseDetail {
    pub course: Course,
    pub last_offered: Option<Term>,
    pub score: CourseScore,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<UserVotes>,
}

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("{0} not found")]
    NotFound(CourseId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct CourseDirectory<V, C> {
    votes: Arc<V>,
    catalog: Arc<C>,
}

impl<V, C> CourseDirectory<V, C>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    pub fn new(votes: Arc<V>, catalog: Arc<C>) -> Self {
        Self { votes, catalog }
    }

    pub fn detail(
        &self,
        id: CourseId,
        viewer: Option<UserId>,
    ) -> Result<CourseDetail, CourseError> {
        let course = self.catalog.course(id)?.ok_or(CourseError::NotFound(id))?;
        let score = self.votes.score(id)?;
        let recommendations = similar_courses(self.catalog.recommendations(id)?);
        let votes = viewer
            .map(|user| self.votes.user_votes(id, user))
            .transpose()?;

        Ok(CourseDetail {
            last_offered: course.last_offered(),
            course,
            score,
            recommendations,
            votes,
        })
    }
}

/// Document-similarity recommendations, heaviest first.
pub fn similar_courses(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut similar: Vec<Recommendation> = recommendations
        .into_iter()
        .filter(|recommendation| recommendation.creator.is_similarity())
        .collect();
    similar.sort_by(|a, b| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| a.target_id.cmp(&b.target_id))
    });
    similar
}
