use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::catalog::{Course, CourseId};
use crate::store::{CatalogRepository, RepositoryError, VoteRepository};
use crate::terms::Term;
use crate::votes::{CourseScore, VoteCategory};

use super::pagination::PageWindow;

/// The two orderings the course lists support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    Best,
    Layups,
}

impl RankingMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Best => "Best Classes",
            Self::Layups => "Layups",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Layups => "layups",
        }
    }

    /// Score category sorted on first; the other one breaks ties.
    pub fn primary(self) -> VoteCategory {
        match self {
            Self::Best => VoteCategory::Quality,
            Self::Layups => VoteCategory::Difficulty,
        }
    }

    pub fn secondary(self) -> VoteCategory {
        match self {
            Self::Best => VoteCategory::Difficulty,
            Self::Layups => VoteCategory::Quality,
        }
    }

    pub fn requires_authentication(self) -> bool {
        matches!(self, Self::Layups)
    }

    /// Descending primary score, descending secondary score, then ascending course id.
    pub fn compare(self, a: &RankedCourse, b: &RankedCourse) -> Ordering {
        b.score
            .get(self.primary())
            .cmp(&a.score.get(self.primary()))
            .then_with(|| {
                b.score
                    .get(self.secondary())
                    .cmp(&a.score.get(self.secondary()))
            })
            .then_with(|| a.course.id.cmp(&b.course.id))
    }
}

impl FromStr for RankingMode {
    type Err = RankingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "best" => Ok(Self::Best),
            "layups" => Ok(Self::Layups),
            _ => Err(RankingError::UnknownMode(raw.to_string())),
        }
    }
}

impl fmt::Display for RankingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RankingError {
    #[error("unknown ranking '{0}'")]
    UnknownMode(String),
    #[error("sign in to {restriction}")]
    AccessRestricted { restriction: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Rejects anonymous callers from modes that need a signed-in user.
pub fn ensure_access(mode: RankingMode, authenticated: bool) -> Result<(), RankingError> {
    if mode.requires_authentication() && !authenticated {
        return Err(RankingError::AccessRestricted {
            restriction: "see layups",
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCourse {
    pub course: Course,
    pub score: CourseScore,
}

/// A sorted course list. Iterating it is repeatable; paging is up to the caller.
#[derive(Debug, Clone)]
pub struct Ranking {
    pub mode: RankingMode,
    pub term: Term,
    entries: Vec<RankedCourse>,
}

impl Ranking {
    pub fn iter(&self) -> std::slice::Iter<'_, RankedCourse> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn page(&self, window: &PageWindow) -> &[RankedCourse] {
        let end = window.end.min(self.entries.len());
        let start = window.start.min(end);
        &self.entries[start..end]
    }
}

impl<'a> IntoIterator for &'a Ranking {
    type Item = &'a RankedCourse;
    type IntoIter = std::slice::Iter<'a, RankedCourse>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct RankingView<V, C> {
    votes: Arc<V>,
    catalog: Arc<C>,
}

impl<V, C> RankingView<V, C>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    pub fn new(votes: Arc<V>, catalog: Arc<C>) -> Self {
        Self { votes, catalog }
    }

    /// Courses offered in `term`, optionally narrowed to one distribution
    /// tag, sorted for `mode`.
    pub fn rank(
        &self,
        term: &Term,
        mode: RankingMode,
        distrib: Option<&str>,
    ) -> Result<Ranking, RankingError> {
        let candidates: Vec<Course> = self
            .catalog
            .courses_offered_in(term)?
            .into_iter()
            .filter(|course| distrib.map_or(true, |tag| course.satisfies_distrib(tag)))
            .collect();

        let ids: Vec<CourseId> = candidates.iter().map(|course| course.id).collect();
        let scores = self.votes.scores(&ids)?;

        let mut entries: Vec<RankedCourse> = candidates
            .into_iter()
            .map(|course| {
                let score = scores.get(&course.id).copied().unwrap_or_default();
                RankedCourse { course, score }
            })
            .collect();
        entries.sort_by(|a, b| mode.compare(a, b));

        debug!(%term, %mode, distrib, courses = entries.len(), "ranked courses");
        Ok(Ranking {
            mode,
            term: *term,
            entries,
        })
    }
}
