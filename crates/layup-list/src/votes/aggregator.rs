use std::collections::HashMap;

use crate::catalog::CourseId;

use super::domain::{CourseScore, VoteCategory};

/// Owner of the per-course aggregate scores. Stores call [`apply_delta`]
/// inside the same critical section that writes the vote, so each score
/// always equals the sum of the live votes behind it.
///
/// [`apply_delta`]: ScoreAggregator::apply_delta
#[derive(Debug, Default)]
pub struct ScoreAggregator {
    scores: HashMap<CourseId, CourseScore>,
}

impl ScoreAggregator {
    /// Add `delta` to one category of a course's score and return the new total.
    pub fn apply_delta(&mut self, course: CourseId, category: VoteCategory, delta: i64) -> i64 {
        let score = self.scores.entry(course).or_default();
        let slot = score.get_mut(category);
        *slot += delta;
        *slot
    }

    /// Courses nobody has voted on score zero in both categories.
    pub fn score(&self, course: CourseId) -> CourseScore {
        self.scores.get(&course).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_accumulate_per_category() {
        let mut aggregator = ScoreAggregator::default();
        let course = CourseId(7);

        assert_eq!(aggregator.apply_delta(course, VoteCategory::Quality, 1), 1);
        assert_eq!(aggregator.apply_delta(course, VoteCategory::Quality, 1), 2);
        assert_eq!(aggregator.apply_delta(course, VoteCategory::Difficulty, -1), -1);
        assert_eq!(aggregator.apply_delta(course, VoteCategory::Quality, -2), 0);

        assert_eq!(
            aggregator.score(course),
            CourseScore {
                quality: 0,
                difficulty: -1
            }
        );
    }

    #[test]
    fn unknown_courses_score_zero() {
        let aggregator = ScoreAggregator::default();
        assert_eq!(aggregator.score(CourseId(99)), CourseScore::default());
    }
}
