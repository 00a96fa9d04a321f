//! Per-term summaries of registrar grade medians.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use crate::catalog::{CourseId, CourseMedianRecord};
use crate::grades::numeric_value_for_grade;
use crate::store::{CatalogRepository, RepositoryError};
use crate::terms::Term;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedianEntry {
    pub median: String,
    pub enrollment: u32,
    pub section: u32,
    pub numeric_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermSummary {
    pub term: Term,
    pub avg_numeric_value: f64,
    pub courses: Vec<MedianEntry>,
}

pub struct MedianSummarizer<C> {
    catalog: Arc<C>,
}

impl<C> MedianSummarizer<C>
where
    C: CatalogRepository + 'static,
{
    pub fn new(catalog: Arc<C>) -> Self {
        Self { catalog }
    }

    /// Medians for a course grouped by term, most recent term first. Unknown
    /// courses have no medians and produce an empty summary.
    pub fn summarize(&self, course: CourseId) -> Result<Vec<TermSummary>, RepositoryError> {
        let records = self.catalog.medians(course)?;
        Ok(summarize_records(&records))
    }
}

/// Records whose term or grade cannot be normalized are logged and skipped.
pub fn summarize_records(records: &[CourseMedianRecord]) -> Vec<TermSummary> {
    let mut by_term: BTreeMap<Term, Vec<MedianEntry>> = BTreeMap::new();

    for record in records {
        let term = match record.term.parse::<Term>() {
            Ok(term) => term,
            Err(err) => {
                warn!(course = record.course_id.0, section = record.section, %err, "skipping median");
                continue;
            }
        };
        let numeric_value = match numeric_value_for_grade(&record.median) {
            Ok(value) => value,
            Err(err) => {
                warn!(course = record.course_id.0, section = record.section, %err, "skipping median");
                continue;
            }
        };

        by_term.entry(term).or_default().push(MedianEntry {
            median: record.median.clone(),
            enrollment: record.enrollment,
            section: record.section,
            numeric_value,
        });
    }

    let mut summaries: Vec<TermSummary> = by_term
        .into_iter()
        .map(|(term, courses)| {
            let total: f64 = courses.iter().map(|entry| entry.numeric_value).sum();
            TermSummary {
                term,
                avg_numeric_value: total / courses.len() as f64,
                courses,
            }
        })
        .collect();
    summaries.sort_by_key(|summary| std::cmp::Reverse(summary.term.ordering_key()));
    summaries
}
