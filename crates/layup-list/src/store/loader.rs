//! CSV ingest for the read-only catalog and optional vote replays.
//!
//! A data directory holds `courses.csv` (required) plus optional
//! `students.csv`, `medians.csv`, `recommendations.csv`, and `votes.csv`.
//! List-valued course columns (`distribs`, `terms`) are `;`-separated.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{Course, CourseId, CourseMedianRecord, Recommendation, UserId};
use crate::terms::{Term, TermError};
use crate::votes::VoteCategory;

use super::memory::InMemoryCatalog;

const COURSES_FILE: &str = "courses.csv";
const STUDENTS_FILE: &str = "students.csv";
const MEDIANS_FILE: &str = "medians.csv";
const RECOMMENDATIONS_FILE: &str = "recommendations.csv";
const VOTES_FILE: &str = "votes.csv";

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed row in {file}: {source}")]
    Csv {
        file: &'static str,
        source: csv::Error,
    },
    #[error("course {course} in {file} lists an invalid term: {source}")]
    Term {
        file: &'static str,
        course: u64,
        source: TermError,
    },
}

/// A vote to replay through the engine after the catalog loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VoteSeed {
    pub user_id: UserId,
    pub course_id: CourseId,
    #[serde(deserialize_with = "vote_category")]
    pub category: VoteCategory,
    pub value: i32,
}

/// Everything read from a data directory.
#[derive(Debug, Default)]
pub struct CatalogSnapshot {
    pub courses: Vec<Course>,
    pub students: Vec<UserId>,
    pub medians: Vec<CourseMedianRecord>,
    pub recommendations: Vec<Recommendation>,
    pub votes: Vec<VoteSeed>,
}

impl CatalogSnapshot {
    pub fn into_catalog(self) -> (InMemoryCatalog, Vec<VoteSeed>) {
        let mut catalog = InMemoryCatalog::default();
        for course in self.courses {
            catalog = catalog.with_course(course);
        }
        for student in self.students {
            catalog = catalog.with_student(student);
        }
        for median in self.medians {
            catalog = catalog.with_median(median);
        }
        for recommendation in self.recommendations {
            catalog = catalog.with_recommendation(recommendation);
        }
        (catalog, self.votes)
    }
}

pub fn load_catalog_dir(dir: &Path) -> Result<CatalogSnapshot, CatalogLoadError> {
    let courses = parse_courses(open(&dir.join(COURSES_FILE))?)?;

    let students = match open_optional(&dir.join(STUDENTS_FILE))? {
        Some(file) => parse_students(file)?,
        None => Vec::new(),
    };
    let medians = match open_optional(&dir.join(MEDIANS_FILE))? {
        Some(file) => parse_medians(file)?,
        None => Vec::new(),
    };
    let recommendations = match open_optional(&dir.join(RECOMMENDATIONS_FILE))? {
        Some(file) => parse_recommendations(file)?,
        None => Vec::new(),
    };
    let votes = match open_optional(&dir.join(VOTES_FILE))? {
        Some(file) => parse_votes(file)?,
        None => Vec::new(),
    };

    info!(
        dir = %dir.display(),
        courses = courses.len(),
        students = students.len(),
        medians = medians.len(),
        recommendations = recommendations.len(),
        votes = votes.len(),
        "catalog loaded"
    );

    Ok(CatalogSnapshot {
        courses,
        students,
        medians,
        recommendations,
        votes,
    })
}

pub fn parse_courses<R: Read>(reader: R) -> Result<Vec<Course>, CatalogLoadError> {
    read_rows::<CourseRow, _>(COURSES_FILE, reader)?
        .into_iter()
        .map(CourseRow::into_course)
        .collect()
}

pub fn parse_students<R: Read>(reader: R) -> Result<Vec<UserId>, CatalogLoadError> {
    Ok(read_rows::<StudentRow, _>(STUDENTS_FILE, reader)?
        .into_iter()
        .map(|row| row.id)
        .collect())
}

pub fn parse_medians<R: Read>(reader: R) -> Result<Vec<CourseMedianRecord>, CatalogLoadError> {
    read_rows(MEDIANS_FILE, reader)
}

pub fn parse_recommendations<R: Read>(
    reader: R,
) -> Result<Vec<Recommendation>, CatalogLoadError> {
    read_rows(RECOMMENDATIONS_FILE, reader)
}

pub fn parse_votes<R: Read>(reader: R) -> Result<Vec<VoteSeed>, CatalogLoadError> {
    read_rows(VOTES_FILE, reader)
}

fn read_rows<T, R>(file: &'static str, reader: R) -> Result<Vec<T>, CatalogLoadError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let rows = csv_reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| CatalogLoadError::Csv { file, source })?;
    debug!(file, rows = rows.len(), "parsed catalog file");
    Ok(rows)
}

fn open(path: &Path) -> Result<File, CatalogLoadError> {
    File::open(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn open_optional(path: &Path) -> Result<Option<File>, CatalogLoadError> {
    if path.exists() {
        open(path).map(Some)
    } else {
        Ok(None)
    }
}

#[derive(Debug, Deserialize)]
struct CourseRow {
    id: u64,
    department: String,
    number: String,
    title: String,
    #[serde(default, deserialize_with = "semicolon_list")]
    distribs: Vec<String>,
    #[serde(default, deserialize_with = "semicolon_list")]
    terms: Vec<String>,
}

impl CourseRow {
    fn into_course(self) -> Result<Course, CatalogLoadError> {
        let offered = self
            .terms
            .iter()
            .map(|raw| raw.parse::<Term>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| CatalogLoadError::Term {
                file: COURSES_FILE,
                course: self.id,
                source,
            })?;

        Ok(Course {
            id: CourseId(self.id),
            department: self.department,
            number: self.number,
            title: self.title,
            distribs: self
                .distribs
                .into_iter()
                .map(|tag| tag.to_ascii_uppercase())
                .collect(),
            offered,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StudentRow {
    id: UserId,
}

fn semicolon_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .split(';')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect())
}

/// Same parsing rules as the HTTP vote body: trimmed and case-insensitive.
fn vote_category<'de, D>(deserializer: D) -> Result<VoteCategory, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}
