use crate::config::ConfigError;
use crate::courses::CourseError;
use crate::ranking::RankingError;
use crate::store::{CatalogLoadError, RepositoryError};
use crate::telemetry::TelemetryError;
use crate::terms::TermError;
use crate::votes::VoteError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Catalog(CatalogLoadError),
    Repository(RepositoryError),
    Vote(VoteError),
    Ranking(RankingError),
    Course(CourseError),
    Term(TermError),
    Output(serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Vote(VoteError::InvalidVoteValue(_)) | AppError::Term(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Vote(VoteError::NotFound(_))
            | AppError::Course(CourseError::NotFound(_))
            | AppError::Ranking(RankingError::UnknownMode(_)) => StatusCode::NOT_FOUND,
            AppError::Vote(VoteError::TransientContention { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Ranking(RankingError::AccessRestricted { .. }) => StatusCode::SEE_OTHER,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Catalog(_)
            | AppError::Repository(_)
            | AppError::Vote(VoteError::Repository(_))
            | AppError::Ranking(RankingError::Repository(_))
            | AppError::Course(CourseError::Repository(_))
            | AppError::Output(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Catalog(err) => write!(f, "catalog error: {}", err),
            AppError::Repository(err) => write!(f, "storage error: {}", err),
            AppError::Vote(err) => write!(f, "vote error: {}", err),
            AppError::Ranking(err) => write!(f, "ranking error: {}", err),
            AppError::Course(err) => write!(f, "course error: {}", err),
            AppError::Term(err) => write!(f, "term error: {}", err),
            AppError::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Catalog(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::Vote(err) => Some(err),
            AppError::Ranking(err) => Some(err),
            AppError::Course(err) => Some(err),
            AppError::Term(err) => Some(err),
            AppError::Output(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Ranking(RankingError::AccessRestricted { restriction }) = &self {
            let target = format!("/signup?restriction={}", restriction.replace(' ', "%20"));
            return Redirect::to(&target).into_response();
        }

        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<CatalogLoadError> for AppError {
    fn from(value: CatalogLoadError) -> Self {
        Self::Catalog(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

impl From<VoteError> for AppError {
    fn from(value: VoteError) -> Self {
        Self::Vote(value)
    }
}

impl From<RankingError> for AppError {
    fn from(value: RankingError) -> Self {
        Self::Ranking(value)
    }
}

impl From<CourseError> for AppError {
    fn from(value: CourseError) -> Self {
        Self::Course(value)
    }
}

impl From<TermError> for AppError {
    fn from(value: TermError) -> Self {
        Self::Term(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Output(value)
    }
}
