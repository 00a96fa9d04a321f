use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::catalog::{CourseId, UserId};
use crate::courses::CourseDetail;
use crate::engine::LayupEngine;
use crate::error::AppError;
use crate::medians::TermSummary;
use crate::ranking::{ensure_access, PageWindow, RankingError, RankingMode};
use crate::store::{CatalogRepository, VoteRepository};
use crate::terms::Term;
use crate::votes::VoteCategory;

/// Header carrying the signed-in user, set by the authenticating gateway.
pub const USER_HEADER: &str = "x-layup-user";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub value: i32,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteResponse {
    pub new_score: i64,
    pub was_unvote: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    pub term: Option<String>,
    pub dist: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RankingPage {
    pub term: Term,
    pub sort: RankingMode,
    pub course_type: &'static str,
    pub page: PageWindow,
    pub courses: Vec<RankedCourseView>,
}

#[derive(Debug, Serialize)]
pub struct RankedCourseView {
    pub id: CourseId,
    pub name: String,
    pub title: String,
    pub distribs: Vec<String>,
    pub quality_score: i64,
    pub difficulty_score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MediansResponse {
    pub medians: Vec<TermSummary>,
}

/// Routes for voting, ranked lists, course detail, and median summaries.
pub fn layup_router<V, C>(engine: Arc<LayupEngine<V, C>>) -> Router
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/courses/:course_id/vote",
            post(vote_handler::<V, C>),
        )
        .route("/api/v1/courses/:course_id", get(course_handler::<V, C>))
        .route(
            "/api/v1/courses/:course_id/medians",
            get(medians_handler::<V, C>),
        )
        .route("/api/v1/rankings/:mode", get(rankings_handler::<V, C>))
        .with_state(engine)
}

/// Requests without a parseable user header are treated as anonymous.
pub(crate) fn viewer(headers: &HeaderMap) -> Option<UserId> {
    let raw = headers.get(USER_HEADER)?;
    match raw.to_str().ok().and_then(|value| value.trim().parse().ok()) {
        Some(id) => Some(UserId(id)),
        None => {
            debug!("ignoring malformed user header");
            None
        }
    }
}

pub(crate) async fn vote_handler<V, C>(
    State(engine): State<Arc<LayupEngine<V, C>>>,
    Path(course_id): Path<u64>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Response
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    let Some(user) = viewer(&headers) else {
        let payload = json!({ "error": "sign in to vote" });
        return (StatusCode::FORBIDDEN, Json(payload)).into_response();
    };

    let category = match request.category.parse::<VoteCategory>() {
        Ok(category) => category,
        Err(err) => return AppError::from(err).into_response(),
    };

    // The cast runs to completion even if the client disconnects, so an
    // abandoned request has either fully committed or not touched anything.
    let cast = tokio::task::spawn_blocking(move || {
        engine
            .votes()
            .cast(user, CourseId(course_id), category, request.value)
    })
    .await;

    match cast {
        Ok(Ok(outcome)) => {
            let body = VoteResponse {
                new_score: outcome.new_score,
                was_unvote: outcome.was_unvote(),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Ok(Err(err)) => AppError::from(err).into_response(),
        Err(join_error) => {
            error!(%join_error, "vote task failed");
            let payload = json!({ "error": "vote could not be processed" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn rankings_handler<V, C>(
    State(engine): State<Arc<LayupEngine<V, C>>>,
    Path(mode): Path<String>,
    Query(query): Query<RankingQuery>,
    headers: HeaderMap,
) -> Result<Json<RankingPage>, AppError>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    let mode: RankingMode = mode.parse()?;
    let viewer = viewer(&headers);
    ensure_access(mode, viewer.is_some())?;

    let term = match query.term.as_deref() {
        Some(raw) => raw.parse::<Term>()?,
        None => engine.current_term(),
    };
    let distrib = query.dist.as_deref().filter(|tag| !tag.trim().is_empty());

    let ranking = engine.rankings().rank(&term, mode, distrib)?;
    let window = engine
        .paginator()
        .window(ranking.len(), query.page.as_deref());
    if window.number > 1 && viewer.is_none() {
        return Err(RankingError::AccessRestricted {
            restriction: "see more",
        }
        .into());
    }

    let entries = ranking.page(&window);
    let votes: HashMap<CourseId, Option<i32>> = match viewer {
        Some(user) => engine
            .votes()
            .votes_for_courses(user, entries.iter().map(|entry| &entry.course), mode.primary())?
            .into_iter()
            .collect(),
        None => HashMap::new(),
    };

    let courses = entries
        .iter()
        .map(|entry| RankedCourseView {
            id: entry.course.id,
            name: entry.course.short_name(),
            title: entry.course.title.clone(),
            distribs: entry.course.distribs.clone(),
            quality_score: entry.score.quality,
            difficulty_score: entry.score.difficulty,
            vote: votes.get(&entry.course.id).copied().flatten(),
        })
        .collect();

    Ok(Json(RankingPage {
        term,
        sort: mode,
        course_type: mode.label(),
        page: window,
        courses,
    }))
}

pub(crate) async fn course_handler<V, C>(
    State(engine): State<Arc<LayupEngine<V, C>>>,
    Path(course_id): Path<u64>,
    headers: HeaderMap,
) -> Result<Json<CourseDetail>, AppError>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    let detail = engine
        .courses()
        .detail(CourseId(course_id), viewer(&headers))?;
    Ok(Json(detail))
}

pub(crate) async fn medians_handler<V, C>(
    State(engine): State<Arc<LayupEngine<V, C>>>,
    Path(course_id): Path<u64>,
) -> Result<Json<MediansResponse>, AppError>
where
    V: VoteRepository + 'static,
    C: CatalogRepository + 'static,
{
    let medians = engine.medians().summarize(CourseId(course_id))?;
    Ok(Json(MediansResponse { medians }))
}
