use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use chrono::{Datelike, Local};
use serde::Deserialize;
use tracing::info;

use crate::backend::domain::commands::work::{CreateWorkPatternCommand, UpsertWorkOverrideCommand, WorkGridRange};
use crate::backend::domain::dates::YearMonth;
use crate::backend::domain::work_schedule::current_month;
use crate::backend::domain::ValidationError;
use crate::backend::io::rest::auth::CurrentUser;
use crate::backend::io::rest::error::domain_error_response;
use crate::backend::io::rest::mappers::WorkMapper;
use crate::backend::AppState;
use shared::{CreateWorkPatternRequest, DeleteResponse, UpsertWorkOverrideRequest, WorkPatternResponse};

/// Query parameters of the work grid: either `start` and `end`, or `year`
/// and `month`. Without any, the current month is shown.
#[derive(Debug, Deserialize)]
pub struct WorkGridQuery {
    pub family_id: Option<i64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl WorkGridQuery {
    fn range(&self) -> Result<WorkGridRange, ValidationError> {
        match (&self.start, &self.end) {
            (Some(start), Some(end)) => Ok(WorkGridRange::Dates {
                start: start.clone(),
                end: end.clone(),
            }),
            (Some(_), None) => Err(ValidationError::InvalidDate("missing end date".to_string())),
            (None, Some(_)) => Err(ValidationError::InvalidDate("missing start date".to_string())),
            (None, None) if self.year.is_none() && self.month.is_none() => Ok(current_month()),
            (None, None) => {
                let today = Local::now().date_naive();
                Ok(WorkGridRange::Month(YearMonth::clamped(
                    self.year.unwrap_or(today.year()),
                    self.month.unwrap_or(today.month()),
                )))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WorkPatternQuery {
    pub family_id: Option<i64>,
}

/// Create a router for work schedule APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/grid", get(get_work_grid))
        .route("/patterns", get(list_work_patterns).post(create_work_pattern))
        .route("/patterns/:id", delete(delete_work_pattern))
        .route("/overrides", post(upsert_work_override))
}

/// Effective shift of every family pattern on every day of the range
async fn get_work_grid(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<WorkGridQuery>,
) -> impl IntoResponse {
    info!("GET /api/work/grid - user: {}, query: {:?}", user.id, query);

    let range = match query.range() {
        Ok(range) => range,
        Err(e) => return domain_error_response("read work grid range", e.into()),
    };
    let family = match state.family_service.resolve_family(&user, query.family_id).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    match state.work_schedule_service.work_grid(&family, range).await {
        Ok(grid) => (StatusCode::OK, Json(WorkMapper::to_grid_dto(grid))).into_response(),
        Err(e) => domain_error_response("build work grid", e),
    }
}

async fn list_work_patterns(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<WorkPatternQuery>,
) -> impl IntoResponse {
    info!("GET /api/work/patterns - user: {}, query: {:?}", user.id, query);

    let family = match state.family_service.resolve_family(&user, query.family_id).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    match state.work_schedule_service.list_patterns(&family).await {
        Ok(patterns) => (StatusCode::OK, Json(WorkMapper::to_pattern_list_dto(patterns))).into_response(),
        Err(e) => domain_error_response("list work patterns", e),
    }
}

async fn create_work_pattern(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateWorkPatternRequest>,
) -> impl IntoResponse {
    info!("POST /api/work/patterns - user: {}, request: {:?}", user.id, request);

    let family = match state.family_service.resolve_family(&user, Some(request.family_id)).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    let command = CreateWorkPatternCommand {
        family_id: request.family_id,
        cycle_length: request.cycle_length,
        start_date: request.start_date,
        day_values: request.day_values,
    };

    match state.work_schedule_service.create_pattern(&user, &family, command).await {
        Ok(pattern) => {
            let response = WorkPatternResponse {
                success_message: format!("Work pattern with a {}-day cycle created", pattern.cycle_length),
                pattern: WorkMapper::pattern_to_dto(pattern),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response("create work pattern", e),
    }
}

async fn delete_work_pattern(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pattern_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/work/patterns/{} - user: {}", pattern_id, user.id);

    match state.work_schedule_service.delete_pattern(&user, pattern_id).await {
        Ok(()) => {
            let response = DeleteResponse {
                id: pattern_id,
                success_message: "Work pattern deleted".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("delete work pattern", e),
    }
}

async fn upsert_work_override(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpsertWorkOverrideRequest>,
) -> impl IntoResponse {
    info!("POST /api/work/overrides - user: {}, request: {:?}", user.id, request);

    let command = UpsertWorkOverrideCommand {
        pattern_id: request.pattern_id,
        date: request.date,
        value: request.value,
    };

    match state.work_schedule_service.upsert_override(&user, command).await {
        Ok(work_override) => (StatusCode::OK, Json(WorkMapper::to_override_dto(work_override))).into_response(),
        Err(e) => domain_error_response("save work override", e),
    }
}
