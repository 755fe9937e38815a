use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;

use crate::backend::domain::commands::events::CreateEventCommand;
use crate::backend::io::rest::auth::CurrentUser;
use crate::backend::io::rest::error::domain_error_response;
use crate::backend::io::rest::mappers::EventMapper;
use crate::backend::AppState;
use shared::{CreateEventRequest, DeleteResponse, EventResponse};

/// Query parameters of the month grid
#[derive(Debug, Deserialize)]
pub struct CalendarMonthQuery {
    pub family_id: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// Query parameters of the year overview
#[derive(Debug, Deserialize)]
pub struct YearOverviewQuery {
    pub family_id: Option<i64>,
    pub year: Option<i32>,
}

/// Create a router for calendar related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/month", get(get_calendar_month))
        .route("/year", get(get_year_overview))
        .route("/events", post(create_event))
        .route("/events/:id", delete(delete_event))
}

/// Month grid with recurring events expanded
async fn get_calendar_month(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<CalendarMonthQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/month - user: {}, query: {:?}", user.id, query);

    let family = match state.family_service.resolve_family(&user, query.family_id).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    match state.calendar_service.month_grid(&family, query.year, query.month).await {
        Ok(month) => (StatusCode::OK, Json(EventMapper::to_month_dto(month))).into_response(),
        Err(e) => domain_error_response("build calendar month", e),
    }
}

/// Events of each month of a year
async fn get_year_overview(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<YearOverviewQuery>,
) -> impl IntoResponse {
    info!("GET /api/calendar/year - user: {}, query: {:?}", user.id, query);

    let family = match state.family_service.resolve_family(&user, query.family_id).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    match state.calendar_service.year_overview(&family, query.year).await {
        Ok(overview) => (StatusCode::OK, Json(EventMapper::to_year_dto(overview))).into_response(),
        Err(e) => domain_error_response("build year overview", e),
    }
}

async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateEventRequest>,
) -> impl IntoResponse {
    info!("POST /api/calendar/events - user: {}, request: {:?}", user.id, request);

    let family = match state.family_service.resolve_family(&user, Some(request.family_id)).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    let command = CreateEventCommand {
        family_id: request.family_id,
        title: request.title,
        description: request.description,
        start_at: request.start_at,
        end_at: request.end_at,
        recurrence: EventMapper::recurrence_to_domain(request.recurrence),
    };

    match state.event_service.create_event(&user, &family, command).await {
        Ok(event) => {
            let response = EventResponse {
                success_message: format!("Event '{}' created", event.title),
                event: EventMapper::to_dto(event),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response("create event", e),
    }
}

async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(event_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/calendar/events/{} - user: {}", event_id, user.id);

    match state.event_service.delete_event(&user, event_id).await {
        Ok(()) => {
            let response = DeleteResponse {
                id: event_id,
                success_message: "Event deleted".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("delete event", e),
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::io::rest::test_support::{create_family, decode, register, send, setup_test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use shared::{CalendarMonthResponse, EventResponse, Recurrence, YearOverviewResponse};

    #[tokio::test]
    async fn test_birthday_shows_up_in_year_overview_and_month_grid() {
        let app = setup_test_app().await;
        let user_id = register(&app, "lea@example.org", Some("1990-06-15")).await;
        let family_id = create_family(&app, user_id, "Martin").await;

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/calendar/year?family_id={}&year=2025", family_id),
            Some(user_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let overview: YearOverviewResponse = decode(body);
        assert_eq!(overview.months.len(), 12);
        let june = &overview.months[5];
        assert_eq!(june.month, 6);
        assert_eq!(june.events.len(), 1);
        assert_eq!(june.events[0].title, "Birthday of Lea MARTIN");
        assert_eq!(june.events[0].start_at, "1990-06-15T00:00:00");
        assert!(june.events[0].is_birthday);
        assert!(overview.months[4].events.is_empty());

        let (status, body) = send(
            &app,
            Method::GET,
            &format!("/api/calendar/month?family_id={}&year=2025&month=6", family_id),
            Some(user_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let month: CalendarMonthResponse = decode(body);
        let cells: Vec<_> = month.weeks.iter().flat_map(|w| w.days.iter()).collect();
        assert_eq!(cells.len() % 7, 0);
        assert_eq!(cells[0].date, "2025-05-26");
        let birthday_cell = cells.iter().find(|c| c.date == "2025-06-15").unwrap();
        assert_eq!(birthday_cell.events.len(), 1);
        assert!(cells.iter().filter(|c| c.date != "2025-06-15").all(|c| c.events.is_empty()));
    }

    #[tokio::test]
    async fn test_month_defaults_to_first_family() {
        let app = setup_test_app().await;
        let user_id = register(&app, "lea@example.org", None).await;
        let family_id = create_family(&app, user_id, "Martin").await;

        let (status, body) = send(&app, Method::GET, "/api/calendar/month?year=2025&month=2", Some(user_id), None).await;

        assert_eq!(status, StatusCode::OK);
        let month: CalendarMonthResponse = decode(body);
        assert_eq!(month.family_id, family_id);
        assert_eq!(month.month, 2);
    }

    #[tokio::test]
    async fn test_calendar_requires_known_member() {
        let app = setup_test_app().await;
        let owner = register(&app, "lea@example.org", None).await;
        let stranger = register(&app, "sam@example.org", None).await;
        let family_id = create_family(&app, owner, "Martin").await;
        let uri = format!("/api/calendar/month?family_id={}", family_id);

        let (status, _) = send(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, Method::GET, &uri, Some(9999), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::GET, &uri, Some(stranger), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "ACCESS_DENIED");
    }

    #[tokio::test]
    async fn test_create_and_delete_weekly_event() {
        let app = setup_test_app().await;
        let user_id = register(&app, "lea@example.org", None).await;
        let family_id = create_family(&app, user_id, "Martin").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/calendar/events",
            Some(user_id),
            Some(json!({
                "family_id": family_id,
                "title": "Swimming",
                "start_at": "2025-06-03T19:00",
                "recurrence": "weekly",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let created: EventResponse = decode(body);
        assert_eq!(created.event.recurrence, Recurrence::Weekly);
        assert_eq!(created.event.start_at, "2025-06-03T19:00:00");

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/calendar/month?family_id={}&year=2025&month=7", family_id),
            Some(user_id),
            None,
        )
        .await;
        let month: CalendarMonthResponse = decode(body);
        let tuesdays = month
            .weeks
            .iter()
            .filter(|w| w.days[1].events.iter().any(|e| e.title == "Swimming"))
            .count();
        assert_eq!(tuesdays, month.weeks.len());

        let uri = format!("/api/calendar/events/{}", created.event.id);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(user_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(user_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_event_validation_errors() {
        let app = setup_test_app().await;
        let user_id = register(&app, "lea@example.org", None).await;
        let family_id = create_family(&app, user_id, "Martin").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/calendar/events",
            Some(user_id),
            Some(json!({
                "family_id": family_id,
                "title": "Trip",
                "start_at": "2025-06-03T10:00",
                "end_at": "2025-06-01T10:00",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}
