use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::backend::domain::commands::users::{CreateUserCommand, UpdateProfileCommand};
use crate::backend::io::rest::auth::CurrentUser;
use crate::backend::io::rest::error::domain_error_response;
use crate::backend::io::rest::mappers::UserMapper;
use crate::backend::AppState;
use shared::{CreateUserRequest, UpdateProfileRequest, UserResponse};

/// Create a router for user APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/me", get(get_current_user).put(update_profile))
}

/// Register a user. No caller identity is needed.
async fn create_user(State(state): State<AppState>, Json(request): Json<CreateUserRequest>) -> impl IntoResponse {
    info!("POST /api/users - email: {}", request.email);

    let command = CreateUserCommand {
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        birth_date: request.birth_date,
        is_admin: request.is_admin,
    };

    match state.user_service.create_user(command).await {
        Ok(user) => {
            let response = UserResponse {
                success_message: format!("User {} created", user.email),
                user: UserMapper::to_dto(user),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response("create user", e),
    }
}

async fn get_current_user(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    info!("GET /api/users/me - user: {}", user.id);

    let response = UserResponse {
        success_message: String::new(),
        user: UserMapper::to_dto(user),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Edit names or birth date; the birthday event follows in every family
async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateProfileRequest>,
) -> impl IntoResponse {
    info!("PUT /api/users/me - user: {}, request: {:?}", user.id, request);

    let command = UpdateProfileCommand {
        first_name: request.first_name,
        last_name: request.last_name,
        birth_date: request.birth_date,
    };

    match state.user_service.update_profile(&user, command).await {
        Ok(updated) => {
            let response = UserResponse {
                success_message: "Profile updated".to_string(),
                user: UserMapper::to_dto(updated),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("update profile", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::io::rest::test_support::{create_family, decode, register, send, setup_test_app};
    use axum::http::Method;
    use serde_json::json;
    use shared::YearOverviewResponse;

    #[tokio::test]
    async fn test_register_and_fetch_me() {
        let app = setup_test_app().await;
        let user_id = register(&app, "Lea@Example.org", Some("1990-06-15")).await;

        let (status, body) = send(&app, Method::GET, "/api/users/me", Some(user_id), None).await;

        assert_eq!(status, StatusCode::OK);
        let me: UserResponse = decode(body);
        assert_eq!(me.user.email, "lea@example.org");
        assert_eq!(me.user.birth_date.as_deref(), Some("1990-06-15"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let app = setup_test_app().await;
        register(&app, "lea@example.org", None).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/users",
            None,
            Some(json!({ "email": "LEA@example.org", "first_name": "Lea", "last_name": "Martin" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_profile_edit_moves_birthday() {
        let app = setup_test_app().await;
        let user_id = register(&app, "lea@example.org", Some("1990-06-15")).await;
        let family_id = create_family(&app, user_id, "Martin").await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/users/me",
            Some(user_id),
            Some(json!({ "birth_date": "1990-07-02" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", body);

        let (_, body) = send(
            &app,
            Method::GET,
            &format!("/api/calendar/year?family_id={}&year=2025", family_id),
            Some(user_id),
            None,
        )
        .await;
        let overview: YearOverviewResponse = decode(body);
        assert!(overview.months[5].events.is_empty());
        assert_eq!(overview.months[6].events.len(), 1);
        assert_eq!(overview.months[6].events[0].start_at, "1990-07-02T00:00:00");
    }
}
