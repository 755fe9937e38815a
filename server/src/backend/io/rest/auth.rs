//! Caller identification.
//!
//! Sessions are handled outside this server; the authenticated user id is
//! forwarded in the `x-user-id` header.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Response,
};
use tracing::warn;

use crate::backend::domain::models::user::User;
use crate::backend::io::rest::error::{domain_error_response, error_response};
use crate::backend::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| unauthorized("Missing or malformed x-user-id header"))?;

        match state.user_service.get_user(user_id).await {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                warn!("Rejecting request from unknown user {}", user_id);
                Err(unauthorized("Unknown user"))
            }
            Err(e) => Err(domain_error_response("identify caller", e)),
        }
    }
}

fn unauthorized(message: &str) -> Response {
    error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
}
