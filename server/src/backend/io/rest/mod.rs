//! # REST API Interface Layer
//!
//! HTTP endpoints of TribuConnect, all nested under `/api`:
//!
//! - `/calendar`: month grid, year overview, event create/delete
//! - `/work`: work grid, patterns, overrides
//! - `/users`: registration and profile
//! - `/families`: families, members, birthday sync
//!
//! Handlers only translate: DTOs in, commands to the domain, DTOs out.
//! The caller is identified by the `x-user-id` header (see [`auth`]).

use axum::Router;

use crate::backend::AppState;

pub mod auth;
pub mod calendar_apis;
pub mod error;
pub mod family_apis;
pub mod mappers;
pub mod user_apis;
pub mod work_apis;

/// All API routes, to be nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/calendar", calendar_apis::router())
        .nest("/work", work_apis::router())
        .nest("/users", user_apis::router())
        .nest("/families", family_apis::router())
}
