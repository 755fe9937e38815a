//! # Backend Module
//!
//! Everything behind the HTTP boundary of TribuConnect.
//!
//! ```text
//! IO Layer (REST handlers, DTO mappers)
//!     ↓
//! Domain Layer (services, recurrence and shift engines)
//!     ↓
//! Storage Layer (SQLite repositories)
//! ```
//!
//! [`initialize_backend`] wires the layers together from an [`AppConfig`];
//! [`create_router`] exposes them under `/api`.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::backend::config::AppConfig;
use crate::backend::domain::{
    BirthdaySyncService, CalendarService, EventService, FamilyService, UserService, WorkScheduleService,
};
use crate::backend::storage::{
    DbConnection, EventRepository, FamilyRepository, InvitationRepository, UserRepository,
    WorkScheduleRepository,
};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub family_service: FamilyService,
    pub calendar_service: CalendarService,
    pub event_service: EventService,
    pub work_schedule_service: WorkScheduleService,
}

impl AppState {
    /// Build every service on top of one database connection
    pub fn new(db: DbConnection) -> Self {
        let users = Arc::new(UserRepository::new(db.clone()));
        let families = Arc::new(FamilyRepository::new(db.clone()));
        let invitations = Arc::new(InvitationRepository::new(db.clone()));
        let events = Arc::new(EventRepository::new(db.clone()));
        let schedules = Arc::new(WorkScheduleRepository::new(db));

        let birthday_sync = BirthdaySyncService::new(events.clone(), families.clone());

        Self {
            user_service: UserService::new(users.clone(), birthday_sync.clone()),
            family_service: FamilyService::new(families.clone(), users, invitations, birthday_sync),
            calendar_service: CalendarService::new(events.clone()),
            event_service: EventService::new(events, families.clone()),
            work_schedule_service: WorkScheduleService::new(schedules, families),
        }
    }
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    info!("Setting up application state");
    Ok(AppState::new(db))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Result<Router> {
    // CORS setup to allow the browser frontend to make requests
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Ok(Router::new()
        .nest("/api", io::rest::api_router())
        .layer(cors)
        .with_state(app_state))
}
