//! # Domain Module
//!
//! Business logic of TribuConnect: the family calendar with recurring events,
//! automatic birthday events and per-member work-shift schedules.
//!
//! ## Module Organization
//!
//! - **recurrence**: pure expansion of stored events into day occurrences
//! - **calendar**: month grid and year overview built on the expander
//! - **birthday_sync**: keeps one yearly birthday event per member and family
//! - **work_schedule**: cyclic shift resolution, overrides and the work grid
//! - **event_service**, **user_service**, **family_service**: CRUD flows and permissions
//! - **access**: who may view, manage or administer family resources
//! - **dates**: calendar arithmetic and date parsing shared by all of the above
//!
//! Services only see the storage traits, never SQLite directly.

pub mod access;
pub mod birthday_sync;
pub mod calendar;
pub mod commands;
pub mod dates;
pub mod errors;
pub mod event_service;
pub mod family_service;
pub mod models;
pub mod recurrence;
pub mod user_service;
pub mod work_schedule;

pub use birthday_sync::{BirthdaySyncService, SyncOutcome};
pub use calendar::CalendarService;
pub use errors::{DomainError, DomainResult, ValidationError};
pub use event_service::EventService;
pub use family_service::FamilyService;
pub use user_service::UserService;
pub use work_schedule::WorkScheduleService;
