//! # Storage Module
//!
//! Handles all data persistence for TribuConnect.
//!
//! The domain layer only talks to the traits in [`traits`]; the SQLite
//! repositories are the one production implementation and share a single
//! [`DbConnection`] pool.
//!
//! ## Tables
//!
//! - **users**, **families**, **family_members**: identity and membership
//! - **events**: calendar events, including synchronized birthday events
//! - **work_patterns**, **work_overrides**: rotating shift cycles and per-day exceptions
//! - **invitations**: single-use tokens for joining a family
//!
//! Dates are stored as ISO-8601 text so that string order is date order.

pub mod connection;
pub mod repositories;
pub mod traits;

// Re-export the main types that other modules need
pub use connection::DbConnection;
pub use repositories::{
    EventRepository, FamilyRepository, InvitationRepository, UserRepository, WorkScheduleRepository,
};
pub use traits::{EventStorage, FamilyStorage, InvitationStorage, UserStorage, WorkScheduleStorage};
