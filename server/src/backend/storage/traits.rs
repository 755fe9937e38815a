//! # Storage Traits
//!
//! This module defines the storage abstraction traits that let the domain
//! layer treat the record store as a black box. The SQLite repositories are
//! the only production implementation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::backend::domain::dates::DateWindow;
use crate::backend::domain::models::event::{Event, NewEvent};
use crate::backend::domain::models::family::Family;
use crate::backend::domain::models::invitation::{Invitation, NewInvitation};
use crate::backend::domain::models::user::{NewUser, User};
use crate::backend::domain::models::work_pattern::{NewWorkPattern, WorkOverride, WorkPattern};

/// Trait defining the interface for user storage operations
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Store a new user and return it with its id
    async fn store_user(&self, user: &NewUser) -> Result<User>;

    /// Retrieve a specific user by ID
    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update names and birth date of an existing user
    async fn update_user(&self, user: &User) -> Result<()>;
}

/// Trait defining the interface for family and membership storage
#[async_trait]
pub trait FamilyStorage: Send + Sync {
    /// Create a family owned by `owner_id`; the owner becomes its first member
    async fn create_family(&self, name: &str, owner_id: i64) -> Result<Family>;

    async fn get_family(&self, family_id: i64) -> Result<Option<Family>>;

    /// Families the user belongs to, oldest first
    async fn list_families_for_user(&self, user_id: i64) -> Result<Vec<Family>>;

    /// Returns false if the user already was a member
    async fn add_member(&self, family_id: i64, user_id: i64) -> Result<bool>;

    /// Deletes the family together with its memberships, events, work
    /// patterns, overrides and invitations. Returns true if it existed.
    async fn delete_family(&self, family_id: i64) -> Result<bool>;

    /// Returns false if the family does not exist
    async fn set_owner(&self, family_id: i64, owner_id: i64) -> Result<bool>;
}

/// Trait defining the interface for family invitations
#[async_trait]
pub trait InvitationStorage: Send + Sync {
    async fn store_invitation(&self, invitation: &NewInvitation) -> Result<Invitation>;

    /// The invitation with this token, if it has not been accepted yet
    async fn find_pending_invitation(&self, token: &str) -> Result<Option<Invitation>>;

    /// Flip a pending invitation to accepted. Returns false if it was
    /// missing or already accepted.
    async fn mark_accepted(&self, invitation_id: i64, accepted_at: NaiveDateTime) -> Result<bool>;
}

/// Trait defining the interface for calendar event storage
#[async_trait]
pub trait EventStorage: Send + Sync {
    async fn store_event(&self, event: &NewEvent) -> Result<Event>;

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>>;

    /// Returns true if the event was found and deleted
    async fn delete_event(&self, event_id: i64) -> Result<bool>;

    /// Events of a family that may show up in `window`: one-off events
    /// starting inside it plus every recurring event.
    /// Ordered by start ascending. Rows that cannot be decoded are skipped.
    async fn list_visible_events(&self, family_id: i64, window: DateWindow) -> Result<Vec<Event>>;

    /// The birthday event a member has in a family, if any
    async fn find_birthday_event(&self, family_id: i64, user_id: i64) -> Result<Option<Event>>;

    /// Create the member's birthday event, or overwrite title and start of
    /// the existing one, in a single statement
    async fn upsert_birthday_event(
        &self,
        family_id: i64,
        user_id: i64,
        title: &str,
        start_at: NaiveDateTime,
    ) -> Result<Event>;
}

/// Trait defining the interface for work patterns and their overrides
#[async_trait]
pub trait WorkScheduleStorage: Send + Sync {
    async fn store_pattern(&self, pattern: &NewWorkPattern) -> Result<WorkPattern>;

    async fn get_pattern(&self, pattern_id: i64) -> Result<Option<WorkPattern>>;

    /// Patterns of a family, oldest first
    async fn list_patterns(&self, family_id: i64) -> Result<Vec<WorkPattern>>;

    /// Deletes the pattern and its overrides. Returns true if it existed.
    async fn delete_pattern(&self, pattern_id: i64) -> Result<bool>;

    /// Overrides of the given patterns dated inside `window`
    async fn list_overrides(&self, pattern_ids: &[i64], window: DateWindow) -> Result<Vec<WorkOverride>>;

    /// Insert or replace the override of (pattern, date)
    async fn upsert_override(&self, work_override: &WorkOverride) -> Result<()>;
}
