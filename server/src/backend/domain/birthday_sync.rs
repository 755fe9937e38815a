//! Birthday synchronization.
//!
//! Every member with a birth date owns exactly one yearly birthday event in
//! each family they belong to. The event is created on first sync and only
//! rewritten when the member's name or birth date changed. Uniqueness is
//! guaranteed by the record store (partial unique index plus upsert).
//!
//! Callers in the membership flows use the `*_quietly` variants: a failed
//! sync is logged and never fails the surrounding operation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::domain::dates::at_midnight;
use crate::backend::domain::errors::DomainResult;
use crate::backend::domain::models::user::User;
use crate::backend::storage::traits::{EventStorage, FamilyStorage};

/// What a synchronization did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Member has no birth date
    Skipped,
    Created,
    Updated,
    /// Existing event already matched, nothing written
    Unchanged,
}

#[derive(Clone)]
pub struct BirthdaySyncService {
    event_storage: Arc<dyn EventStorage>,
    family_storage: Arc<dyn FamilyStorage>,
}

impl BirthdaySyncService {
    pub fn new(event_storage: Arc<dyn EventStorage>, family_storage: Arc<dyn FamilyStorage>) -> Self {
        Self {
            event_storage,
            family_storage,
        }
    }

    /// Make the member's birthday event in `family_id` match their profile
    pub async fn sync_for_user_in_family(&self, user: &User, family_id: i64) -> DomainResult<SyncOutcome> {
        let birth_date = match user.birth_date {
            Some(date) => date,
            None => {
                debug!("User {} has no birth date, skipping birthday sync", user.id);
                return Ok(SyncOutcome::Skipped);
            }
        };

        let title = user.birthday_title();
        let existing = self.event_storage.find_birthday_event(family_id, user.id).await?;

        if let Some(event) = &existing {
            // Time-of-day is irrelevant for a birthday
            if event.title == title && event.start_date() == birth_date {
                debug!("Birthday event {} of user {} is up to date", event.id, user.id);
                return Ok(SyncOutcome::Unchanged);
            }
        }

        let event = self
            .event_storage
            .upsert_birthday_event(family_id, user.id, &title, at_midnight(birth_date))
            .await?;

        let outcome = if existing.is_some() {
            SyncOutcome::Updated
        } else {
            SyncOutcome::Created
        };
        info!(
            "Birthday event {} of user {} in family {}: {:?}",
            event.id, user.id, family_id, outcome
        );
        Ok(outcome)
    }

    /// Sync the member's birthday in every family they belong to.
    /// A family that fails is logged and left out of the result; the others
    /// are still synced.
    pub async fn sync_for_user(&self, user: &User) -> DomainResult<Vec<(i64, SyncOutcome)>> {
        let families = self.family_storage.list_families_for_user(user.id).await?;
        let mut outcomes = Vec::with_capacity(families.len());
        for family in families {
            if let Some(outcome) = self.sync_quietly(user, family.id).await {
                outcomes.push((family.id, outcome));
            }
        }
        Ok(outcomes)
    }

    /// Best-effort variant for membership changes; failures are only logged
    pub async fn sync_quietly(&self, user: &User, family_id: i64) -> Option<SyncOutcome> {
        match self.sync_for_user_in_family(user, family_id).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(
                    "Birthday sync failed for user {} in family {}: {}",
                    user.id, family_id, e
                );
                None
            }
        }
    }

    /// Best-effort variant for profile edits; failures are only logged
    pub async fn sync_everywhere_quietly(&self, user: &User) {
        if let Err(e) = self.sync_for_user(user).await {
            warn!("Birthday sync failed for user {}: {}", user.id, e);
        }
    }
}
