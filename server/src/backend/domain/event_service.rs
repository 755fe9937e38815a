//! Event creation and deletion.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::domain::access::{can_manage, can_view};
use crate::backend::domain::commands::events::CreateEventCommand;
use crate::backend::domain::dates::parse_date_time;
use crate::backend::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::backend::domain::models::event::{Event, EventOrigin, NewEvent, MAX_TITLE_LEN};
use crate::backend::domain::models::family::Family;
use crate::backend::domain::models::user::User;
use crate::backend::storage::traits::{EventStorage, FamilyStorage};

/// Service for events entered through the event form
#[derive(Clone)]
pub struct EventService {
    event_storage: Arc<dyn EventStorage>,
    family_storage: Arc<dyn FamilyStorage>,
}

impl EventService {
    pub fn new(event_storage: Arc<dyn EventStorage>, family_storage: Arc<dyn FamilyStorage>) -> Self {
        Self {
            event_storage,
            family_storage,
        }
    }

    /// Create an event in `family` on behalf of `caller`
    pub async fn create_event(&self, caller: &User, family: &Family, command: CreateEventCommand) -> DomainResult<Event> {
        info!(
            "Creating event '{}' in family {} ({:?})",
            command.title, family.id, command.recurrence
        );

        if !can_view(caller, family) {
            return Err(DomainError::AccessDenied(format!(
                "user {} is not a member of family {}",
                caller.id, family.id
            )));
        }

        let new_event = self.validate_create_command(caller, family, command)?;
        let event = self.event_storage.store_event(&new_event).await?;

        info!("Created event {} in family {}", event.id, family.id);
        Ok(event)
    }

    /// Delete an event. Allowed for its creator, the family owner and admins.
    pub async fn delete_event(&self, caller: &User, event_id: i64) -> DomainResult<()> {
        info!("Deleting event {} for user {}", event_id, caller.id);

        let event = self
            .event_storage
            .get_event(event_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Event {}", event_id)))?;
        let family = self
            .family_storage
            .get_family(event.family_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Family {}", event.family_id)))?;

        if !can_manage(caller, &family, event.created_by) {
            warn!("User {} may not delete event {}", caller.id, event_id);
            return Err(DomainError::AccessDenied(format!(
                "event {} can only be deleted by its creator or the family owner",
                event_id
            )));
        }

        if !self.event_storage.delete_event(event_id).await? {
            return Err(DomainError::NotFound(format!("Event {}", event_id)));
        }

        info!("Deleted event {}", event_id);
        Ok(())
    }

    fn validate_create_command(
        &self,
        caller: &User,
        family: &Family,
        command: CreateEventCommand,
    ) -> Result<NewEvent, ValidationError> {
        let title = command.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong(MAX_TITLE_LEN));
        }

        let start_at = parse_date_time(&command.start_at)?;
        let end_at = match command.end_at.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_date_time(raw)?),
            _ => None,
        };
        if matches!(end_at, Some(end) if end < start_at) {
            return Err(ValidationError::EndBeforeStart);
        }

        let description = command
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(NewEvent {
            family_id: family.id,
            created_by: Some(caller.id),
            title,
            description,
            start_at,
            end_at,
            recurrence: command.recurrence,
            origin: EventOrigin::Manual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::event::Recurrence;
    use crate::backend::domain::models::user::NewUser;
    use crate::backend::storage::traits::UserStorage;
    use crate::backend::storage::{DbConnection, EventRepository, FamilyRepository, UserRepository};

    struct Fixture {
        service: EventService,
        events: EventRepository,
        owner: User,
        member: User,
        family: Family,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let users = UserRepository::new(db.clone());
        let families = FamilyRepository::new(db.clone());
        let events = EventRepository::new(db);

        let new_user = |email: &str| NewUser {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            birth_date: None,
            is_admin: false,
        };
        let owner = users.store_user(&new_user("owner@example.org")).await.unwrap();
        let member = users.store_user(&new_user("member@example.org")).await.unwrap();
        let family = families.create_family("Martin", owner.id).await.unwrap();
        families.add_member(family.id, member.id).await.unwrap();
        let family = families.get_family(family.id).await.unwrap().unwrap();

        Fixture {
            service: EventService::new(Arc::new(events.clone()), Arc::new(families)),
            events,
            owner,
            member,
            family,
        }
    }

    fn command(title: &str, start_at: &str, end_at: Option<&str>) -> CreateEventCommand {
        CreateEventCommand {
            family_id: 0,
            title: title.to_string(),
            description: Some("  ".to_string()),
            start_at: start_at.to_string(),
            end_at: end_at.map(str::to_string),
            recurrence: Recurrence::Weekly,
        }
    }

    #[tokio::test]
    async fn test_create_event_trims_and_stores() {
        let fx = setup_test().await;

        let event = fx
            .service
            .create_event(&fx.member, &fx.family, command("  Swimming ", "2025-06-03T19:00", Some("2025-06-03T20:00")))
            .await
            .unwrap();

        assert_eq!(event.title, "Swimming");
        assert_eq!(event.description, None);
        assert_eq!(event.created_by, Some(fx.member.id));
        assert_eq!(event.origin, EventOrigin::Manual);
        assert_eq!(fx.events.get_event(event.id).await.unwrap(), Some(event));
    }

    async fn create(fx: &Fixture, cmd: CreateEventCommand) -> DomainResult<Event> {
        fx.service.create_event(&fx.member, &fx.family, cmd).await
    }

    #[tokio::test]
    async fn test_create_event_validation() {
        let fx = setup_test().await;
        assert!(matches!(
            create(&fx, command("   ", "2025-06-03", None)).await,
            Err(DomainError::Validation(ValidationError::EmptyTitle))
        ));
        assert!(matches!(
            create(&fx, command(&"x".repeat(MAX_TITLE_LEN + 1), "2025-06-03", None)).await,
            Err(DomainError::Validation(ValidationError::TitleTooLong(_)))
        ));
        assert!(matches!(
            create(&fx, command("Trip", "03/06/2025", None)).await,
            Err(DomainError::Validation(ValidationError::InvalidDate(_)))
        ));
        assert!(matches!(
            create(&fx, command("Trip", "2025-06-03T10:00", Some("2025-06-02T10:00"))).await,
            Err(DomainError::Validation(ValidationError::EndBeforeStart))
        ));
        // A title of exactly the maximum length is fine
        assert!(create(&fx, command(&"x".repeat(MAX_TITLE_LEN), "2025-06-03", Some(""))).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_event_permissions() {
        let fx = setup_test().await;
        let owners_event = fx
            .service
            .create_event(&fx.owner, &fx.family, command("Dinner", "2025-06-03T19:00", None))
            .await
            .unwrap();
        let members_event = fx
            .service
            .create_event(&fx.member, &fx.family, command("Football", "2025-06-04T18:00", None))
            .await
            .unwrap();

        assert!(matches!(
            fx.service.delete_event(&fx.member, owners_event.id).await,
            Err(DomainError::AccessDenied(_))
        ));
        fx.service.delete_event(&fx.member, members_event.id).await.unwrap();
        fx.service.delete_event(&fx.owner, owners_event.id).await.unwrap();
        assert!(matches!(
            fx.service.delete_event(&fx.owner, owners_event.id).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
