//! User registration and profile edits.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::domain::birthday_sync::BirthdaySyncService;
use crate::backend::domain::commands::users::{CreateUserCommand, UpdateProfileCommand};
use crate::backend::domain::dates::parse_date;
use crate::backend::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::backend::domain::models::user::{NewUser, User};
use crate::backend::storage::traits::UserStorage;

/// Service for managing users
#[derive(Clone)]
pub struct UserService {
    user_storage: Arc<dyn UserStorage>,
    birthday_sync: BirthdaySyncService,
}

impl UserService {
    pub fn new(user_storage: Arc<dyn UserStorage>, birthday_sync: BirthdaySyncService) -> Self {
        Self {
            user_storage,
            birthday_sync,
        }
    }

    /// Register a user. New users belong to no family yet, so there is
    /// nothing to synchronize.
    pub async fn create_user(&self, command: CreateUserCommand) -> DomainResult<User> {
        info!("Creating user: email={}", command.email);

        let email = normalize_email(&command.email)?;
        let first_name = required_name(&command.first_name)?;
        let last_name = required_name(&command.last_name)?;
        let birth_date = optional_date(command.birth_date.as_deref())?;

        if self.user_storage.find_user_by_email(&email).await?.is_some() {
            return Err(ValidationError::EmailTaken(email).into());
        }

        let user = self
            .user_storage
            .store_user(&NewUser {
                email,
                first_name,
                last_name,
                birth_date,
                is_admin: command.is_admin,
            })
            .await?;

        info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> DomainResult<Option<User>> {
        let user = self.user_storage.get_user(user_id).await?;
        if user.is_none() {
            warn!("User not found: {}", user_id);
        }
        Ok(user)
    }

    /// Edit the caller's names and birth date, then refresh their birthday
    /// event in every family
    pub async fn update_profile(&self, user: &User, command: UpdateProfileCommand) -> DomainResult<User> {
        info!("Updating profile of user {}", user.id);

        let mut updated = user.clone();
        if let Some(first_name) = command.first_name {
            updated.first_name = required_name(&first_name)?;
        }
        if let Some(last_name) = command.last_name {
            updated.last_name = required_name(&last_name)?;
        }
        if let Some(birth_date) = command.birth_date {
            updated.birth_date = optional_date(Some(&birth_date))?;
        }

        self.user_storage.update_user(&updated).await.map_err(|e| {
            warn!("Failed to update user {}: {}", user.id, e);
            DomainError::Storage(e)
        })?;

        self.birthday_sync.sync_everywhere_quietly(&updated).await;

        info!("Updated profile of user {}", user.id);
        Ok(updated)
    }
}

pub(crate) fn normalize_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') => Ok(email),
        _ => Err(ValidationError::InvalidEmail(raw.trim().to_string())),
    }
}

fn required_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

/// Empty input means "no date"
fn optional_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(Some(parse_date(value)?)),
        _ => Ok(None),
    }
}
