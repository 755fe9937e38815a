use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::dates::{format_date, parse_date};
use crate::backend::domain::models::user::{NewUser, User};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::UserStorage;

/// Repository for user operations
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn user_from_row(row: &SqliteRow) -> Result<User> {
        let birth_date: Option<String> = row.try_get("birth_date")?;
        let birth_date = match birth_date {
            Some(raw) if !raw.trim().is_empty() => Some(parse_date(&raw)?),
            _ => None,
        };

        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            birth_date,
            is_admin: row.try_get("is_admin")?,
        })
    }
}

#[async_trait]
impl UserStorage for UserRepository {
    /// Store a user in the database
    async fn store_user(&self, user: &NewUser) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, first_name, last_name, birth_date, is_admin)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date.map(format_date))
        .bind(user.is_admin)
        .execute(self.db.pool())
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birth_date: user.birth_date,
            is_admin: user.is_admin,
        })
    }

    /// Get a user by ID
    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, birth_date, is_admin
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, first_name, last_name, birth_date, is_admin
            FROM users
            WHERE email = ? COLLATE NOCASE
            "#,
        )
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::user_from_row).transpose()
    }

    /// Update profile fields of a user
    async fn update_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = ?, last_name = ?, birth_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date.map(format_date))
        .bind(user.id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(anyhow::anyhow!("User not found: {}", user.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn setup_test() -> UserRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        UserRepository::new(db)
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: "Lea".to_string(),
            last_name: "Martin".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 6, 15),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_user() {
        let repo = setup_test().await;

        let stored = repo.store_user(&new_user("lea@example.org")).await.unwrap();
        let fetched = repo.get_user(stored.id).await.unwrap();

        assert_eq!(fetched, Some(stored));
        assert!(repo.get_user(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_user_by_email_ignores_case() {
        let repo = setup_test().await;
        let stored = repo.store_user(&new_user("lea@example.org")).await.unwrap();

        assert_eq!(repo.find_user_by_email("LEA@example.org").await.unwrap(), Some(stored));
        assert!(repo.find_user_by_email("sam@example.org").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = setup_test().await;

        repo.store_user(&new_user("lea@example.org")).await.unwrap();
        assert!(repo.store_user(&new_user("lea@example.org")).await.is_err());
    }

    #[tokio::test]
    async fn test_update_user_can_clear_birth_date() {
        let repo = setup_test().await;
        let mut user = repo.store_user(&new_user("lea@example.org")).await.unwrap();

        user.birth_date = None;
        user.last_name = "Durand".to_string();
        repo.update_user(&user).await.unwrap();

        let fetched = repo.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.birth_date, None);
        assert_eq!(fetched.last_name, "Durand");
    }

    #[tokio::test]
    async fn test_update_missing_user_fails() {
        let repo = setup_test().await;
        let mut user = repo.store_user(&new_user("lea@example.org")).await.unwrap();
        user.id = 42;

        assert!(repo.update_user(&user).await.is_err());
    }
}
