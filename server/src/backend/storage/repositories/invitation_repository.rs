use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::dates::{format_date_time, parse_date_time};
use crate::backend::domain::models::invitation::{Invitation, InvitationStatus, NewInvitation};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::InvitationStorage;

/// Repository for family invitations
#[derive(Clone)]
pub struct InvitationRepository {
    db: DbConnection,
}

impl InvitationRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn invitation_from_row(row: &SqliteRow) -> Result<Invitation> {
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let accepted_at: Option<String> = row.try_get("accepted_at")?;

        Ok(Invitation {
            id: row.try_get("id")?,
            family_id: row.try_get("family_id")?,
            email: row.try_get("email")?,
            token: row.try_get("token")?,
            status: InvitationStatus::from_string(&status).map_err(|e| anyhow!(e))?,
            created_at: parse_date_time(&created_at)?,
            accepted_at: accepted_at.as_deref().map(parse_date_time).transpose()?,
        })
    }
}

#[async_trait]
impl InvitationStorage for InvitationRepository {
    async fn store_invitation(&self, invitation: &NewInvitation) -> Result<Invitation> {
        let result = sqlx::query(
            r#"
            INSERT INTO invitations (family_id, email, token, status, created_at)
            VALUES (?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(invitation.family_id)
        .bind(&invitation.email)
        .bind(&invitation.token)
        .bind(format_date_time(invitation.created_at))
        .execute(self.db.pool())
        .await?;

        Ok(invitation.clone().into_invitation(result.last_insert_rowid()))
    }

    async fn find_pending_invitation(&self, token: &str) -> Result<Option<Invitation>> {
        let row = sqlx::query(
            r#"
            SELECT id, family_id, email, token, status, created_at, accepted_at
            FROM invitations
            WHERE token = ? AND status = 'pending'
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::invitation_from_row).transpose()
    }

    async fn mark_accepted(&self, invitation_id: i64, accepted_at: NaiveDateTime) -> Result<bool> {
        // The status guard makes a token single-use under concurrent accepts
        let result = sqlx::query(
            "UPDATE invitations SET status = 'accepted', accepted_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(format_date_time(accepted_at))
        .bind(invitation_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_token_is_single_use() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let family_id = db.seed_family("Durand").await.unwrap();
        let repository = InvitationRepository::new(db);

        let stored = repository
            .store_invitation(&NewInvitation {
                family_id,
                email: "kid@example.org".to_string(),
                token: "abc123".to_string(),
                created_at: now(),
            })
            .await
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Pending);

        let pending = repository.find_pending_invitation("abc123").await.unwrap().unwrap();
        assert_eq!(pending, stored);

        assert!(repository.mark_accepted(stored.id, now()).await.unwrap());
        assert!(!repository.mark_accepted(stored.id, now()).await.unwrap());
        assert!(repository.find_pending_invitation("abc123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let db = DbConnection::init_test().await.unwrap();
        let repository = InvitationRepository::new(db);

        assert!(repository.find_pending_invitation("nope").await.unwrap().is_none());
    }
}
