use anyhow::Result;
use async_trait::async_trait;
use sqlx::Row;

use crate::backend::domain::models::family::Family;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::FamilyStorage;

/// Repository for families and their members
#[derive(Clone)]
pub struct FamilyRepository {
    db: DbConnection,
}

impl FamilyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    async fn member_ids(&self, family_id: i64) -> Result<Vec<i64>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id
            FROM family_members
            WHERE family_id = ?
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(|row| row.get("user_id")).collect())
    }
}

#[async_trait]
impl FamilyStorage for FamilyRepository {
    /// Insert the family and its owner membership in one transaction
    async fn create_family(&self, name: &str, owner_id: i64) -> Result<Family> {
        let mut tx = self.db.pool().begin().await?;

        let family_id = sqlx::query("INSERT INTO families (name, owner_id) VALUES (?, ?)")
            .bind(name)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        sqlx::query("INSERT INTO family_members (family_id, user_id) VALUES (?, ?)")
            .bind(family_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Family {
            id: family_id,
            name: name.to_string(),
            owner_id: Some(owner_id),
            member_ids: vec![owner_id],
        })
    }

    async fn get_family(&self, family_id: i64) -> Result<Option<Family>> {
        let row = sqlx::query("SELECT id, name, owner_id FROM families WHERE id = ?")
            .bind(family_id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => Ok(Some(Family {
                id: r.get("id"),
                name: r.get("name"),
                owner_id: r.get("owner_id"),
                member_ids: self.member_ids(family_id).await?,
            })),
            None => Ok(None),
        }
    }

    async fn list_families_for_user(&self, user_id: i64) -> Result<Vec<Family>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.name, f.owner_id
            FROM families f
            JOIN family_members m ON m.family_id = f.id
            WHERE m.user_id = ?
            ORDER BY f.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        let mut families = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.get("id");
            families.push(Family {
                id,
                name: row.get("name"),
                owner_id: row.get("owner_id"),
                member_ids: self.member_ids(id).await?,
            });
        }
        Ok(families)
    }

    async fn add_member(&self, family_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("INSERT OR IGNORE INTO family_members (family_id, user_id) VALUES (?, ?)")
            .bind(family_id)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_family(&self, family_id: i64) -> Result<bool> {
        // Foreign keys cascade to members, events, patterns, overrides and invitations
        let result = sqlx::query("DELETE FROM families WHERE id = ?")
            .bind(family_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_owner(&self, family_id: i64, owner_id: i64) -> Result<bool> {
        let result = sqlx::query("UPDATE families SET owner_id = ? WHERE id = ?")
            .bind(owner_id)
            .bind(family_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
