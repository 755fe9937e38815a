use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::warn;

use crate::backend::domain::dates::{format_date, parse_date, DateWindow};
use crate::backend::domain::models::work_pattern::{NewWorkPattern, ShiftCode, WorkOverride, WorkPattern};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::WorkScheduleStorage;

/// Repository for work patterns and per-day overrides.
///
/// Day values are stored as a JSON array in the `pattern` column.
#[derive(Clone)]
pub struct WorkScheduleRepository {
    db: DbConnection,
}

impl WorkScheduleRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn pattern_from_row(row: &SqliteRow) -> Result<WorkPattern> {
        let start_date: String = row.try_get("start_date")?;
        let raw_pattern: String = row.try_get("pattern")?;
        let cycle_length: i64 = row.try_get("cycle_length")?;
        let values: Vec<i64> = serde_json::from_str(&raw_pattern)?;

        Ok(WorkPattern {
            id: row.try_get("id")?,
            family_id: row.try_get("family_id")?,
            owner_id: row.try_get("owner_id")?,
            cycle_length: u32::try_from(cycle_length.max(0))?,
            start_date: parse_date(&start_date)?,
            pattern: values.into_iter().map(|v| ShiftCode::clamped(v).value()).collect(),
        })
    }
}

#[async_trait]
impl WorkScheduleStorage for WorkScheduleRepository {
    async fn store_pattern(&self, pattern: &NewWorkPattern) -> Result<WorkPattern> {
        let result = sqlx::query(
            r#"
            INSERT INTO work_patterns (family_id, owner_id, cycle_length, start_date, pattern)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(pattern.family_id)
        .bind(pattern.owner_id)
        .bind(pattern.cycle_length)
        .bind(format_date(pattern.start_date))
        .bind(serde_json::to_string(&pattern.pattern)?)
        .execute(self.db.pool())
        .await?;

        Ok(pattern.clone().into_pattern(result.last_insert_rowid()))
    }

    async fn get_pattern(&self, pattern_id: i64) -> Result<Option<WorkPattern>> {
        let row = sqlx::query(
            r#"
            SELECT id, family_id, owner_id, cycle_length, start_date, pattern
            FROM work_patterns
            WHERE id = ?
            "#,
        )
        .bind(pattern_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::pattern_from_row).transpose()
    }

    async fn list_patterns(&self, family_id: i64) -> Result<Vec<WorkPattern>> {
        let rows = sqlx::query(
            r#"
            SELECT id, family_id, owner_id, cycle_length, start_date, pattern
            FROM work_patterns
            WHERE family_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(family_id)
        .fetch_all(self.db.pool())
        .await?;

        let patterns = rows
            .iter()
            .filter_map(|row| match Self::pattern_from_row(row) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Skipping undecodable work pattern row: {}", e);
                    None
                }
            })
            .collect();
        Ok(patterns)
    }

    async fn delete_pattern(&self, pattern_id: i64) -> Result<bool> {
        // Overrides go with the pattern through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM work_patterns WHERE id = ?")
            .bind(pattern_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_overrides(&self, pattern_ids: &[i64], window: DateWindow) -> Result<Vec<WorkOverride>> {
        if pattern_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT pattern_id, date, value FROM work_overrides WHERE date >= ");
        builder
            .push_bind(format_date(window.start))
            .push(" AND date <= ")
            .push_bind(format_date(window.end))
            .push(" AND pattern_id IN (");
        let mut ids = builder.separated(", ");
        for id in pattern_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY date ASC, pattern_id ASC");

        let rows = builder.build().fetch_all(self.db.pool()).await?;

        let mut overrides = Vec::with_capacity(rows.len());
        for row in &rows {
            let date: String = row.get("date");
            let value: i64 = row.get("value");
            match parse_date(&date) {
                Ok(date) => overrides.push(WorkOverride {
                    pattern_id: row.get("pattern_id"),
                    date,
                    value: ShiftCode::clamped(value),
                }),
                Err(e) => warn!("Skipping work override with bad date: {}", e),
            }
        }
        Ok(overrides)
    }

    async fn upsert_override(&self, work_override: &WorkOverride) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO work_overrides (pattern_id, date, value)
            VALUES (?, ?, ?)
            ON CONFLICT (pattern_id, date) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(work_override.pattern_id)
        .bind(format_date(work_override.date))
        .bind(i64::from(work_override.value.value()))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
