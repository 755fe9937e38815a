use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;

use crate::backend::domain::dates::{format_date, format_date_time, parse_date_time, DateWindow};
use crate::backend::domain::models::event::{Event, EventOrigin, NewEvent, Recurrence};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::EventStorage;

const EVENT_COLUMNS: &str =
    "id, family_id, created_by, title, description, start_at, end_at, recurrence, origin";

/// Repository for calendar events
#[derive(Clone)]
pub struct EventRepository {
    db: DbConnection,
}

impl EventRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn event_from_row(row: &SqliteRow) -> Result<Event> {
        let start_at: String = row.try_get("start_at")?;
        let end_at: Option<String> = row.try_get("end_at")?;
        let recurrence: String = row.try_get("recurrence")?;
        let origin: String = row.try_get("origin")?;

        Ok(Event {
            id: row.try_get("id")?,
            family_id: row.try_get("family_id")?,
            created_by: row.try_get("created_by")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            start_at: parse_date_time(&start_at)?,
            end_at: end_at.as_deref().map(parse_date_time).transpose()?,
            recurrence: Recurrence::from_string(&recurrence).map_err(|e| anyhow!(e))?,
            origin: EventOrigin::from_string(&origin).map_err(|e| anyhow!(e))?,
        })
    }

    /// Decode rows, dropping the ones that no longer parse
    fn decode_rows(rows: &[SqliteRow]) -> Vec<Event> {
        rows.iter()
            .filter_map(|row| match Self::event_from_row(row) {
                Ok(event) => Some(event),
                Err(e) => {
                    let id: Option<i64> = row.try_get("id").ok();
                    warn!("Skipping undecodable event row {:?}: {}", id, e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl EventStorage for EventRepository {
    async fn store_event(&self, event: &NewEvent) -> Result<Event> {
        let result = sqlx::query(
            r#"
            INSERT INTO events (family_id, created_by, title, description, start_at, end_at, recurrence, origin)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.family_id)
        .bind(event.created_by)
        .bind(&event.title)
        .bind(&event.description)
        .bind(format_date_time(event.start_at))
        .bind(event.end_at.map(format_date_time))
        .bind(event.recurrence.as_str())
        .bind(event.origin.as_str())
        .execute(self.db.pool())
        .await?;

        Ok(event.clone().into_event(result.last_insert_rowid()))
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS))
            .bind(event_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::event_from_row).transpose()
    }

    async fn delete_event(&self, event_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_visible_events(&self, family_id: i64, window: DateWindow) -> Result<Vec<Event>> {
        // start_at is stored as ISO text with whole seconds, so string order is date order
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM events
            WHERE family_id = ?
              AND (recurrence != 'none' OR (start_at >= ? AND start_at <= ?))
            ORDER BY start_at ASC, id ASC
            "#,
            EVENT_COLUMNS
        ))
        .bind(family_id)
        .bind(format_date(window.start))
        .bind(format!("{}T23:59:59", format_date(window.end)))
        .fetch_all(self.db.pool())
        .await?;

        Ok(Self::decode_rows(&rows))
    }

    async fn find_birthday_event(&self, family_id: i64, user_id: i64) -> Result<Option<Event>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM events WHERE family_id = ? AND created_by = ? AND origin = 'birthday'",
            EVENT_COLUMNS
        ))
        .bind(family_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::event_from_row).transpose()
    }

    async fn upsert_birthday_event(
        &self,
        family_id: i64,
        user_id: i64,
        title: &str,
        start_at: NaiveDateTime,
    ) -> Result<Event> {
        sqlx::query(
            r#"
            INSERT INTO events (family_id, created_by, title, start_at, recurrence, origin)
            VALUES (?, ?, ?, ?, 'yearly', 'birthday')
            ON CONFLICT (family_id, created_by) WHERE origin = 'birthday'
            DO UPDATE SET title = excluded.title, start_at = excluded.start_at
            "#,
        )
        .bind(family_id)
        .bind(user_id)
        .bind(title)
        .bind(format_date_time(start_at))
        .execute(self.db.pool())
        .await?;

        self.find_birthday_event(family_id, user_id)
            .await?
            .ok_or_else(|| anyhow!("Birthday event of user {} vanished from family {}", user_id, family_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn new_event(family_id: i64, title: &str, start_at: NaiveDateTime, recurrence: Recurrence) -> NewEvent {
        NewEvent {
            family_id,
            created_by: None,
            title: title.to_string(),
            description: Some("notes".to_string()),
            start_at,
            end_at: None,
            recurrence,
            origin: EventOrigin::Manual,
        }
    }

    async fn setup_test() -> (EventRepository, DbConnection, i64) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let family_id = db.seed_family("Martin").await.unwrap();
        (EventRepository::new(db.clone()), db, family_id)
    }

    fn june_2025() -> DateWindow {
        DateWindow::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_store_get_and_delete_event() {
        let (repo, _db, family_id) = setup_test().await;

        let stored = repo
            .store_event(&new_event(family_id, "Dentist", at(2025, 6, 10, 9), Recurrence::None))
            .await
            .unwrap();
        assert_eq!(repo.get_event(stored.id).await.unwrap(), Some(stored.clone()));

        assert!(repo.delete_event(stored.id).await.unwrap());
        assert!(!repo.delete_event(stored.id).await.unwrap());
        assert!(repo.get_event(stored.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_visible_events_include_window_bounds_and_recurring() {
        let (repo, _db, family_id) = setup_test().await;
        let first = repo
            .store_event(&new_event(family_id, "First", at(2025, 6, 1, 0), Recurrence::None))
            .await
            .unwrap();
        let last = repo
            .store_event(&new_event(family_id, "Last", at(2025, 6, 30, 23), Recurrence::None))
            .await
            .unwrap();
        repo.store_event(&new_event(family_id, "July", at(2025, 7, 1, 0), Recurrence::None))
            .await
            .unwrap();
        let weekly = repo
            .store_event(&new_event(family_id, "Training", at(2020, 1, 7, 19), Recurrence::Weekly))
            .await
            .unwrap();

        let ids: Vec<i64> = repo
            .list_visible_events(family_id, june_2025())
            .await
            .unwrap()
            .iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec![weekly.id, first.id, last.id]);
    }

    #[tokio::test]
    async fn test_visible_events_are_scoped_to_family() {
        let (repo, db, family_id) = setup_test().await;
        let other_family = db.seed_family("Durand").await.unwrap();
        repo.store_event(&new_event(other_family, "Other", at(2025, 6, 5, 10), Recurrence::None))
            .await
            .unwrap();

        assert!(repo.list_visible_events(family_id, june_2025()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let (repo, db, family_id) = setup_test().await;
        repo.store_event(&new_event(family_id, "Good", at(2025, 6, 5, 10), Recurrence::None))
            .await
            .unwrap();
        sqlx::query("INSERT INTO events (family_id, title, start_at, recurrence) VALUES (?, 'Bad', '2025-06-07T10:00:00', 'fortnightly')")
            .bind(family_id)
            .execute(db.pool())
            .await
            .unwrap();

        let events = repo.list_visible_events(family_id, june_2025()).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Good");
    }

    #[tokio::test]
    async fn test_birthday_upsert_keeps_a_single_row() {
        let (repo, db, family_id) = setup_test().await;
        let user_id = sqlx::query("INSERT INTO users (email, first_name, last_name) VALUES ('lea@example.org', 'Lea', 'Martin')")
            .execute(db.pool())
            .await
            .unwrap()
            .last_insert_rowid();

        let created = repo
            .upsert_birthday_event(family_id, user_id, "Birthday of Lea MARTIN", at(1990, 6, 15, 0))
            .await
            .unwrap();
        let updated = repo
            .upsert_birthday_event(family_id, user_id, "Birthday of Lea DURAND", at(1990, 6, 16, 0))
            .await
            .unwrap();

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.title, "Birthday of Lea DURAND");
        assert_eq!(updated.recurrence, Recurrence::Yearly);
        assert_eq!(updated.origin, EventOrigin::Birthday);
        assert_eq!(repo.find_birthday_event(family_id, user_id).await.unwrap(), Some(updated));

        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM events")
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("n");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_manual_events_do_not_collide_with_birthdays() {
        let (repo, db, family_id) = setup_test().await;
        let user_id = sqlx::query("INSERT INTO users (email, first_name, last_name) VALUES ('sam@example.org', 'Sam', 'Martin')")
            .execute(db.pool())
            .await
            .unwrap()
            .last_insert_rowid();
        let mut manual = new_event(family_id, "Party", at(2025, 6, 15, 18), Recurrence::Yearly);
        manual.created_by = Some(user_id);

        repo.store_event(&manual).await.unwrap();
        repo.store_event(&manual).await.unwrap();
        repo.upsert_birthday_event(family_id, user_id, "Birthday of Sam MARTIN", at(2001, 6, 15, 0))
            .await
            .unwrap();

        let events = repo.list_visible_events(family_id, june_2025()).await.unwrap();
        assert_eq!(events.len(), 3);
    }
}
