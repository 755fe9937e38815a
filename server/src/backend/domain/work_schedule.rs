//! Work schedule resolution.
//!
//! A work pattern is a cycle of shift codes anchored at its start date (day 0).
//! The effective shift of a day is the cycle entry at the signed day offset
//! modulo the cycle length, unless an override exists for that exact
//! (pattern, date) pair.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::backend::domain::access::{can_manage, can_view};
use crate::backend::domain::commands::work::{CreateWorkPatternCommand, UpsertWorkOverrideCommand, WorkGridRange};
use crate::backend::domain::dates::{days_between, parse_date, week_aligned, DateWindow, YearMonth};
use crate::backend::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::backend::domain::models::family::Family;
use crate::backend::domain::models::user::User;
use crate::backend::domain::models::work_pattern::{
    NewWorkPattern, ShiftCode, WorkOverride, WorkPattern, MAX_CYCLE_LENGTH, MIN_CYCLE_LENGTH,
};
use crate::backend::storage::traits::{FamilyStorage, WorkScheduleStorage};

/// Longest explicit range a work grid may cover
pub const MAX_GRID_DAYS: i64 = 366;

/// Overrides keyed by (pattern id, date)
pub type OverrideMap = HashMap<(i64, NaiveDate), ShiftCode>;

/// Effective shift code of `pattern` on `date`
pub fn resolve_day(pattern: &WorkPattern, date: NaiveDate, overrides: &OverrideMap) -> ShiftCode {
    if let Some(value) = overrides.get(&(pattern.id, date)) {
        return *value;
    }

    let len = if pattern.cycle_length >= 1 {
        i64::from(pattern.cycle_length)
    } else {
        pattern.pattern.len().max(1) as i64
    };
    let index = days_between(pattern.start_date, date).rem_euclid(len) as usize;

    pattern
        .pattern
        .get(index)
        .map(|value| ShiftCode::clamped(i64::from(*value)))
        .unwrap_or_default()
}

/// Clamp the cycle length and day values of a new pattern.
///
/// Extra values are dropped; fewer values than the clamped cycle length is an
/// error, so a stored pattern always has exactly `cycle_length` entries.
pub fn normalize_pattern(cycle_length: i64, day_values: &[i64]) -> Result<(u32, Vec<u8>), ValidationError> {
    let cycle_length = cycle_length.clamp(i64::from(MIN_CYCLE_LENGTH), i64::from(MAX_CYCLE_LENGTH)) as usize;

    if day_values.len() < cycle_length {
        return Err(ValidationError::PatternLengthMismatch {
            expected: cycle_length,
            actual: day_values.len(),
        });
    }

    let values = day_values[..cycle_length]
        .iter()
        .map(|value| ShiftCode::clamped(*value).value())
        .collect();
    Ok((cycle_length as u32, values))
}

/// Effective shift of one pattern on one day
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedShift {
    pub pattern_id: i64,
    pub owner_id: i64,
    pub value: ShiftCode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkGridDay {
    pub date: NaiveDate,
    /// One entry per pattern of the family, in pattern order
    pub shifts: Vec<ResolvedShift>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkGrid {
    pub family_id: i64,
    pub window: DateWindow,
    pub days: Vec<WorkGridDay>,
}

/// Service for work patterns, overrides and the work grid
#[derive(Clone)]
pub struct WorkScheduleService {
    schedule_storage: Arc<dyn WorkScheduleStorage>,
    family_storage: Arc<dyn FamilyStorage>,
}

impl WorkScheduleService {
    pub fn new(schedule_storage: Arc<dyn WorkScheduleStorage>, family_storage: Arc<dyn FamilyStorage>) -> Self {
        Self {
            schedule_storage,
            family_storage,
        }
    }

    /// Create a pattern owned by the caller in one of their families
    pub async fn create_pattern(
        &self,
        caller: &User,
        family: &Family,
        command: CreateWorkPatternCommand,
    ) -> DomainResult<WorkPattern> {
        info!(
            "Creating work pattern for user {} in family {} (cycle {})",
            caller.id, family.id, command.cycle_length
        );

        if !family.has_member(caller.id) {
            return Err(DomainError::AccessDenied(format!(
                "user {} is not a member of family {}",
                caller.id, family.id
            )));
        }

        let start_date = parse_date(&command.start_date)?;
        let (cycle_length, pattern) = normalize_pattern(command.cycle_length, &command.day_values)?;

        let stored = self
            .schedule_storage
            .store_pattern(&NewWorkPattern {
                family_id: family.id,
                owner_id: caller.id,
                cycle_length,
                start_date,
                pattern,
            })
            .await?;

        info!("Created work pattern {} for user {}", stored.id, caller.id);
        Ok(stored)
    }

    pub async fn list_patterns(&self, family: &Family) -> DomainResult<Vec<WorkPattern>> {
        let patterns = self.schedule_storage.list_patterns(family.id).await?;
        info!("Found {} work patterns in family {}", patterns.len(), family.id);
        Ok(patterns)
    }

    /// Delete a pattern and, through the store, its overrides
    pub async fn delete_pattern(&self, caller: &User, pattern_id: i64) -> DomainResult<()> {
        info!("Deleting work pattern {} for user {}", pattern_id, caller.id);

        let pattern = self.manageable_pattern(caller, pattern_id).await?;
        if !self.schedule_storage.delete_pattern(pattern.id).await? {
            return Err(DomainError::NotFound(format!("Work pattern {}", pattern_id)));
        }

        info!("Deleted work pattern {}", pattern_id);
        Ok(())
    }

    /// Insert or replace the shift of a pattern on one date.
    /// The value is clamped to the shift code range before storage.
    pub async fn upsert_override(
        &self,
        caller: &User,
        command: UpsertWorkOverrideCommand,
    ) -> DomainResult<WorkOverride> {
        info!(
            "Setting work override for pattern {} on {} to {}",
            command.pattern_id, command.date, command.value
        );

        // Validate before touching the store so a bad date writes nothing
        let date = parse_date(&command.date)?;
        let pattern = self.manageable_pattern(caller, command.pattern_id).await?;

        let work_override = WorkOverride {
            pattern_id: pattern.id,
            date,
            value: ShiftCode::clamped(command.value),
        };
        self.schedule_storage.upsert_override(&work_override).await?;

        Ok(work_override)
    }

    /// Effective shifts of every family pattern on every day of the range
    pub async fn work_grid(&self, family: &Family, range: WorkGridRange) -> DomainResult<WorkGrid> {
        let window = grid_window(range)?;
        info!(
            "Generating work grid for family {} ({}..{})",
            family.id, window.start, window.end
        );

        let patterns = self.schedule_storage.list_patterns(family.id).await?;
        let pattern_ids: Vec<i64> = patterns.iter().map(|p| p.id).collect();
        let overrides: OverrideMap = self
            .schedule_storage
            .list_overrides(&pattern_ids, window)
            .await?
            .into_iter()
            .map(|o| ((o.pattern_id, o.date), o.value))
            .collect();

        let days = window
            .days()
            .map(|date| WorkGridDay {
                date,
                shifts: patterns
                    .iter()
                    .map(|pattern| ResolvedShift {
                        pattern_id: pattern.id,
                        owner_id: pattern.owner_id,
                        value: resolve_day(pattern, date, &overrides),
                    })
                    .collect(),
            })
            .collect();

        Ok(WorkGrid {
            family_id: family.id,
            window,
            days,
        })
    }

    /// Load a pattern the caller is allowed to change
    async fn manageable_pattern(&self, caller: &User, pattern_id: i64) -> DomainResult<WorkPattern> {
        let pattern = self
            .schedule_storage
            .get_pattern(pattern_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Work pattern {}", pattern_id)))?;

        let family = self
            .family_storage
            .get_family(pattern.family_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Family {}", pattern.family_id)))?;

        if !can_manage(caller, &family, Some(pattern.owner_id)) {
            warn!("User {} may not change work pattern {}", caller.id, pattern_id);
            let reason = if can_view(caller, &family) {
                format!("work pattern {} belongs to another member", pattern_id)
            } else {
                format!("user {} is not a member of family {}", caller.id, family.id)
            };
            return Err(DomainError::AccessDenied(reason));
        }
        Ok(pattern)
    }
}

/// Days covered by a work grid request
fn grid_window(range: WorkGridRange) -> DomainResult<DateWindow> {
    match range {
        WorkGridRange::Dates { start, end } => {
            let window = DateWindow::new(parse_date(&start)?, parse_date(&end)?);
            if window.len_days() > MAX_GRID_DAYS {
                return Err(ValidationError::RangeTooLong(MAX_GRID_DAYS).into());
            }
            Ok(window)
        }
        WorkGridRange::Month(month) => {
            let invalid = || ValidationError::InvalidDate(format!("{}-{:02}", month.year, month.month));
            let bounds = month.window().ok_or_else(invalid)?;
            Ok(week_aligned(bounds.start, bounds.end).ok_or_else(invalid)?)
        }
    }
}

/// Grid range of the current month
pub fn current_month() -> WorkGridRange {
    WorkGridRange::Month(YearMonth::of(Local::now().date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::user::NewUser;
    use crate::backend::storage::traits::UserStorage;
    use crate::backend::storage::{DbConnection, FamilyRepository, UserRepository, WorkScheduleRepository};
    use chrono::{Datelike, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pattern(id: i64, cycle_length: u32, start: NaiveDate, values: &[u8]) -> WorkPattern {
        WorkPattern {
            id,
            family_id: 1,
            owner_id: 1,
            cycle_length,
            start_date: start,
            pattern: values.to_vec(),
        }
    }

    #[test]
    fn test_resolve_day_cycles_in_both_directions() {
        let anchor = date(2025, 3, 3);
        let week = pattern(1, 7, anchor, &[0, 1, 2, 3, 0, 1, 2]);
        let none = OverrideMap::new();

        assert_eq!(resolve_day(&week, anchor, &none), ShiftCode::Rest);
        assert_eq!(resolve_day(&week, date(2025, 3, 10), &none), ShiftCode::Rest);
        assert_eq!(resolve_day(&week, date(2025, 2, 24), &none), ShiftCode::Rest);
        assert_eq!(resolve_day(&week, date(2025, 3, 4), &none), ShiftCode::Morning);
        assert_eq!(resolve_day(&week, date(2025, 3, 6), &none), ShiftCode::Night);
    }

    #[test]
    fn test_resolve_day_three_day_cycle_before_anchor() {
        let short = pattern(1, 3, date(2025, 1, 1), &[1, 2, 0]);
        let none = OverrideMap::new();

        let resolved: Vec<u8> = [date(2025, 1, 1), date(2025, 1, 2), date(2025, 1, 3), date(2025, 1, 4), date(2024, 12, 31)]
            .iter()
            .map(|d| resolve_day(&short, *d, &none).value())
            .collect();

        assert_eq!(resolved, vec![1, 2, 0, 1, 0]);
    }

    #[test]
    fn test_override_takes_precedence() {
        let week = pattern(7, 7, date(2025, 3, 3), &[0, 1, 2, 3, 0, 1, 2]);
        let target = date(2025, 3, 4);
        let mut overrides = OverrideMap::new();
        overrides.insert((7, target), ShiftCode::Holiday);
        // Overrides of other patterns do not leak
        overrides.insert((8, date(2025, 3, 5)), ShiftCode::Travel);

        assert_eq!(resolve_day(&week, target, &overrides), ShiftCode::Holiday);
        assert_eq!(resolve_day(&week, date(2025, 3, 5), &overrides), ShiftCode::Afternoon);
    }

    #[test]
    fn test_resolve_day_is_idempotent() {
        let week = pattern(1, 7, date(2025, 3, 3), &[0, 1, 2, 3, 0, 1, 2]);
        let none = OverrideMap::new();
        for offset in -30..30 {
            let day = date(2025, 3, 3) + chrono::Duration::days(offset);
            assert_eq!(resolve_day(&week, day, &none), resolve_day(&week, day, &none));
        }
    }

    #[test]
    fn test_resolve_day_tolerates_inconsistent_stored_patterns() {
        let none = OverrideMap::new();

        // Missing entries read as rest
        let short = pattern(1, 7, date(2025, 1, 1), &[3, 3]);
        assert_eq!(resolve_day(&short, date(2025, 1, 6), &none), ShiftCode::Rest);

        // A zero cycle falls back to the array length
        let zero = pattern(2, 0, date(2025, 1, 1), &[5, 6]);
        assert_eq!(resolve_day(&zero, date(2025, 1, 2), &none), ShiftCode::Remote);
        assert_eq!(resolve_day(&zero, date(2025, 1, 3), &none), ShiftCode::Day);

        // Out-of-range codes clamp to travel
        let wild = pattern(3, 1, date(2025, 1, 1), &[42]);
        assert_eq!(resolve_day(&wild, date(2025, 1, 9), &none), ShiftCode::Travel);
    }

    #[test]
    fn test_normalize_pattern_clamps_and_truncates() {
        assert_eq!(
            normalize_pattern(3, &[1, 2, 0, 9, -1, 3, 4, 5]),
            Ok((7, vec![1, 2, 0, 7, 0, 3, 4]))
        );
        let (length, values) = normalize_pattern(40, &[1; 25]).unwrap();
        assert_eq!(length, 21);
        assert_eq!(values.len(), 21);
    }

    #[test]
    fn test_normalize_pattern_rejects_too_few_values() {
        assert_eq!(
            normalize_pattern(10, &[1, 2, 3]),
            Err(ValidationError::PatternLengthMismatch { expected: 10, actual: 3 })
        );
    }

    #[test]
    fn test_month_range_is_week_aligned() {
        let window = grid_window(WorkGridRange::Month(YearMonth::clamped(2025, 6))).unwrap();
        assert_eq!(window.start.weekday(), Weekday::Mon);
        assert_eq!(window.end.weekday(), Weekday::Sun);
        assert_eq!(window.start, date(2025, 5, 26));
        assert_eq!(window.end, date(2025, 7, 6));
    }

    #[test]
    fn test_explicit_range_is_capped() {
        let year = grid_window(WorkGridRange::Dates {
            start: "2024-01-01".to_string(),
            end: "2024-12-31".to_string(),
        })
        .unwrap();
        assert_eq!(year.len_days(), MAX_GRID_DAYS);

        let result = grid_window(WorkGridRange::Dates {
            start: "0001-01-01".to_string(),
            end: "9999-12-31".to_string(),
        });
        assert!(matches!(
            result,
            Err(DomainError::Validation(ValidationError::RangeTooLong(MAX_GRID_DAYS)))
        ));
    }

    #[test]
    fn test_month_range_at_the_end_of_the_calendar_does_not_panic() {
        for month in [
            YearMonth::clamped(NaiveDate::MAX.year(), 12),
            YearMonth::clamped(NaiveDate::MIN.year(), 1),
        ] {
            let result = grid_window(WorkGridRange::Month(month));
            assert!(matches!(result, Ok(_) | Err(DomainError::Validation(_))));
        }
    }

    struct Fixture {
        service: WorkScheduleService,
        owner: User,
        member: User,
        outsider: User,
        family: Family,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let users = UserRepository::new(db.clone());
        let families = FamilyRepository::new(db.clone());

        let mut people = Vec::new();
        for email in ["owner@example.org", "member@example.org", "outsider@example.org"] {
            people.push(
                users
                    .store_user(&NewUser {
                        email: email.to_string(),
                        first_name: "Test".to_string(),
                        last_name: "User".to_string(),
                        birth_date: None,
                        is_admin: false,
                    })
                    .await
                    .unwrap(),
            );
        }
        let outsider = people.pop().unwrap();
        let member = people.pop().unwrap();
        let owner = people.pop().unwrap();

        let family = families.create_family("Martin", owner.id).await.unwrap();
        families.add_member(family.id, member.id).await.unwrap();
        let family = families.get_family(family.id).await.unwrap().unwrap();

        Fixture {
            service: WorkScheduleService::new(Arc::new(WorkScheduleRepository::new(db)), Arc::new(families)),
            owner,
            member,
            outsider,
            family,
        }
    }

    fn weekly_command(family_id: i64) -> CreateWorkPatternCommand {
        CreateWorkPatternCommand {
            family_id,
            cycle_length: 7,
            start_date: "2025-01-06".to_string(),
            day_values: vec![1, 1, 2, 2, 3, 0, 0],
        }
    }

    #[tokio::test]
    async fn test_create_pattern_is_owned_by_caller() {
        let fx = setup_test().await;

        let created = fx
            .service
            .create_pattern(&fx.member, &fx.family, weekly_command(fx.family.id))
            .await
            .unwrap();

        assert_eq!(created.owner_id, fx.member.id);
        assert_eq!(created.cycle_length as usize, created.pattern.len());
        assert_eq!(fx.service.list_patterns(&fx.family).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_pattern_rejects_bad_input() {
        let fx = setup_test().await;

        let mut bad_date = weekly_command(fx.family.id);
        bad_date.start_date = "2025-13-01".to_string();
        assert!(matches!(
            fx.service.create_pattern(&fx.member, &fx.family, bad_date).await,
            Err(DomainError::Validation(ValidationError::InvalidDate(_)))
        ));

        let mut short = weekly_command(fx.family.id);
        short.day_values.truncate(3);
        assert!(matches!(
            fx.service.create_pattern(&fx.member, &fx.family, short).await,
            Err(DomainError::Validation(ValidationError::PatternLengthMismatch { .. }))
        ));

        assert!(matches!(
            fx.service.create_pattern(&fx.outsider, &fx.family, weekly_command(fx.family.id)).await,
            Err(DomainError::AccessDenied(_))
        ));
        assert!(fx.service.list_patterns(&fx.family).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_work_grid_applies_overrides() {
        let fx = setup_test().await;
        let created = fx
            .service
            .create_pattern(&fx.member, &fx.family, weekly_command(fx.family.id))
            .await
            .unwrap();

        let saved = fx
            .service
            .upsert_override(
                &fx.member,
                UpsertWorkOverrideCommand {
                    pattern_id: created.id,
                    date: "2025-01-08".to_string(),
                    value: 12,
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.value, ShiftCode::Travel);

        let grid = fx
            .service
            .work_grid(
                &fx.family,
                WorkGridRange::Dates {
                    start: "2025-01-06".to_string(),
                    end: "2025-01-12".to_string(),
                },
            )
            .await
            .unwrap();

        let values: Vec<u8> = grid.days.iter().map(|d| d.shifts[0].value.value()).collect();
        assert_eq!(values, vec![1, 1, 7, 2, 3, 0, 0]);
        assert!(grid.days.iter().all(|d| d.shifts[0].owner_id == fx.member.id));
    }

    #[tokio::test]
    async fn test_work_grid_without_patterns_has_empty_days() {
        let fx = setup_test().await;

        let grid = fx
            .service
            .work_grid(&fx.family, WorkGridRange::Month(YearMonth::clamped(2025, 2)))
            .await
            .unwrap();

        assert_eq!(grid.days.len() % 7, 0);
        assert!(grid.days.iter().all(|d| d.shifts.is_empty()));
    }

    #[tokio::test]
    async fn test_override_permissions() {
        let fx = setup_test().await;
        let created = fx
            .service
            .create_pattern(&fx.member, &fx.family, weekly_command(fx.family.id))
            .await
            .unwrap();
        let command = |value| UpsertWorkOverrideCommand {
            pattern_id: created.id,
            date: "2025-01-10".to_string(),
            value,
        };

        // Family owner may edit a member's pattern, outsiders may not
        assert!(fx.service.upsert_override(&fx.owner, command(4)).await.is_ok());
        assert!(matches!(
            fx.service.upsert_override(&fx.outsider, command(5)).await,
            Err(DomainError::AccessDenied(_))
        ));
        assert!(matches!(
            fx.service
                .upsert_override(
                    &fx.owner,
                    UpsertWorkOverrideCommand {
                        pattern_id: 999,
                        date: "2025-01-10".to_string(),
                        value: 1
                    }
                )
                .await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            fx.service
                .upsert_override(
                    &fx.owner,
                    UpsertWorkOverrideCommand {
                        pattern_id: created.id,
                        date: "tomorrow".to_string(),
                        value: 1
                    }
                )
                .await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_pattern_permissions() {
        let fx = setup_test().await;
        let created = fx
            .service
            .create_pattern(&fx.owner, &fx.family, weekly_command(fx.family.id))
            .await
            .unwrap();

        assert!(matches!(
            fx.service.delete_pattern(&fx.member, created.id).await,
            Err(DomainError::AccessDenied(_))
        ));
        fx.service.delete_pattern(&fx.owner, created.id).await.unwrap();
        assert!(matches!(
            fx.service.delete_pattern(&fx.owner, created.id).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
