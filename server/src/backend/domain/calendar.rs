//! Calendar domain logic for TribuConnect.
//!
//! This module builds the month grid (Monday-first weeks, lead and trail
//! days included) and the twelve-month year overview of a family. Recurring
//! events are materialized by the [`RecurrenceExpander`]; the UI only
//! renders the cells it receives.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, Local, NaiveDate};
use tracing::info;

use crate::backend::domain::dates::{week_aligned, DateWindow, YearMonth};
use crate::backend::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::backend::domain::models::event::Event;
use crate::backend::domain::models::family::Family;
use crate::backend::domain::recurrence::{Occurrence, OccurrencesByDay, RecurrenceExpander};
use crate::backend::storage::traits::EventStorage;

/// A single cell of the month grid
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    /// False for lead/trail days of the adjacent months
    pub in_month: bool,
    pub occurrences: Vec<Occurrence>,
}

/// Seven consecutive days, Monday to Sunday
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarWeek {
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth {
    pub family_id: i64,
    pub month: YearMonth,
    pub weeks: Vec<CalendarWeek>,
}

/// Events of each month of a year, January first
#[derive(Debug, Clone, PartialEq)]
pub struct YearOverview {
    pub family_id: i64,
    pub year: i32,
    pub months: Vec<(u32, Vec<Event>)>,
}

impl YearOverview {
    pub fn events_in(&self, month: u32) -> &[Event] {
        self.months
            .iter()
            .find(|(m, _)| *m == month)
            .map(|(_, events)| events.as_slice())
            .unwrap_or(&[])
    }
}

/// Calendar service that handles all calendar-related business logic
#[derive(Clone)]
pub struct CalendarService {
    event_storage: Arc<dyn EventStorage>,
    expander: RecurrenceExpander,
}

impl CalendarService {
    pub fn new(event_storage: Arc<dyn EventStorage>) -> Self {
        Self {
            event_storage,
            expander: RecurrenceExpander::new(),
        }
    }

    /// Extend a month to whole weeks: back to the Monday on or before
    /// `month_start`, forward to the Sunday on or after `month_end`.
    pub fn grid_bounds(&self, month_start: NaiveDate, month_end: NaiveDate) -> DomainResult<DateWindow> {
        week_aligned(month_start, month_end).ok_or_else(|| {
            ValidationError::InvalidDate(format!("grid around {}..{}", month_start, month_end)).into()
        })
    }

    /// Lay out the grid for a month and drop each day's occurrences into its cell
    pub fn build_grid(
        &self,
        month_start: NaiveDate,
        month_end: NaiveDate,
        occurrences: &OccurrencesByDay,
    ) -> DomainResult<Vec<CalendarWeek>> {
        let displayed = YearMonth::of(month_start);
        let bounds = self.grid_bounds(month_start, month_end)?;

        let cells: Vec<CalendarDay> = bounds
            .days()
            .map(|date| CalendarDay {
                date,
                in_month: displayed.contains(date),
                occurrences: occurrences.on(date).to_vec(),
            })
            .collect();

        Ok(cells
            .chunks(7)
            .map(|chunk| CalendarWeek {
                days: chunk.to_vec(),
            })
            .collect())
    }

    /// Month view of a family calendar.
    ///
    /// Missing year/month default to today; the month is clamped to 1..=12.
    pub async fn month_grid(
        &self,
        family: &Family,
        year: Option<i32>,
        month: Option<u32>,
    ) -> DomainResult<CalendarMonth> {
        let today = Local::now().date_naive();
        let displayed = YearMonth::clamped(year.unwrap_or(today.year()), month.unwrap_or(today.month()));
        info!(
            "Generating calendar grid for family {} ({}-{:02})",
            family.id, displayed.year, displayed.month
        );

        let month_window = displayed
            .window()
            .ok_or_else(|| invalid_year(displayed.year))?;
        let grid_window = self.grid_bounds(month_window.start, month_window.end)?;

        let events = self
            .event_storage
            .list_visible_events(family.id, grid_window)
            .await?;
        let occurrences = self.expander.expand(&events, grid_window, displayed);
        let weeks = self.build_grid(month_window.start, month_window.end, &occurrences)?;

        info!(
            "Calendar grid for family {} has {} weeks and {} occurrences",
            family.id,
            weeks.len(),
            occurrences.total()
        );

        Ok(CalendarMonth {
            family_id: family.id,
            month: displayed,
            weeks,
        })
    }

    /// Group already-fetched events by month of `year`. Each event is listed
    /// once per month it occurs in, in order of its first occurrence.
    pub fn group_by_month(&self, events: &[Event], year: i32) -> Vec<(u32, Vec<Event>)> {
        (1..=12)
            .map(|month| {
                let reference = YearMonth::clamped(year, month);
                let listed = match reference.window() {
                    Some(window) => {
                        let occurrences = self.expander.expand(events, window, reference);
                        distinct_in_day_order(&occurrences, window)
                    }
                    None => Vec::new(),
                };
                (month, listed)
            })
            .collect()
    }

    /// Twelve-month overview of a family calendar. Missing year defaults to today.
    pub async fn year_overview(&self, family: &Family, year: Option<i32>) -> DomainResult<YearOverview> {
        let year = year.unwrap_or_else(|| Local::now().year());
        info!("Generating year overview for family {} ({})", family.id, year);

        let (first, last) = match (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(invalid_year(year)),
        };

        let events = self
            .event_storage
            .list_visible_events(family.id, DateWindow::new(first, last))
            .await?;

        Ok(YearOverview {
            family_id: family.id,
            year,
            months: self.group_by_month(&events, year),
        })
    }
}

fn distinct_in_day_order(occurrences: &OccurrencesByDay, window: DateWindow) -> Vec<Event> {
    let mut seen = HashSet::new();
    let mut listed = Vec::new();
    for day in window.days() {
        for occurrence in occurrences.on(day) {
            if seen.insert(occurrence.event.id) {
                listed.push(occurrence.event.clone());
            }
        }
    }
    listed
}

fn invalid_year(year: i32) -> DomainError {
    DomainError::Validation(ValidationError::InvalidDate(format!("year {}", year)))
}
