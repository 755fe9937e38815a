//! Recurrence expansion.
//!
//! Turns stored events into the calendar-day occurrences visible in a window.
//! Expansion is pure: events come in already fetched from the record store
//! and nothing is written back.
//!
//! Rules per recurrence kind:
//! - `None`: its own date, only if inside the window
//! - `Yearly`: the source month/day in the reference year, always emitted
//! - `Monthly`: the source day in the reference month, clamped to the month length
//! - `Weekly`: every window day sharing the source ISO weekday
//!
//! All recurring occurrences keep the time-of-day of the source event.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::backend::domain::dates::{clamped_date, DateWindow, YearMonth};
use crate::backend::domain::models::event::{Event, Recurrence};

/// One materialization of an event on a calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub event: Event,
    pub at: NaiveDateTime,
}

/// Occurrences bucketed per day. Bucket order follows the input event order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OccurrencesByDay {
    buckets: HashMap<NaiveDate, Vec<Occurrence>>,
}

impl OccurrencesByDay {
    pub fn on(&self, date: NaiveDate) -> &[Occurrence] {
        self.buckets.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events of a day without their occurrence times
    pub fn events_on(&self, date: NaiveDate) -> Vec<Event> {
        self.on(date).iter().map(|o| o.event.clone()).collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    fn push(&mut self, occurrence: Occurrence) {
        self.buckets
            .entry(occurrence.at.date())
            .or_insert_with(Vec::new)
            .push(occurrence);
    }
}

/// Expands recurring events over a window
#[derive(Clone, Default)]
pub struct RecurrenceExpander;

impl RecurrenceExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expand `events` over `window`.
    ///
    /// `reference` is the month being displayed: yearly events land in its
    /// year and monthly events in its month, even when `window` also covers
    /// lead or trail days of the neighbouring months.
    pub fn expand(&self, events: &[Event], window: DateWindow, reference: YearMonth) -> OccurrencesByDay {
        let mut by_day = OccurrencesByDay::default();

        for event in events {
            for at in self.occurrences_of(event, window, reference) {
                by_day.push(Occurrence {
                    event: event.clone(),
                    at,
                });
            }
        }

        debug!(
            "Expanded {} events into {} occurrences over {}..{}",
            events.len(),
            by_day.total(),
            window.start,
            window.end
        );
        by_day
    }

    /// Occurrence times of a single event, in chronological order
    pub fn occurrences_of(&self, event: &Event, window: DateWindow, reference: YearMonth) -> Vec<NaiveDateTime> {
        let source = event.start_at;
        let time = source.time();

        match event.recurrence {
            Recurrence::None => {
                if window.contains(source.date()) {
                    vec![source]
                } else {
                    Vec::new()
                }
            }
            Recurrence::Yearly => clamped_date(reference.year, source.month(), source.day())
                .map(|date| vec![date.and_time(time)])
                .unwrap_or_default(),
            Recurrence::Monthly => clamped_date(reference.year, reference.month, source.day())
                .map(|date| vec![date.and_time(time)])
                .unwrap_or_default(),
            Recurrence::Weekly => {
                let weekday = source.weekday();
                window
                    .days()
                    .filter(|day| day.weekday() == weekday)
                    .map(|day| day.and_time(time))
                    .collect()
            }
        }
    }
}
