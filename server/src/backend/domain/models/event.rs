//! Calendar events and their recurrence rules.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Maximum length of an event title
pub const MAX_TITLE_LEN: usize = 180;

/// Recurrence rule of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recurrence {
    None,
    Yearly,
    Monthly,
    Weekly,
}

impl Recurrence {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Yearly => "yearly",
            Recurrence::Monthly => "monthly",
            Recurrence::Weekly => "weekly",
        }
    }

    /// Parse from the storage representation
    pub fn from_string(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(Recurrence::None),
            "yearly" => Ok(Recurrence::Yearly),
            "monthly" => Ok(Recurrence::Monthly),
            "weekly" => Ok(Recurrence::Weekly),
            other => Err(format!("Invalid recurrence: {}", other)),
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

/// Who put the event on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOrigin {
    /// Entered by a member through the event form
    Manual,
    /// Maintained by the birthday synchronizer
    Birthday,
}

impl EventOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrigin::Manual => "manual",
            EventOrigin::Birthday => "birthday",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "manual" => Ok(EventOrigin::Manual),
            "birthday" => Ok(EventOrigin::Birthday),
            other => Err(format!("Invalid event origin: {}", other)),
        }
    }
}

/// Domain model of a family calendar event.
///
/// `start_at` is the anchor occurrence; recurring events reuse its
/// time-of-day and, depending on the rule, its weekday, day or month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub family_id: i64,
    pub created_by: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_at: NaiveDateTime,
    pub end_at: Option<NaiveDateTime>,
    pub recurrence: Recurrence,
    pub origin: EventOrigin,
}

impl Event {
    pub fn start_date(&self) -> NaiveDate {
        self.start_at.date()
    }
}

/// Event fields before the record store assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub family_id: i64,
    pub created_by: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub start_at: NaiveDateTime,
    pub end_at: Option<NaiveDateTime>,
    pub recurrence: Recurrence,
    pub origin: EventOrigin,
}

impl NewEvent {
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            family_id: self.family_id,
            created_by: self.created_by,
            title: self.title,
            description: self.description,
            start_at: self.start_at,
            end_at: self.end_at,
            recurrence: self.recurrence,
            origin: self.origin,
        }
    }
}
