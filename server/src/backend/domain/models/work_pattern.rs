//! Cyclic work-shift patterns, shift codes and date overrides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const MIN_CYCLE_LENGTH: u32 = 7;
pub const MAX_CYCLE_LENGTH: u32 = 21;

/// Work-day category of a member on a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ShiftCode {
    Rest = 0,
    Morning = 1,
    Afternoon = 2,
    Night = 3,
    Holiday = 4,
    Day = 5,
    Remote = 6,
    Travel = 7,
}

impl ShiftCode {
    pub const ALL: [ShiftCode; 8] = [
        ShiftCode::Rest,
        ShiftCode::Morning,
        ShiftCode::Afternoon,
        ShiftCode::Night,
        ShiftCode::Holiday,
        ShiftCode::Day,
        ShiftCode::Remote,
        ShiftCode::Travel,
    ];

    /// Map any integer onto the code domain. Values below 0 become `Rest`,
    /// values above 7 become `Travel`.
    pub fn clamped(value: i64) -> Self {
        let index = value.clamp(0, ShiftCode::Travel as i64) as usize;
        Self::ALL[index]
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShiftCode::Rest => "rest",
            ShiftCode::Morning => "morning",
            ShiftCode::Afternoon => "afternoon",
            ShiftCode::Night => "night",
            ShiftCode::Holiday => "holiday",
            ShiftCode::Day => "day",
            ShiftCode::Remote => "remote",
            ShiftCode::Travel => "travel",
        }
    }
}

impl Default for ShiftCode {
    fn default() -> Self {
        ShiftCode::Rest
    }
}

/// Cyclic shift schedule of one family member.
///
/// Day 0 of the cycle is `start_date`; `pattern[i]` is the shift on cycle day `i`.
/// Patterns written through the work schedule service always hold exactly
/// `cycle_length` entries, but rows written by older clients may not, so
/// readers must tolerate a short pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPattern {
    pub id: i64,
    pub family_id: i64,
    pub owner_id: i64,
    pub cycle_length: u32,
    pub start_date: NaiveDate,
    pub pattern: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkPattern {
    pub family_id: i64,
    pub owner_id: i64,
    pub cycle_length: u32,
    pub start_date: NaiveDate,
    pub pattern: Vec<u8>,
}

impl NewWorkPattern {
    pub fn into_pattern(self, id: i64) -> WorkPattern {
        WorkPattern {
            id,
            family_id: self.family_id,
            owner_id: self.owner_id,
            cycle_length: self.cycle_length,
            start_date: self.start_date,
            pattern: self.pattern,
        }
    }
}

/// Date-specific replacement of the pattern value. At most one per (pattern, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOverride {
    pub pattern_id: i64,
    pub date: NaiveDate,
    pub value: ShiftCode,
}
