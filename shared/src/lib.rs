use serde::{Deserialize, Serialize};

/// How an event repeats on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// One-off event shown on its own date only
    None,
    /// Same month/day every year (birthdays)
    Yearly,
    /// Same day of month every month, clamped to the month length
    Monthly,
    /// Same ISO weekday every week
    Weekly,
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::None
    }
}

/// Calendar event as exposed over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub family_id: i64,
    /// Member who created the event; None once that member is deleted
    pub created_by: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    /// Anchor occurrence, `YYYY-MM-DDTHH:MM:SS`
    pub start_at: String,
    pub end_at: Option<String>,
    pub recurrence: Recurrence,
    /// True for events maintained by the birthday synchronizer
    pub is_birthday: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub family_id: i64,
    /// Event title (max 180 characters)
    pub title: String,
    pub description: Option<String>,
    /// `YYYY-MM-DDTHH:MM[:SS]`
    pub start_at: String,
    pub end_at: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResponse {
    pub event: Event,
    pub success_message: String,
}

/// Acknowledgement of a deleted event or work pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: i64,
    pub success_message: String,
}

/// A single cell of the month grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDayCell {
    /// `YYYY-MM-DD`
    pub date: String,
    /// False for lead/trail days borrowed from adjacent months
    pub in_month: bool,
    pub events: Vec<Event>,
}

/// Seven consecutive cells, Monday first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarWeek {
    pub days: Vec<CalendarDayCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarMonthResponse {
    pub family_id: i64,
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverviewMonth {
    pub month: u32,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverviewResponse {
    pub family_id: i64,
    pub year: i32,
    /// Always twelve entries, January first
    pub months: Vec<YearOverviewMonth>,
}

/// Cyclic work-shift schedule of one member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPattern {
    pub id: i64,
    pub family_id: i64,
    pub owner_id: i64,
    pub cycle_length: u32,
    /// Cycle anchor (day 0), `YYYY-MM-DD`
    pub start_date: String,
    /// Shift codes 0-7, one per cycle day
    pub pattern: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateWorkPatternRequest {
    pub family_id: i64,
    /// Clamped to 7..=21 by the server
    pub cycle_length: i64,
    pub start_date: String,
    pub day_values: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPatternResponse {
    pub pattern: WorkPattern,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPatternListResponse {
    pub patterns: Vec<WorkPattern>,
}

/// Effective shift of one pattern on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkShiftEntry {
    pub pattern_id: i64,
    pub owner_id: i64,
    pub value: u8,
    /// Machine label of the shift code (`rest`, `morning`, ...)
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDay {
    pub date: String,
    pub shifts: Vec<WorkShiftEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkGridResponse {
    pub family_id: i64,
    pub start: String,
    pub end: String,
    pub days: Vec<WorkDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertWorkOverrideRequest {
    pub pattern_id: i64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Out-of-range values are clamped to 0..=7
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertWorkOverrideResponse {
    pub pattern_id: i64,
    pub date: String,
    pub value: u8,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub birth_date: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Profile edit; omitted fields are left untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: User,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub owner_id: Option<i64>,
    pub member_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyResponse {
    pub family: Family,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeOwnerRequest {
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
}

/// An invitation to join a family. Whoever holds the token may accept it once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: i64,
    pub family_id: i64,
    pub email: String,
    pub token: String,
    pub status: InvitationStatus,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInvitationRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationResponse {
    pub invitation: Invitation,
    pub success_message: String,
}

/// What a birthday synchronization did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BirthdaySyncOutcome {
    /// Member has no birth date
    Skipped,
    Created,
    Updated,
    /// Existing event already matched, nothing written
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthdaySyncResponse {
    pub family_id: i64,
    pub user_id: i64,
    pub outcome: BirthdaySyncOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Recurrence::Weekly).unwrap(), "\"weekly\"");
        let parsed: Recurrence = serde_json::from_str("\"yearly\"").unwrap();
        assert_eq!(parsed, Recurrence::Yearly);
    }

    #[test]
    fn test_create_event_request_defaults_to_no_recurrence() {
        let request: CreateEventRequest = serde_json::from_str(
            r#"{"family_id":1,"title":"Dentist","description":null,"start_at":"2025-03-04T09:30","end_at":null}"#,
        )
        .unwrap();
        assert_eq!(request.recurrence, Recurrence::None);
    }

    #[test]
    fn test_update_profile_request_allows_partial_bodies() {
        let request: UpdateProfileRequest = serde_json::from_str(r#"{"birth_date":"1990-06-15"}"#).unwrap();
        assert_eq!(request.birth_date.as_deref(), Some("1990-06-15"));
        assert!(request.first_name.is_none());
    }
}
