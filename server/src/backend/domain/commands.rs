//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are not
//! exposed over the API. The REST layer maps the DTOs of the `shared` crate
//! to these internal types.

pub mod events {
    use crate::backend::domain::models::event::Recurrence;

    /// Input for creating an event through the event form.
    /// Dates arrive as raw text and are validated by the service.
    #[derive(Debug, Clone)]
    pub struct CreateEventCommand {
        pub family_id: i64,
        pub title: String,
        pub description: Option<String>,
        pub start_at: String,
        pub end_at: Option<String>,
        pub recurrence: Recurrence,
    }
}

pub mod work {
    use crate::backend::domain::dates::YearMonth;

    #[derive(Debug, Clone)]
    pub struct CreateWorkPatternCommand {
        pub family_id: i64,
        /// Clamped to the supported cycle range
        pub cycle_length: i64,
        pub start_date: String,
        pub day_values: Vec<i64>,
    }

    #[derive(Debug, Clone)]
    pub struct UpsertWorkOverrideCommand {
        pub pattern_id: i64,
        pub date: String,
        pub value: i64,
    }

    /// Which days a work grid covers
    #[derive(Debug, Clone, PartialEq)]
    pub enum WorkGridRange {
        /// Explicit inclusive `YYYY-MM-DD` bounds
        Dates { start: String, end: String },
        /// The Monday-aligned grid of a month
        Month(YearMonth),
    }
}

pub mod users {
    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub birth_date: Option<String>,
        pub is_admin: bool,
    }

    /// Profile edit. `None` leaves a field untouched; an empty birth date clears it.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateProfileCommand {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub birth_date: Option<String>,
    }
}

pub mod families {
    #[derive(Debug, Clone)]
    pub struct CreateFamilyCommand {
        pub name: String,
    }

    #[derive(Debug, Clone)]
    pub struct AddMemberCommand {
        pub family_id: i64,
        pub user_id: i64,
    }

    #[derive(Debug, Clone)]
    pub struct InviteCommand {
        pub family_id: i64,
        pub email: String,
    }

    #[derive(Debug, Clone)]
    pub struct ChangeOwnerCommand {
        pub family_id: i64,
        pub new_owner_id: i64,
    }
}
