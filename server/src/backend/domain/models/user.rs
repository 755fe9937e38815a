use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered person. Authentication lives outside this crate; only the
/// fields the calendar needs are modelled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_admin: bool,
}

impl User {
    /// Title of the member's birthday event, e.g. "Birthday of Ada LOVELACE"
    pub fn birthday_title(&self) -> String {
        format!(
            "Birthday of {} {}",
            self.first_name.trim(),
            self.last_name.trim().to_uppercase()
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<NaiveDate>,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_birthday_title_uppercases_last_name() {
        let user = User {
            id: 1,
            email: "ada@example.org".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            birth_date: None,
            is_admin: false,
        };
        assert_eq!(user.birthday_title(), "Birthday of Ada LOVELACE");
    }
}
