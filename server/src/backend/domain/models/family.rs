//! Family groups and their members.

use serde::{Deserialize, Serialize};

/// A family group. Events and work patterns are scoped by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub owner_id: Option<i64>,
    pub member_ids: Vec<i64>,
}

impl Family {
    pub fn has_member(&self, user_id: i64) -> bool {
        self.member_ids.contains(&user_id)
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == Some(user_id)
    }
}
