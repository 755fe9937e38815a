//! Invitations to join a family, redeemed through their token.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvitationStatus {
    Pending,
    Accepted,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
        }
    }

    pub fn from_string(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            other => Err(format!("Invalid invitation status: {}", other)),
        }
    }
}

/// A pending or accepted invitation. The token is the only thing the
/// invitee needs; it is single-use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: i64,
    pub family_id: i64,
    pub email: String,
    pub token: String,
    pub status: InvitationStatus,
    pub created_at: NaiveDateTime,
    pub accepted_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvitation {
    pub family_id: i64,
    pub email: String,
    pub token: String,
    pub created_at: NaiveDateTime,
}

impl NewInvitation {
    pub fn into_invitation(self, id: i64) -> Invitation {
        Invitation {
            id,
            family_id: self.family_id,
            email: self.email,
            token: self.token,
            status: InvitationStatus::Pending,
            created_at: self.created_at,
            accepted_at: None,
        }
    }
}
