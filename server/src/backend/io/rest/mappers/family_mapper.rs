//! Family, invitation and birthday sync outcome mappers.

use crate::backend::domain::dates::format_date_time;
use crate::backend::domain::models::family::Family as DomainFamily;
use crate::backend::domain::models::invitation::{
    Invitation as DomainInvitation, InvitationStatus as DomainInvitationStatus,
};
use crate::backend::domain::SyncOutcome;
use shared::{
    BirthdaySyncOutcome, Family as SharedFamily, Invitation as SharedInvitation,
    InvitationStatus as SharedInvitationStatus,
};

pub struct FamilyMapper;

impl FamilyMapper {
    pub fn to_dto(domain: DomainFamily) -> SharedFamily {
        SharedFamily {
            id: domain.id,
            name: domain.name,
            owner_id: domain.owner_id,
            member_ids: domain.member_ids,
        }
    }

    pub fn invitation_to_dto(domain: DomainInvitation) -> SharedInvitation {
        SharedInvitation {
            id: domain.id,
            family_id: domain.family_id,
            email: domain.email,
            token: domain.token,
            status: match domain.status {
                DomainInvitationStatus::Pending => SharedInvitationStatus::Pending,
                DomainInvitationStatus::Accepted => SharedInvitationStatus::Accepted,
            },
            created_at: format_date_time(domain.created_at),
        }
    }

    pub fn outcome_to_dto(outcome: SyncOutcome) -> BirthdaySyncOutcome {
        match outcome {
            SyncOutcome::Skipped => BirthdaySyncOutcome::Skipped,
            SyncOutcome::Created => BirthdaySyncOutcome::Created,
            SyncOutcome::Updated => BirthdaySyncOutcome::Updated,
            SyncOutcome::Unchanged => BirthdaySyncOutcome::Unchanged,
        }
    }
}
