//! Families, membership and current-family resolution.
//!
//! Every change that makes a user a member of a family triggers a
//! best-effort birthday sync for that user.

use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::domain::access::{can_administer, can_view};
use crate::backend::domain::birthday_sync::{BirthdaySyncService, SyncOutcome};
use crate::backend::domain::commands::families::{
    AddMemberCommand, ChangeOwnerCommand, CreateFamilyCommand, InviteCommand,
};
use crate::backend::domain::errors::{DomainError, DomainResult, ValidationError};
use crate::backend::domain::models::family::Family;
use crate::backend::domain::models::invitation::{Invitation, NewInvitation};
use crate::backend::domain::models::user::User;
use crate::backend::domain::user_service::normalize_email;
use crate::backend::storage::traits::{FamilyStorage, InvitationStorage, UserStorage};

/// Maximum length of a family name
pub const MAX_FAMILY_NAME_LEN: usize = 120;

#[derive(Clone)]
pub struct FamilyService {
    family_storage: Arc<dyn FamilyStorage>,
    user_storage: Arc<dyn UserStorage>,
    invitation_storage: Arc<dyn InvitationStorage>,
    birthday_sync: BirthdaySyncService,
}

impl FamilyService {
    pub fn new(
        family_storage: Arc<dyn FamilyStorage>,
        user_storage: Arc<dyn UserStorage>,
        invitation_storage: Arc<dyn InvitationStorage>,
        birthday_sync: BirthdaySyncService,
    ) -> Self {
        Self {
            family_storage,
            user_storage,
            invitation_storage,
            birthday_sync,
        }
    }

    /// The family a request operates on.
    ///
    /// With an explicit id the caller must be a member (admins may open any
    /// family). Without one, the caller's oldest family is used.
    pub async fn resolve_family(&self, user: &User, requested: Option<i64>) -> DomainResult<Family> {
        match requested {
            Some(family_id) => {
                let family = self.family_storage.get_family(family_id).await?;
                match family {
                    Some(family) if can_view(user, &family) => Ok(family),
                    None if user.is_admin => Err(DomainError::NotFound(format!("Family {}", family_id))),
                    _ => {
                        warn!("User {} denied access to family {}", user.id, family_id);
                        Err(DomainError::AccessDenied(format!(
                            "user {} is not a member of family {}",
                            user.id, family_id
                        )))
                    }
                }
            }
            None => self
                .family_storage
                .list_families_for_user(user.id)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| DomainError::NotFound(format!("Family of user {}", user.id))),
        }
    }

    /// Create a family owned by `owner` and sync the owner's birthday into it
    pub async fn create_family(&self, owner: &User, command: CreateFamilyCommand) -> DomainResult<Family> {
        info!("Creating family '{}' for user {}", command.name, owner.id);

        let name = command.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if name.chars().count() > MAX_FAMILY_NAME_LEN {
            return Err(ValidationError::NameTooLong(MAX_FAMILY_NAME_LEN).into());
        }

        let family = self.family_storage.create_family(name, owner.id).await?;
        self.birthday_sync.sync_quietly(owner, family.id).await;

        info!("Created family {} ({})", family.id, family.name);
        Ok(family)
    }

    /// Add a user to a family. Only the family owner or an admin may do this.
    pub async fn add_member(&self, caller: &User, command: AddMemberCommand) -> DomainResult<Family> {
        info!(
            "Adding user {} to family {} on behalf of user {}",
            command.user_id, command.family_id, caller.id
        );

        let family = self
            .family_storage
            .get_family(command.family_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Family {}", command.family_id)))?;

        if !can_administer(caller, &family) {
            return Err(DomainError::AccessDenied(format!(
                "only the owner of family {} can add members",
                family.id
            )));
        }

        let member = self
            .user_storage
            .get_user(command.user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {}", command.user_id)))?;

        if !self.family_storage.add_member(family.id, member.id).await? {
            info!("User {} already belongs to family {}", member.id, family.id);
        }
        self.birthday_sync.sync_quietly(&member, family.id).await;

        self.family_storage
            .get_family(family.id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Family {}", family.id)))
    }

    /// Explicit birthday sync of the caller in one of their families.
    /// Unlike the membership flows, failures are reported.
    pub async fn sync_birthday(&self, caller: &User, family: &Family) -> DomainResult<SyncOutcome> {
        info!("Syncing birthday of user {} in family {}", caller.id, family.id);

        if !family.has_member(caller.id) {
            return Err(DomainError::AccessDenied(format!(
                "user {} is not a member of family {}",
                caller.id, family.id
            )));
        }
        self.birthday_sync.sync_for_user_in_family(caller, family.id).await
    }

    /// Invite someone to a family by email. Any member may invite.
    pub async fn invite(&self, caller: &User, command: InviteCommand) -> DomainResult<Invitation> {
        info!("User {} inviting {} to family {}", caller.id, command.email, command.family_id);

        let family = self.existing_family(command.family_id).await?;
        if !can_view(caller, &family) {
            return Err(DomainError::AccessDenied(format!(
                "user {} is not a member of family {}",
                caller.id, family.id
            )));
        }

        let email = normalize_email(&command.email)?;
        let invitation = self
            .invitation_storage
            .store_invitation(&NewInvitation {
                family_id: family.id,
                email,
                token: Uuid::new_v4().simple().to_string(),
                created_at: Local::now().naive_local(),
            })
            .await?;

        info!("Created invitation {} for family {}", invitation.id, family.id);
        Ok(invitation)
    }

    /// Redeem an invitation token: the caller joins the family and their
    /// birthday is synced into it. A token works once.
    pub async fn accept_invitation(&self, token: &str, caller: &User) -> DomainResult<Family> {
        info!("User {} accepting an invitation", caller.id);

        let invitation = self
            .invitation_storage
            .find_pending_invitation(token.trim())
            .await?
            .ok_or_else(|| DomainError::NotFound("Invitation".to_string()))?;

        if !self
            .invitation_storage
            .mark_accepted(invitation.id, Local::now().naive_local())
            .await?
        {
            return Err(DomainError::NotFound("Invitation".to_string()));
        }

        self.family_storage.add_member(invitation.family_id, caller.id).await?;
        self.birthday_sync.sync_quietly(caller, invitation.family_id).await;

        info!("User {} joined family {} by invitation", caller.id, invitation.family_id);
        self.existing_family(invitation.family_id).await
    }

    /// Delete a family with everything attached to it. Owner or admin only.
    pub async fn delete_family(&self, caller: &User, family_id: i64) -> DomainResult<()> {
        info!("User {} deleting family {}", caller.id, family_id);

        let family = self.existing_family(family_id).await?;
        if !can_administer(caller, &family) {
            warn!("User {} denied deleting family {}", caller.id, family_id);
            return Err(DomainError::AccessDenied(format!(
                "only the owner of family {} can delete it",
                family.id
            )));
        }

        if !self.family_storage.delete_family(family.id).await? {
            return Err(DomainError::NotFound(format!("Family {}", family.id)));
        }
        info!("Deleted family {} ({})", family.id, family.name);
        Ok(())
    }

    /// Hand the family over to another member
    pub async fn change_owner(&self, caller: &User, command: ChangeOwnerCommand) -> DomainResult<Family> {
        info!(
            "User {} transferring family {} to user {}",
            caller.id, command.family_id, command.new_owner_id
        );

        let family = self.existing_family(command.family_id).await?;
        if !can_administer(caller, &family) {
            return Err(DomainError::AccessDenied(format!(
                "only the owner of family {} can transfer it",
                family.id
            )));
        }

        let new_owner = self
            .user_storage
            .get_user(command.new_owner_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User {}", command.new_owner_id)))?;
        if !family.has_member(new_owner.id) {
            return Err(ValidationError::NotAMember(new_owner.id).into());
        }

        self.family_storage.set_owner(family.id, new_owner.id).await?;
        self.existing_family(family.id).await
    }

    async fn existing_family(&self, family_id: i64) -> DomainResult<Family> {
        self.family_storage
            .get_family(family_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Family {}", family_id)))
    }
}
