//! Permission rules shared by the family-scoped services.

use crate::backend::domain::models::family::Family;
use crate::backend::domain::models::user::User;

/// Whether `user` may see the calendar and work grid of `family`
pub fn can_view(user: &User, family: &Family) -> bool {
    user.is_admin || family.has_member(user.id)
}

/// Whether `user` may change membership of `family`
pub fn can_administer(user: &User, family: &Family) -> bool {
    user.is_admin || family.is_owned_by(user.id)
}

/// Whether `user` may edit or delete a resource of `family` created by
/// `resource_owner` (an event's creator, a work pattern's owner)
pub fn can_manage(user: &User, family: &Family, resource_owner: Option<i64>) -> bool {
    can_administer(user, family) || (resource_owner == Some(user.id) && family.has_member(user.id))
}
