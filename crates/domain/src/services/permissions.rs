//! Permission evaluation for group roles.
//!
//! Everything here is a pure function of roles and capability names. The
//! role to permission mapping lives in [`crate::models::permission`].

use std::collections::BTreeSet;
use std::str::FromStr;

use crate::models::group::GroupRole;
use crate::models::permission::{role_permissions, Permission};

/// Permissions granted to `role`.
pub fn permissions_for(role: GroupRole) -> &'static [Permission] {
    role_permissions(role)
}

/// Permission names granted to `role`.
pub fn permission_names(role: GroupRole) -> BTreeSet<&'static str> {
    permissions_for(role).iter().map(|p| p.as_str()).collect()
}

/// Permissions for a role given by name; unknown roles get none.
pub fn permissions_for_role_name(role: &str) -> &'static [Permission] {
    GroupRole::from_str(role)
        .map(permissions_for)
        .unwrap_or(&[])
}

/// Returns true if `role` holds `permission`.
pub fn has_permission(role: GroupRole, permission: Permission) -> bool {
    permissions_for(role).contains(&permission)
}

/// Returns true if `role` holds the capability named `capability`.
///
/// Unknown capability names are never granted.
pub fn can_perform(role: GroupRole, capability: &str) -> bool {
    Permission::from_str(capability)
        .map(|p| has_permission(role, p))
        .unwrap_or(false)
}

/// Whether an actor may remove or otherwise manage a member holding `target_role`.
pub fn can_manage_member(actor_role: GroupRole, target_role: GroupRole) -> bool {
    actor_role == GroupRole::Creator && target_role != GroupRole::Creator
}

/// Whether an actor may assign `target_role` to someone.
///
/// The creator role is fixed at group creation and is never assignable.
pub fn can_assign_role(actor_role: GroupRole, target_role: GroupRole) -> bool {
    actor_role == GroupRole::Creator && target_role != GroupRole::Creator
}
