//! Engine services: group registry, membership management and invitations.

pub mod invitation;
pub mod membership;
pub mod registry;

pub use invitation::InvitationService;
pub use membership::MembershipService;
pub use registry::{GroupIdGenerator, GroupRegistry};

use domain::models::{Membership, Permission};
use domain::services::has_permission;
use domain::store::{MembershipStore, Store};
use domain::GroupError;
use tracing::warn;
use uuid::Uuid;

pub(crate) const NOT_A_MEMBER: &str = "You are not a member of this group";

/// Loads the actor's membership and checks it grants `permission`.
///
/// An actor without an active membership (including one whose group is
/// inactive) is `Forbidden`, the same as a member whose role lacks `permission`.
pub(crate) async fn authorize(
    store: &dyn Store,
    group_id: &str,
    actor_id: Uuid,
    permission: Permission,
) -> Result<Membership, GroupError> {
    let Some(membership) = store.find_membership(group_id, actor_id).await? else {
        warn!(
            group_id = %group_id,
            actor_user_id = %actor_id,
            permission = %permission,
            "Non-member attempted a group action"
        );
        return Err(GroupError::Forbidden(NOT_A_MEMBER.to_string()));
    };

    if !has_permission(membership.role, permission) {
        warn!(
            group_id = %group_id,
            actor_user_id = %actor_id,
            role = %membership.role,
            permission = %permission,
            "Permission denied"
        );
        return Err(GroupError::Forbidden(format!(
            "Role {} does not grant {}",
            membership.role, permission
        )));
    }

    Ok(membership)
}
