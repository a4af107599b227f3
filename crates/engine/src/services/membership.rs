//! Membership management: joins, role changes, removals and listings.

use std::sync::Arc;

use domain::models::{
    AssignableRole, GroupInfo, GroupRole, GroupWithRole, Membership, NewMembership, Permission,
};
use domain::services::Clock;
use domain::store::{GroupStore, MembershipStore, Store};
use domain::GroupError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::authorize;

#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl MembershipService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Active membership of `user_id` in an active group.
    pub async fn get_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<Option<Membership>, GroupError> {
        let membership = self.store.find_membership(group_id, user_id).await?;
        debug!(
            group_id = %group_id,
            user_id = %user_id,
            found = membership.is_some(),
            "Membership lookup"
        );
        Ok(membership)
    }

    pub async fn is_member(&self, group_id: &str, user_id: Uuid) -> Result<bool, GroupError> {
        Ok(self.get_membership(group_id, user_id).await?.is_some())
    }

    /// Adds `user_id` to an active group with a non-creator role.
    ///
    /// Fails with `AlreadyMember` if an active membership exists; the store
    /// enforces this atomically with the insert.
    pub async fn add_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
        role: AssignableRole,
        invited_by: Option<Uuid>,
    ) -> Result<Membership, GroupError> {
        if self.store.find_group(group_id).await?.is_none() {
            return Err(GroupError::NotFound("Group not found".to_string()));
        }

        let membership = self
            .store
            .insert_membership(NewMembership {
                group_id: group_id.to_string(),
                user_id,
                role,
                invited_by,
                joined_at: self.clock.now(),
            })
            .await?
            .ok_or(GroupError::AlreadyMember)?;

        info!(
            group_id = %group_id,
            user_id = %user_id,
            role = %role,
            "Member added to group"
        );
        Ok(membership)
    }

    /// Changes a member's role. Only the creator may do this, and neither the
    /// creator's own role nor the CREATOR role itself can be involved.
    pub async fn update_role(
        &self,
        group_id: &str,
        target_user_id: Uuid,
        new_role: GroupRole,
        actor_id: Uuid,
    ) -> Result<Membership, GroupError> {
        authorize(self.store.as_ref(), group_id, actor_id, Permission::ChangeRoles).await?;

        let target = self.find_target(group_id, target_user_id).await?;
        let assignable = AssignableRole::try_from(new_role)?;
        if target.role.is_creator() {
            warn!(
                group_id = %group_id,
                actor_user_id = %actor_id,
                "Attempt to change the creator's role"
            );
            return Err(GroupError::InvalidRoleAssignment(
                "Cannot change the creator's role".to_string(),
            ));
        }

        let updated = self
            .store
            .update_member_role(group_id, target_user_id, assignable, self.clock.now())
            .await?
            .ok_or_else(|| GroupError::NotFound("Member not found".to_string()))?;

        info!(
            group_id = %group_id,
            actor_user_id = %actor_id,
            target_user_id = %target_user_id,
            old_role = %target.role,
            new_role = %updated.role,
            "Member role updated"
        );
        Ok(updated)
    }

    /// Soft-removes a non-creator member. Only the creator may do this.
    pub async fn remove_membership(
        &self,
        group_id: &str,
        target_user_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(), GroupError> {
        authorize(self.store.as_ref(), group_id, actor_id, Permission::RemoveMembers).await?;

        let target = self.find_target(group_id, target_user_id).await?;
        if target.role.is_creator() {
            warn!(
                group_id = %group_id,
                actor_user_id = %actor_id,
                "Attempt to remove the group creator"
            );
            return Err(GroupError::InvalidRoleAssignment(
                "Cannot remove the group creator".to_string(),
            ));
        }

        if !self
            .store
            .deactivate_membership(group_id, target_user_id, self.clock.now())
            .await?
        {
            return Err(GroupError::NotFound("Member not found".to_string()));
        }

        info!(
            group_id = %group_id,
            actor_user_id = %actor_id,
            removed_user_id = %target_user_id,
            "Member removed from group"
        );
        Ok(())
    }

    /// Members of a group, creator first, then by join time. Requires `view_members`.
    pub async fn list_members(
        &self,
        group_id: &str,
        requesting_user_id: Uuid,
    ) -> Result<Vec<Membership>, GroupError> {
        authorize(
            self.store.as_ref(),
            group_id,
            requesting_user_id,
            Permission::ViewMembers,
        )
        .await?;
        Ok(self.store.list_memberships(group_id).await?)
    }

    /// Active groups `user_id` belongs to, most recently joined first.
    pub async fn list_groups_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupWithRole>, GroupError> {
        Ok(self.store.list_groups_for_user(user_id).await?)
    }

    /// Group details for one of its members. Requires `view_group`.
    pub async fn group_info(&self, group_id: &str, user_id: Uuid) -> Result<GroupInfo, GroupError> {
        let membership =
            authorize(self.store.as_ref(), group_id, user_id, Permission::ViewGroup).await?;
        let group = self
            .store
            .find_group(group_id)
            .await?
            .ok_or_else(|| GroupError::NotFound("Group not found".to_string()))?;
        let member_count = self.store.count_members(group_id).await?;

        Ok(GroupInfo {
            id: group.id,
            name: group.name,
            created_by: group.created_by,
            is_active: group.is_active,
            created_at: group.created_at,
            updated_at: group.updated_at,
            member_count,
            your_role: membership.role,
            is_creator: membership.role.is_creator(),
        })
    }

    async fn find_target(&self, group_id: &str, user_id: Uuid) -> Result<Membership, GroupError> {
        self.store
            .find_membership(group_id, user_id)
            .await?
            .ok_or_else(|| {
                GroupError::NotFound("Target user is not a member of this group".to_string())
            })
    }
}
