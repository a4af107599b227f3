//! The engine facade used by content services to authorize their operations.

use std::collections::BTreeSet;
use std::sync::Arc;

use domain::models::{
    Group, GroupInfo, GroupRole, GroupWithRole, Invitation, InvitationPreview, Membership,
};
use domain::services::{can_perform, permission_names, Clock, SystemClock};
use domain::store::Store;
use domain::GroupError;
use tracing::debug;
use uuid::Uuid;

use crate::config::LimitsConfig;
use crate::services::{GroupIdGenerator, GroupRegistry, InvitationService, MembershipService};

/// Entry point composing the registry, membership and invitation services
/// over one store.
#[derive(Clone)]
pub struct GroupEngine {
    registry: GroupRegistry,
    memberships: MembershipService,
    invitations: InvitationService,
}

impl GroupEngine {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, limits: LimitsConfig) -> Self {
        Self {
            registry: GroupRegistry::new(store.clone(), clock.clone(), limits.clone()),
            memberships: MembershipService::new(store.clone(), clock.clone()),
            invitations: InvitationService::new(store, clock, limits.invitation_ttl_days),
        }
    }

    /// Engine reading the wall clock.
    pub fn with_system_clock(store: Arc<dyn Store>, limits: LimitsConfig) -> Self {
        Self::new(store, Arc::new(SystemClock), limits)
    }

    /// Replaces the random group id source.
    pub fn with_id_generator(mut self, id_generator: GroupIdGenerator) -> Self {
        self.registry = self.registry.with_id_generator(id_generator);
        self
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn memberships(&self) -> &MembershipService {
        &self.memberships
    }

    pub fn invitations(&self) -> &InvitationService {
        &self.invitations
    }

    // Authorization

    /// Role of `user_id` in an active group, if any.
    pub async fn get_role(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<Option<GroupRole>, GroupError> {
        Ok(self
            .memberships
            .get_membership(group_id, user_id)
            .await?
            .map(|m| m.role))
    }

    /// Whether `user_id` holds `capability` in `group_id`.
    ///
    /// Non-members and unknown capability names are denied. Store failures
    /// are returned rather than read as a denial.
    pub async fn can_perform(
        &self,
        group_id: &str,
        user_id: Uuid,
        capability: &str,
    ) -> Result<bool, GroupError> {
        let allowed = match self.get_role(group_id, user_id).await? {
            Some(role) => can_perform(role, capability),
            None => false,
        };
        debug!(
            group_id = %group_id,
            user_id = %user_id,
            capability = %capability,
            allowed = allowed,
            "Capability check"
        );
        Ok(allowed)
    }

    /// Capability names `user_id` holds in `group_id`; empty for non-members.
    pub async fn permissions(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<BTreeSet<&'static str>, GroupError> {
        Ok(self
            .get_role(group_id, user_id)
            .await?
            .map(permission_names)
            .unwrap_or_default())
    }

    // Groups

    pub async fn create_group(&self, name: &str, creator_id: Uuid) -> Result<Group, GroupError> {
        self.registry.create_group(name, creator_id).await
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group, GroupError> {
        self.registry.get_group(group_id).await
    }

    pub async fn group_info(&self, group_id: &str, user_id: Uuid) -> Result<GroupInfo, GroupError> {
        self.memberships.group_info(group_id, user_id).await
    }

    pub async fn rename_group(
        &self,
        group_id: &str,
        actor_id: Uuid,
        name: &str,
    ) -> Result<Group, GroupError> {
        self.registry.rename_group(group_id, actor_id, name).await
    }

    pub async fn deactivate_group(&self, group_id: &str, actor_id: Uuid) -> Result<(), GroupError> {
        self.registry.deactivate_group(group_id, actor_id).await
    }

    // Members

    pub async fn list_groups_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupWithRole>, GroupError> {
        self.memberships.list_groups_for_user(user_id).await
    }

    pub async fn list_members(
        &self,
        group_id: &str,
        requesting_user_id: Uuid,
    ) -> Result<Vec<Membership>, GroupError> {
        self.memberships
            .list_members(group_id, requesting_user_id)
            .await
    }

    pub async fn update_role(
        &self,
        group_id: &str,
        target_user_id: Uuid,
        new_role: GroupRole,
        actor_id: Uuid,
    ) -> Result<Membership, GroupError> {
        self.memberships
            .update_role(group_id, target_user_id, new_role, actor_id)
            .await
    }

    pub async fn remove_membership(
        &self,
        group_id: &str,
        target_user_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(), GroupError> {
        self.memberships
            .remove_membership(group_id, target_user_id, actor_id)
            .await
    }

    // Invitations

    pub async fn create_invitation(
        &self,
        group_id: &str,
        actor_id: Uuid,
    ) -> Result<(Invitation, String), GroupError> {
        self.invitations.create_invitation(group_id, actor_id).await
    }

    pub async fn redeem_invitation(
        &self,
        code: &str,
        redeemer_id: Uuid,
    ) -> Result<Group, GroupError> {
        self.invitations.redeem_invitation(code, redeemer_id).await
    }

    pub async fn list_pending_invitations(
        &self,
        group_id: &str,
        actor_id: Uuid,
    ) -> Result<Vec<Invitation>, GroupError> {
        self.invitations
            .list_pending_invitations(group_id, actor_id)
            .await
    }

    pub async fn invitation_preview(&self, code: &str) -> Result<InvitationPreview, GroupError> {
        self.invitations.invitation_preview(code).await
    }

    pub async fn expire_stale_invitations(&self) -> Result<u64, GroupError> {
        self.invitations.expire_stale_invitations().await
    }
}
