//! In-process store used by tests and local tooling.
//!
//! A single async mutex guards all three collections, so every compound
//! operation is atomic with respect to every other one. Filtering and
//! ordering follow the PostgreSQL queries in [`crate::repositories`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::group::sort_members;
use domain::models::{
    AssignableRole, Group, GroupRole, GroupWithRole, Invitation, InvitationStatus, Membership,
    NewGroup, NewInvitation, NewMembership,
};
use domain::store::{
    CreateGroupOutcome, GroupStore, InvitationStore, MembershipStore, RedeemOutcome,
};
use domain::StoreError;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    groups: HashMap<String, Group>,
    memberships: Vec<Membership>,
    invitations: HashMap<String, Invitation>,
}

impl State {
    fn group_is_active(&self, group_id: &str) -> bool {
        self.groups.get(group_id).is_some_and(|g| g.is_active)
    }

    fn active_membership_mut(&mut self, group_id: &str, user_id: Uuid) -> Option<&mut Membership> {
        self.memberships
            .iter_mut()
            .find(|m| m.is_active && m.group_id == group_id && m.user_id == user_id)
    }

    fn has_active_membership(&self, group_id: &str, user_id: Uuid) -> bool {
        self.memberships
            .iter()
            .any(|m| m.is_active && m.group_id == group_id && m.user_id == user_id)
    }

    fn push_membership(
        &mut self,
        group_id: &str,
        user_id: Uuid,
        role: GroupRole,
        invited_by: Option<Uuid>,
        joined_at: DateTime<Utc>,
    ) -> Membership {
        let membership = Membership {
            id: Uuid::new_v4(),
            group_id: group_id.to_string(),
            user_id,
            role,
            invited_by,
            is_active: true,
            joined_at,
            updated_at: joined_at,
        };
        self.memberships.push(membership.clone());
        membership
    }
}

/// Store keeping everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every membership row ever written, active or not.
    pub async fn all_memberships(&self) -> Vec<Membership> {
        self.state.lock().await.memberships.clone()
    }

    /// Number of active creator memberships in a group.
    pub async fn creator_count(&self, group_id: &str) -> usize {
        self.state
            .lock()
            .await
            .memberships
            .iter()
            .filter(|m| m.is_active && m.group_id == group_id && m.role.is_creator())
            .count()
    }
}

#[async_trait]
impl GroupStore for InMemoryStore {
    async fn create_group_with_creator(
        &self,
        group: NewGroup,
        max_groups: i64,
    ) -> Result<CreateGroupOutcome, StoreError> {
        let mut state = self.state.lock().await;

        let owned = state
            .groups
            .values()
            .filter(|g| g.is_active && g.created_by == group.created_by)
            .count() as i64;
        if owned >= max_groups {
            return Ok(CreateGroupOutcome::QuotaReached);
        }
        if state.groups.contains_key(&group.id) {
            return Ok(CreateGroupOutcome::IdTaken);
        }

        let created = Group {
            id: group.id,
            name: group.name,
            created_by: group.created_by,
            is_active: true,
            created_at: group.created_at,
            updated_at: group.created_at,
        };
        state.groups.insert(created.id.clone(), created.clone());
        let creator = state.push_membership(
            &created.id,
            created.created_by,
            GroupRole::Creator,
            None,
            created.created_at,
        );

        Ok(CreateGroupOutcome::Created {
            group: created,
            creator,
        })
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<Group>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.groups.get(group_id).filter(|g| g.is_active).cloned())
    }

    async fn rename_group(
        &self,
        group_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Group>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .groups
            .get_mut(group_id)
            .filter(|g| g.is_active)
            .map(|g| {
                g.name = name.to_string();
                g.updated_at = now;
                g.clone()
            }))
    }

    async fn deactivate_group(
        &self,
        group_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        match state.groups.get_mut(group_id) {
            Some(group) if group.is_active => {
                group.is_active = false;
                group.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_groups_created_by(&self, user_id: Uuid) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .groups
            .values()
            .filter(|g| g.is_active && g.created_by == user_id)
            .count() as i64)
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn find_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        let state = self.state.lock().await;
        if !state.group_is_active(group_id) {
            return Ok(None);
        }
        Ok(state
            .memberships
            .iter()
            .find(|m| m.is_active && m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(
        &self,
        membership: NewMembership,
    ) -> Result<Option<Membership>, StoreError> {
        let mut state = self.state.lock().await;
        if !state.groups.contains_key(&membership.group_id) {
            return Err(StoreError::Database(format!(
                "group {} does not exist",
                membership.group_id
            )));
        }
        if state.has_active_membership(&membership.group_id, membership.user_id) {
            return Ok(None);
        }
        Ok(Some(state.push_membership(
            &membership.group_id,
            membership.user_id,
            membership.role.into(),
            membership.invited_by,
            membership.joined_at,
        )))
    }

    async fn update_member_role(
        &self,
        group_id: &str,
        user_id: Uuid,
        role: AssignableRole,
        now: DateTime<Utc>,
    ) -> Result<Option<Membership>, StoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .active_membership_mut(group_id, user_id)
            .filter(|m| !m.role.is_creator())
            .map(|m| {
                m.role = role.into();
                m.updated_at = now;
                m.clone()
            }))
    }

    async fn deactivate_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.lock().await;
        match state.active_membership_mut(group_id, user_id) {
            Some(m) if !m.role.is_creator() => {
                m.is_active = false;
                m.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_memberships(&self, group_id: &str) -> Result<Vec<Membership>, StoreError> {
        let state = self.state.lock().await;
        let mut members: Vec<Membership> = state
            .memberships
            .iter()
            .filter(|m| m.is_active && m.group_id == group_id)
            .cloned()
            .collect();
        sort_members(&mut members);
        Ok(members)
    }

    async fn count_members(&self, group_id: &str) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.is_active && m.group_id == group_id)
            .count() as i64)
    }

    async fn list_groups_for_user(&self, user_id: Uuid) -> Result<Vec<GroupWithRole>, StoreError> {
        let state = self.state.lock().await;
        let mut groups: Vec<GroupWithRole> = state
            .memberships
            .iter()
            .filter(|m| m.is_active && m.user_id == user_id)
            .filter_map(|m| {
                state
                    .groups
                    .get(&m.group_id)
                    .filter(|g| g.is_active)
                    .map(|g| GroupWithRole {
                        group: g.clone(),
                        role: m.role,
                        joined_at: m.joined_at,
                    })
            })
            .collect();
        groups.sort_by(|a, b| b.joined_at.cmp(&a.joined_at));
        Ok(groups)
    }
}

#[async_trait]
impl InvitationStore for InMemoryStore {
    async fn insert_invitation(
        &self,
        invitation: NewInvitation,
    ) -> Result<Option<Invitation>, StoreError> {
        let mut state = self.state.lock().await;
        if state.invitations.contains_key(&invitation.code) {
            return Ok(None);
        }
        let created = Invitation {
            id: invitation.id,
            group_id: invitation.group_id,
            invited_by: invitation.invited_by,
            code: invitation.code,
            status: InvitationStatus::Pending,
            created_at: invitation.created_at,
            expires_at: invitation.expires_at,
            accepted_by: None,
            accepted_at: None,
        };
        state
            .invitations
            .insert(created.code.clone(), created.clone());
        Ok(Some(created))
    }

    async fn find_invitation_by_code(&self, code: &str) -> Result<Option<Invitation>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.invitations.get(code).cloned())
    }

    async fn list_pending_invitations(
        &self,
        group_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invitation>, StoreError> {
        let state = self.state.lock().await;
        let mut pending: Vec<Invitation> = state
            .invitations
            .values()
            .filter(|i| i.group_id == group_id && i.is_redeemable(now))
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn redeem_invitation(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, StoreError> {
        let mut state = self.state.lock().await;

        let Some(invitation) = state.invitations.get(code).cloned() else {
            return Ok(RedeemOutcome::InvalidOrExpired);
        };
        if !invitation.is_redeemable(now) || !state.group_is_active(&invitation.group_id) {
            return Ok(RedeemOutcome::InvalidOrExpired);
        }
        if state.has_active_membership(&invitation.group_id, redeemer_id) {
            return Ok(RedeemOutcome::AlreadyMember);
        }

        let membership = state.push_membership(
            &invitation.group_id,
            redeemer_id,
            GroupRole::Member,
            Some(invitation.invited_by),
            now,
        );
        if let Some(group) = state.groups.get_mut(&invitation.group_id) {
            group.updated_at = now;
        }

        let accepted = Invitation {
            status: InvitationStatus::Accepted,
            accepted_by: Some(redeemer_id),
            accepted_at: Some(now),
            ..invitation
        };
        state
            .invitations
            .insert(accepted.code.clone(), accepted.clone());

        Ok(RedeemOutcome::Redeemed {
            invitation: accepted,
            membership,
        })
    }

    async fn expire_invitations(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut state = self.state.lock().await;
        let mut flipped = 0;
        for invitation in state.invitations.values_mut() {
            if invitation.status == InvitationStatus::Pending && invitation.expires_at <= now {
                invitation.status = InvitationStatus::Expired;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}
