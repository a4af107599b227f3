//! PostgreSQL implementation of the domain store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{
    AssignableRole, Group, GroupWithRole, Invitation, Membership, NewGroup, NewInvitation,
    NewMembership,
};
use domain::store::{
    CreateGroupOutcome, GroupStore, InvitationStore, MembershipStore, RedeemOutcome,
};
use domain::StoreError;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::repositories::{CreatedGroup, GroupRepository, InvitationRepository, RedeemedInvitation};
use crate::retry::with_retry;

const DEFAULT_MAX_RETRIES: u32 = 3;

/// Store backed by a PostgreSQL pool.
///
/// Every call runs through [`with_retry`]; compound writes each run in their
/// own transaction so a retried attempt starts clean. A transaction whose
/// `COMMIT` failed without a server answer is not retried.
#[derive(Clone)]
pub struct PgStore {
    groups: GroupRepository,
    invitations: InvitationRepository,
    max_retries: u32,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            groups: GroupRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Overrides the number of extra attempts on transient failures.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn pool(&self) -> &PgPool {
        self.groups.pool()
    }
}

#[async_trait]
impl GroupStore for PgStore {
    async fn create_group_with_creator(
        &self,
        group: NewGroup,
        max_groups: i64,
    ) -> Result<CreateGroupOutcome, StoreError> {
        let group = &group;
        let created = with_retry("create_group_with_creator", self.max_retries, move || {
            self.groups.create_group_with_creator(group, max_groups)
        })
        .await?;

        Ok(match created {
            CreatedGroup::Created(entity, creator) => CreateGroupOutcome::Created {
                group: entity.into(),
                creator: creator.into(),
            },
            CreatedGroup::QuotaReached => CreateGroupOutcome::QuotaReached,
            CreatedGroup::IdTaken => {
                debug!(group_id = %group.id, "Generated group id already taken");
                CreateGroupOutcome::IdTaken
            }
        })
    }

    async fn find_group(&self, group_id: &str) -> Result<Option<Group>, StoreError> {
        let entity = with_retry("find_group", self.max_retries, move || {
            self.groups.find_by_id(group_id)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn rename_group(
        &self,
        group_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Group>, StoreError> {
        let entity = with_retry("rename_group", self.max_retries, move || {
            self.groups.rename_group(group_id, name, now)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn deactivate_group(
        &self,
        group_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let affected = with_retry("deactivate_group", self.max_retries, move || {
            self.groups.deactivate_group(group_id, now)
        })
        .await?;
        Ok(affected > 0)
    }

    async fn count_groups_created_by(&self, user_id: Uuid) -> Result<i64, StoreError> {
        with_retry("count_groups_created_by", self.max_retries, move || {
            self.groups.count_created_by(user_id)
        })
        .await
    }
}

#[async_trait]
impl MembershipStore for PgStore {
    async fn find_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        let entity = with_retry("find_membership", self.max_retries, move || {
            self.groups.get_membership(group_id, user_id)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn insert_membership(
        &self,
        membership: NewMembership,
    ) -> Result<Option<Membership>, StoreError> {
        let membership = &membership;
        let entity = with_retry("insert_membership", self.max_retries, move || {
            self.groups.add_member(membership)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn update_member_role(
        &self,
        group_id: &str,
        user_id: Uuid,
        role: AssignableRole,
        now: DateTime<Utc>,
    ) -> Result<Option<Membership>, StoreError> {
        let entity = with_retry("update_member_role", self.max_retries, move || {
            self.groups.update_member_role(group_id, user_id, role, now)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn deactivate_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let affected = with_retry("deactivate_membership", self.max_retries, move || {
            self.groups.remove_member(group_id, user_id, now)
        })
        .await?;
        Ok(affected > 0)
    }

    async fn list_memberships(&self, group_id: &str) -> Result<Vec<Membership>, StoreError> {
        let entities = with_retry("list_memberships", self.max_retries, move || {
            self.groups.list_members(group_id)
        })
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn count_members(&self, group_id: &str) -> Result<i64, StoreError> {
        with_retry("count_members", self.max_retries, move || {
            self.groups.count_members(group_id)
        })
        .await
    }

    async fn list_groups_for_user(&self, user_id: Uuid) -> Result<Vec<GroupWithRole>, StoreError> {
        let entities = with_retry("list_groups_for_user", self.max_retries, move || {
            self.groups.find_user_groups(user_id)
        })
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl InvitationStore for PgStore {
    async fn insert_invitation(
        &self,
        invitation: NewInvitation,
    ) -> Result<Option<Invitation>, StoreError> {
        let invitation = &invitation;
        let entity = with_retry("insert_invitation", self.max_retries, move || {
            self.invitations.create_invitation(invitation)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn find_invitation_by_code(&self, code: &str) -> Result<Option<Invitation>, StoreError> {
        let entity = with_retry("find_invitation_by_code", self.max_retries, move || {
            self.invitations.find_by_code(code)
        })
        .await?;
        Ok(entity.map(Into::into))
    }

    async fn list_pending_invitations(
        &self,
        group_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invitation>, StoreError> {
        let entities = with_retry("list_pending_invitations", self.max_retries, move || {
            self.invitations.list_pending(group_id, now)
        })
        .await?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn redeem_invitation(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, StoreError> {
        let redeemed = with_retry("redeem_invitation", self.max_retries, move || {
            self.invitations.redeem(code, redeemer_id, now)
        })
        .await?;

        Ok(match redeemed {
            RedeemedInvitation::Redeemed(invitation, membership) => RedeemOutcome::Redeemed {
                invitation: invitation.into(),
                membership: membership.into(),
            },
            RedeemedInvitation::InvalidOrExpired => RedeemOutcome::InvalidOrExpired,
            RedeemedInvitation::AlreadyMember => RedeemOutcome::AlreadyMember,
        })
    }

    async fn expire_invitations(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        with_retry("expire_invitations", self.max_retries, move || {
            self.invitations.expire_stale(now)
        })
        .await
    }
}
