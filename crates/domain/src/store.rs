//! Store traits for groups, memberships and invitations.
//!
//! The engine receives an implementation of [`Store`] at construction time.
//! Operations that span several rows (group plus creator membership, code
//! redemption plus membership) are single trait methods so an implementation
//! can make them atomic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    AssignableRole, Group, GroupWithRole, Invitation, Membership, NewGroup, NewInvitation,
    NewMembership,
};

/// Result of an atomic group creation attempt.
#[derive(Debug, Clone)]
pub enum CreateGroupOutcome {
    /// Group and its creator membership both exist.
    Created {
        group: Group,
        creator: Membership,
    },
    /// The creator already has `max_groups` active groups.
    QuotaReached,
    /// The generated id is already taken; nothing was written.
    IdTaken,
}

/// Result of an atomic invitation redemption.
#[derive(Debug, Clone)]
pub enum RedeemOutcome {
    /// Membership created and invitation marked accepted.
    Redeemed {
        invitation: Invitation,
        membership: Membership,
    },
    /// No pending, unexpired invitation of an active group has this code.
    InvalidOrExpired,
    /// The redeemer is already an active member; the invitation is untouched.
    AlreadyMember,
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Insert a group and its creator membership as one unit, unless the
    /// creator already has `max_groups` active groups.
    async fn create_group_with_creator(
        &self,
        group: NewGroup,
        max_groups: i64,
    ) -> Result<CreateGroupOutcome, StoreError>;

    /// Find an active group.
    async fn find_group(&self, group_id: &str) -> Result<Option<Group>, StoreError>;

    /// Rename an active group. Returns `None` if it does not exist.
    async fn rename_group(
        &self,
        group_id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Group>, StoreError>;

    /// Soft-delete a group. Returns false if it was not active.
    async fn deactivate_group(&self, group_id: &str, now: DateTime<Utc>)
        -> Result<bool, StoreError>;

    /// Count active groups created by `user_id`.
    async fn count_groups_created_by(&self, user_id: Uuid) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Active membership of `user_id` in an active group.
    async fn find_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<Option<Membership>, StoreError>;

    /// Insert a membership unless an active one exists for the pair.
    ///
    /// Returns `None` when the user is already an active member. The check
    /// and the insert are atomic.
    async fn insert_membership(
        &self,
        membership: NewMembership,
    ) -> Result<Option<Membership>, StoreError>;

    /// Change the role of a non-creator member. Creator rows never match.
    async fn update_member_role(
        &self,
        group_id: &str,
        user_id: Uuid,
        role: AssignableRole,
        now: DateTime<Utc>,
    ) -> Result<Option<Membership>, StoreError>;

    /// Soft-remove a non-creator member. Creator rows never match.
    async fn deactivate_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Active memberships of a group, creator first, then by join time.
    async fn list_memberships(&self, group_id: &str) -> Result<Vec<Membership>, StoreError>;

    /// Number of active members in a group.
    async fn count_members(&self, group_id: &str) -> Result<i64, StoreError>;

    /// Active groups the user belongs to, most recently joined first.
    async fn list_groups_for_user(&self, user_id: Uuid) -> Result<Vec<GroupWithRole>, StoreError>;
}

#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Insert a pending invitation. Returns `None` if the code is taken.
    async fn insert_invitation(
        &self,
        invitation: NewInvitation,
    ) -> Result<Option<Invitation>, StoreError>;

    /// Find an invitation by code regardless of status.
    async fn find_invitation_by_code(&self, code: &str) -> Result<Option<Invitation>, StoreError>;

    /// Pending invitations of a group that have not expired at `now`, newest first.
    async fn list_pending_invitations(
        &self,
        group_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invitation>, StoreError>;

    /// Claim a pending, unexpired code and create a `Member` membership for
    /// the redeemer, as one unit.
    async fn redeem_invitation(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemOutcome, StoreError>;

    /// Flip pending invitations past their expiry to `Expired`.
    async fn expire_invitations(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Everything the engine needs from persistence.
pub trait Store: GroupStore + MembershipStore + InvitationStore {}

impl<T> Store for T where T: GroupStore + MembershipStore + InvitationStore {}
