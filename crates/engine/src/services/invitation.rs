//! Invitation workflow: issuing codes and redeeming them into memberships.
//!
//! An invitation is PENDING until one user redeems it (ACCEPTED) or its
//! expiry passes. Expiry is checked against the clock on every read, so a
//! PENDING row past its deadline is never redeemable whether or not
//! [`InvitationService::expire_stale_invitations`] has run.

use std::sync::Arc;

use chrono::Duration;
use domain::models::{Group, Invitation, InvitationPreview, NewInvitation, Permission};
use domain::services::Clock;
use domain::store::{GroupStore, InvitationStore, MembershipStore, RedeemOutcome, Store};
use domain::{GroupError, StoreError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{authorize, NOT_A_MEMBER};

/// Fresh codes tried before giving up on a code collision.
const CODE_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct InvitationService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl InvitationService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, ttl_days: i64) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::days(ttl_days),
        }
    }

    /// Issues a single-use code for `group_id`. Any active member may invite.
    ///
    /// Returns the stored invitation and the code to share.
    pub async fn create_invitation(
        &self,
        group_id: &str,
        actor_id: Uuid,
    ) -> Result<(Invitation, String), GroupError> {
        if self
            .store
            .find_membership(group_id, actor_id)
            .await?
            .is_none()
        {
            warn!(
                group_id = %group_id,
                actor_user_id = %actor_id,
                "Non-member attempted to invite"
            );
            return Err(GroupError::Forbidden(NOT_A_MEMBER.to_string()));
        }

        for attempt in 1..=CODE_ATTEMPTS {
            let code = shared::tokens::generate_invite_code();
            let candidate =
                NewInvitation::new(group_id, actor_id, code.clone(), self.clock.now(), self.ttl);

            match self.store.insert_invitation(candidate).await? {
                Some(invitation) => {
                    info!(
                        group_id = %group_id,
                        invitation_id = %invitation.id,
                        actor_user_id = %actor_id,
                        expires_at = %invitation.expires_at,
                        "Invitation created"
                    );
                    return Ok((invitation, code));
                }
                None => debug!(attempt = attempt, "Invitation code collision, regenerating"),
            }
        }

        Err(StoreError::UniqueViolation("uq_group_invitations_code".to_string()).into())
    }

    /// Redeems `code`, making `redeemer_id` a MEMBER of the invitation's group.
    ///
    /// Claiming the code and creating the membership happen as one unit in
    /// the store, so concurrent redemptions of one code admit one user.
    pub async fn redeem_invitation(
        &self,
        code: &str,
        redeemer_id: Uuid,
    ) -> Result<Group, GroupError> {
        let now = self.clock.now();
        match self.store.redeem_invitation(code, redeemer_id, now).await? {
            RedeemOutcome::Redeemed {
                invitation,
                membership,
            } => {
                info!(
                    group_id = %invitation.group_id,
                    invitation_id = %invitation.id,
                    user_id = %redeemer_id,
                    invited_by = %invitation.invited_by,
                    role = %membership.role,
                    "Invitation redeemed"
                );
                self.store
                    .find_group(&invitation.group_id)
                    .await?
                    .ok_or_else(|| GroupError::NotFound("Group not found".to_string()))
            }
            RedeemOutcome::InvalidOrExpired => {
                warn!(user_id = %redeemer_id, "Invalid or expired invitation code");
                Err(GroupError::InvalidOrExpiredCode)
            }
            RedeemOutcome::AlreadyMember => {
                debug!(user_id = %redeemer_id, "Redeemer is already a member");
                Err(GroupError::AlreadyMember)
            }
        }
    }

    /// Redeemable invitations of a group, newest first. Requires `invite_members`.
    pub async fn list_pending_invitations(
        &self,
        group_id: &str,
        actor_id: Uuid,
    ) -> Result<Vec<Invitation>, GroupError> {
        authorize(self.store.as_ref(), group_id, actor_id, Permission::InviteMembers).await?;
        Ok(self
            .store
            .list_pending_invitations(group_id, self.clock.now())
            .await?)
    }

    /// What a code would join, shown before redeeming.
    ///
    /// Unknown codes and codes of inactive groups are `InvalidOrExpiredCode`;
    /// accepted or lapsed codes still preview, with `is_valid` false.
    pub async fn invitation_preview(&self, code: &str) -> Result<InvitationPreview, GroupError> {
        let invitation = self
            .store
            .find_invitation_by_code(code)
            .await?
            .ok_or(GroupError::InvalidOrExpiredCode)?;
        let group = self
            .store
            .find_group(&invitation.group_id)
            .await?
            .ok_or(GroupError::InvalidOrExpiredCode)?;

        let now = self.clock.now();
        Ok(InvitationPreview {
            group_id: group.id,
            group_name: group.name,
            invited_by: invitation.invited_by,
            status: invitation.effective_status(now),
            expires_at: invitation.expires_at,
            is_valid: invitation.is_redeemable(now),
        })
    }

    /// Flips PENDING invitations past their expiry to EXPIRED.
    pub async fn expire_stale_invitations(&self) -> Result<u64, GroupError> {
        let expired = self.store.expire_invitations(self.clock.now()).await?;
        if expired > 0 {
            info!(count = expired, "Expired stale invitations");
        }
        Ok(expired)
    }
}
