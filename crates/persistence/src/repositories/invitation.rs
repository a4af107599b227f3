//! Invitation repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::NewInvitation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupMembershipEntity, InvitationEntity};
use crate::error::commit_error;
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str =
    "id, group_id, invited_by, code, status, created_at, expires_at, accepted_by, accepted_at";

/// Outcome of the redemption transaction.
#[derive(Debug)]
pub enum RedeemedInvitation {
    Redeemed(InvitationEntity, GroupMembershipEntity),
    InvalidOrExpired,
    AlreadyMember,
}

/// Repository for invitation-related database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a new pending invitation. Returns `None` if the code is already in use.
    pub async fn create_invitation(
        &self,
        invitation: &NewInvitation,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            INSERT INTO group_invitations (id, group_id, invited_by, code, status, created_at, expires_at)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6)
            ON CONFLICT (code) DO NOTHING
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation.id)
        .bind(&invitation.group_id)
        .bind(invitation.invited_by)
        .bind(&invitation.code)
        .bind(invitation.created_at)
        .bind(invitation.expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find invitation by code, whatever its status.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_code");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM group_invitations
            WHERE code = $1
            "#
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List redeemable invitations for a group, newest first.
    pub async fn list_pending(
        &self,
        group_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_invitations");
        let result = sqlx::query_as::<_, InvitationEntity>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM group_invitations
            WHERE group_id = $1
              AND status = 'pending'
              AND expires_at > $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(group_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Accept a pending invitation and add the redeemer as a member.
    ///
    /// The conditional update locks the invitation row, so a concurrent
    /// redemption of the same code waits and then matches zero rows.
    pub async fn redeem(
        &self,
        code: &str,
        redeemer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<RedeemedInvitation, sqlx::Error> {
        let timer = QueryTimer::new("redeem_invitation");
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query_as::<_, InvitationEntity>(
            r#"
            UPDATE group_invitations i
            SET status = 'accepted', accepted_by = $2, accepted_at = $3
            WHERE i.code = $1
              AND i.status = 'pending'
              AND i.expires_at > $3
              AND EXISTS (SELECT 1 FROM groups g WHERE g.id = i.group_id AND g.is_active = true)
            RETURNING i.id, i.group_id, i.invited_by, i.code, i.status, i.created_at,
                      i.expires_at, i.accepted_by, i.accepted_at
            "#,
        )
        .bind(code)
        .bind(redeemer_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(invitation) = claimed else {
            tx.rollback().await?;
            timer.record();
            return Ok(RedeemedInvitation::InvalidOrExpired);
        };

        let membership = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            INSERT INTO group_memberships (id, group_id, user_id, role, invited_by, is_active, joined_at, updated_at)
            VALUES ($1, $2, $3, 'member', $4, true, $5, $5)
            ON CONFLICT (group_id, user_id) WHERE is_active = true DO NOTHING
            RETURNING id, group_id, user_id, role, invited_by, is_active, joined_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&invitation.group_id)
        .bind(redeemer_id)
        .bind(invitation.invited_by)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(membership) = membership else {
            // Leave the invitation pending for someone else
            tx.rollback().await?;
            timer.record();
            return Ok(RedeemedInvitation::AlreadyMember);
        };

        sqlx::query("UPDATE groups SET updated_at = $2 WHERE id = $1")
            .bind(&invitation.group_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(commit_error)?;
        timer.record();
        Ok(RedeemedInvitation::Redeemed(invitation, membership))
    }

    /// Mark pending invitations past their expiry as expired.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_stale_invitations");
        let result = sqlx::query(
            r#"
            UPDATE group_invitations
            SET status = 'expired'
            WHERE status = 'pending' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
