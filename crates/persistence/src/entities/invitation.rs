//! Invitation entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::InvitationStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for invitation_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
pub enum InvitationStatusDb {
    Pending,
    Accepted,
    Expired,
}

impl From<InvitationStatusDb> for InvitationStatus {
    fn from(db_status: InvitationStatusDb) -> Self {
        match db_status {
            InvitationStatusDb::Pending => InvitationStatus::Pending,
            InvitationStatusDb::Accepted => InvitationStatus::Accepted,
            InvitationStatusDb::Expired => InvitationStatus::Expired,
        }
    }
}

/// Database row mapping for the group_invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub group_id: String,
    pub invited_by: Uuid,
    pub code: String,
    pub status: InvitationStatusDb,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_by: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl From<InvitationEntity> for domain::models::Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            invited_by: entity.invited_by,
            code: entity.code,
            status: entity.status.into(),
            created_at: entity.created_at,
            expires_at: entity.expires_at,
            accepted_by: entity.accepted_by,
            accepted_at: entity.accepted_at,
        }
    }
}
