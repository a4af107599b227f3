//! Invitation domain models for joining groups by code.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Invitations lapse this many days after creation.
pub const INVITATION_TTL_DAYS: i64 = 7;

/// Stored status of an invitation.
///
/// A `Pending` row whose expiry has passed is treated as expired whether or
/// not it has been flipped to `Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
        }
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "expired" => Ok(InvitationStatus::Expired),
            _ => Err(format!("Invalid invitation status: {}", s)),
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a single-use group invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: Uuid,
    pub group_id: String,
    pub invited_by: Uuid,
    pub code: String,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_by: Option<Uuid>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    /// Status as of `now`, with time-based expiry applied.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        match self.status {
            InvitationStatus::Pending if self.expires_at <= now => InvitationStatus::Expired,
            status => status,
        }
    }

    /// Returns true if the code can still be redeemed at `now`.
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at > now
    }
}

/// Data for a new invitation row.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub id: Uuid,
    pub group_id: String,
    pub invited_by: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewInvitation {
    /// Builds a pending invitation expiring `ttl` after `now`.
    pub fn new(
        group_id: &str,
        invited_by: Uuid,
        code: String,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: group_id.to_string(),
            invited_by,
            code,
            created_at: now,
            expires_at: now + ttl,
        }
    }
}

/// Public view of an invitation code, shown before joining.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InvitationPreview {
    pub group_id: String,
    pub group_name: String,
    pub invited_by: Uuid,
    pub status: InvitationStatus,
    pub expires_at: DateTime<Utc>,
    pub is_valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(status: InvitationStatus, expires_at: DateTime<Utc>) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            group_id: "abcd1234".to_string(),
            invited_by: Uuid::new_v4(),
            code: "Zm9vYmFyYmF6".to_string(),
            status,
            created_at: now,
            expires_at,
            accepted_by: None,
            accepted_at: None,
        }
    }

    #[test]
    fn test_invitation_status_round_trip_strings() {
        assert_eq!(InvitationStatus::Pending.as_str(), "pending");
        assert_eq!(
            InvitationStatus::from_str("ACCEPTED").unwrap(),
            InvitationStatus::Accepted
        );
        assert!(InvitationStatus::from_str("revoked").is_err());
    }

    #[test]
    fn test_pending_before_expiry_is_redeemable() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now + Duration::days(1));
        assert!(inv.is_redeemable(now));
        assert_eq!(inv.effective_status(now), InvitationStatus::Pending);
    }

    #[test]
    fn test_pending_past_expiry_is_not_redeemable() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now - Duration::seconds(1));
        assert!(!inv.is_redeemable(now));
        assert_eq!(inv.effective_status(now), InvitationStatus::Expired);
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Pending, now);
        assert!(!inv.is_redeemable(now));
    }

    #[test]
    fn test_accepted_is_never_redeemable() {
        let now = Utc::now();
        let inv = invitation(InvitationStatus::Accepted, now + Duration::days(3));
        assert!(!inv.is_redeemable(now));
        assert_eq!(inv.effective_status(now), InvitationStatus::Accepted);
    }

    #[test]
    fn test_new_invitation_expiry() {
        let now = Utc::now();
        let inv = NewInvitation::new(
            "abcd1234",
            Uuid::new_v4(),
            "code".to_string(),
            now,
            Duration::days(INVITATION_TTL_DAYS),
        );
        assert_eq!(inv.expires_at - inv.created_at, Duration::days(7));
    }
}
