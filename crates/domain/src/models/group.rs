//! Group and membership domain models for shared pet care groups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::error::GroupError;

/// Maximum number of active groups a single user may create.
pub const MAX_GROUPS_PER_CREATOR: i64 = 10;

/// Role within a group.
///
/// Exactly one membership per group carries `Creator`; it is set when the
/// group is created and never assigned afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Creator,
    Member,
    Viewer,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Creator => "creator",
            GroupRole::Member => "member",
            GroupRole::Viewer => "viewer",
        }
    }

    pub fn is_creator(&self) -> bool {
        matches!(self, GroupRole::Creator)
    }
}

impl FromStr for GroupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "creator" => Ok(GroupRole::Creator),
            "member" => Ok(GroupRole::Member),
            "viewer" => Ok(GroupRole::Viewer),
            _ => Err(format!("Invalid group role: {}", s)),
        }
    }
}

impl fmt::Display for GroupRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role that may be granted through membership management.
///
/// `Creator` has no variant here, so no join or role change can produce a
/// second creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignableRole {
    Member,
    Viewer,
}

impl From<AssignableRole> for GroupRole {
    fn from(role: AssignableRole) -> Self {
        match role {
            AssignableRole::Member => GroupRole::Member,
            AssignableRole::Viewer => GroupRole::Viewer,
        }
    }
}

impl TryFrom<GroupRole> for AssignableRole {
    type Error = GroupError;

    fn try_from(role: GroupRole) -> Result<Self, Self::Error> {
        match role {
            GroupRole::Member => Ok(AssignableRole::Member),
            GroupRole::Viewer => Ok(AssignableRole::Viewer),
            GroupRole::Creator => Err(GroupError::InvalidRoleAssignment(
                "Cannot assign CREATOR role - only one creator per group".to_string(),
            )),
        }
    }
}

impl fmt::Display for AssignableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        GroupRole::from(*self).fmt(f)
    }
}

/// Represents a shared pet care group (e.g. a household).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Group {
    /// Short shareable identifier, 8 characters of `[a-z0-9]`.
    pub id: String,
    pub name: String,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Represents a user's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Membership {
    pub id: Uuid,
    pub group_id: String,
    pub user_id: Uuid,
    pub role: GroupRole,
    pub invited_by: Option<Uuid>,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A group together with the requesting user's role in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupWithRole {
    pub group: Group,
    pub role: GroupRole,
    pub joined_at: DateTime<Utc>,
}

/// Group details as seen by one of its members.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub member_count: i64,
    pub your_role: GroupRole,
    pub is_creator: bool,
}

/// Data for a new group row.
#[derive(Debug, Clone)]
pub struct NewGroup {
    pub id: String,
    pub name: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Data for a new non-creator membership row.
#[derive(Debug, Clone)]
pub struct NewMembership {
    pub group_id: String,
    pub user_id: Uuid,
    pub role: AssignableRole,
    pub invited_by: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}

/// Request payload for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
}

/// Request payload for renaming a group.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RenameGroupRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
}

/// Orders members for presentation: the creator first, then by join time.
pub fn sort_members(members: &mut [Membership]) {
    members.sort_by_key(|m| (!m.role.is_creator(), m.joined_at));
}
