//! Group and membership entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{AssignableRole, GroupRole};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for group_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "group_role", rename_all = "lowercase")]
pub enum GroupRoleDb {
    Creator,
    Member,
    Viewer,
}

impl From<GroupRoleDb> for GroupRole {
    fn from(db_role: GroupRoleDb) -> Self {
        match db_role {
            GroupRoleDb::Creator => GroupRole::Creator,
            GroupRoleDb::Member => GroupRole::Member,
            GroupRoleDb::Viewer => GroupRole::Viewer,
        }
    }
}

impl From<GroupRole> for GroupRoleDb {
    fn from(role: GroupRole) -> Self {
        match role {
            GroupRole::Creator => GroupRoleDb::Creator,
            GroupRole::Member => GroupRoleDb::Member,
            GroupRole::Viewer => GroupRoleDb::Viewer,
        }
    }
}

impl From<AssignableRole> for GroupRoleDb {
    fn from(role: AssignableRole) -> Self {
        GroupRole::from(role).into()
    }
}

/// Database row mapping for the groups table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupEntity {
    pub id: String,
    pub name: String,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupEntity> for domain::models::Group {
    fn from(entity: GroupEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            created_by: entity.created_by,
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the group_memberships table.
#[derive(Debug, Clone, FromRow)]
pub struct GroupMembershipEntity {
    pub id: Uuid,
    pub group_id: String,
    pub user_id: Uuid,
    pub role: GroupRoleDb,
    pub invited_by: Option<Uuid>,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GroupMembershipEntity> for domain::models::Membership {
    fn from(entity: GroupMembershipEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            user_id: entity.user_id,
            role: entity.role.into(),
            invited_by: entity.invited_by,
            is_active: entity.is_active,
            joined_at: entity.joined_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Group row joined with one user's membership.
#[derive(Debug, Clone, FromRow)]
pub struct GroupWithRoleEntity {
    pub id: String,
    pub name: String,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    // Membership fields
    pub role: GroupRoleDb,
    pub joined_at: DateTime<Utc>,
}

impl From<GroupWithRoleEntity> for domain::models::GroupWithRole {
    fn from(entity: GroupWithRoleEntity) -> Self {
        Self {
            group: domain::models::Group {
                id: entity.id,
                name: entity.name,
                created_by: entity.created_by,
                is_active: entity.is_active,
                created_at: entity.created_at,
                updated_at: entity.updated_at,
            },
            role: entity.role.into(),
            joined_at: entity.joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversions() {
        for role in [GroupRole::Creator, GroupRole::Member, GroupRole::Viewer] {
            let db: GroupRoleDb = role.into();
            assert_eq!(GroupRole::from(db), role);
        }
        assert_eq!(
            GroupRoleDb::from(AssignableRole::Viewer),
            GroupRoleDb::Viewer
        );
    }

    #[test]
    fn test_membership_entity_into_domain() {
        let now = Utc::now();
        let entity = GroupMembershipEntity {
            id: Uuid::new_v4(),
            group_id: "abcd1234".to_string(),
            user_id: Uuid::new_v4(),
            role: GroupRoleDb::Member,
            invited_by: Some(Uuid::new_v4()),
            is_active: true,
            joined_at: now,
            updated_at: now,
        };
        let membership: domain::models::Membership = entity.clone().into();
        assert_eq!(membership.role, GroupRole::Member);
        assert_eq!(membership.invited_by, entity.invited_by);
        assert_eq!(membership.group_id, "abcd1234");
    }
}
