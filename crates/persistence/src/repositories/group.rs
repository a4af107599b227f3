//! Group repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::{AssignableRole, NewGroup, NewMembership};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GroupEntity, GroupMembershipEntity, GroupRoleDb, GroupWithRoleEntity};
use crate::error::commit_error;
use crate::metrics::QueryTimer;

const GROUP_COLUMNS: &str = "id, name, created_by, is_active, created_at, updated_at";

const MEMBERSHIP_COLUMNS: &str =
    "id, group_id, user_id, role, invited_by, is_active, joined_at, updated_at";

/// Outcome of the group creation transaction.
#[derive(Debug)]
pub enum CreatedGroup {
    Created(GroupEntity, GroupMembershipEntity),
    QuotaReached,
    IdTaken,
}

/// Repository for group and membership database operations.
#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    /// Creates a new GroupRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a new group and add the creator membership, unless the creator
    /// already has `max_groups` active groups.
    pub async fn create_group_with_creator(
        &self,
        group: &NewGroup,
        max_groups: i64,
    ) -> Result<CreatedGroup, sqlx::Error> {
        let timer = QueryTimer::new("create_group_with_creator");

        // Quota check, group insert and creator membership commit together
        let mut tx = self.pool.begin().await?;

        // Serialize concurrent creations by the same user so the count stays accurate
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(group.created_by.to_string())
            .execute(&mut *tx)
            .await?;

        let owned = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM groups
            WHERE created_by = $1 AND is_active = true
            "#,
        )
        .bind(group.created_by)
        .fetch_one(&mut *tx)
        .await?;

        if owned >= max_groups {
            tx.rollback().await?;
            timer.record();
            return Ok(CreatedGroup::QuotaReached);
        }

        let inserted = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            INSERT INTO groups (id, name, created_by, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, true, $4, $4)
            ON CONFLICT (id) DO NOTHING
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(&group.id)
        .bind(&group.name)
        .bind(group.created_by)
        .bind(group.created_at)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(entity) = inserted else {
            tx.rollback().await?;
            timer.record();
            return Ok(CreatedGroup::IdTaken);
        };

        let creator = sqlx::query_as::<_, GroupMembershipEntity>(&format!(
            r#"
            INSERT INTO group_memberships (id, group_id, user_id, role, invited_by, is_active, joined_at, updated_at)
            VALUES ($1, $2, $3, 'creator', NULL, true, $4, $4)
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&entity.id)
        .bind(group.created_by)
        .bind(group.created_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await.map_err(commit_error)?;
        timer.record();
        Ok(CreatedGroup::Created(entity, creator))
    }

    /// Find an active group by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_group_by_id");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM groups
            WHERE id = $1 AND is_active = true
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Rename an active group.
    pub async fn rename_group(
        &self,
        id: &str,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<GroupEntity>, sqlx::Error> {
        let timer = QueryTimer::new("rename_group");
        let result = sqlx::query_as::<_, GroupEntity>(&format!(
            r#"
            UPDATE groups
            SET name = $2, updated_at = $3
            WHERE id = $1 AND is_active = true
            RETURNING {GROUP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft delete a group.
    pub async fn deactivate_group(&self, id: &str, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("deactivate_group");
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET is_active = false, updated_at = $2
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Count active groups created by a user.
    pub async fn count_created_by(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_groups_created_by");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM groups
            WHERE created_by = $1 AND is_active = true
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Get a user's active membership in an active group.
    pub async fn get_membership(
        &self,
        group_id: &str,
        user_id: Uuid,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("get_group_membership");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(
            r#"
            SELECT gm.id, gm.group_id, gm.user_id, gm.role, gm.invited_by, gm.is_active,
                   gm.joined_at, gm.updated_at
            FROM group_memberships gm
            JOIN groups g ON g.id = gm.group_id
            WHERE gm.group_id = $1 AND gm.user_id = $2
              AND gm.is_active = true AND g.is_active = true
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a non-creator member. Returns `None` if an active membership exists.
    pub async fn add_member(
        &self,
        membership: &NewMembership,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("add_group_member");
        let role_db: GroupRoleDb = membership.role.into();
        let result = sqlx::query_as::<_, GroupMembershipEntity>(&format!(
            r#"
            INSERT INTO group_memberships (id, group_id, user_id, role, invited_by, is_active, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, true, $6, $6)
            ON CONFLICT (group_id, user_id) WHERE is_active = true DO NOTHING
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&membership.group_id)
        .bind(membership.user_id)
        .bind(role_db)
        .bind(membership.invited_by)
        .bind(membership.joined_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update the role of a non-creator member.
    pub async fn update_member_role(
        &self,
        group_id: &str,
        user_id: Uuid,
        new_role: AssignableRole,
        now: DateTime<Utc>,
    ) -> Result<Option<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_member_role");
        let role_db: GroupRoleDb = new_role.into();
        let result = sqlx::query_as::<_, GroupMembershipEntity>(&format!(
            r#"
            UPDATE group_memberships
            SET role = $3, updated_at = $4
            WHERE group_id = $1 AND user_id = $2
              AND is_active = true AND role <> 'creator'
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(group_id)
        .bind(user_id)
        .bind(role_db)
        .bind(now)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Soft-remove a non-creator member.
    pub async fn remove_member(
        &self,
        group_id: &str,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("remove_group_member");
        let result = sqlx::query(
            r#"
            UPDATE group_memberships
            SET is_active = false, updated_at = $3
            WHERE group_id = $1 AND user_id = $2
              AND is_active = true AND role <> 'creator'
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// List active members of a group, creator first, then by join time.
    pub async fn list_members(
        &self,
        group_id: &str,
    ) -> Result<Vec<GroupMembershipEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_group_members");
        let result = sqlx::query_as::<_, GroupMembershipEntity>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM group_memberships
            WHERE group_id = $1 AND is_active = true
            ORDER BY (role = 'creator') DESC, joined_at ASC
            "#
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count active members in a group.
    pub async fn count_members(&self, group_id: &str) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_group_members");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM group_memberships
            WHERE group_id = $1 AND is_active = true
            "#,
        )
        .bind(group_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find all active groups a user belongs to.
    pub async fn find_user_groups(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<GroupWithRoleEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_groups");
        let result = sqlx::query_as::<_, GroupWithRoleEntity>(
            r#"
            SELECT
                g.id, g.name, g.created_by, g.is_active, g.created_at, g.updated_at,
                gm.role, gm.joined_at
            FROM groups g
            JOIN group_memberships gm ON g.id = gm.group_id
            WHERE gm.user_id = $1 AND gm.is_active = true AND g.is_active = true
            ORDER BY gm.joined_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: GroupRepository tests require database connection and are covered by integration tests
}
