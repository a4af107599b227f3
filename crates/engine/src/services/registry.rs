//! Group registry: creation under quota, lookup, rename and deactivation.

use std::sync::Arc;

use domain::models::{CreateGroupRequest, Group, NewGroup, Permission, RenameGroupRequest};
use domain::services::Clock;
use domain::store::{CreateGroupOutcome, GroupStore, Store};
use domain::{GroupError, StoreError};
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::authorize;
use crate::config::LimitsConfig;

/// Produces candidate group ids.
pub type GroupIdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct GroupRegistry {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    limits: LimitsConfig,
    id_generator: GroupIdGenerator,
}

impl GroupRegistry {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, limits: LimitsConfig) -> Self {
        Self {
            store,
            clock,
            limits,
            id_generator: Arc::new(shared::tokens::generate_group_id),
        }
    }

    /// Replaces the random id source.
    pub fn with_id_generator(mut self, id_generator: GroupIdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// Creates a group owned by `creator_id`, who becomes its only CREATOR.
    ///
    /// The quota check, group row and creator membership are written as one
    /// unit. A colliding id is replaced with a fresh one up to
    /// `limits.group_id_attempts` times.
    pub async fn create_group(&self, name: &str, creator_id: Uuid) -> Result<Group, GroupError> {
        let request = CreateGroupRequest {
            name: name.to_string(),
        };
        request.validate()?;

        let limit = self.limits.max_groups_per_creator;
        for attempt in 1..=self.limits.group_id_attempts {
            let candidate = NewGroup {
                id: (self.id_generator)(),
                name: request.name.clone(),
                created_by: creator_id,
                created_at: self.clock.now(),
            };

            match self.store.create_group_with_creator(candidate, limit).await? {
                CreateGroupOutcome::Created { group, .. } => {
                    info!(
                        group_id = %group.id,
                        group_name = %group.name,
                        user_id = %creator_id,
                        "Group created"
                    );
                    return Ok(group);
                }
                CreateGroupOutcome::QuotaReached => {
                    warn!(user_id = %creator_id, limit = limit, "Group quota reached");
                    return Err(GroupError::QuotaExceeded { limit });
                }
                CreateGroupOutcome::IdTaken => {
                    debug!(attempt = attempt, "Group id collision, regenerating");
                }
            }
        }

        Err(StoreError::UniqueViolation("groups_pkey".to_string()).into())
    }

    /// Returns an active group.
    pub async fn get_group(&self, group_id: &str) -> Result<Group, GroupError> {
        self.store
            .find_group(group_id)
            .await?
            .ok_or_else(|| GroupError::NotFound("Group not found".to_string()))
    }

    /// Renames a group. Requires `edit_group`.
    pub async fn rename_group(
        &self,
        group_id: &str,
        actor_id: Uuid,
        name: &str,
    ) -> Result<Group, GroupError> {
        let request = RenameGroupRequest {
            name: name.to_string(),
        };
        request.validate()?;

        authorize(self.store.as_ref(), group_id, actor_id, Permission::EditGroup).await?;

        let group = self
            .store
            .rename_group(group_id, &request.name, self.clock.now())
            .await?
            .ok_or_else(|| GroupError::NotFound("Group not found".to_string()))?;

        info!(
            group_id = %group_id,
            actor_user_id = %actor_id,
            group_name = %group.name,
            "Group renamed"
        );
        Ok(group)
    }

    /// Soft-deletes a group. Requires `delete_group`, which only the creator holds.
    ///
    /// Memberships and invitations are left in place but stop being visible.
    pub async fn deactivate_group(&self, group_id: &str, actor_id: Uuid) -> Result<(), GroupError> {
        authorize(self.store.as_ref(), group_id, actor_id, Permission::DeleteGroup).await?;

        if !self
            .store
            .deactivate_group(group_id, self.clock.now())
            .await?
        {
            return Err(GroupError::NotFound("Group not found".to_string()));
        }

        info!(group_id = %group_id, actor_user_id = %actor_id, "Group deactivated");
        Ok(())
    }

    /// Number of active groups `user_id` has created.
    pub async fn created_group_count(&self, user_id: Uuid) -> Result<i64, GroupError> {
        Ok(self.store.count_groups_created_by(user_id).await?)
    }
}
