//! Group lifecycle service: creation with conflict reporting, lookup,
//! listing and deletion.

use grouper_core::error::{GrouperError, GrouperResult};
use grouper_core::identity::Identity;
use grouper_core::models::group::{CreateGroup, Group};
use grouper_core::repository::{GroupRepository, PaginatedResult, Pagination};
use tracing::{info, warn};

use crate::authz;
use crate::ids::parse_group_id;

/// Upper bound on insert attempts when the conflicting row disappears
/// between the failed insert and the follow-up read.
const MAX_CREATE_ATTEMPTS: u32 = 3;

pub struct GroupService<G: GroupRepository> {
    groups: G,
}

impl<G: GroupRepository> GroupService<G> {
    pub fn new(groups: G) -> Self {
        Self { groups }
    }

    /// Create a group named `name`.
    ///
    /// Only system admins may create groups. If the name is taken the
    /// call fails with [`GrouperError::GroupConflict`] carrying the
    /// existing group, never with a duplicate and never with a silent
    /// success.
    pub async fn create_group(&self, identity: &Identity, name: &str) -> GrouperResult<Group> {
        let actor = identity.require_user()?;
        if !authz::can_create_group(actor) {
            warn!(actor_id = %actor.id, "Group creation denied");
            return Err(GrouperError::Unauthorized {
                reason: "only system admins can create groups".into(),
            });
        }

        if name.trim().is_empty() {
            return Err(GrouperError::Validation {
                message: "group name is required".into(),
            });
        }

        for _ in 0..MAX_CREATE_ATTEMPTS {
            let input = CreateGroup {
                name: name.to_string(),
            };
            match self.groups.create(input).await {
                Ok(group) => {
                    info!(group_id = %group.id, name = %group.name, actor_id = %actor.id, "Group created");
                    return Ok(group);
                }
                // The unique index picked another writer; report its row.
                Err(GrouperError::AlreadyExists { .. }) => match self.groups.get_by_name(name).await {
                    Ok(existing) => {
                        return Err(GrouperError::GroupConflict {
                            id: existing.id,
                            name: existing.name,
                        });
                    }
                    Err(GrouperError::NotFound { .. }) => continue,
                    Err(e) => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }

        Err(GrouperError::Internal(format!(
            "group '{name}' could not be created or read back after {MAX_CREATE_ATTEMPTS} attempts"
        )))
    }

    pub async fn get_group(&self, identity: &Identity, group_id: &str) -> GrouperResult<Group> {
        identity.require_user()?;
        let id = parse_group_id(group_id)?;
        self.groups.get_by_id(id).await
    }

    pub async fn list_groups(
        &self,
        identity: &Identity,
        pagination: Pagination,
    ) -> GrouperResult<PaginatedResult<Group>> {
        identity.require_user()?;
        self.groups.list(pagination).await
    }

    /// Delete a group and every membership in it. System admins only.
    pub async fn delete_group(&self, identity: &Identity, group_id: &str) -> GrouperResult<()> {
        let actor = identity.require_user()?;
        let group = self.groups.get_by_id(parse_group_id(group_id)?).await?;

        if !authz::can_delete_group(actor) {
            warn!(actor_id = %actor.id, group_id = %group.id, "Group deletion denied");
            return Err(GrouperError::Unauthorized {
                reason: "only system admins can delete groups".into(),
            });
        }

        self.groups.delete(group.id).await?;
        info!(group_id = %group.id, name = %group.name, actor_id = %actor.id, "Group deleted");
        Ok(())
    }
}
