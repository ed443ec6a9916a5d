//! Membership service: adding, removing and promoting group members.
//!
//! Every mutating operation runs the same checks in the same order:
//!
//! 1. the caller is authenticated,
//! 2. the group exists (`NotFound`),
//! 3. the target user exists (`InvalidReference`),
//! 4. the caller may manage the group (`Unauthorized`).
//!
//! The order fixes which outcome wins when several apply. Nothing is
//! written unless all checks pass.

use chrono::NaiveDate;
use grouper_core::error::{GrouperError, GrouperResult};
use grouper_core::identity::Identity;
use grouper_core::models::group::Group;
use grouper_core::models::membership::{Membership, UpsertMembership, parse_expiration_date};
use grouper_core::models::user::User;
use grouper_core::repository::{
    GroupRepository, MembershipRepository, PaginatedResult, Pagination, UserRepository,
};
use tracing::{info, warn};

use crate::authz;
use crate::ids::{parse_group_id, parse_user_id};

/// Raw add-user request as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct AddUserToGroup {
    pub group_id: String,
    pub user_id: String,
    /// ISO `YYYY-MM-DD`; absent or blank means non-expiring.
    pub expiration_date: Option<String>,
}

pub struct MembershipService<G, U, M>
where
    G: GroupRepository,
    U: UserRepository,
    M: MembershipRepository,
{
    groups: G,
    users: U,
    memberships: M,
}

impl<G, U, M> MembershipService<G, U, M>
where
    G: GroupRepository,
    U: UserRepository,
    M: MembershipRepository,
{
    pub fn new(groups: G, users: U, memberships: M) -> Self {
        Self {
            groups,
            users,
            memberships,
        }
    }

    /// Add `user_id` to `group_id`, or update the existing membership's
    /// expiration date. The group-admin flag of an existing membership
    /// is left as is.
    pub async fn add_user_to_group(
        &self,
        identity: &Identity,
        input: AddUserToGroup,
    ) -> GrouperResult<Membership> {
        let (actor, group, target) = self
            .authorize_member_change(identity, &input.group_id, &input.user_id)
            .await?;

        let expiration_date = parse_expiration_date(input.expiration_date.as_deref())?;

        let membership = self
            .memberships
            .upsert(UpsertMembership {
                group_id: group.id,
                user_id: target.id,
                is_group_admin: None,
                expiration_date: Some(expiration_date),
            })
            .await?;

        info!(
            group_id = %group.id,
            user_id = %target.id,
            actor_id = %actor.id,
            expiration_date = ?membership.expiration_date,
            "User added to group"
        );
        Ok(membership)
    }

    /// Remove `user_id` from `group_id`. Removing a non-member succeeds.
    pub async fn remove_user_from_group(
        &self,
        identity: &Identity,
        group_id: &str,
        user_id: &str,
    ) -> GrouperResult<()> {
        let (actor, group, target) = self
            .authorize_member_change(identity, group_id, user_id)
            .await?;

        self.memberships.remove(group.id, target.id).await?;

        info!(group_id = %group.id, user_id = %target.id, actor_id = %actor.id, "User removed from group");
        Ok(())
    }

    /// Grant or revoke group-admin rights, creating the membership if
    /// the user is not in the group yet.
    pub async fn set_group_admin(
        &self,
        identity: &Identity,
        group_id: &str,
        user_id: &str,
        is_group_admin: bool,
    ) -> GrouperResult<Membership> {
        let (actor, group, target) = self
            .authorize_member_change(identity, group_id, user_id)
            .await?;

        let membership = self
            .memberships
            .upsert(UpsertMembership {
                group_id: group.id,
                user_id: target.id,
                is_group_admin: Some(is_group_admin),
                expiration_date: None,
            })
            .await?;

        info!(
            group_id = %group.id,
            user_id = %target.id,
            actor_id = %actor.id,
            is_group_admin,
            "Group admin flag updated"
        );
        Ok(membership)
    }

    /// Memberships of `group_id`, visible to whoever may manage it.
    pub async fn list_members(
        &self,
        identity: &Identity,
        group_id: &str,
        pagination: Pagination,
    ) -> GrouperResult<PaginatedResult<Membership>> {
        let actor = identity.require_user()?;
        let group = self.resolve_group(group_id).await?;
        self.authorize(actor, &group).await?;

        self.memberships.list_by_group(group.id, pagination).await
    }

    /// Memberships of `group_id` still valid on `today`.
    pub async fn active_members(
        &self,
        identity: &Identity,
        group_id: &str,
        today: NaiveDate,
    ) -> GrouperResult<Vec<Membership>> {
        let actor = identity.require_user()?;
        let group = self.resolve_group(group_id).await?;
        self.authorize(actor, &group).await?;

        let mut pagination = Pagination::default();
        let mut active = Vec::new();
        loop {
            let page = self
                .memberships
                .list_by_group(group.id, pagination.clone())
                .await?;
            let fetched = page.items.len() as u64;
            active.extend(page.items.into_iter().filter(|m| !m.is_expired_on(today)));
            pagination.offset += fetched;
            if fetched == 0 || pagination.offset >= page.total {
                return Ok(active);
            }
        }
    }

    async fn authorize_member_change<'a>(
        &self,
        identity: &'a Identity,
        group_id: &str,
        user_id: &str,
    ) -> GrouperResult<(&'a User, Group, User)> {
        let actor = identity.require_user()?;
        let group = self.resolve_group(group_id).await?;
        let target = self.resolve_user(user_id).await?;
        self.authorize(actor, &group).await?;
        Ok((actor, group, target))
    }

    async fn resolve_group(&self, raw: &str) -> GrouperResult<Group> {
        self.groups.get_by_id(parse_group_id(raw)?).await
    }

    async fn resolve_user(&self, raw: &str) -> GrouperResult<User> {
        let id = parse_user_id(raw)?;
        self.users.get_by_id(id).await.map_err(|e| match e {
            GrouperError::NotFound { entity, id } => GrouperError::InvalidReference { entity, id },
            other => other,
        })
    }

    async fn authorize(&self, actor: &User, group: &Group) -> GrouperResult<()> {
        if authz::can_manage_group(&self.memberships, actor, group).await? {
            return Ok(());
        }
        warn!(actor_id = %actor.id, group_id = %group.id, "Group management denied");
        Err(GrouperError::Unauthorized {
            reason: format!("not allowed to manage group {}", group.name),
        })
    }
}
