//! Authorization engine.
//!
//! Two privilege levels exist: system admins manage every group, group
//! admins manage only the group whose membership carries the admin
//! flag. Creating a group needs system admin.

use grouper_core::error::{GrouperError, GrouperResult};
use grouper_core::models::group::Group;
use grouper_core::models::membership::Membership;
use grouper_core::models::user::User;
use grouper_core::repository::MembershipRepository;

/// Why an actor may (or may not) manage a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAccess {
    SystemAdmin,
    GroupAdmin,
    Denied,
}

impl GroupAccess {
    pub fn is_allowed(self) -> bool {
        !matches!(self, GroupAccess::Denied)
    }
}

/// Pure policy: decide access from the actor and the actor's
/// membership in `group`, if any.
///
/// A membership for some other user or group never grants access.
pub fn evaluate(actor: &User, group: &Group, membership: Option<&Membership>) -> GroupAccess {
    if actor.is_system_admin {
        return GroupAccess::SystemAdmin;
    }
    match membership {
        Some(m) if m.group_id == group.id && m.user_id == actor.id && m.is_group_admin => {
            GroupAccess::GroupAdmin
        }
        _ => GroupAccess::Denied,
    }
}

pub fn can_create_group(actor: &User) -> bool {
    actor.is_system_admin
}

/// Deleting drops every membership, so it stays with system admins
/// even for group admins of that group.
pub fn can_delete_group(actor: &User) -> bool {
    actor.is_system_admin
}

/// Resolve the actor's access to `group`, reading the membership only
/// when the actor isn't a system admin.
pub async fn group_access<M: MembershipRepository>(
    memberships: &M,
    actor: &User,
    group: &Group,
) -> GrouperResult<GroupAccess> {
    if actor.is_system_admin {
        return Ok(GroupAccess::SystemAdmin);
    }
    let membership = match memberships.get(group.id, actor.id).await {
        Ok(m) => Some(m),
        Err(GrouperError::NotFound { .. }) => None,
        Err(e) => return Err(e),
    };
    Ok(evaluate(actor, group, membership.as_ref()))
}

pub async fn can_manage_group<M: MembershipRepository>(
    memberships: &M,
    actor: &User,
    group: &Group,
) -> GrouperResult<bool> {
    Ok(group_access(memberships, actor, group).await?.is_allowed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(is_system_admin: bool) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            is_system_admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn group() -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "jumbo".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn membership(group: &Group, user: &User, is_group_admin: bool) -> Membership {
        Membership {
            group_id: group.id,
            user_id: user.id,
            is_group_admin,
            expiration_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn system_admin_manages_any_group() {
        let admin = user(true);
        assert_eq!(evaluate(&admin, &group(), None), GroupAccess::SystemAdmin);
        assert!(can_create_group(&admin));
    }

    #[test]
    fn group_admin_manages_own_group_only() {
        let actor = user(false);
        let g = group();
        let other = group();
        let m = membership(&g, &actor, true);

        assert_eq!(evaluate(&actor, &g, Some(&m)), GroupAccess::GroupAdmin);
        assert_eq!(evaluate(&actor, &other, Some(&m)), GroupAccess::Denied);
        assert!(!can_create_group(&actor));
        assert!(!can_delete_group(&actor));
    }

    #[test]
    fn plain_member_is_denied() {
        let actor = user(false);
        let g = group();
        let m = membership(&g, &actor, false);
        assert_eq!(evaluate(&actor, &g, Some(&m)), GroupAccess::Denied);
        assert_eq!(evaluate(&actor, &g, None), GroupAccess::Denied);
    }

    #[test]
    fn someone_elses_admin_membership_is_ignored() {
        let actor = user(false);
        let g = group();
        let m = membership(&g, &user(false), true);
        assert!(!evaluate(&actor, &g, Some(&m)).is_allowed());
    }
}
