use grouper_auth::{AuthConfig, IdentityResolver};
use grouper_core::error::GrouperResult;
use grouper_core::identity::Identity;
use grouper_core::repository::{
    AccessTokenRepository, GroupRepository, MembershipRepository, Pagination, UserRepository,
};
use grouper_groups::{AddUserToGroup, GroupService, MembershipService};
use serde::Deserialize;

use crate::response::ApiResponse;

/// Body of `POST /groups`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateGroupRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// Body of `POST /groups/{group_id}/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddUserRequest {
    pub user_id: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// Body of `PUT /groups/{group_id}/users/{user_id}/admin`.
#[derive(Debug, Clone, Deserialize)]
pub struct SetGroupAdminRequest {
    pub is_group_admin: bool,
}

/// Request boundary for group and membership operations.
///
/// Every call takes the raw access token as presented (or `None`),
/// resolves it once, and renders either the success body or the mapped
/// error. Handlers never panic on caller input.
pub struct GroupApi<T, U, G, M>
where
    T: AccessTokenRepository,
    U: UserRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    resolver: IdentityResolver<T, U>,
    groups: GroupService<G>,
    memberships: MembershipService<G, U, M>,
}

impl<T, U, G, M> GroupApi<T, U, G, M>
where
    T: AccessTokenRepository,
    U: UserRepository,
    G: GroupRepository,
    M: MembershipRepository,
{
    pub fn new(
        resolver: IdentityResolver<T, U>,
        groups: GroupService<G>,
        memberships: MembershipService<G, U, M>,
    ) -> Self {
        Self {
            resolver,
            groups,
            memberships,
        }
    }

    /// `POST /groups` → 200 `{id, name}`.
    pub async fn create_group(&self, token: Option<&str>, req: CreateGroupRequest) -> ApiResponse {
        let name = req.name.unwrap_or_default();
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self.groups.create_group(&identity, &name).await;

        match result {
            Ok(group) => ApiResponse::group(&group),
            Err(e) => e.into(),
        }
    }

    /// `GET /groups/{group_id}` → 200 `{id, name}`.
    pub async fn get_group(&self, token: Option<&str>, group_id: &str) -> ApiResponse {
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self.groups.get_group(&identity, group_id).await;

        match result {
            Ok(group) => ApiResponse::group(&group),
            Err(e) => e.into(),
        }
    }

    /// `DELETE /groups/{group_id}` → 204.
    pub async fn delete_group(&self, token: Option<&str>, group_id: &str) -> ApiResponse {
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self.groups.delete_group(&identity, group_id).await;

        no_content(result)
    }

    /// `POST /groups/{group_id}/users` → 204.
    pub async fn add_user(
        &self,
        token: Option<&str>,
        group_id: &str,
        req: AddUserRequest,
    ) -> ApiResponse {
        let input = AddUserToGroup {
            group_id: group_id.to_string(),
            user_id: req.user_id,
            expiration_date: req.expiration_date,
        };
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self.memberships.add_user_to_group(&identity, input).await;

        no_content(result)
    }

    /// `DELETE /groups/{group_id}/users/{user_id}` → 204.
    pub async fn remove_user(
        &self,
        token: Option<&str>,
        group_id: &str,
        user_id: &str,
    ) -> ApiResponse {
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self
            .memberships
            .remove_user_from_group(&identity, group_id, user_id)
            .await;

        no_content(result)
    }

    /// `PUT /groups/{group_id}/users/{user_id}/admin` → 204.
    pub async fn set_group_admin(
        &self,
        token: Option<&str>,
        group_id: &str,
        user_id: &str,
        req: SetGroupAdminRequest,
    ) -> ApiResponse {
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self
            .memberships
            .set_group_admin(&identity, group_id, user_id, req.is_group_admin)
            .await;

        no_content(result)
    }

    /// `GET /groups/{group_id}/users` → 200 `{total, items}`.
    pub async fn list_members(
        &self,
        token: Option<&str>,
        group_id: &str,
        pagination: Pagination,
    ) -> ApiResponse {
        let identity = match self.identity(token).await {
            Ok(identity) => identity,
            Err(response) => return response,
        };
        let result = self
            .memberships
            .list_members(&identity, group_id, pagination)
            .await;

        match result {
            Ok(page) => ApiResponse::members(&page.items, page.total),
            Err(e) => e.into(),
        }
    }

    async fn identity(&self, token: Option<&str>) -> Result<Identity, ApiResponse> {
        self.resolver.resolve(token).await.map_err(ApiResponse::from)
    }
}

impl<T, U, G, M> GroupApi<T, U, G, M>
where
    T: AccessTokenRepository,
    U: UserRepository + Clone,
    G: GroupRepository + Clone,
    M: MembershipRepository,
{
    /// Wire resolver and services over one set of repositories.
    pub fn from_repositories(
        tokens: T,
        users: U,
        groups: G,
        memberships: M,
        auth: AuthConfig,
    ) -> Self {
        Self::new(
            IdentityResolver::new(tokens, users.clone(), auth),
            GroupService::new(groups.clone()),
            MembershipService::new(groups, users, memberships),
        )
    }
}

fn no_content<T>(result: GrouperResult<T>) -> ApiResponse {
    match result {
        Ok(_) => ApiResponse::no_content(),
        Err(e) => e.into(),
    }
}
