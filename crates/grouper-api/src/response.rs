//! Outcome → status code and JSON body.

use grouper_core::error::GrouperError;
use grouper_core::models::group::Group;
use grouper_core::models::membership::{Membership, format_expiration_date};
use http::StatusCode;
use serde_json::{Value, json};

/// `status` field of the duplicate-name response body.
pub const GROUP_ALREADY_EXIST: &str = "group already exist";

/// A rendered response: status plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }

    pub fn group(group: &Group) -> Self {
        Self::json(StatusCode::OK, json!({ "id": group.id, "name": group.name }))
    }

    pub fn members(members: &[Membership], total: u64) -> Self {
        let items: Vec<Value> = members
            .iter()
            .map(|m| {
                json!({
                    "user_id": m.user_id,
                    "is_group_admin": m.is_group_admin,
                    "expiration_date": m.expiration_date.map(format_expiration_date),
                })
            })
            .collect();
        Self::json(StatusCode::OK, json!({ "total": total, "items": items }))
    }

    /// Serialized body, empty when there is none.
    pub fn body_string(&self) -> String {
        self.body.as_ref().map(Value::to_string).unwrap_or_default()
    }

    fn error(status: StatusCode, code: &str, message: String) -> Self {
        Self::json(
            status,
            json!({ "error": { "code": code, "message": message } }),
        )
    }
}

impl From<GrouperError> for ApiResponse {
    fn from(err: GrouperError) -> Self {
        match err {
            GrouperError::GroupConflict { id, name } => Self::json(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "status": GROUP_ALREADY_EXIST, "id": id, "name": name }),
            ),
            GrouperError::Unauthenticated { .. } => Self::error(
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                err.to_string(),
            ),
            GrouperError::Unauthorized { .. } => {
                Self::error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
            }
            GrouperError::NotFound { .. } => {
                Self::error(StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
            }
            GrouperError::InvalidReference { .. } => Self::error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_REFERENCE",
                err.to_string(),
            ),
            GrouperError::AlreadyExists { .. } => {
                Self::error(StatusCode::UNPROCESSABLE_ENTITY, "CONFLICT", err.to_string())
            }
            GrouperError::Validation { .. } => Self::error(
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                err.to_string(),
            ),
            GrouperError::Database(_) | GrouperError::Internal(_) => {
                tracing::error!(error = %err, "Request failed");
                Self::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".into(),
                )
            }
        }
    }
}
