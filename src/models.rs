//! Data models shared between the store and the HTTP surface.
//!
//! Uses String for IDs and timestamps for maximum compatibility with
//! clients; the wire representation is camelCase throughout.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A todo item, in both its stored and serialized shape.
///
/// `deleted_at` is present exactly when `is_deleted` is true; the store
/// maintains that equivalence on every transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "todoId")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub priority: i64,
    pub is_completed: bool,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
    pub deleted_at: Option<String>,
}

/// A registered account. Not serializable: the hash stays server-side
/// and responses pick fields explicitly.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: String,
}

/// Visibility class a listing selects via the `status` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Not deleted and not completed.
    Active,
    /// Not deleted and completed.
    Completed,
    /// In the trash.
    Deleted,
    /// Everything not deleted; the default when no filter is given.
    NotDeleted,
}

impl StatusFilter {
    /// Absent or empty selects the default view; any other value must be
    /// one of the three exact lowercase filter names.
    pub fn from_param(param: Option<&str>) -> Result<Self, ApiError> {
        match param {
            None | Some("") => Ok(Self::NotDeleted),
            Some("active") => Ok(Self::Active),
            Some("completed") => Ok(Self::Completed),
            Some("deleted") => Ok(Self::Deleted),
            Some(_) => Err(ApiError::InvalidFilter),
        }
    }
}

/// Body of `POST /api/todos`. Every field is optional so that absence
/// surfaces as a missing-fields error instead of a deserialization
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PUT /api/todos/{id}`. Only supplied fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Body of `PATCH /api/todos/{id}/priority`. The value is kept as raw
/// JSON so non-integers report an invalid priority rather than a body
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReorderRequest {
    pub priority: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}
