use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A named list of tasks, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TodoList {
    pub id: i32,
    /// Identifier of the owning user.
    #[serde(rename = "user")]
    pub owner_id: i32,
    /// Title, unique across every list in the system.
    pub title: String,
}

/// Body accepted when creating or renaming a list.
///
/// Only the title is read; an owner supplied by the client is ignored, the owner is
/// always the authenticated caller.
#[derive(Debug, Deserialize, Validate)]
pub struct TodoListInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}
