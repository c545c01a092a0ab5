use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A single entry in a todo list.
///
/// Tasks carry no owner of their own: whoever owns the parent list owns the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    /// Identifier of the parent list.
    #[serde(rename = "todo_list")]
    pub list_id: i32,
    pub note: Option<String>,
}

/// Body accepted when creating a task.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    /// The list the task is added to; the caller must own it.
    pub todo_list: i32,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Body accepted when editing a task's note.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}
