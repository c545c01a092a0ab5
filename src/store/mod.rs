//! Persistence contracts.
//!
//! Handlers and the authenticator only see the traits in this module. `PgStore` backs them
//! with PostgreSQL; `MemoryStore` keeps everything in process and is what the test suite
//! and database-less runs use.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AppError;
use crate::models::{Task, TodoList, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Column whose uniqueness a write would have broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Title,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for {0:?}")]
    Duplicate(UniqueField),
    /// A task was written against a list that does not exist.
    #[error("todo list {0} does not exist")]
    MissingParent(i32),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::Duplicate(UniqueField::Username) => {
                AppError::BadRequest("User already exists".into())
            }
            StoreError::Duplicate(UniqueField::Title) => {
                AppError::BadRequest("Todo with this title already exists".into())
            }
            StoreError::MissingParent(_) => AppError::BadRequest("Invalid todo list".into()),
            StoreError::Unavailable(msg) => AppError::DatabaseError(msg),
        }
    }
}

/// Username → password-hash records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user. Fails with `Duplicate(Username)` if the name is taken.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError>;
}

/// Lists and their tasks. No method here checks ownership; callers go through
/// `auth::ownership` first.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Lists owned by `owner_id`, ordered by id.
    async fn list_todo_lists(&self, owner_id: i32) -> Result<Vec<TodoList>, StoreError>;

    async fn find_todo_list(&self, id: i32) -> Result<Option<TodoList>, StoreError>;

    async fn find_todo_list_by_title(&self, title: &str) -> Result<Option<TodoList>, StoreError>;

    /// Fails with `Duplicate(Title)` if any list already has `title`.
    async fn create_todo_list(&self, owner_id: i32, title: &str) -> Result<TodoList, StoreError>;

    /// Returns `None` if the list no longer exists.
    async fn update_todo_list(&self, id: i32, title: &str)
        -> Result<Option<TodoList>, StoreError>;

    /// Deletes the list and every task in it. Returns whether a list was removed.
    async fn delete_todo_list(&self, id: i32) -> Result<bool, StoreError>;

    /// Tasks in any list owned by `owner_id`, ordered by id.
    async fn list_tasks_for_owner(&self, owner_id: i32) -> Result<Vec<Task>, StoreError>;

    async fn list_tasks_in_list(&self, list_id: i32) -> Result<Vec<Task>, StoreError>;

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError>;

    /// Fails with `MissingParent` if list `list_id` does not exist.
    async fn create_task(&self, list_id: i32, note: Option<&str>) -> Result<Task, StoreError>;

    async fn update_task(&self, id: i32, note: Option<&str>) -> Result<Option<Task>, StoreError>;

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError>;
}

/// Everything the HTTP handlers need from persistence.
pub trait Store: CredentialStore + TodoStore {}

impl<T: CredentialStore + TodoStore> Store for T {}
