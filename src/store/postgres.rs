use async_trait::async_trait;
use log::info;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{CredentialStore, StoreError, TodoStore, UniqueField};
use crate::models::{Task, TodoList, User};

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        StoreError::Unavailable(error.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(error: sqlx::migrate::MigrateError) -> StoreError {
        StoreError::Unavailable(format!("migration failed: {}", error))
    }
}

/// Maps a foreign-key violation on a task insert to `MissingParent`.
fn missing_parent_or(error: sqlx::Error, list_id: i32) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::MissingParent(list_id)
        }
        _ => error.into(),
    }
}

/// Maps a unique-constraint violation to `Duplicate(field)`; anything else is a storage failure.
fn unique_or(error: sqlx::Error, field: UniqueField) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(field),
        _ => error.into(),
    }
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations in `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2)
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or(e, UniqueField::Username))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn list_todo_lists(&self, owner_id: i32) -> Result<Vec<TodoList>, StoreError> {
        let lists = sqlx::query_as::<_, TodoList>(
            "SELECT id, owner_id, title FROM todo_lists WHERE owner_id = $1 ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    async fn find_todo_list(&self, id: i32) -> Result<Option<TodoList>, StoreError> {
        let list =
            sqlx::query_as::<_, TodoList>("SELECT id, owner_id, title FROM todo_lists WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(list)
    }

    async fn find_todo_list_by_title(&self, title: &str) -> Result<Option<TodoList>, StoreError> {
        let list = sqlx::query_as::<_, TodoList>(
            "SELECT id, owner_id, title FROM todo_lists WHERE title = $1",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }

    async fn create_todo_list(&self, owner_id: i32, title: &str) -> Result<TodoList, StoreError> {
        sqlx::query_as::<_, TodoList>(
            "INSERT INTO todo_lists (owner_id, title) VALUES ($1, $2)
             RETURNING id, owner_id, title",
        )
        .bind(owner_id)
        .bind(title)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_or(e, UniqueField::Title))
    }

    async fn update_todo_list(
        &self,
        id: i32,
        title: &str,
    ) -> Result<Option<TodoList>, StoreError> {
        sqlx::query_as::<_, TodoList>(
            "UPDATE todo_lists SET title = $1 WHERE id = $2
             RETURNING id, owner_id, title",
        )
        .bind(title)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| unique_or(e, UniqueField::Title))
    }

    async fn delete_todo_list(&self, id: i32) -> Result<bool, StoreError> {
        // tasks go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM todo_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tasks_for_owner(&self, owner_id: i32) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT t.id, t.list_id, t.note
             FROM tasks t JOIN todo_lists l ON l.id = t.list_id
             WHERE l.owner_id = $1
             ORDER BY t.id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn list_tasks_in_list(&self, list_id: i32) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT id, list_id, note FROM tasks WHERE list_id = $1 ORDER BY id",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>("SELECT id, list_id, note FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn create_task(&self, list_id: i32, note: Option<&str>) -> Result<Task, StoreError> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (list_id, note) VALUES ($1, $2) RETURNING id, list_id, note",
        )
        .bind(list_id)
        .bind(note)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_parent_or(e, list_id))
    }

    async fn update_task(&self, id: i32, note: Option<&str>) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET note = $1 WHERE id = $2 RETURNING id, list_id, note",
        )
        .bind(note)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
