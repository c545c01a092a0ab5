use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, TodoStore, UniqueField};
use crate::models::{Task, TodoList, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    lists: BTreeMap<i32, TodoList>,
    tasks: BTreeMap<i32, Task>,
    last_user_id: i32,
    last_list_id: i32,
    last_task_id: i32,
}

/// In-process store with the same constraints as the SQL schema: unique usernames,
/// globally unique list titles, and list deletion cascading to tasks.
///
/// Every operation holds the lock for its whole duration, so uniqueness checks and
/// inserts cannot interleave.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Duplicate(UniqueField::Username));
        }
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_user(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list_todo_lists(&self, owner_id: i32) -> Result<Vec<TodoList>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .lists
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn find_todo_list(&self, id: i32) -> Result<Option<TodoList>, StoreError> {
        Ok(self.tables.read().await.lists.get(&id).cloned())
    }

    async fn find_todo_list_by_title(&self, title: &str) -> Result<Option<TodoList>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.lists.values().find(|l| l.title == title).cloned())
    }

    async fn create_todo_list(&self, owner_id: i32, title: &str) -> Result<TodoList, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.lists.values().any(|l| l.title == title) {
            return Err(StoreError::Duplicate(UniqueField::Title));
        }
        tables.last_list_id += 1;
        let list = TodoList {
            id: tables.last_list_id,
            owner_id,
            title: title.to_string(),
        };
        tables.lists.insert(list.id, list.clone());
        Ok(list)
    }

    async fn update_todo_list(
        &self,
        id: i32,
        title: &str,
    ) -> Result<Option<TodoList>, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.lists.values().any(|l| l.id != id && l.title == title) {
            return Err(StoreError::Duplicate(UniqueField::Title));
        }
        Ok(tables.lists.get_mut(&id).map(|list| {
            list.title = title.to_string();
            list.clone()
        }))
    }

    async fn delete_todo_list(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.lists.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, task| task.list_id != id);
        Ok(true)
    }

    async fn list_tasks_for_owner(&self, owner_id: i32) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|task| {
                tables
                    .lists
                    .get(&task.list_id)
                    .map_or(false, |list| list.owner_id == owner_id)
            })
            .cloned()
            .collect())
    }

    async fn list_tasks_in_list(&self, list_id: i32) -> Result<Vec<Task>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn create_task(&self, list_id: i32, note: Option<&str>) -> Result<Task, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.lists.contains_key(&list_id) {
            return Err(StoreError::MissingParent(list_id));
        }
        tables.last_task_id += 1;
        let task = Task {
            id: tables.last_task_id,
            list_id,
            note: note.map(str::to_string),
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i32, note: Option<&str>) -> Result<Option<Task>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.note = note.map(str::to_string);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}
