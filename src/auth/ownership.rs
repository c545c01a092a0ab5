//! Per-row access control for lists and tasks.
//!
//! A list belongs to its `owner_id`; a task belongs to whoever owns its parent list.
//! Callers that may not see a row get the same answer as callers asking for a row that
//! does not exist, so ids cannot be probed.

use log::debug;
use thiserror::Error;

use crate::error::AppError;
use crate::models::{Task, TodoList};
use crate::store::{StoreError, TodoStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// A row the caller wants to act on, with whatever is needed to judge ownership.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    TodoList(&'a TodoList),
    /// `parent` is the task's list, or `None` if it could not be found.
    Task {
        task: &'a Task,
        parent: Option<&'a TodoList>,
    },
}

/// Decides whether `user_id` may act on `resource`.
pub fn authorize(user_id: i32, resource: Resource<'_>) -> Access {
    let list = match resource {
        Resource::TodoList(list) => list,
        Resource::Task {
            task,
            parent: Some(list),
        } if list.id == task.list_id => list,
        Resource::Task { .. } => return Access::Denied,
    };

    if list.owner_id == user_id {
        Access::Allowed
    } else {
        Access::Denied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    TodoList,
    Task,
}

impl ResourceKind {
    pub fn not_found_message(self) -> &'static str {
        match self {
            ResourceKind::TodoList => "Todo not found",
            ResourceKind::Task => "Task not found",
        }
    }
}

/// The row is missing or belongs to someone else; both look the same from outside.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("access denied to {0:?}")]
    Denied(ResourceKind),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<GuardError> for AppError {
    fn from(error: GuardError) -> AppError {
        match error {
            GuardError::Denied(kind) => AppError::NotFound(kind.not_found_message().into()),
            GuardError::Store(e) => e.into(),
        }
    }
}

/// Loads list `list_id` if `user_id` owns it.
pub async fn owned_list<S: TodoStore + ?Sized>(
    store: &S,
    user_id: i32,
    list_id: i32,
) -> Result<TodoList, GuardError> {
    let list = store.find_todo_list(list_id).await?;
    match list {
        Some(list) if authorize(user_id, Resource::TodoList(&list)) == Access::Allowed => Ok(list),
        _ => {
            debug!("user {} denied todo list {}", user_id, list_id);
            Err(GuardError::Denied(ResourceKind::TodoList))
        }
    }
}

/// Loads task `task_id` if `user_id` owns its parent list.
pub async fn owned_task<S: TodoStore + ?Sized>(
    store: &S,
    user_id: i32,
    task_id: i32,
) -> Result<Task, GuardError> {
    let denied = || {
        debug!("user {} denied task {}", user_id, task_id);
        GuardError::Denied(ResourceKind::Task)
    };

    let task = store.find_task(task_id).await?.ok_or_else(denied)?;
    let parent = store.find_todo_list(task.list_id).await?;

    let resource = Resource::Task {
        task: &task,
        parent: parent.as_ref(),
    };
    match authorize(user_id, resource) {
        Access::Allowed => Ok(task),
        Access::Denied => Err(denied()),
    }
}

/// Checks that a new task may be added to `list_id`.
///
/// Unlike reads, a refusal here is a 400: the caller named the list themselves.
pub async fn target_list_for_new_task<S: TodoStore + ?Sized>(
    store: &S,
    user_id: i32,
    list_id: i32,
) -> Result<TodoList, AppError> {
    match owned_list(store, user_id, list_id).await {
        Ok(list) => Ok(list),
        Err(GuardError::Denied(_)) => Err(AppError::BadRequest("Invalid todo list".into())),
        Err(GuardError::Store(e)) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const ALICE: i32 = 1;
    const BOB: i32 = 2;

    fn list(id: i32, owner_id: i32) -> TodoList {
        TodoList {
            id,
            owner_id,
            title: format!("list {}", id),
        }
    }

    fn task(id: i32, list_id: i32) -> Task {
        Task {
            id,
            list_id,
            note: None,
        }
    }

    #[test]
    fn test_list_owner_is_allowed() {
        let l = list(10, ALICE);
        assert_eq!(authorize(ALICE, Resource::TodoList(&l)), Access::Allowed);
        assert_eq!(authorize(BOB, Resource::TodoList(&l)), Access::Denied);
    }

    #[test]
    fn test_task_ownership_follows_parent_list() {
        let l = list(10, ALICE);
        let t = task(5, 10);
        let resource = Resource::Task {
            task: &t,
            parent: Some(&l),
        };
        assert_eq!(authorize(ALICE, resource), Access::Allowed);
        assert_eq!(authorize(BOB, resource), Access::Denied);
    }

    #[test]
    fn test_orphaned_task_is_denied() {
        let t = task(5, 10);
        let resource = Resource::Task {
            task: &t,
            parent: None,
        };
        assert_eq!(authorize(ALICE, resource), Access::Denied);
    }

    #[test]
    fn test_mismatched_parent_is_denied() {
        let unrelated = list(11, ALICE);
        let t = task(5, 10);
        let resource = Resource::Task {
            task: &t,
            parent: Some(&unrelated),
        };
        assert_eq!(authorize(ALICE, resource), Access::Denied);
    }

    #[actix_rt::test]
    async fn test_owned_list_hides_foreign_and_missing() {
        let store = MemoryStore::new();
        let l = store.create_todo_list(ALICE, "Alice's").await.unwrap();

        assert_eq!(owned_list(&store, ALICE, l.id).await.unwrap(), l);

        let foreign = owned_list(&store, BOB, l.id).await.unwrap_err();
        let missing = owned_list(&store, BOB, 999).await.unwrap_err();
        assert!(matches!(foreign, GuardError::Denied(ResourceKind::TodoList)));
        assert!(matches!(missing, GuardError::Denied(ResourceKind::TodoList)));
        assert_eq!(
            AppError::from(foreign).detail(),
            AppError::from(missing).detail()
        );
    }

    #[actix_rt::test]
    async fn test_owned_task_checks_parent() {
        let store = MemoryStore::new();
        let l = store.create_todo_list(ALICE, "Alice's").await.unwrap();
        let t = store.create_task(l.id, Some("note")).await.unwrap();

        assert_eq!(owned_task(&store, ALICE, t.id).await.unwrap(), t);

        let err = owned_task(&store, BOB, t.id).await.unwrap_err();
        assert_eq!(AppError::from(err).detail(), "Task not found");

        let err = owned_task(&store, ALICE, 999).await.unwrap_err();
        assert_eq!(AppError::from(err).detail(), "Task not found");
    }

    #[actix_rt::test]
    async fn test_new_task_target_is_a_client_error() {
        let store = MemoryStore::new();
        let l = store.create_todo_list(ALICE, "Alice's").await.unwrap();

        assert!(target_list_for_new_task(&store, ALICE, l.id).await.is_ok());

        let err = target_list_for_new_task(&store, BOB, l.id).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        let err = target_list_for_new_task(&store, BOB, 999).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
