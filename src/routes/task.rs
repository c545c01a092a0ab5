use crate::{
    auth::{
        ownership::{owned_task, target_list_for_new_task, ResourceKind},
        AuthenticatedUserId, MessageResponse,
    },
    error::AppError,
    models::{TaskInput, TaskUpdate},
    store::Store,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound(ResourceKind::Task.not_found_message().into())
}

/// Retrieves every task in every list the authenticated user owns.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects, ordered by id.
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks = store.list_tasks_for_owner(user_id.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task in one of the caller's lists.
///
/// ## Request Body:
/// - `todo_list`: id of the parent list (must be owned by the caller).
/// - `note` (optional): free text, at most 1000 characters.
///
/// ## Responses:
/// - `200 OK`: The new `Task`.
/// - `400 Bad Request`: The list does not exist or belongs to someone else ("Invalid todo list").
/// - `422 Unprocessable Entity`: Note too long.
#[post("")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let list = target_list_for_new_task(store.get_ref(), user_id.0, task_data.todo_list).await?;
    let task = store
        .create_task(list.id, task_data.note.as_deref())
        .await?;
    info!("user {} created task {} in list {}", user_id.0, task.id, list.id);

    Ok(HttpResponse::Ok().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `404 Not Found`: No such task, or its list belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(store.get_ref(), user_id.0, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces the note of a task. The parent list cannot be changed.
///
/// ## Responses:
/// - `200 OK`: The updated `Task`.
/// - `404 Not Found`: No such task, or its list belongs to someone else.
/// - `422 Unprocessable Entity`: Note too long.
#[put("/{id}")]
pub async fn update_task(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = owned_task(store.get_ref(), user_id.0, task_id.into_inner()).await?;

    let updated = store
        .update_task(task.id, task_data.note.as_deref())
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{"msg": "Task deleted successfully"}`.
/// - `404 Not Found`: No such task, or its list belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(store.get_ref(), user_id.0, task_id.into_inner()).await?;

    if !store.delete_task(task.id).await? {
        return Err(task_not_found());
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("Task deleted successfully")))
}
