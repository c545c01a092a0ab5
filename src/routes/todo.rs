use crate::{
    auth::{
        ownership::{owned_list, ResourceKind},
        AuthenticatedUserId, MessageResponse,
    },
    error::AppError,
    models::TodoListInput,
    store::Store,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use validator::Validate;

fn duplicate_title() -> AppError {
    AppError::BadRequest("Todo with this title already exists".into())
}

fn todo_not_found() -> AppError {
    AppError::NotFound(ResourceKind::TodoList.not_found_message().into())
}

/// Lists every todo list owned by the authenticated user, ordered by id.
///
/// ## Responses:
/// - `200 OK`: JSON array of `TodoList` objects (empty for a new user).
/// - `401 Unauthorized`: Missing or invalid bearer token.
#[get("")]
pub async fn get_todos(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let lists = store.list_todo_lists(user_id.0).await?;
    Ok(HttpResponse::Ok().json(lists))
}

/// Creates a todo list owned by the authenticated user.
///
/// Only `title` is read from the body; the owner is always the caller.
///
/// ## Responses:
/// - `200 OK`: The new `TodoList`.
/// - `400 Bad Request`: Some list already has this title.
/// - `422 Unprocessable Entity`: Empty or overlong title.
#[post("")]
pub async fn create_todo(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    todo_data: web::Json<TodoListInput>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;

    if store.find_todo_list_by_title(&todo_data.title).await?.is_some() {
        return Err(duplicate_title());
    }

    // The unique constraint still catches a racing insert of the same title.
    let list = store.create_todo_list(user_id.0, &todo_data.title).await?;
    info!("user {} created todo list {}", user_id.0, list.id);

    Ok(HttpResponse::Ok().json(list))
}

/// Fetches one of the caller's lists.
///
/// ## Responses:
/// - `200 OK`: The `TodoList`.
/// - `404 Not Found`: No such list, or it belongs to someone else.
#[get("/{id}")]
pub async fn get_todo(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let list = owned_list(store.get_ref(), user_id.0, todo_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(list))
}

/// Renames one of the caller's lists.
///
/// ## Responses:
/// - `200 OK`: The updated `TodoList`.
/// - `400 Bad Request`: Another list already has this title.
/// - `404 Not Found`: No such list, or it belongs to someone else.
/// - `422 Unprocessable Entity`: Empty or overlong title.
#[put("/{id}")]
pub async fn update_todo(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<i32>,
    todo_data: web::Json<TodoListInput>,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;
    let list = owned_list(store.get_ref(), user_id.0, todo_id.into_inner()).await?;

    if let Some(existing) = store.find_todo_list_by_title(&todo_data.title).await? {
        if existing.id != list.id {
            return Err(duplicate_title());
        }
    }

    let updated = store
        .update_todo_list(list.id, &todo_data.title)
        .await?
        .ok_or_else(todo_not_found)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes one of the caller's lists together with all of its tasks.
///
/// ## Responses:
/// - `200 OK`: `{"msg": "Todo deleted successfully"}`.
/// - `404 Not Found`: No such list, or it belongs to someone else.
#[delete("/{id}")]
pub async fn delete_todo(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let list = owned_list(store.get_ref(), user_id.0, todo_id.into_inner()).await?;

    if !store.delete_todo_list(list.id).await? {
        return Err(todo_not_found());
    }
    info!("user {} deleted todo list {}", user_id.0, list.id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("Todo deleted successfully")))
}

/// Lists the tasks of one of the caller's lists.
#[get("/{id}/task")]
pub async fn get_todo_tasks(
    store: web::Data<dyn Store>,
    user_id: AuthenticatedUserId,
    todo_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let list = owned_list(store.get_ref(), user_id.0, todo_id.into_inner()).await?;
    let tasks = store.list_tasks_in_list(list.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}
