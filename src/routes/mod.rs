pub mod auth;
pub mod health;
pub mod task;
pub mod todo;

use crate::auth::AuthMiddleware;
use actix_web::web;

/// Mounts the API. `/register` and `/login` are public; every other scope sits
/// behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::register)
        .service(auth::login)
        .service(web::scope("/users").wrap(AuthMiddleware).service(auth::me))
        .service(
            web::scope("/todo")
                .wrap(AuthMiddleware)
                .service(todo::get_todos)
                .service(todo::create_todo)
                .service(todo::get_todo_tasks)
                .service(todo::get_todo)
                .service(todo::update_todo)
                .service(todo::delete_todo),
        )
        .service(
            web::scope("/task")
                .wrap(AuthMiddleware)
                .service(task::get_tasks)
                .service(task::create_task)
                .service(task::get_task)
                .service(task::update_task)
                .service(task::delete_task),
        );
}
