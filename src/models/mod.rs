pub mod task;
pub mod todo;
pub mod user;

pub use task::{Task, TaskInput, TaskUpdate};
pub use todo::{TodoList, TodoListInput};
pub use user::{User, UserRead};
