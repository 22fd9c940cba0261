//! Admin todo list fed by application, payment, maintenance, and transfer events.

mod board;
mod domain;
mod router;

pub use board::{TodoBoard, TodoRepository};
pub use domain::{TaskType, Todo, TodoStatus};
pub use router::todo_router;
