pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryTodoRepository;
pub use models::{NewTodo, Todo};
pub use postgres::PgTodoRepository;
pub use repository::{StoreError, TodoRepository};
