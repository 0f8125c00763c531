// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind the BearerAuth interceptor, so handlers can rely
// on a `Caller` in the request extensions.
pub mod todo;

pub use todo::{todo_delete, todo_list, todo_post};
