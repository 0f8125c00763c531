// handlers/public/mod.rs - Public handlers (no authentication required)
//
// `/limit` is still guarded by the shared rate limiter; the rest are open.
pub mod build_info;
pub mod health;
pub mod limit;
pub mod token;

pub use build_info::build_info_get;
pub use health::health_get;
pub use limit::limit_get;
pub use token::token_get;
