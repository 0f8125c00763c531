pub mod auth;
pub mod pipeline;
pub mod rate_limit;
pub mod request_id;

pub use auth::{BearerAuth, Caller};
pub use pipeline::{intercept, Flow, Interceptor, Pipeline};
pub use rate_limit::RateLimit;
pub use request_id::{MakeTransactionId, TRANSACTION_ID};
