use axum::{extract::Request, response::IntoResponse};
use std::sync::Arc;

use super::pipeline::{Flow, Interceptor};
use crate::error::ApiError;
use crate::limiter::Limiter;

/// Answers 429 once the shared limiter has no cells left
pub struct RateLimit {
    limiter: Arc<dyn Limiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<dyn Limiter>) -> Self {
        Self { limiter }
    }
}

impl Interceptor for RateLimit {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn intercept(&self, _request: &mut Request) -> Flow {
        if self.limiter.try_acquire() {
            Flow::Continue
        } else {
            tracing::debug!("rate limit exceeded");
            Flow::Respond(ApiError::too_many_requests("rate limit exceeded").into_response())
        }
    }
}
