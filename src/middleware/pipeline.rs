use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Router,
};
use std::sync::Arc;

/// Outcome of a single interceptor
pub enum Flow {
    /// Hand the request to the next stage
    Continue,
    /// Stop here and send this response
    Respond(Response),
}

/// One stage in front of a group of routes. Stages may annotate the request
/// through its extensions before continuing.
pub trait Interceptor: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn intercept(&self, request: &mut Request) -> Flow;
}

/// Ordered list of interceptors. The first stage that responds wins and the
/// remaining stages and the handler never run.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Interceptor>]>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: Arc::from(Vec::new()),
        }
    }

    pub fn then(self, stage: impl Interceptor) -> Self {
        let mut stages = self.stages.to_vec();
        stages.push(Arc::new(stage));
        Self {
            stages: stages.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order. `Some` means the request was short-circuited.
    pub fn run(&self, request: &mut Request) -> Option<Response> {
        for stage in self.stages.iter() {
            if let Flow::Respond(response) = stage.intercept(request) {
                tracing::debug!(
                    stage = stage.name(),
                    status = %response.status(),
                    "request short-circuited"
                );
                return Some(response);
            }
        }
        None
    }

    /// Mount in front of every route currently in `router`
    pub fn guard<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(axum::middleware::from_fn_with_state(self, intercept))
    }
}

/// axum adapter that drives a `Pipeline`
pub async fn intercept(State(pipeline): State<Pipeline>, mut request: Request, next: Next) -> Response {
    match pipeline.run(&mut request) {
        Some(response) => response,
        None => next.run(request).await,
    }
}
