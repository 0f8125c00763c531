pub mod liveness;
pub mod shutdown;
pub mod state;

use axum::{
    http::{HeaderName, HeaderValue, Method},
    routing::{delete, get},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::handlers::{protected, public};
use crate::middleware::{BearerAuth, MakeTransactionId, Pipeline, RateLimit, TRANSACTION_ID};

pub use liveness::LivenessMarker;
pub use shutdown::{serve, shutdown_signal, ShutdownOutcome};
pub use state::{AppState, BuildInfo};

/// Full router with global middleware
pub fn app(config: &AppConfig, state: AppState) -> Router {
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);

    Router::new()
        .merge(public_routes())
        .merge(limited_routes(&state))
        .merge(protected_routes(&state))
        .with_state(state)
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(TRANSACTION_ID.clone(), MakeTransactionId))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.security))
                .layer(TimeoutLayer::new(request_timeout))
                .layer(PropagateRequestIdLayer::new(TRANSACTION_ID.clone())),
        )
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(public::health_get))
        .route("/x", get(public::build_info_get))
        .route("/tokenz", get(public::token_get))
}

fn limited_routes(state: &AppState) -> Router<AppState> {
    rate_limit_pipeline(state).guard(Router::new().route("/limit", get(public::limit_get)))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new()
        .route("/todo", get(protected::todo_list).post(protected::todo_post))
        .route("/todo/:id", delete(protected::todo_delete));

    protected_pipeline(state).guard(routes)
}

/// Interceptors in front of the protected group
pub fn protected_pipeline(state: &AppState) -> Pipeline {
    Pipeline::new().then(BearerAuth::new(state.authority.clone()))
}

/// Interceptors in front of `/limit`
pub fn rate_limit_pipeline(state: &AppState) -> Pipeline {
    Pipeline::new().then(RateLimit::new(state.limiter.clone()))
}

/// Cross-origin policy: configured origins and headers only. Entries that are
/// not valid header values are skipped.
pub fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let headers: Vec<HeaderName> = security
        .cors_headers
        .iter()
        .filter_map(|header| match HeaderName::from_bytes(header.as_bytes()) {
            Ok(name) => Some(name),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS header: {}", header);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers(AllowHeaders::list(headers))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(12 * 60 * 60))
}
