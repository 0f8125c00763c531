#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use governor::clock::FakeRelativeClock;
use serde_json::Value;
use tower::ServiceExt;

use todo_api::config::AppConfig;
use todo_api::database::{MemoryTodoRepository, StoreError, Todo, TodoRepository};
use todo_api::limiter;
use todo_api::server::{self, AppState};

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.signing_secret = SECRET.to_string();
    config
}

/// Router wired exactly like the binary, backed by an in-memory store. The
/// rate limiter runs on `clock`, which only moves when a test advances it.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub memory: Option<Arc<MemoryTodoRepository>>,
    pub clock: FakeRelativeClock,
}

impl TestApp {
    pub fn new() -> Self {
        let memory = Arc::new(MemoryTodoRepository::new());
        let mut app = Self::with_repository(memory.clone());
        app.memory = Some(memory);
        app
    }

    pub fn with_repository(todos: Arc<dyn TodoRepository>) -> Self {
        let config = test_config();
        let clock = FakeRelativeClock::default();
        let state = AppState::new(&config, todos)
            .with_limiter(limiter::direct_with_clock(&config.rate_limit, &clock));
        let router = server::app(&config, state.clone());
        Self {
            router,
            state,
            memory: None,
            clock,
        }
    }

    pub fn memory(&self) -> &MemoryTodoRepository {
        self.memory.as_deref().expect("app is not backed by the memory store")
    }

    pub fn token(&self) -> String {
        self.state.authority.issue().expect("issue token")
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }

    pub async fn authed(&self, method: Method, uri: &str, body: Option<&str>) -> Result<TestResponse> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token()));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body)?).await
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Store whose backend is always down
pub struct FailingTodoRepository;

#[async_trait]
impl TodoRepository for FailingTodoRepository {
    async fn create(&self, _title: &str) -> Result<Todo, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: i64) -> Result<(), StoreError> {
        Err(StoreError::Backend(sqlx::Error::PoolTimedOut))
    }
}
