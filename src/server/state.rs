use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::TokenAuthority;
use crate::config::AppConfig;
use crate::database::TodoRepository;
use crate::limiter::{self, Limiter};

/// Values stamped at build time, served from `/x`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub build_commit: String,
    pub build_time: String,
}

impl BuildInfo {
    /// `BUILD_COMMIT` / `BUILD_TIME` from the compiler environment, else
    /// `dev` and the moment the process started.
    pub fn from_build_env() -> Self {
        Self {
            build_commit: option_env!("BUILD_COMMIT").unwrap_or("dev").to_string(),
            build_time: option_env!("BUILD_TIME")
                .map(str::to_string)
                .unwrap_or_else(|| Utc::now().to_rfc3339()),
        }
    }
}

/// Everything the handlers and interceptors share
#[derive(Clone)]
pub struct AppState {
    pub todos: Arc<dyn TodoRepository>,
    pub authority: Arc<TokenAuthority>,
    pub limiter: Arc<dyn Limiter>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(config: &AppConfig, todos: Arc<dyn TodoRepository>) -> Self {
        Self {
            todos,
            authority: Arc::new(TokenAuthority::from_config(&config.security)),
            limiter: limiter::direct(&config.rate_limit),
            build: BuildInfo::from_build_env(),
        }
    }

    /// Swap the rate limiter, e.g. for one on a fake clock
    pub fn with_limiter(mut self, limiter: Arc<dyn Limiter>) -> Self {
        self.limiter = limiter;
        self
    }
}
