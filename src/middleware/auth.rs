use axum::{
    extract::Request,
    http::header::AUTHORIZATION,
    response::IntoResponse,
};
use std::sync::Arc;

use super::pipeline::{Flow, Interceptor};
use crate::auth::{AuthError, Audience, Claims, TokenAuthority};
use crate::error::ApiError;

/// Verified caller, injected into request extensions by `BearerAuth`
#[derive(Clone, Debug)]
pub struct Caller {
    pub audience: Option<Audience>,
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            audience: claims.aud,
        }
    }
}

/// Rejects the request with 401 unless it carries a valid bearer token
pub struct BearerAuth {
    authority: Arc<TokenAuthority>,
}

impl BearerAuth {
    pub fn new(authority: Arc<TokenAuthority>) -> Self {
        Self { authority }
    }
}

impl Interceptor for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn intercept(&self, request: &mut Request) -> Flow {
        let header = match request.headers().get(AUTHORIZATION) {
            Some(value) => match value.to_str() {
                Ok(s) => Some(s),
                Err(_) => return reject(AuthError::MalformedHeader),
            },
            None => None,
        };

        match self.authority.verify_header(header) {
            Ok(claims) => {
                request.extensions_mut().insert(Caller::from(claims));
                Flow::Continue
            }
            Err(err) => reject(err),
        }
    }
}

fn reject(err: AuthError) -> Flow {
    tracing::debug!("authentication failed: {}", err);
    Flow::Respond(ApiError::unauthorized(err.to_string()).into_response())
}
