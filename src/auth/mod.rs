use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use thiserror::Error;

use crate::config::SecurityConfig;

/// Prefix required in front of the token. Exactly one space, case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Only the shared-secret HMAC family is accepted.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Allowed clock skew when checking `exp`, `nbf` and `iat`, in seconds
const CLOCK_LEEWAY_SECS: f64 = 60.0;

/// `aud` is usually a string or a list of strings. Any other JSON value is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
    Other(Value),
}

impl Audience {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            Audience::One(aud) => aud == value,
            Audience::Many(auds) => auds.iter().any(|aud| aud == value),
            Audience::Other(_) => false,
        }
    }
}

/// Registered claims the service looks at. Time claims are NumericDates and
/// may carry a fraction; a non-numeric value is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub iat: Option<f64>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub nbf: Option<f64>,
    #[serde(default, deserialize_with = "numeric_date", skip_serializing_if = "Option::is_none")]
    pub exp: Option<f64>,
}

impl Claims {
    /// Time-based checks against `now` (seconds since the epoch)
    pub fn check_times(&self, now: f64) -> Result<(), AuthError> {
        if matches!(self.exp, Some(exp) if now > exp + CLOCK_LEEWAY_SECS) {
            return Err(AuthError::Expired);
        }
        if matches!(self.nbf, Some(nbf) if now + CLOCK_LEEWAY_SECS < nbf) {
            return Err(AuthError::NotYetValid);
        }
        if matches!(self.iat, Some(iat) if now + CLOCK_LEEWAY_SECS < iat) {
            return Err(AuthError::IssuedInFuture);
        }
        Ok(())
    }
}

fn numeric_date<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Empty JWT token")]
    EmptyToken,

    #[error("JWT secret not configured")]
    SecretNotConfigured,

    #[error("JWT token has expired")]
    Expired,

    #[error("JWT token is not valid yet")]
    NotYetValid,

    #[error("JWT token was issued in the future")]
    IssuedInFuture,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies bearer tokens with one shared secret.
#[derive(Clone)]
pub struct TokenAuthority {
    configured: bool,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    audience: String,
    expiry: Duration,
}

impl std::fmt::Debug for TokenAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuthority")
            .field("configured", &self.configured)
            .field("audience", &self.audience)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenAuthority {
    pub fn new(secret: &str, audience: impl Into<String>, expiry: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = HMAC_ALGORITHMS.to_vec();
        // Time claims are checked by Claims::check_times; aud is surfaced, not matched
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        Self {
            configured: !secret.is_empty(),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            audience: audience.into(),
            expiry,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(
            &security.signing_secret,
            security.jwt_audience.clone(),
            Duration::hours(security.jwt_expiry_hours as i64),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Issue a token for the configured audience
    pub fn issue(&self) -> Result<String, TokenError> {
        self.issue_for(&self.audience)
    }

    pub fn issue_for(&self, audience: &str) -> Result<String, TokenError> {
        if !self.configured {
            return Err(TokenError::InvalidSecret);
        }

        let now = Utc::now();
        let claims = json!({
            "aud": audience,
            "iat": now.timestamp(),
            "exp": (now + self.expiry).timestamp(),
        });

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Verify the raw `Authorization` header value
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let token = bearer_token(header)?;
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        if !self.configured {
            return Err(AuthError::SecretNotConfigured);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let now = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        token_data.claims.check_times(now)?;
        Ok(token_data.claims)
    }
}

/// Strip the bearer prefix. `Bearer<token>`, `bearer <token>` and
/// `Bearer  <token>` are all rejected.
pub fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedHeader)?;

    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    if token.starts_with(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authority(secret: &str) -> TokenAuthority {
        TokenAuthority::new(secret, "todo-api", Duration::hours(1))
    }

    fn sign(claims: &Value) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(b"s3cret")).unwrap()
    }

    #[test]
    fn issued_token_round_trips_audience() {
        let auth = authority("s3cret");
        let token = auth.issue().unwrap();
        let claims = auth.verify_header(Some(&format!("Bearer {}", token))).unwrap();
        assert_eq!(claims.aud, Some(Audience::One("todo-api".to_string())));
        assert!(claims.exp.unwrap() > claims.iat.unwrap());
    }

    #[test]
    fn bearer_prefix_requires_exactly_one_space() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert!(matches!(bearer_token("Bearerabc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(bearer_token("Bearer  abc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(bearer_token("bearer abc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(bearer_token("Bearer "), Err(AuthError::EmptyToken)));
        assert!(matches!(bearer_token("Bearer"), Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(matches!(
            authority("s3cret").verify_header(None),
            Err(AuthError::MissingHeader)
        ));
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = authority("one").issue().unwrap();
        assert!(matches!(
            authority("two").verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn whole_hmac_family_is_accepted() {
        let claims = json!({ "aud": ["a", "b"] });
        let key = EncodingKey::from_secret(b"s3cret");
        for alg in HMAC_ALGORITHMS {
            let token = encode(&Header::new(alg), &claims, &key).unwrap();
            let verified = authority("s3cret").verify(&token).unwrap();
            assert!(verified.aud.unwrap().contains("b"));
        }
    }

    #[test]
    fn non_hmac_algorithms_are_rejected() {
        // {"alg":"RS256","typ":"JWT"} . {"aud":"todo-api"} . junk
        let rs256 = "eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.eyJhdWQiOiJ0b2RvLWFwaSJ9.c2ln";
        // {"alg":"none","typ":"JWT"} . {"aud":"todo-api"} .
        let none = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.eyJhdWQiOiJ0b2RvLWFwaSJ9.";
        let auth = authority("s3cret");
        assert!(auth.verify(rs256).is_err());
        assert!(auth.verify(none).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign(&json!({ "iat": 0, "exp": Utc::now().timestamp() - 3600 }));
        assert!(matches!(
            authority("s3cret").verify(&token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn fractional_numeric_dates_are_accepted() {
        let token = sign(&json!({
            "aud": "todo-api",
            "iat": 1_700_000_000.25,
            "exp": 4_102_444_800.5,
        }));
        let claims = authority("s3cret").verify(&token).unwrap();
        assert_eq!(claims.exp, Some(4_102_444_800.5));
        assert!(claims.aud.unwrap().contains("todo-api"));
    }

    #[test]
    fn fractional_exp_in_the_past_is_rejected() {
        let past = Utc::now().timestamp() as f64 - 3600.5;
        let token = sign(&json!({ "exp": past }));
        assert!(matches!(
            authority("s3cret").verify(&token),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn unusual_claim_types_do_not_fail_verification() {
        let token = sign(&json!({ "aud": 42, "exp": "tomorrow" }));
        let claims = authority("s3cret").verify(&token).unwrap();
        assert_eq!(claims.aud, Some(Audience::Other(json!(42))));
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn future_nbf_and_iat_are_rejected() {
        let later = Utc::now().timestamp() + 3600;
        let auth = authority("s3cret");
        assert!(matches!(
            auth.verify(&sign(&json!({ "nbf": later }))),
            Err(AuthError::NotYetValid)
        ));
        assert!(matches!(
            auth.verify(&sign(&json!({ "iat": later }))),
            Err(AuthError::IssuedInFuture)
        ));
    }

    #[test]
    fn empty_secret_never_verifies_or_issues() {
        let auth = authority("");
        assert!(matches!(auth.issue(), Err(TokenError::InvalidSecret)));
        let token = authority("s3cret").issue().unwrap();
        assert!(matches!(auth.verify(&token), Err(AuthError::SecretNotConfigured)));
    }
}
