//! Request tagging, bearer auth and the shared request budget.
//!
//! Rejections are rendered as [`ApiError`] envelopes so clients see the same
//! `{error, meta}` shape as from the handlers.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::{Choice, ConstantTimeEq};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::ApiError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Longest client-supplied request ID that is echoed back.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Request ID carried in the request extensions and echoed on the response.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// Keeps a client ID when it is short visible ASCII, otherwise mints a v4 UUID.
    fn from_header(value: Option<&HeaderValue>) -> Self {
        let supplied = value
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| {
                !id.is_empty()
                    && id.len() <= MAX_REQUEST_ID_LEN
                    && id.bytes().all(|b| b.is_ascii_graphic())
            });
        Self(supplied.map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned))
    }
}

/// Bearer keys accepted on the `/api/v1` routes.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<Vec<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Reads `MTLRESTO_API_KEYS` (comma-separated). See [`AuthState::from_keys`].
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var("MTLRESTO_API_KEYS").unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// Parses a comma-separated key list.
    ///
    /// No keys turns auth off in development and is a startup error elsewhere.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let keys: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();

        match (keys.is_empty(), is_development) {
            (false, _) => Ok(Self {
                api_keys: Arc::new(keys),
                enabled: true,
            }),
            (true, true) => {
                tracing::warn!("MTLRESTO_API_KEYS empty; the restaurant API is open");
                Ok(Self::disabled())
            }
            (true, false) => anyhow::bail!("MTLRESTO_API_KEYS must list at least one key"),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(Vec::new()),
            enabled: false,
        }
    }

    /// Compares against every configured key in constant time.
    fn allows(&self, token: &str) -> bool {
        self.api_keys
            .iter()
            .fold(Choice::from(0u8), |found, key| {
                found | key.as_bytes().ct_eq(token.as_bytes())
            })
            .into()
    }
}

#[derive(Debug)]
struct Budget {
    opened_at: Instant,
    used: usize,
}

/// One request budget shared by every caller of the API, refilled each window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    budget: Arc<Mutex<Budget>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            budget: Arc::new(Mutex::new(Budget {
                opened_at: Instant::now(),
                used: 0,
            })),
        }
    }

    /// Takes one request from the current window. `false` once it is spent.
    pub async fn try_acquire(&self) -> bool {
        let mut budget = self.budget.lock().await;
        if budget.opened_at.elapsed() >= self.window {
            budget.opened_at = Instant::now();
            budget.used = 0;
        }
        if budget.used >= self.max_requests {
            return false;
        }
        budget.used += 1;
        true
    }
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map_or_else(String::new, |id| id.0.clone())
}

/// Tags the request with a [`RequestId`] and echoes it as `x-request-id`.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_header(req.headers().get(&X_REQUEST_ID));
    let echoed = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut res = next.run(req).await;
    if let Some(value) = echoed {
        res.headers_mut().insert(X_REQUEST_ID, value);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match extract_bearer_token(req.headers().get(AUTHORIZATION)) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => {
            tracing::debug!(path = %req.uri().path(), "rejected request without a valid bearer key");
            ApiError::new(
                request_id_of(&req),
                "unauthorized",
                "missing or invalid bearer token",
            )
            .into_response()
        }
    }
}

pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    if rate_limit.try_acquire().await {
        return next.run(req).await;
    }
    tracing::info!(path = %req.uri().path(), "request budget exhausted");
    ApiError::new(
        request_id_of(&req),
        "rate_limited",
        "too many requests; try again shortly",
    )
    .into_response()
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
    }

    #[test]
    fn auth_state_disables_when_no_keys_in_dev() {
        let state = AuthState::from_keys("", true).expect("dev should allow missing keys");
        assert!(!state.enabled);
    }

    #[test]
    fn auth_state_requires_keys_outside_dev() {
        assert!(AuthState::from_keys(" , ", false).is_err());
    }

    #[test]
    fn auth_state_matches_any_configured_key() {
        let state = AuthState::from_keys("alpha, beta", false).expect("keys");
        assert!(state.enabled);
        assert!(state.allows("beta"));
        assert!(!state.allows("bet"));
        assert!(!state.allows("gamma"));
    }

    #[test]
    fn client_request_id_is_kept_when_well_formed() {
        let header = HeaderValue::from_static("trace-42");
        assert_eq!(RequestId::from_header(Some(&header)).0, "trace-42");
    }

    #[test]
    fn malformed_request_id_is_replaced() {
        let too_long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        for raw in ["", "   ", "has space", too_long.as_str()] {
            let header = HeaderValue::from_str(raw).expect("header");
            let id = RequestId::from_header(Some(&header)).0;
            assert_ne!(id, raw);
            assert!(Uuid::parse_str(&id).is_ok(), "{raw:?} -> {id}");
        }
        assert!(Uuid::parse_str(&RequestId::from_header(None).0).is_ok());
    }

    #[tokio::test]
    async fn budget_is_spent_then_refilled() {
        let limit = RateLimitState::new(2, Duration::from_millis(50));
        assert!(limit.try_acquire().await);
        assert!(limit.try_acquire().await);
        assert!(!limit.try_acquire().await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limit.try_acquire().await);
    }

    #[tokio::test]
    async fn clones_share_one_budget() {
        let limit = RateLimitState::new(1, Duration::from_secs(60));
        let other = limit.clone();
        assert!(limit.try_acquire().await);
        assert!(!other.try_acquire().await);
    }
}
