mod contact;
mod map;
mod profiles;
mod selection;
mod venues;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use mtlresto_core::{AreaSettings, ValidationMode};
use mtlresto_sources::{NominatimClient, SourceError, YelpClient};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
    X_REQUEST_ID,
};
use crate::session::{SharedSession, VenueFetchStatus};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub session: SharedSession,
    pub area: Arc<AreaSettings>,
    pub nominatim: Arc<NominatimClient>,
    pub yelp: Arc<YelpClient>,
    pub contact_mode: ValidationMode,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    venues: VenueFetchStatus,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "location_unavailable" => StatusCode::UNPROCESSABLE_ENTITY,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &mtlresto_db::DbError) -> ApiError {
    if matches!(error, mtlresto_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "record not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_source_error(request_id: String, error: &SourceError) -> ApiError {
    match error {
        SourceError::AddressNotFound(_) => {
            ApiError::new(request_id, "not_found", error.to_string())
        }
        SourceError::InvalidRequest(message) => {
            ApiError::new(request_id, "bad_request", message.clone())
        }
        _ => {
            tracing::warn!(error = %error, "upstream request failed");
            ApiError::new(request_id, "upstream_error", "upstream service request failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            X_REQUEST_ID,
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/venues", get(venues::list_venues))
        .route("/api/v1/suggestions", get(venues::list_suggestions))
        .route(
            "/api/v1/suggestions/select",
            post(venues::select_suggestion),
        )
        .route(
            "/api/v1/address-suggestions",
            get(venues::list_address_suggestions),
        )
        .route("/api/v1/map", get(map::get_map))
        .route("/api/v1/map/locate", post(map::locate))
        .route("/api/v1/map/address", post(map::go_to_address))
        .route(
            "/api/v1/selection",
            get(selection::get_selection).post(selection::select_venue),
        )
        .route(
            "/api/v1/profiles/{user_id}",
            get(profiles::get_profile).put(profiles::update_profile),
        )
        .route("/api/v1/contact", post(contact::send_message))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let venues = state.session.read().await.venues.clone();

    let (status_code, data) = match mtlresto_db::health_check(&state.pool).await {
        Ok(()) => {
            let status = if matches!(venues, VenueFetchStatus::Unavailable { .. }) {
                "degraded"
            } else {
                "ok"
            };
            (
                StatusCode::OK,
                HealthData {
                    status,
                    database: "ok",
                    venues,
                },
            )
        }
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthData {
                    status: "degraded",
                    database: "unavailable",
                    venues,
                },
            )
        }
    };

    (status_code, Json(ApiResponse::new(data, req_id.0)))
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}
