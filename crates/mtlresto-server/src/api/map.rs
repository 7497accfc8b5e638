use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Json,
};
use mtlresto_core::{resolve_current_position, Coordinate, MapView, Marker, ReportedPosition};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_source_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LocateRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AddressRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
struct MapData<'a> {
    #[serde(flatten)]
    view: &'a MapView,
    markers: Vec<Marker>,
}

#[derive(Debug, Serialize)]
pub(super) struct CameraData {
    center: Coordinate,
    zoom: u8,
}

pub(super) async fn get_map(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Response {
    let session = state.session.read().await;
    let data = MapData {
        view: &session.map,
        markers: session.map.markers(&session.search),
    };
    Json(ApiResponse::new(data, req_id.0)).into_response()
}

/// Recenters on the position the client reports. A missing or invalid
/// position leaves the camera where it is.
pub(super) async fn locate(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LocateRequest>,
) -> Result<Json<ApiResponse<CameraData>>, ApiError> {
    let reported = match (body.latitude, body.longitude) {
        (Some(latitude), Some(longitude)) => ReportedPosition(Some(Coordinate::new(latitude, longitude))),
        _ => ReportedPosition(None),
    };

    let position = resolve_current_position(&reported).map_err(|e| {
        tracing::info!(error = %e, "device position unavailable");
        ApiError::new(req_id.0.clone(), "location_unavailable", e.alert_message())
    })?;

    let mut session = state.session.write().await;
    session.map.recenter(position);
    let data = CameraData {
        center: session.map.center,
        zoom: session.map.zoom,
    };
    drop(session);

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// Geocodes `address` and recenters on the first match.
pub(super) async fn go_to_address(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AddressRequest>,
) -> Result<Json<ApiResponse<CameraData>>, ApiError> {
    let position = state
        .nominatim
        .resolve_address(&body.address)
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let mut session = state.session.write().await;
    session.map.recenter(position);
    let data = CameraData {
        center: session.map.center,
        zoom: session.map.zoom,
    };
    drop(session);

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
