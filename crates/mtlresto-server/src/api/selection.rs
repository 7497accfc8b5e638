use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use mtlresto_core::{Coordinate, CoreError, Generation, Popup, VenueId};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;
use crate::session::{spawn_enrichment, Session};

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SelectRequest {
    pub venue_id: VenueId,
}

#[derive(Debug, Deserialize)]
pub(super) struct SelectionQuery {
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SelectionData<'a> {
    generation: u64,
    pending: bool,
    center: Coordinate,
    zoom: u8,
    popup: Popup<'a>,
}

/// Selects `venue_id`, focuses the map on it and starts the enrichment
/// lookup for the new generation.
pub(super) fn start_selection(
    state: &AppState,
    session: &mut Session,
    venue_id: VenueId,
) -> Result<Generation, CoreError> {
    let generation = session.selection.select_from(&session.search, venue_id)?;
    let (coordinate, name) = match session.selection.current() {
        Some(selection) => (selection.coordinate, selection.name.clone()),
        None => return Err(CoreError::UnknownVenue(venue_id)),
    };
    session.map.focus(coordinate);

    tracing::info!(venue_id, generation = generation.0, "venue selected");
    spawn_enrichment(
        Arc::clone(&state.session),
        Arc::clone(&state.yelp),
        state.area.review_location.clone(),
        generation,
        name,
    );
    Ok(generation)
}

fn render(session: &Session, request_id: String) -> Option<Response> {
    let selection = session.selection.current()?;
    let data = SelectionData {
        generation: selection.generation.0,
        pending: selection.is_pending(),
        center: session.map.center,
        zoom: session.map.zoom,
        popup: session.map.popup(selection),
    };
    Some(Json(ApiResponse::new(data, request_id)).into_response())
}

pub(super) async fn select_venue(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SelectRequest>,
) -> Result<Response, ApiError> {
    let mut session = state.session.write().await;
    start_selection(&state, &mut session, body.venue_id)
        .map_err(|e| ApiError::new(req_id.0.clone(), "not_found", e.to_string()))?;

    render(&session, req_id.0.clone())
        .ok_or_else(|| ApiError::new(req_id.0, "internal_error", "selection was not recorded"))
}

/// Current selection popup. `page` moves the review cursor (clamped to the
/// valid range) before rendering.
pub(super) async fn get_selection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SelectionQuery>,
) -> Result<Response, ApiError> {
    let mut session = state.session.write().await;
    if let Some(page) = query.page {
        if let Some(enrichment) = session.selection.enrichment_mut() {
            enrichment.reviews.go_to(page);
        }
    }

    render(&session, req_id.0.clone())
        .ok_or_else(|| ApiError::new(req_id.0, "not_found", "no venue selected"))
}
