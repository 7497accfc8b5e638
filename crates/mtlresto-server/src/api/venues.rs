use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use mtlresto_core::{Coordinate, Marker, Suggestion, SuggestionAction, SuggestionSource};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::selection::start_selection;
use super::{map_source_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct VenueQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SuggestionQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
struct VenueListData<'a> {
    query: &'a str,
    type_filter: &'a str,
    loaded: bool,
    total: usize,
    displayed: usize,
    markers: Vec<Marker>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(super) enum SuggestionOutcome {
    SelectVenue { venue_id: i64, generation: u64 },
    Recenter { center: Coordinate, zoom: u8 },
}

/// Applies `q` / `type` (when present) to the session search and returns the
/// markers for the resulting displayed set.
pub(super) async fn list_venues(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<VenueQuery>,
) -> Response {
    let mut session = state.session.write().await;
    if let Some(q) = query.q {
        session.search.set_query(q);
    }
    if let Some(type_filter) = query.type_filter {
        session.search.set_type_filter(type_filter);
    }

    let data = VenueListData {
        query: session.search.query(),
        type_filter: session.search.type_filter(),
        loaded: session.search.is_loaded(),
        total: session.search.venues().len(),
        displayed: session.search.filtered_len(),
        markers: session.map.markers(&session.search),
    };
    Json(ApiResponse::new(data, req_id.0)).into_response()
}

/// Venue suggestions for the query, or hover suggestions when the box is empty.
pub(super) async fn list_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SuggestionQuery>,
) -> Json<ApiResponse<Vec<Suggestion>>> {
    let mut session = state.session.write().await;
    if let Some(q) = query.q {
        session.search.set_query(q);
    }

    let mut suggestions = session.search.suggestions();
    if suggestions.is_empty() {
        suggestions = session.search.hover_suggestions();
    }
    Json(ApiResponse::new(suggestions, req_id.0))
}

pub(super) async fn list_address_suggestions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<ApiResponse<Vec<Suggestion>>>, ApiError> {
    let q = query.q.unwrap_or_default();
    let matches = state
        .nominatim
        .suggest_addresses(&q)
        .await
        .map_err(|e| map_source_error(req_id.0.clone(), &e))?;

    let suggestions = matches
        .into_iter()
        .map(mtlresto_sources::AddressMatch::into_suggestion)
        .collect();
    Ok(Json(ApiResponse::new(suggestions, req_id.0)))
}

/// Venue suggestions select the venue; address suggestions recenter the map.
/// An address outside WGS84 range is rejected before anything changes.
pub(super) async fn select_suggestion(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(suggestion): Json<Suggestion>,
) -> Result<Json<ApiResponse<SuggestionOutcome>>, ApiError> {
    if let SuggestionSource::Address { coordinate } = &suggestion.source {
        if !coordinate.is_valid() {
            tracing::info!(
                latitude = coordinate.latitude,
                longitude = coordinate.longitude,
                "rejected out-of-range address suggestion"
            );
            return Err(ApiError::new(
                req_id.0,
                "location_unavailable",
                "suggested position is out of range; the map stays on its current position",
            ));
        }
    }

    let mut session = state.session.write().await;

    let outcome = match session.search.apply_suggestion(&suggestion) {
        SuggestionAction::SelectVenue(venue_id) => {
            let generation = start_selection(&state, &mut session, venue_id)
                .map_err(|e| ApiError::new(req_id.0.clone(), "not_found", e.to_string()))?;
            SuggestionOutcome::SelectVenue {
                venue_id,
                generation: generation.0,
            }
        }
        SuggestionAction::Recenter(center) => {
            session.map.recenter(center);
            SuggestionOutcome::Recenter {
                center: session.map.center,
                zoom: session.map.zoom,
            }
        }
    };
    drop(session);

    Ok(Json(ApiResponse::new(outcome, req_id.0)))
}
