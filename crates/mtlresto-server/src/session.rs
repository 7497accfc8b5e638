//! Shared session state and the background tasks that feed it.

use std::sync::Arc;

use mtlresto_core::{
    AreaSettings, Enrichment, Generation, MapView, SearchState, SelectionState, Venue,
};
use mtlresto_sources::{enrich_venue, OverpassClient, SourceError, YelpClient};
use serde::Serialize;
use tokio::sync::RwLock;

pub type SharedSession = Arc<RwLock<Session>>;

/// Outcome of the one-time venue fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VenueFetchStatus {
    Loading,
    Ok { count: usize },
    Unavailable { reason: String },
}

impl VenueFetchStatus {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            VenueFetchStatus::Loading => "loading",
            VenueFetchStatus::Ok { .. } => "ok",
            VenueFetchStatus::Unavailable { .. } => "unavailable",
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub search: SearchState,
    pub selection: SelectionState,
    pub map: MapView,
    pub venues: VenueFetchStatus,
}

impl Session {
    #[must_use]
    pub fn new(area: &AreaSettings) -> Self {
        Self {
            search: SearchState::new(),
            selection: SelectionState::new(),
            map: MapView::from_area(area),
            venues: VenueFetchStatus::Loading,
        }
    }

    #[must_use]
    pub fn shared(area: &AreaSettings) -> SharedSession {
        Arc::new(RwLock::new(Self::new(area)))
    }

    /// Installs the fetch result. A failed fetch leaves an empty cache so
    /// search keeps working, and is recorded for `/health`.
    pub fn finish_venue_fetch(&mut self, result: Result<Vec<Venue>, SourceError>) {
        match result {
            Ok(venues) => {
                self.venues = VenueFetchStatus::Ok {
                    count: venues.len(),
                };
                self.search.load_venues(venues);
            }
            Err(e) => {
                tracing::warn!(error = %e, "venue fetch failed; continuing with no venues");
                self.venues = VenueFetchStatus::Unavailable {
                    reason: e.to_string(),
                };
                self.search.load_venues(Vec::new());
            }
        }
    }
}

/// Runs the venue fetch once, in the background.
pub fn spawn_venue_fetch(
    session: SharedSession,
    overpass: OverpassClient,
    area: Arc<AreaSettings>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let result = overpass
            .fetch_venues(&area.bounding_box, &area.amenity)
            .await;
        let mut guard = session.write().await;
        guard.finish_venue_fetch(result);
        tracing::info!(
            status = guard.venues.label(),
            venues = guard.search.venues().len(),
            "venue fetch finished"
        );
    })
}

/// Looks up details for the selection stamped `generation` and stores them
/// only if that selection is still current.
pub fn spawn_enrichment(
    session: SharedSession,
    yelp: Arc<YelpClient>,
    review_location: String,
    generation: Generation,
    name: Option<String>,
) -> tokio::task::JoinHandle<bool> {
    tokio::spawn(async move {
        let enrichment = match enrich_venue(&yelp, name.as_deref(), &review_location).await {
            Ok(enrichment) => enrichment,
            Err(SourceError::MissingApiKey) => {
                tracing::debug!("YELP_API_KEY not set; skipping enrichment");
                Enrichment::not_found()
            }
            Err(e) => {
                tracing::warn!(error = %e, name = ?name, "enrichment failed");
                Enrichment::not_found()
            }
        };

        let applied = session.write().await.selection.complete(generation, enrichment);
        if !applied {
            tracing::debug!(generation = generation.0, "discarded stale enrichment");
        }
        applied
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use mtlresto_core::Coordinate;

    use super::*;

    fn venue(id: i64, name: &str) -> Venue {
        let mut tags = BTreeMap::new();
        tags.insert("name".to_string(), name.to_string());
        Venue {
            id,
            coordinate: Coordinate::new(45.51, -73.57),
            tags,
        }
    }

    #[test]
    fn failed_fetch_degrades_to_empty_cache() {
        let mut session = Session::new(&AreaSettings::default());
        session.search.set_query("piz");
        session.finish_venue_fetch(Err(SourceError::InvalidRequest("boom".to_string())));
        assert_eq!(session.venues.label(), "unavailable");
        assert!(session.search.is_loaded());
        assert_eq!(session.search.filtered_len(), 0);
    }

    #[test]
    fn query_typed_before_fetch_applies_on_load() {
        let mut session = Session::new(&AreaSettings::default());
        session.search.set_query("piz");
        session.finish_venue_fetch(Ok(vec![
            venue(1, "Pizza Place"),
            venue(2, "Sushi Bar"),
            venue(3, "Pizza Corner"),
        ]));
        assert_eq!(session.venues, VenueFetchStatus::Ok { count: 3 });
        assert_eq!(session.search.filtered_len(), 2);
    }

    #[tokio::test]
    async fn stale_enrichment_is_discarded() {
        let session = Session::shared(&AreaSettings::default());
        let yelp = Arc::new(
            YelpClient::new("http://127.0.0.1:9", None, 1, "mtlresto-test/0.1").expect("client"),
        );

        let (first, second) = {
            let mut guard = session.write().await;
            let first = guard.selection.select(&venue(1, "Pizza Place"));
            let second = guard.selection.select(&venue(3, "Pizza Corner"));
            (first, second)
        };

        let stale = spawn_enrichment(
            Arc::clone(&session),
            Arc::clone(&yelp),
            "Montreal".to_string(),
            first,
            Some("Pizza Place".to_string()),
        )
        .await
        .expect("task");
        assert!(!stale);

        let current = spawn_enrichment(
            Arc::clone(&session),
            yelp,
            "Montreal".to_string(),
            second,
            Some("Pizza Corner".to_string()),
        )
        .await
        .expect("task");
        assert!(current);

        let guard = session.read().await;
        let selection = guard.selection.current().expect("selection");
        assert_eq!(selection.venue_id, 3);
        assert!(!selection.is_pending());
    }
}
