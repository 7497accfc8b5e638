//! Venue fetcher: one Overpass query per session for every restaurant node in
//! the configured bounding box.

use mtlresto_core::{AppConfig, BoundingBox, Coordinate, Venue};
use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::http::{build_client, parse_base_url, read_json};
use crate::types::{OverpassElement, OverpassResponse};

pub struct OverpassClient {
    client: Client,
    endpoint: Url,
}

impl OverpassClient {
    /// `endpoint` is the full interpreter URL, e.g.
    /// `https://overpass-api.de/api/interpreter`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for an unparseable endpoint, or
    /// [`SourceError::Http`] if the `reqwest` client cannot be built.
    pub fn new(endpoint: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            endpoint: parse_base_url(endpoint)?,
        })
    }

    /// # Errors
    ///
    /// See [`OverpassClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::new(
            &config.overpass_url,
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    /// Fetches every node tagged `amenity=<amenity>` inside `bbox`.
    ///
    /// Not retried. Elements without a usable position are skipped.
    ///
    /// # Errors
    ///
    /// - [`SourceError::InvalidRequest`] for a degenerate box or a malformed
    ///   amenity value.
    /// - [`SourceError::RateLimited`] / [`SourceError::UnexpectedStatus`] for
    ///   non-2xx responses.
    /// - [`SourceError::Http`] on network failure.
    /// - [`SourceError::Deserialize`] if the body is not Overpass JSON.
    pub async fn fetch_venues(
        &self,
        bbox: &BoundingBox,
        amenity: &str,
    ) -> Result<Vec<Venue>, SourceError> {
        let query = build_query(bbox, amenity)?;
        tracing::debug!(%query, "querying overpass");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("data", query.as_str())])
            .send()
            .await?;
        let parsed: OverpassResponse = read_json(response, "overpass venue query").await?;

        let total = parsed.elements.len();
        let venues: Vec<Venue> = parsed
            .elements
            .into_iter()
            .filter_map(into_venue)
            .collect();
        if venues.len() < total {
            tracing::debug!(
                skipped = total - venues.len(),
                "dropped overpass elements without coordinates"
            );
        }
        tracing::info!(count = venues.len(), "fetched venues");
        Ok(venues)
    }
}

/// Builds `[out:json];(node["amenity"="<amenity>"](S,W,N,E););out body;`.
///
/// # Errors
///
/// Returns [`SourceError::InvalidRequest`] for an invalid box or an amenity
/// that would break out of the tag selector.
pub fn build_query(bbox: &BoundingBox, amenity: &str) -> Result<String, SourceError> {
    if let Some(reason) = bbox.validation_error() {
        return Err(SourceError::InvalidRequest(reason));
    }
    let amenity = amenity.trim();
    if amenity.is_empty() || amenity.contains(['"', '\\']) {
        return Err(SourceError::InvalidRequest(format!(
            "invalid amenity value {amenity:?}"
        )));
    }
    Ok(format!(
        "[out:json];(node[\"amenity\"=\"{amenity}\"]{bbox};);out body;",
        bbox = bbox.to_overpass()
    ))
}

fn into_venue(element: OverpassElement) -> Option<Venue> {
    let (latitude, longitude) = match (element.lat, element.lon, element.center) {
        (Some(lat), Some(lon), _) => (lat, lon),
        (_, _, Some(center)) => (center.lat, center.lon),
        _ => return None,
    };
    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        tracing::debug!(
            id = element.id,
            kind = %element.element_type,
            "skipping overpass element with invalid coordinates"
        );
        return None;
    }
    Some(Venue {
        id: element.id,
        coordinate,
        tags: element.tags,
    })
}
