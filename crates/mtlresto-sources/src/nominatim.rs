//! Address geocoding and autocomplete against Nominatim's `/search`.

use mtlresto_core::{AppConfig, Coordinate, Suggestion, SuggestionSource, MAX_SUGGESTIONS, MIN_QUERY_CHARS};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::SourceError;
use crate::http::{build_client, endpoint, parse_base_url, read_json};
use crate::types::NominatimPlace;

/// One geocoder candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressMatch {
    pub label: String,
    pub coordinate: Coordinate,
}

impl AddressMatch {
    /// Autocomplete entry that recenters the map when picked.
    #[must_use]
    pub fn into_suggestion(self) -> Suggestion {
        Suggestion {
            label: self.label,
            source: SuggestionSource::Address {
                coordinate: self.coordinate,
            },
        }
    }
}

pub struct NominatimClient {
    client: Client,
    search_url: Url,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for an unusable base URL, or
    /// [`SourceError::Http`] if the `reqwest` client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SourceError> {
        let base = parse_base_url(base_url)?;
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            search_url: endpoint(&base, &["search"])?,
        })
    }

    /// # Errors
    ///
    /// See [`NominatimClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::new(
            &config.nominatim_url,
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    /// Geocodes free-form `address` to the first candidate's position.
    ///
    /// # Errors
    ///
    /// - [`SourceError::InvalidRequest`] for a blank address (no request is sent).
    /// - [`SourceError::AddressNotFound`] when no candidate has a usable position.
    /// - Transport, status and decoding errors from the request.
    pub async fn resolve_address(&self, address: &str) -> Result<Coordinate, SourceError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(SourceError::InvalidRequest(
                "address must not be blank".to_owned(),
            ));
        }

        let places = self.search(address, None).await?;
        places
            .into_iter()
            .next()
            .map(|m| m.coordinate)
            .ok_or_else(|| SourceError::AddressNotFound(address.to_owned()))
    }

    /// Up to five address candidates for autocomplete.
    ///
    /// Queries shorter than three characters return an empty list without
    /// contacting the geocoder.
    ///
    /// # Errors
    ///
    /// Transport, status and decoding errors from the request.
    pub async fn suggest_addresses(&self, text: &str) -> Result<Vec<AddressMatch>, SourceError> {
        let text = text.trim();
        if text.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }
        let mut matches = self.search(text, Some(MAX_SUGGESTIONS)).await?;
        matches.truncate(MAX_SUGGESTIONS);
        Ok(matches)
    }

    async fn search(&self, q: &str, limit: Option<usize>) -> Result<Vec<AddressMatch>, SourceError> {
        let mut request = self.client.get(self.search_url.clone()).query(&[
            ("q", q),
            ("format", "json"),
            ("addressdetails", "1"),
        ]);
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }

        let response = request.send().await?;
        let places: Vec<NominatimPlace> = read_json(response, "nominatim search").await?;
        tracing::debug!(candidates = places.len(), "geocoder responded");

        Ok(places.into_iter().filter_map(into_match).collect())
    }
}

fn into_match(place: NominatimPlace) -> Option<AddressMatch> {
    let latitude = place.lat.trim().parse::<f64>().ok()?;
    let longitude = place.lon.trim().parse::<f64>().ok()?;
    let coordinate = Coordinate::new(latitude, longitude);
    if !coordinate.is_valid() {
        return None;
    }
    Some(AddressMatch {
        label: place.display_name,
        coordinate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(lat: &str, lon: &str) -> NominatimPlace {
        NominatimPlace {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
            display_name: "Rue Saint-Denis, Montréal".to_owned(),
        }
    }

    #[test]
    fn string_coordinates_are_parsed() {
        let m = into_match(place("45.5150", " -73.5700")).expect("match");
        assert_eq!(m.coordinate, Coordinate::new(45.515, -73.57));
    }

    #[test]
    fn unparseable_or_out_of_range_candidates_are_dropped() {
        assert!(into_match(place("north", "-73.57")).is_none());
        assert!(into_match(place("145.0", "-73.57")).is_none());
    }

    #[test]
    fn match_becomes_address_suggestion() {
        let suggestion = into_match(place("45.5", "-73.6"))
            .expect("match")
            .into_suggestion();
        assert!(matches!(
            suggestion.source,
            SuggestionSource::Address { .. }
        ));
    }
}
