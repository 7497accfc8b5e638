//! Live search over the cached venue set.
//!
//! Two filters narrow the cache: a free-text query matched against venue
//! names, and a type filter matched against the name or any tag value. Both
//! are re-applied synchronously on every input change, and again whenever the
//! cache itself is replaced, so a query typed before the venue fetch resolves
//! still takes effect once the venues arrive.

use serde::{Deserialize, Serialize};

use crate::venues::{Coordinate, Venue, VenueId};

/// Queries shorter than this (in characters) leave the name filter inactive.
pub const MIN_QUERY_CHARS: usize = 3;

/// Upper bound on every suggestion list.
pub const MAX_SUGGESTIONS: usize = 5;

/// Where a suggestion came from, and therefore what selecting it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestionSource {
    /// A cached venue; selecting it selects the venue.
    Venue { id: VenueId },
    /// A geocoder candidate; selecting it recenters the map.
    Address { coordinate: Coordinate },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    pub source: SuggestionSource,
}

/// What the caller must do after a suggestion has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuggestionAction {
    SelectVenue(VenueId),
    Recenter(Coordinate),
}

#[derive(Debug, Default, Clone)]
pub struct SearchState {
    venues: Vec<Venue>,
    loaded: bool,
    query: String,
    type_filter: String,
    /// Indices into `venues`, in cache order.
    filtered: Vec<usize>,
}

impl SearchState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the venue cache and re-derives the filtered set from the
    /// current query and type filter.
    pub fn load_venues(&mut self, venues: Vec<Venue>) {
        self.venues = venues;
        self.loaded = true;
        self.refilter();
    }

    /// `false` until the first [`load_venues`](Self::load_venues) call.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.refilter();
    }

    pub fn set_type_filter(&mut self, type_filter: impl Into<String>) {
        self.type_filter = type_filter.into();
        self.refilter();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn type_filter(&self) -> &str {
        &self.type_filter
    }

    #[must_use]
    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    #[must_use]
    pub fn venue(&self, id: VenueId) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }

    /// Venues currently displayed, in cache order.
    pub fn filtered(&self) -> impl Iterator<Item = &Venue> + '_ {
        self.filtered.iter().filter_map(|&i| self.venues.get(i))
    }

    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// `true` when `id` is part of the currently displayed set.
    #[must_use]
    pub fn is_displayed(&self, id: VenueId) -> bool {
        self.filtered().any(|v| v.id == id)
    }

    /// Autocomplete entries for the current query: the first
    /// [`MAX_SUGGESTIONS`] venues whose name matches it. Empty while the query
    /// is below the activation threshold.
    #[must_use]
    pub fn suggestions(&self) -> Vec<Suggestion> {
        if !query_is_active(&self.query) {
            return Vec::new();
        }
        let needle = self.query.to_lowercase();
        self.venues
            .iter()
            .filter(|v| name_contains(v, &needle))
            .take(MAX_SUGGESTIONS)
            .filter_map(venue_suggestion)
            .collect()
    }

    /// Suggestions offered when the pointer hovers an empty search box: up to
    /// [`MAX_SUGGESTIONS`] named venues from the cache.
    #[must_use]
    pub fn hover_suggestions(&self) -> Vec<Suggestion> {
        if !self.query.is_empty() {
            return Vec::new();
        }
        self.venues
            .iter()
            .filter_map(venue_suggestion)
            .take(MAX_SUGGESTIONS)
            .collect()
    }

    /// Puts the suggestion label into the search box and reports the follow-up
    /// action dictated by the suggestion's source.
    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) -> SuggestionAction {
        self.set_query(suggestion.label.clone());
        match suggestion.source {
            SuggestionSource::Venue { id } => SuggestionAction::SelectVenue(id),
            SuggestionSource::Address { coordinate } => SuggestionAction::Recenter(coordinate),
        }
    }

    fn refilter(&mut self) {
        self.filtered = filter_indices(&self.venues, &self.query, &self.type_filter);
    }
}

/// `true` once the query is long enough to narrow the venue set.
#[must_use]
pub fn query_is_active(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

/// Indices of `venues` that pass both filters. Filters that are inactive
/// (short query, empty type) pass everything.
#[must_use]
pub fn filter_indices(venues: &[Venue], query: &str, type_filter: &str) -> Vec<usize> {
    let query_needle = query_is_active(query).then(|| query.to_lowercase());
    let type_needle = (!type_filter.trim().is_empty()).then(|| type_filter.trim().to_lowercase());

    venues
        .iter()
        .enumerate()
        .filter(|(_, v)| {
            query_needle
                .as_deref()
                .is_none_or(|needle| name_contains(v, needle))
        })
        .filter(|(_, v)| {
            type_needle
                .as_deref()
                .is_none_or(|needle| type_matches(v, needle))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Case-insensitive name match. `needle` must already be lowercase.
fn name_contains(venue: &Venue, needle: &str) -> bool {
    venue
        .name()
        .is_some_and(|name| name.to_lowercase().contains(needle))
}

/// Type filter: the name or any tag value contains `needle` (lowercase).
fn type_matches(venue: &Venue, needle: &str) -> bool {
    name_contains(venue, needle)
        || venue
            .tags
            .values()
            .any(|value| value.to_lowercase().contains(needle))
}

fn venue_suggestion(venue: &Venue) -> Option<Suggestion> {
    venue.name().map(|name| Suggestion {
        label: name.to_string(),
        source: SuggestionSource::Venue { id: venue.id },
    })
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
