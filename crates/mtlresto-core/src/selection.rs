//! The currently selected venue and its enrichment result.
//!
//! Every selection is stamped with a fresh [`Generation`]. Enrichment lookups
//! run asynchronously and report back with the generation they were started
//! for; a result whose generation is no longer current is dropped, so a slow
//! response for an earlier click can never overwrite a newer selection.

use serde::{Deserialize, Serialize};

use crate::reviews::{Review, ReviewPager};
use crate::search::SearchState;
use crate::venues::{Coordinate, Venue, VenueId};
use crate::CoreError;

/// Monotonic selection counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(pub u64);

/// Rating, photo and reviews for a venue, as found by the reviews API.
///
/// All fields are unset when no matching business was found.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub business_id: Option<String>,
    pub business_name: Option<String>,
    pub rating: Option<f32>,
    pub review_count: Option<u32>,
    pub photo_url: Option<String>,
    pub business_url: Option<String>,
    pub reviews: ReviewPager,
}

impl Enrichment {
    /// Result for a venue with no matching business.
    #[must_use]
    pub fn not_found() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_reviews(mut self, reviews: Vec<Review>) -> Self {
        self.reviews = ReviewPager::new(reviews);
        self
    }

    #[must_use]
    pub fn has_reviews(&self) -> bool {
        !self.reviews.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub venue_id: VenueId,
    pub name: Option<String>,
    pub coordinate: Coordinate,
    pub generation: Generation,
    /// `None` while the lookup for this generation is still in flight.
    pub enrichment: Option<Enrichment>,
}

impl Selection {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.enrichment.is_none()
    }
}

#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    last_generation: u64,
    current: Option<Selection>,
}

impl SelectionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `venue`, discarding any previous selection and its enrichment.
    pub fn select(&mut self, venue: &Venue) -> Generation {
        self.last_generation += 1;
        let generation = Generation(self.last_generation);
        self.current = Some(Selection {
            venue_id: venue.id,
            name: venue.name().map(str::to_owned),
            coordinate: venue.coordinate,
            generation,
            enrichment: None,
        });
        generation
    }

    /// Selects the cached venue `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownVenue`] if `id` is not in the venue cache.
    pub fn select_from(&mut self, search: &SearchState, id: VenueId) -> Result<Generation, CoreError> {
        let venue = search.venue(id).ok_or(CoreError::UnknownVenue(id))?;
        Ok(self.select(venue))
    }

    /// Stores `enrichment` if `generation` is still the current selection.
    ///
    /// Returns `false` (and drops the result) for superseded generations.
    pub fn complete(&mut self, generation: Generation, enrichment: Enrichment) -> bool {
        match self.current.as_mut() {
            Some(selection) if selection.generation == generation => {
                selection.enrichment = Some(enrichment);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current
            .as_ref()
            .is_some_and(|s| s.generation == generation)
    }

    #[must_use]
    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    /// Mutable access to the current enrichment, for review paging.
    pub fn enrichment_mut(&mut self) -> Option<&mut Enrichment> {
        self.current.as_mut().and_then(|s| s.enrichment.as_mut())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn venue(id: VenueId, name: &str) -> Venue {
        let mut tags = BTreeMap::new();
        tags.insert("name".to_string(), name.to_string());
        Venue {
            id,
            coordinate: Coordinate::new(45.5, -73.6),
            tags,
        }
    }

    fn enrichment(rating: f32) -> Enrichment {
        Enrichment {
            rating: Some(rating),
            ..Enrichment::default()
        }
    }

    #[test]
    fn select_starts_pending() {
        let mut state = SelectionState::new();
        let generation = state.select(&venue(1, "Pizza Place"));
        let current = state.current().expect("selection");
        assert_eq!(current.generation, generation);
        assert_eq!(current.name.as_deref(), Some("Pizza Place"));
        assert!(current.is_pending());
    }

    #[test]
    fn completion_for_current_generation_is_applied() {
        let mut state = SelectionState::new();
        let generation = state.select(&venue(1, "Pizza Place"));
        assert!(state.complete(generation, enrichment(4.5)));
        let current = state.current().expect("selection");
        assert_eq!(current.enrichment.as_ref().and_then(|e| e.rating), Some(4.5));
    }

    #[test]
    fn stale_completion_never_overwrites_newer_selection() {
        let mut state = SelectionState::new();
        let first = state.select(&venue(1, "Pizza Place"));
        let second = state.select(&venue(2, "Sushi Bar"));
        assert!(second > first);

        // Newer lookup resolves first, then the slow one for the first click.
        assert!(state.complete(second, enrichment(3.0)));
        assert!(!state.complete(first, enrichment(5.0)));

        let current = state.current().expect("selection");
        assert_eq!(current.venue_id, 2);
        assert_eq!(current.enrichment.as_ref().and_then(|e| e.rating), Some(3.0));
    }

    #[test]
    fn new_selection_replaces_enrichment_wholesale() {
        let mut state = SelectionState::new();
        let first = state.select(&venue(1, "Pizza Place"));
        state.complete(first, enrichment(4.0));
        state.select(&venue(2, "Sushi Bar"));
        assert!(state.current().expect("selection").is_pending());
    }

    #[test]
    fn completion_after_clear_is_dropped() {
        let mut state = SelectionState::new();
        let generation = state.select(&venue(1, "Pizza Place"));
        state.clear();
        assert!(!state.complete(generation, enrichment(4.0)));
        assert!(state.current().is_none());
    }

    #[test]
    fn select_from_rejects_unknown_venue() {
        let mut search = SearchState::new();
        search.load_venues(vec![venue(1, "Pizza Place")]);
        let mut state = SelectionState::new();
        assert!(state.select_from(&search, 1).is_ok());
        assert!(matches!(
            state.select_from(&search, 99),
            Err(CoreError::UnknownVenue(99))
        ));
        assert_eq!(state.current().map(|s| s.venue_id), Some(1));
    }

    #[test]
    fn not_found_enrichment_is_empty() {
        let e = Enrichment::not_found();
        assert!(e.rating.is_none() && e.photo_url.is_none());
        assert!(!e.has_reviews());
    }
}
