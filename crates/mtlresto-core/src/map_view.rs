//! Projection of search and selection state onto map markers and a popup.

use serde::Serialize;

use crate::area::AreaSettings;
use crate::reviews::ReviewPage;
use crate::search::SearchState;
use crate::selection::Selection;
use crate::venues::{Coordinate, VenueId};

pub const UNNAMED_VENUE: &str = "Unnamed restaurant";
pub const NO_REVIEWS: &str = "No reviews available";
pub const LOADING_DETAILS: &str = "Loading details";

/// Marker image and its pixel geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub url: String,
    pub size: [u32; 2],
    /// Pixel of the image that sits on the coordinate.
    pub anchor: [u32; 2],
    pub popup_anchor: [i32; 2],
}

impl MarkerIcon {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size: [32, 32],
            anchor: [16, 32],
            popup_anchor: [0, -32],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub venue_id: VenueId,
    pub coordinate: Coordinate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup<'a> {
    pub venue_id: VenueId,
    pub title: &'a str,
    pub rating: Option<f32>,
    pub photo_url: Option<&'a str>,
    pub business_url: Option<&'a str>,
    /// Shown instead of reviews while loading or when none were found.
    pub message: Option<&'static str>,
    pub reviews: Option<ReviewPage<'a>>,
}

/// Camera position plus the fixed marker icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    #[serde(skip)]
    selected_zoom: u8,
    pub icon: MarkerIcon,
}

impl MapView {
    #[must_use]
    pub fn from_area(area: &AreaSettings) -> Self {
        Self {
            center: area.default_center,
            zoom: area.default_zoom,
            selected_zoom: area.selected_zoom,
            icon: MarkerIcon::new(area.marker_icon_url.clone()),
        }
    }

    /// Moves the camera without changing zoom (position or address lookups).
    pub fn recenter(&mut self, center: Coordinate) {
        self.center = center;
    }

    /// Centers on a selected venue at the fixed selection zoom.
    pub fn focus(&mut self, center: Coordinate) {
        self.center = center;
        self.zoom = self.selected_zoom;
    }

    /// One marker per displayed venue; no clustering.
    #[must_use]
    pub fn markers(&self, search: &SearchState) -> Vec<Marker> {
        search
            .filtered()
            .map(|v| Marker {
                venue_id: v.id,
                coordinate: v.coordinate,
                label: v.name().unwrap_or(UNNAMED_VENUE).to_string(),
            })
            .collect()
    }

    /// Popup content for the selected venue.
    #[must_use]
    pub fn popup<'a>(&self, selection: &'a Selection) -> Popup<'a> {
        let title = selection.name.as_deref().unwrap_or(UNNAMED_VENUE);
        let Some(enrichment) = selection.enrichment.as_ref() else {
            return Popup {
                venue_id: selection.venue_id,
                title,
                rating: None,
                photo_url: None,
                business_url: None,
                message: Some(LOADING_DETAILS),
                reviews: None,
            };
        };

        let (message, reviews) = if enrichment.has_reviews() {
            (None, Some(enrichment.reviews.current()))
        } else {
            (Some(NO_REVIEWS), None)
        };

        Popup {
            venue_id: selection.venue_id,
            title,
            rating: enrichment.rating,
            photo_url: enrichment.photo_url.as_deref(),
            business_url: enrichment.business_url.as_deref(),
            message,
            reviews,
        }
    }
}
