//! Venue and geometry types shared by every crate in the workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// OSM node id of a venue.
pub type VenueId = i64;

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Downtown Montreal, used as the map center until a position is known.
    pub const MONTREAL: Coordinate = Coordinate {
        latitude: 45.5017,
        longitude: -73.5673,
    };

    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` when both components are finite and within WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Latitude/longitude rectangle in Overpass order (south, west, north, east).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Greater Montreal, roughly 0.1 degrees around downtown.
    pub const MONTREAL: BoundingBox = BoundingBox {
        south: 45.4017,
        west: -73.7173,
        north: 45.6017,
        east: -73.4673,
    };

    /// Returns a human-readable reason when the box is degenerate or out of range.
    #[must_use]
    pub fn validation_error(&self) -> Option<String> {
        let values = [self.south, self.west, self.north, self.east];
        if values.iter().any(|v| !v.is_finite()) {
            return Some("bounding box must contain finite coordinates".to_string());
        }
        if self.south >= self.north || self.west >= self.east {
            return Some("bounding box must be ordered south < north and west < east".to_string());
        }
        if !(-90.0..=90.0).contains(&self.south) || !(-90.0..=90.0).contains(&self.north) {
            return Some("latitude must be within [-90, 90]".to_string());
        }
        if !(-180.0..=180.0).contains(&self.west) || !(-180.0..=180.0).contains(&self.east) {
            return Some("longitude must be within [-180, 180]".to_string());
        }
        None
    }

    #[must_use]
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }

    /// Overpass filter form: `(south,west,north,east)`.
    #[must_use]
    pub fn to_overpass(&self) -> String {
        format!("({},{},{},{})", self.south, self.west, self.north, self.east)
    }
}

/// A restaurant as returned by the map-data API. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: VenueId,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Venue {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.tags
            .get("name")
            .map(String::as_str)
            .filter(|n| !n.trim().is_empty())
    }

    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue(name: Option<&str>) -> Venue {
        let mut tags = BTreeMap::new();
        tags.insert("amenity".to_string(), "restaurant".to_string());
        if let Some(n) = name {
            tags.insert("name".to_string(), n.to_string());
        }
        Venue {
            id: 1,
            coordinate: Coordinate::MONTREAL,
            tags,
        }
    }

    #[test]
    fn montreal_bbox_is_valid_and_contains_default_center() {
        assert!(BoundingBox::MONTREAL.validation_error().is_none());
        assert!(BoundingBox::MONTREAL.contains(Coordinate::MONTREAL));
    }

    #[test]
    fn inverted_bbox_is_rejected() {
        let bbox = BoundingBox {
            south: 45.6,
            west: -73.7,
            north: 45.4,
            east: -73.4,
        };
        assert!(bbox.validation_error().is_some());
    }

    #[test]
    fn overpass_form_matches_query_order() {
        assert_eq!(
            BoundingBox::MONTREAL.to_overpass(),
            "(45.4017,-73.7173,45.6017,-73.4673)"
        );
    }

    #[test]
    fn blank_name_tag_reads_as_missing() {
        assert_eq!(venue(Some("  ")).name(), None);
        assert_eq!(venue(None).name(), None);
        assert_eq!(venue(Some("Chez Lévêque")).name(), Some("Chez Lévêque"));
    }

    #[test]
    fn coordinate_validity() {
        assert!(Coordinate::MONTREAL.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
