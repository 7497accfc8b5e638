use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::venues::{BoundingBox, Coordinate};
use crate::ConfigError;

/// Zoom levels accepted by slippy-map tile servers.
const MAX_ZOOM: u8 = 19;

/// Geographic scope of a deployment: where to look for venues and how the map
/// starts out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSettings {
    pub name: String,
    pub bounding_box: BoundingBox,
    pub default_center: Coordinate,
    /// OSM `amenity` value the venue query filters on.
    #[serde(default = "default_amenity")]
    pub amenity: String,
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    #[serde(default = "selected_zoom")]
    pub selected_zoom: u8,
    /// Free-text location passed to the reviews API business search.
    pub review_location: String,
    #[serde(default = "default_marker_icon_url")]
    pub marker_icon_url: String,
}

fn default_amenity() -> String {
    "restaurant".to_string()
}

fn default_zoom() -> u8 {
    13
}

fn selected_zoom() -> u8 {
    16
}

fn default_marker_icon_url() -> String {
    "https://cdn.pixabay.com/photo/2014/04/03/10/03/google-309740_1280.png".to_string()
}

impl Default for AreaSettings {
    fn default() -> Self {
        Self {
            name: "Montreal".to_string(),
            bounding_box: BoundingBox::MONTREAL,
            default_center: Coordinate::MONTREAL,
            amenity: default_amenity(),
            default_zoom: default_zoom(),
            selected_zoom: selected_zoom(),
            review_location: "Montreal".to_string(),
            marker_icon_url: default_marker_icon_url(),
        }
    }
}

/// Load and validate area settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_area(path: &Path) -> Result<AreaSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AreaFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let area: AreaSettings = serde_yaml::from_str(&content)?;
    validate_area(&area)?;

    Ok(area)
}

/// Like [`load_area`], but a missing file yields the built-in Montreal area.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_area_or_default(path: &Path) -> Result<AreaSettings, ConfigError> {
    if path.exists() {
        load_area(path)
    } else {
        Ok(AreaSettings::default())
    }
}

fn validate_area(area: &AreaSettings) -> Result<(), ConfigError> {
    if area.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "area name must be non-empty".to_string(),
        ));
    }

    if let Some(reason) = area.bounding_box.validation_error() {
        return Err(ConfigError::Validation(reason));
    }

    if !area.default_center.is_valid() {
        return Err(ConfigError::Validation(format!(
            "default center {:?} is not a valid coordinate",
            area.default_center
        )));
    }

    if area.amenity.trim().is_empty() || area.amenity.contains('"') {
        return Err(ConfigError::Validation(format!(
            "amenity '{}' must be non-empty and must not contain quotes",
            area.amenity
        )));
    }

    for (label, zoom) in [
        ("default_zoom", area.default_zoom),
        ("selected_zoom", area.selected_zoom),
    ] {
        if zoom > MAX_ZOOM {
            return Err(ConfigError::Validation(format!(
                "{label} {zoom} exceeds maximum zoom {MAX_ZOOM}"
            )));
        }
    }

    if area.review_location.trim().is_empty() {
        return Err(ConfigError::Validation(
            "review_location must be non-empty".to_string(),
        ));
    }

    Ok(())
}
