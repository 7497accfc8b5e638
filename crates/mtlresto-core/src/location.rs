//! Device-position half of the location service.
//!
//! Address geocoding lives with the other HTTP clients in `mtlresto-sources`;
//! this module only covers asking a platform for the current position.

use thiserror::Error;

use crate::venues::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The platform has no position capability or the user denied it.
    #[error("location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("address not found: {0}")]
    AddressNotFound(String),
}

impl LocationError {
    /// One-line message suitable for a user-facing alert.
    #[must_use]
    pub fn alert_message(&self) -> &'static str {
        match self {
            LocationError::LocationUnavailable(_) => {
                "Geolocation is not available; the map stays on its current position."
            }
            LocationError::AddressNotFound(_) => "No location matches that address.",
        }
    }
}

/// Source of the device's current position.
pub trait PositionProvider {
    /// # Errors
    ///
    /// Returns [`LocationError::LocationUnavailable`] when no position can be
    /// obtained.
    fn current_position(&self) -> Result<Coordinate, LocationError>;
}

/// Position reported by the caller (a browser posting its coordinates, CLI
/// flags). `None` means the capability is absent or permission was denied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportedPosition(pub Option<Coordinate>);

impl PositionProvider for ReportedPosition {
    fn current_position(&self) -> Result<Coordinate, LocationError> {
        match self.0 {
            Some(coordinate) if coordinate.is_valid() => Ok(coordinate),
            Some(coordinate) => Err(LocationError::LocationUnavailable(format!(
                "reported position {}, {} is out of range",
                coordinate.latitude, coordinate.longitude
            ))),
            None => Err(LocationError::LocationUnavailable(
                "no position reported".to_string(),
            )),
        }
    }
}

/// Single attempt to read the device position. Never retried.
///
/// # Errors
///
/// Propagates the provider's [`LocationError`].
pub fn resolve_current_position<P: PositionProvider + ?Sized>(
    provider: &P,
) -> Result<Coordinate, LocationError> {
    provider.current_position()
}
