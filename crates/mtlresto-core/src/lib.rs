pub mod app_config;
pub mod area;
pub mod config;
pub mod contact;
pub mod location;
pub mod map_view;
pub mod menus;
pub mod profile;
pub mod reviews;
pub mod search;
pub mod selection;
pub mod venues;

pub use app_config::{AppConfig, Environment};
pub use area::{load_area, load_area_or_default, AreaSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use contact::{
    ContactForm, ContactMessage, ContactValidationError, FieldError, SubmissionOutcome,
    ValidationMode, SEND_FAILURE_MESSAGE,
};
pub use location::{resolve_current_position, LocationError, PositionProvider, ReportedPosition};
pub use map_view::{MapView, Marker, MarkerIcon, Popup, LOADING_DETAILS, NO_REVIEWS, UNNAMED_VENUE};
pub use menus::{
    sanitize_name, MenuError, MenuFile, MenuItem, MenuStatus, RestaurantMenu, UNNAMED_RESTAURANT,
};
pub use profile::{ImageInput, ProfileEditor, ProfileField, ProfileUpdate, UserProfile};
pub use reviews::{Review, ReviewPage, ReviewPager, REVIEW_PAGE_SIZE};
pub use search::{
    SearchState, Suggestion, SuggestionAction, SuggestionSource, MAX_SUGGESTIONS, MIN_QUERY_CHARS,
};
pub use selection::{Enrichment, Generation, Selection, SelectionState};
pub use venues::{BoundingBox, Coordinate, Venue, VenueId};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("venue {0} is not in the venue cache")]
    UnknownVenue(VenueId),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read area file {path}: {source}")]
    AreaFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse area file: {0}")]
    AreaFileParse(#[from] serde_yaml::Error),

    #[error("area validation failed: {0}")]
    Validation(String),
}
