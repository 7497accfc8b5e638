//! Wire types for the Overpass, Nominatim and Yelp responses.
//!
//! Only the fields the app reads are modelled; everything else is ignored.
//!
//! ### Overpass
//! `out body` on a `node` query returns `elements` with top-level `lat`/`lon`.
//! Ways and relations (only present if the query is widened) carry a `center`
//! instead, and only when `out center` is requested. Elements with neither
//! are dropped during conversion.
//!
//! ### Nominatim
//! `lat` and `lon` are JSON **strings**, e.g. `"45.5088"`, not numbers.
//!
//! ### Yelp
//! `time_created` is a local `"YYYY-MM-DD HH:MM:SS"` string with no zone; it
//! is treated as UTC. Review `rating` is an integer 1..=5, business `rating`
//! a half-step float.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(rename = "type")]
    pub element_type: String,
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub struct YelpSearchResponse {
    #[serde(default)]
    pub businesses: Vec<YelpBusiness>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct YelpBusiness {
    pub id: String,
    pub name: String,
    pub rating: Option<f32>,
    pub review_count: Option<u32>,
    /// Empty string when the business has no photo.
    pub image_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YelpReviewsResponse {
    #[serde(default)]
    pub reviews: Vec<YelpReview>,
}

#[derive(Debug, Deserialize)]
pub struct YelpReview {
    #[serde(default)]
    pub text: String,
    pub rating: f32,
    pub time_created: Option<String>,
    pub url: Option<String>,
    pub user: Option<YelpUser>,
}

#[derive(Debug, Deserialize)]
pub struct YelpUser {
    pub name: Option<String>,
}
