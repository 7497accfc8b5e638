pub mod enrich;
pub mod error;
mod http;
pub mod nominatim;
pub mod overpass;
pub mod types;
pub mod yelp;

pub use enrich::enrich_venue;
pub use error::SourceError;
pub use nominatim::{AddressMatch, NominatimClient};
pub use overpass::{build_query, OverpassClient};
pub use yelp::YelpClient;
