//! Read-only lookups against the live third-party services.
//!
//! None of these commands touch the database.

use clap::Subcommand;
use mtlresto_core::{AppConfig, SearchState, UNNAMED_VENUE};
use mtlresto_sources::{enrich_venue, NominatimClient, OverpassClient, YelpClient};

/// Sub-commands available under `venues`.
#[derive(Debug, Subcommand)]
pub enum VenueCommands {
    /// Fetch venues for the configured area and apply the search filters
    Search {
        /// Name query (ignored below three characters)
        #[arg(long)]
        query: Option<String>,
        /// Type filter matched against the name and every tag value
        #[arg(long = "type")]
        type_filter: Option<String>,
        /// Maximum number of venues to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

pub(crate) async fn run_venues(config: &AppConfig, command: VenueCommands) -> anyhow::Result<()> {
    match command {
        VenueCommands::Search {
            query,
            type_filter,
            limit,
        } => run_venue_search(config, query, type_filter, limit).await,
    }
}

async fn run_venue_search(
    config: &AppConfig,
    query: Option<String>,
    type_filter: Option<String>,
    limit: usize,
) -> anyhow::Result<()> {
    let area = mtlresto_core::load_area_or_default(&config.area_path)?;
    let client = OverpassClient::from_config(config)?;
    let venues = client
        .fetch_venues(&area.bounding_box, &area.amenity)
        .await?;

    let mut search = SearchState::new();
    search.load_venues(venues);
    if let Some(query) = query {
        search.set_query(query);
    }
    if let Some(type_filter) = type_filter {
        search.set_type_filter(type_filter);
    }

    println!(
        "{} of {} venues in {} match",
        search.filtered_len(),
        search.venues().len(),
        area.name
    );
    for venue in search.filtered().take(limit) {
        println!(
            "  {:>12}  {:<40} {:.5}, {:.5}",
            venue.id,
            venue.name().unwrap_or(UNNAMED_VENUE),
            venue.coordinate.latitude,
            venue.coordinate.longitude,
        );
    }
    Ok(())
}

pub(crate) async fn run_geocode(
    config: &AppConfig,
    address: &str,
    suggest: bool,
) -> anyhow::Result<()> {
    let client = NominatimClient::from_config(config)?;

    if suggest {
        let matches = client.suggest_addresses(address).await?;
        if matches.is_empty() {
            println!("no suggestions for {address:?}");
        }
        for m in matches {
            println!(
                "  {:.5}, {:.5}  {}",
                m.coordinate.latitude, m.coordinate.longitude, m.label
            );
        }
        return Ok(());
    }

    let position = client.resolve_address(address).await?;
    println!("{:.6}, {:.6}", position.latitude, position.longitude);
    Ok(())
}

pub(crate) async fn run_enrich(
    config: &AppConfig,
    name: &str,
    location: Option<&str>,
    page: usize,
) -> anyhow::Result<()> {
    let client = YelpClient::from_config(config)?;
    if !client.has_api_key() {
        anyhow::bail!("YELP_API_KEY is not set; cannot look up reviews");
    }

    let area;
    let location = match location {
        Some(location) => location,
        None => {
            area = mtlresto_core::load_area_or_default(&config.area_path)?;
            area.review_location.as_str()
        }
    };

    let mut enrichment = enrich_venue(&client, Some(name), location).await?;
    let Some(business) = enrichment.business_name.as_deref() else {
        println!("no business found for {name:?} in {location}");
        return Ok(());
    };

    let rating = enrichment
        .rating
        .map_or_else(|| "unrated".to_string(), |r| format!("{r:.1}"));
    println!("{business} ({rating})");
    if let Some(url) = enrichment.business_url.as_deref() {
        println!("  {url}");
    }

    if !enrichment.has_reviews() {
        println!("  {}", mtlresto_core::NO_REVIEWS);
        return Ok(());
    }

    let business = business.to_string();
    enrichment.reviews.go_to(page);
    let current = enrichment.reviews.current();
    println!(
        "  reviews for {business}, page {} of {}",
        current.page, current.last_page
    );
    for review in current.reviews {
        println!("  - {} ({:.1}): {}", review.author, review.rating, review.text);
    }
    Ok(())
}
