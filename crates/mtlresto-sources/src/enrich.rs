//! Detail enricher: venue name -> Yelp business -> reviews.

use mtlresto_core::Enrichment;

use crate::error::SourceError;
use crate::types::YelpBusiness;
use crate::yelp::YelpClient;

/// Looks up rating, photo and reviews for a venue called `name` in
/// `location`.
///
/// An unnamed venue or a search with no hits yields
/// [`Enrichment::not_found`]. A failed reviews request keeps the business
/// details with an empty review list. Nothing is retried.
///
/// # Errors
///
/// Propagates [`SourceError`] from the business search, including
/// [`SourceError::MissingApiKey`].
pub async fn enrich_venue(
    yelp: &YelpClient,
    name: Option<&str>,
    location: &str,
) -> Result<Enrichment, SourceError> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(Enrichment::not_found());
    };

    let Some(business) = yelp.search_business(name, location).await? else {
        tracing::debug!(name, "no yelp business matched");
        return Ok(Enrichment::not_found());
    };

    let reviews = match yelp.fetch_reviews(&business.id).await {
        Ok(reviews) => reviews,
        Err(e) => {
            tracing::warn!(name, business_id = %business.id, error = %e, "yelp reviews unavailable");
            return Ok(from_business(business));
        }
    };
    tracing::debug!(
        name,
        business_id = %business.id,
        reviews = reviews.len(),
        "enriched venue"
    );
    Ok(from_business(business).with_reviews(reviews))
}

fn from_business(business: YelpBusiness) -> Enrichment {
    Enrichment {
        business_id: Some(business.id),
        business_name: Some(business.name),
        rating: business.rating,
        review_count: business.review_count,
        photo_url: business.image_url.filter(|u| !u.trim().is_empty()),
        business_url: business.url.filter(|u| !u.trim().is_empty()),
        ..Enrichment::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_photo_url_is_dropped() {
        let enrichment = from_business(YelpBusiness {
            id: "la-banquise-montreal".to_owned(),
            name: "La Banquise".to_owned(),
            rating: Some(4.0),
            review_count: Some(3210),
            image_url: Some(String::new()),
            url: None,
        });
        assert_eq!(enrichment.rating, Some(4.0));
        assert!(enrichment.photo_url.is_none());
        assert!(!enrichment.has_reviews());
    }

    #[tokio::test]
    async fn unnamed_venue_is_not_looked_up() {
        // No key configured: any network attempt would fail with MissingApiKey.
        let yelp = YelpClient::new("http://127.0.0.1:9", None, 1, "ua").expect("client");
        let enrichment = enrich_venue(&yelp, Some("   "), "Montreal")
            .await
            .expect("not found");
        assert_eq!(enrichment, Enrichment::not_found());
    }
}
