//! Yelp Fusion client: business search by name and per-business reviews.

use chrono::{DateTime, NaiveDateTime, Utc};
use mtlresto_core::{AppConfig, Review};
use reqwest::{Client, RequestBuilder, Url};

use crate::error::SourceError;
use crate::http::{build_client, endpoint, parse_base_url, read_json};
use crate::types::{YelpBusiness, YelpReview, YelpReviewsResponse, YelpSearchResponse};

const TIME_CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct YelpClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl std::fmt::Debug for YelpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YelpClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl YelpClient {
    /// `api_key` may be `None`; every lookup then fails with
    /// [`SourceError::MissingApiKey`] without touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidBaseUrl`] for an unusable base URL, or
    /// [`SourceError::Http`] if the `reqwest` client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            base_url: parse_base_url(base_url)?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// # Errors
    ///
    /// See [`YelpClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::new(
            &config.yelp_url,
            config.yelp_api_key.clone(),
            config.http_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn authorized(&self, url: Url) -> Result<RequestBuilder, SourceError> {
        let key = self.api_key.as_deref().ok_or(SourceError::MissingApiKey)?;
        Ok(self.client.get(url).bearer_auth(key))
    }

    /// Best match for `term` near `location`, if any.
    ///
    /// # Errors
    ///
    /// - [`SourceError::MissingApiKey`] when no key is configured.
    /// - Transport, status and decoding errors from the request.
    pub async fn search_business(
        &self,
        term: &str,
        location: &str,
    ) -> Result<Option<YelpBusiness>, SourceError> {
        let url = endpoint(&self.base_url, &["businesses", "search"])?;
        let response = self
            .authorized(url)?
            .query(&[("term", term), ("location", location), ("limit", "1")])
            .send()
            .await?;
        let parsed: YelpSearchResponse = read_json(response, "yelp business search").await?;
        Ok(parsed.businesses.into_iter().next())
    }

    /// Reviews for `business_id`, in the order Yelp returns them.
    ///
    /// # Errors
    ///
    /// - [`SourceError::MissingApiKey`] when no key is configured.
    /// - Transport, status and decoding errors from the request.
    pub async fn fetch_reviews(&self, business_id: &str) -> Result<Vec<Review>, SourceError> {
        let url = endpoint(&self.base_url, &["businesses", business_id, "reviews"])?;
        let response = self.authorized(url)?.send().await?;
        let parsed: YelpReviewsResponse = read_json(response, "yelp reviews").await?;
        Ok(parsed.reviews.into_iter().map(into_review).collect())
    }
}

fn into_review(review: YelpReview) -> Review {
    Review {
        author: review
            .user
            .and_then(|u| u.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Anonymous".to_owned()),
        rating: review.rating,
        text: review.text,
        created_at: review.time_created.as_deref().and_then(parse_time_created),
        url: review.url,
    }
}

fn parse_time_created(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), TIME_CREATED_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;
    use crate::types::YelpUser;

    #[test]
    fn time_created_is_read_as_utc() {
        let parsed = parse_time_created("2024-03-09 18:41:13").expect("timestamp");
        assert_eq!(parsed.year(), 2024);
        assert_eq!(parsed.hour(), 18);
        assert!(parse_time_created("last tuesday").is_none());
    }

    #[test]
    fn review_without_user_name_is_anonymous() {
        let review = into_review(YelpReview {
            text: "Bon".to_owned(),
            rating: 4.0,
            time_created: None,
            url: None,
            user: Some(YelpUser { name: None }),
        });
        assert_eq!(review.author, "Anonymous");
        assert!(review.created_at.is_none());
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = YelpClient::new(
            "https://api.yelp.com/v3",
            Some("sk-secret".to_owned()),
            5,
            "mtlresto-test/0.1",
        )
        .expect("client");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[redacted]"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let client = YelpClient::new("https://api.yelp.com/v3", Some("  ".to_owned()), 5, "ua")
            .expect("client");
        assert!(!client.has_api_key());
    }
}
