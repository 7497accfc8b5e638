//! Plumbing shared by the three API clients.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::SourceError;

/// Builds the `reqwest` client every source uses: one request timeout, a
/// fixed connect timeout and an identifying `User-Agent` (Nominatim and
/// Overpass reject anonymous clients).
pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, SourceError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, SourceError> {
    let url = Url::parse(raw).map_err(|e| SourceError::InvalidBaseUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(SourceError::InvalidBaseUrl {
            url: raw.to_owned(),
            reason: "URL cannot be used as a base".to_owned(),
        });
    }
    Ok(url)
}

/// Appends path `segments` to `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, SourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| SourceError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "URL cannot be used as a base".to_owned(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Maps non-2xx statuses to typed errors and decodes the body as `T`.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    context: &str,
) -> Result<T, SourceError> {
    let status = response.status();
    let url = response.url().clone();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(SourceError::RateLimited {
            domain: url.host_str().unwrap_or_default().to_owned(),
        });
    }
    if !status.is_success() {
        return Err(SourceError::UnexpectedStatus {
            status: status.as_u16(),
            url: redact_query(&url),
        });
    }

    let body = response.text().await?;
    serde_json::from_str::<T>(&body).map_err(|source| SourceError::Deserialize {
        context: context.to_owned(),
        source,
    })
}

/// Drops the query string so search terms and Overpass scripts stay out of
/// error messages.
fn redact_query(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}
