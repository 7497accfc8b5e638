//! Integration tests for `YelpClient` and `enrich_venue` against a local
//! `wiremock` server.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mtlresto_sources::{enrich_venue, SourceError, YelpClient};

fn test_client(server: &MockServer) -> YelpClient {
    YelpClient::new(
        &format!("{}/v3", server.uri()),
        Some("test-key".to_owned()),
        5,
        "mtlresto-test/0.1",
    )
    .expect("failed to build test YelpClient")
}

async fn mount_search(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .and(query_param("term", "Pizza Place"))
        .and(query_param("location", "Montreal"))
        .and(query_param("limit", "1"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn enrich_venue_combines_business_and_reviews() {
    let server = MockServer::start().await;

    mount_search(
        &server,
        json!({"businesses": [{
            "id": "pizza-place-montreal",
            "name": "Pizza Place",
            "rating": 4.5,
            "review_count": 212,
            "image_url": "https://img.example/pizza.jpg",
            "url": "https://www.yelp.com/biz/pizza-place-montreal"
        }]}),
    )
    .await;

    let reviews: Vec<_> = (0..7)
        .map(|i| {
            json!({
                "text": format!("Review {i}"),
                "rating": 5,
                "time_created": "2024-05-01 12:00:00",
                "user": {"name": format!("User {i}")}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/v3/businesses/pizza-place-montreal/reviews"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reviews": reviews})))
        .expect(1)
        .mount(&server)
        .await;

    let enrichment = enrich_venue(&test_client(&server), Some("Pizza Place"), "Montreal")
        .await
        .expect("enrichment should succeed");

    assert_eq!(enrichment.rating, Some(4.5));
    assert_eq!(
        enrichment.photo_url.as_deref(),
        Some("https://img.example/pizza.jpg")
    );
    assert_eq!(enrichment.reviews.len(), 7);
    assert_eq!(enrichment.reviews.last_page(), 2);
    assert_eq!(enrichment.reviews.current().reviews.len(), 5);
    assert_eq!(enrichment.reviews.reviews()[0].author, "User 0");
}

#[tokio::test]
async fn enrich_venue_without_match_is_not_found() {
    let server = MockServer::start().await;

    mount_search(&server, json!({"businesses": [], "total": 0})).await;

    Mock::given(method("GET"))
        .and(path("/v3/businesses/pizza-place-montreal/reviews"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let enrichment = enrich_venue(&test_client(&server), Some("Pizza Place"), "Montreal")
        .await
        .expect("no match is not an error");
    assert!(enrichment.business_id.is_none());
    assert!(!enrichment.has_reviews());
}

#[tokio::test]
async fn missing_api_key_fails_without_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = YelpClient::new(&server.uri(), None, 5, "mtlresto-test/0.1").expect("client");
    let err = enrich_venue(&client, Some("Pizza Place"), "Montreal")
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::MissingApiKey), "got {err:?}");
}

#[tokio::test]
async fn unauthorized_search_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/businesses/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "TOKEN_INVALID", "description": "Invalid access token"}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .search_business("Pizza Place", "Montreal")
        .await
        .unwrap_err();
    assert!(
        matches!(err, SourceError::UnexpectedStatus { status: 401, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn failed_reviews_keep_business_details() {
    let server = MockServer::start().await;

    mount_search(
        &server,
        json!({"businesses": [{
            "id": "pizza-place-montreal",
            "name": "Pizza Place",
            "rating": 4.0,
            "review_count": 98,
            "image_url": "https://img.example/pizza.jpg"
        }]}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/v3/businesses/pizza-place-montreal/reviews"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let enrichment = enrich_venue(&test_client(&server), Some("Pizza Place"), "Montreal")
        .await
        .expect("business details survive a reviews failure");

    assert_eq!(enrichment.business_id.as_deref(), Some("pizza-place-montreal"));
    assert_eq!(enrichment.rating, Some(4.0));
    assert_eq!(
        enrichment.photo_url.as_deref(),
        Some("https://img.example/pizza.jpg")
    );
    assert!(!enrichment.has_reviews());
}
