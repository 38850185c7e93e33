use serde_json::json;
use techtweet_news::newsapi::{HeadlineQuery, NewsApiClient};
use techtweet_news::{HeadlineSource, NewsError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, key: &str) -> NewsApiClient {
    NewsApiClient::with_endpoint(key.to_string(), HeadlineQuery::default(), &server.uri()).unwrap()
}

#[tokio::test]
async fn fetches_technology_batch_of_five() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("category", "technology"))
        .and(query_param("language", "en"))
        .and(query_param("pageSize", "5"))
        .and(header("x-api-key", "news-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "totalResults": 38,
            "articles": [
                {
                    "source": {"id": "the-verge", "name": "The Verge"},
                    "title": "A new open-source database hits 1.0",
                    "urlToImage": "https://cdn.example.com/db.jpg",
                    "publishedAt": "2024-05-01T12:00:00Z"
                },
                {"source": {"id": null, "name": "[Removed]"}, "title": "[Removed]", "urlToImage": null},
                {"title": "Quantum startup raises Series B", "urlToImage": null, "publishedAt": "2024-05-01T11:00:00Z"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let headlines = client(&server, "news-key").top_headlines().await.unwrap();
    assert_eq!(headlines.len(), 2);
    assert_eq!(headlines[0].title, "A new open-source database hits 1.0");
    assert_eq!(headlines[0].image_url.as_deref(), Some("https://cdn.example.com/db.jpg"));
    assert_eq!(headlines[1].image_url, None);
}

#[tokio::test]
async fn empty_batch_is_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "ok", "totalResults": 0, "articles": []})),
        )
        .mount(&server)
        .await;

    let headlines = client(&server, "k").top_headlines().await.unwrap();
    assert!(headlines.is_empty());
}

#[tokio::test]
async fn invalid_key_is_an_http_error_with_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid or incorrect."
        })))
        .mount(&server)
        .await;

    let err = client(&server, "wrong").top_headlines().await.unwrap_err();
    match err {
        NewsError::Http(e) => assert_eq!(e.code().as_deref(), Some("apiKeyInvalid")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn missing_key_skips_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, "").top_headlines().await.unwrap_err();
    assert!(matches!(err, NewsError::Config(_)));
}
