//! Exercises the crate the way the HTTP facade consumes it: config built
//! from JSON, both read operations, and errors mapped back to status codes.

use chirp::{AsyncClient, ClientConfig, Error};

use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn stub_config(server: &MockServer) -> ClientConfig {
    let mut config: ClientConfig = serde_json::from_value(serde_json::json!({
        "api_key": "key",
        "api_secret": "secret",
        "default_limit": 2
    }))
    .unwrap();
    config.base_url = server.uri();
    config.token_url = format!("{}/oauth2/token", server.uri());
    config.retry.backoff_factor = 0.0;
    config
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "bearer",
            "access_token": "TESTTOKEN"
        })))
        .mount(server)
        .await;
}

fn tweet_fixture(text: &str) -> serde_json::Value {
    serde_json::json!({
        "created_at": "Wed Oct 10 20:19:24 +0000 2018",
        "text": text,
        "entities": {"hashtags": [{"text": "news"}]},
        "favorite_count": 2,
        "retweet_count": 1,
        "user": {"id": 42, "name": "Newsroom", "screen_name": "newsroom"}
    })
}

#[tokio::test]
async fn facade_flow_search_then_timeline() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/search/tweets.json"))
        .and(query_param("q", "#news"))
        .and(query_param("count", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "statuses": [tweet_fixture("breaking"), tweet_fixture("update")]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/statuses/user_timeline.json"))
        .and(query_param("screen_name", "newsroom"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([tweet_fixture("from the timeline")])),
        )
        .mount(&server)
        .await;

    let client = AsyncClient::new(stub_config(&server)).await.unwrap();

    let search = client.hashtag_tweets("#news", None).await.unwrap();
    assert_eq!(search.len(), 2);
    assert_eq!(search[0].text.as_ref(), "breaking");
    assert_eq!(search[0].hashtags, vec!["#news"]);
    assert_eq!(search[0].account.href.as_ref(), "/newsroom");
    assert_eq!(search[0].date.as_ref(), "8:19 PM - 10 Oct 2018");

    let timeline = client.user_timeline("newsroom", None).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].text.as_ref(), "from the timeline");

    // The payload the token endpoint returned stays available verbatim.
    assert_eq!(client.token().payload().access_token.as_ref(), "TESTTOKEN");
}

#[tokio::test]
async fn provider_error_exposes_status_for_the_facade() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/search/tweets.json"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "errors": [{"code": 220, "message": "Your credentials do not allow access."}]
        })))
        .mount(&server)
        .await;

    let client = AsyncClient::new(stub_config(&server)).await.unwrap();
    let err = client.hashtag_tweets("#news", None).await.unwrap_err();

    // A facade relays the provider's status and message as-is.
    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    match err {
        Error::Provider { message, .. } => {
            assert_eq!(&*message, "Your credentials do not allow access.");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}

#[tokio::test]
async fn shared_instance_is_constructed_once() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    let first = chirp::shared(stub_config(&server)).await.unwrap();
    let second = chirp::shared(stub_config(&server)).await.unwrap();

    assert!(std::ptr::eq(first, second));
}

#[tokio::test]
async fn failed_token_exchange_is_fatal_to_construction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "errors": [{"code": 99, "message": "Unable to verify your credentials"}]
        })))
        .mount(&server)
        .await;

    let err = AsyncClient::new(stub_config(&server)).await.unwrap_err();
    match err {
        Error::Provider { status, message } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(&*message, "Unable to verify your credentials");
        }
        other => panic!("expected provider error, got {:?}", other),
    }
}
