use std::env;

use chirp::{AsyncClient, ClientConfig};

/// Manual smoke test against the real API. Needs application credentials in
/// `CHIRP_API_KEY` / `CHIRP_API_SECRET`.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let api_key = env::var("CHIRP_API_KEY").expect("CHIRP_API_KEY not set");
    let api_secret = env::var("CHIRP_API_SECRET").expect("CHIRP_API_SECRET not set");

    let client = AsyncClient::new(ClientConfig::new(api_key, api_secret))
        .await
        .unwrap();

    let tweets = client.hashtag_tweets("#rustlang", Some(5)).await.unwrap();
    for tweet in &tweets {
        println!("{} {}: {}", tweet.date, tweet.account.href, tweet.text);
    }

    let timeline = client.user_timeline("rustlang", Some(5)).await.unwrap();
    for tweet in &timeline {
        println!("{} {}", tweet.date, tweet.text);
    }
}
