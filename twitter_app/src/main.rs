use dotenvy::dotenv;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use std::env;

use twitter_client::{ClientConfig, SearchQuery, TwitterClient, UserRef};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // 1. Initialize logger
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::DEBUG.into())
        .from_env()?
        .add_directive("hyper::proto=info".parse()?)
        .add_directive("hyper::client=info".parse()?)
        .add_directive("reqwest=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    // 2. Initialize client
    let config = ClientConfig::from_env()?;
    let client = TwitterClient::new(config)?;
    let mut args = env::args().skip(1);

    // 3. Rate limit
    if let Some(limit) = client.rate_limit_info().recv().await {
        tracing::info!(
            "Rate limit: {}/{} left, resets at {}",
            limit.remaining_hits,
            limit.hourly_limit,
            limit.reset_time
        );
    }

    // 4. Search, or show a user
    match args.next().as_deref() {
        Some("user") => {
            let user: UserRef = args.next().unwrap_or_default().parse()?;
            if let Some(user) = client.user(user).recv().await {
                println!("{} (@{}): {}", user.name, user.screen_name, user.last_status().text);
            }
        }
        Some(text) => {
            let query = SearchQuery::new(text);
            for result in client.search(query).recv().await.unwrap_or_default() {
                println!("@{}: {}", result.from_user, result.text);
            }
        }
        None => {
            for status in client.public_timeline().recv().await.unwrap_or_default() {
                println!("@{}: {}", status.author().screen_name, status.text);
            }
        }
    }

    // 5. Report errors
    for error in client.error_stream().drain() {
        tracing::error!("{}", error);
    }

    Ok(())
}
