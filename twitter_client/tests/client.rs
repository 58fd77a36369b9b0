use async_trait::async_trait;
use reqwest::Url;
use tokio::sync::mpsc;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use twitter_client::*;

/// Serves canned bodies keyed by URL path and records every request.
#[derive(Default)]
struct MockTransport {
    routes: HashMap<String, std::result::Result<String, String>>,
    calls: Mutex<Vec<(Url, Vec<(String, String)>)>>,
}

impl MockTransport {
    fn route(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(path.to_string(), Ok(body.to_string()));
        self
    }

    fn fixture(self, path: &str, name: &str) -> Self {
        let file = format!("{}/testdata/{}.json", env!("CARGO_MANIFEST_DIR"), name);
        let body = std::fs::read_to_string(file).unwrap();
        self.route(path, &body)
    }

    fn fail(mut self, path: &str, message: &str) -> Self {
        self.routes.insert(path.to_string(), Err(message.to_string()));
        self
    }

    fn calls(&self) -> Vec<(Url, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, url: Url, form: Vec<(String, String)>) -> Result<String> {
        let route = self.routes.get(url.path()).cloned();
        self.calls.lock().unwrap().push((url.clone(), form));
        match route {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(Error::Transport(message)),
            None => Err(Error::Transport(format!("no route for {}", url.path()))),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: Url, _session: &Session) -> Result<String> {
        self.respond(url, Vec::new())
    }

    async fn post(&self, url: Url, _session: &Session, form: Vec<(String, String)>) -> Result<String> {
        self.respond(url, form)
    }
}

fn config() -> ClientConfig {
    ClientConfig {
        api_root: Url::parse("http://api.example.com").unwrap(),
        search_root: Url::parse("http://search.example.com").unwrap(),
        ..Default::default()
    }
}

fn client(transport: MockTransport) -> (TwitterClient, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let client = TwitterClient::with_transport(config(), transport.clone());
    (client, transport)
}

#[tokio::test]
async fn user_by_id_is_served_from_cache() {
    let (client, transport) = client(MockTransport::default().fixture("/users/show.json", "user_show"));

    let user = client.user(55).recv().await.unwrap();
    assert_eq!(user.screen_name, "jb55");
    let again = client.user(55).recv().await.unwrap();
    assert_eq!(again, user);
    assert_eq!(transport.call_count(), 1);
    assert_eq!(client.cache_backend().hits(), 1);

    // Screen name lookups always go to the network.
    client.user("jb55").recv().await.unwrap();
    assert_eq!(transport.call_count(), 2);
    assert!(!client.has_errors());
}

#[tokio::test(start_paused = true)]
async fn expired_entries_are_fetched_again() {
    let (client, transport) = client(MockTransport::default().fixture("/users/show.json", "user_show"));

    client.user(55).recv().await.unwrap();
    tokio::time::advance(Duration::from_secs(59)).await;
    client.user(55).recv().await.unwrap();
    assert_eq!(transport.call_count(), 1);

    tokio::time::advance(Duration::from_secs(1)).await;
    client.user(55).recv().await.unwrap();
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn fetched_records_warm_the_other_cache() {
    let (client, transport) = client(MockTransport::default().fixture("/statuses/show/901.json", "status_show"));

    let status = client.status(901).recv().await.unwrap();
    assert_eq!(status.author().id, 55);

    let author = client.user(55).recv().await.unwrap();
    assert_eq!(author.name, "William Casarin");
    assert_eq!(author.last_status().id, 901);

    let again = client.status(901).recv().await.unwrap();
    assert_eq!(again.text, status.text);
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn failure_delivers_empty_value_once() {
    let (client, transport) = client(MockTransport::default().fail("/statuses/show/5.json", "connection reset"));

    let status = client.status(5).recv().await.unwrap();
    assert_eq!(status, Status::default());
    assert_eq!(transport.call_count(), 1);

    let error = client.pop_last_error().unwrap();
    assert_eq!(error.severity, Severity::Error);
    assert_eq!(error.to_string(), "twitter_client error: Transport error: connection reset");
    assert!(client.pop_last_error().is_none());
    assert_eq!(client.error_stream().try_recv().unwrap().error.to_string(), "Transport error: connection reset");
    assert!(client.error_stream().try_recv().is_none());

    // Failures are not cached.
    assert!(client.cache_backend().statuses().is_empty());
}

#[tokio::test]
async fn invalid_user_ref_is_rejected_without_request() {
    let (client, transport) = client(MockTransport::default());

    let user = client.user("3.14").recv().await.unwrap();
    assert_eq!(user, User::default());
    let followers = client.followers(-4i64, 1).recv().await.unwrap();
    assert!(followers.is_empty());

    assert_eq!(transport.call_count(), 0);
    let errors = client.error_stream();
    assert!(matches!(*errors.try_recv().unwrap().error, Error::InvalidUserRef(_)));
    assert!(matches!(*errors.try_recv().unwrap().error, Error::InvalidUserRef(_)));
    assert!(errors.try_recv().is_none());
}

#[tokio::test]
async fn soft_error_record_is_delivered_and_cached() {
    let body = r#"{"id": 42, "text": "partial", "error": "Rate limit exceeded"}"#;
    let (client, transport) = client(MockTransport::default().route("/statuses/show/42.json", body));

    let status = client.status(42).recv().await.unwrap();
    assert_eq!(status.text, "partial");
    assert_eq!(status.error.as_deref(), Some("Rate limit exceeded"));

    let error = client.pop_last_error().unwrap();
    assert_eq!(error.severity, Severity::Warning);
    assert_eq!(error.to_string(), "twitter_client warning: Remote error: Rate limit exceeded");

    client.status(42).recv().await.unwrap();
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn record_without_id_is_not_cached() {
    let (client, transport) = client(
        MockTransport::default().route("/statuses/show/7.json", r#"{"error": "Not found", "request": "/x"}"#),
    );

    let status = client.status(7).recv().await.unwrap();
    assert_eq!(status.id, 0);
    assert!(client.cache_backend().statuses().is_empty());

    client.status(7).recv().await.unwrap();
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn error_object_in_place_of_list() {
    let (client, _) = client(MockTransport::default().fixture("/statuses/user_timeline.json", "error"));

    let statuses = client.user_timeline().recv().await.unwrap();
    assert!(statuses.is_empty());
    let error = client.pop_last_error().unwrap();
    assert!(matches!(*error.error, Error::Remote(ref msg) if msg.starts_with("Not authorized")));
}

#[tokio::test]
async fn timeline_items_with_errors_are_still_delivered() {
    let (client, _) = client(MockTransport::default().fixture("/statuses/public_timeline.json", "public_timeline"));

    let statuses = client.public_timeline().recv().await.unwrap();
    assert_eq!(statuses.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1001, 1002, 1003, 1004]);

    let reported = client.error_stream().drain();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].to_string(), "twitter_client warning: Remote error: Status is protected");

    // Every status and author, including the one carrying an error, is cached.
    let cache = client.cache_backend();
    assert_eq!(cache.statuses().len(), 4);
    assert!(cache.users().contains(4));
}

#[tokio::test]
async fn shared_channel_receives_every_result() {
    let (mut client, _) = client(
        MockTransport::default()
            .route("/statuses/public_timeline.json", r#"[{"id": 1}]"#)
            .route("/statuses/friends_timeline.json", r#"[{"id": 2}, {"id": 3}]"#)
            .route("/statuses/mentions.json", "[]"),
    );
    let (sender, mut receiver) = mpsc::unbounded_channel();
    client.set_receive_channel::<Vec<Status>>(sender);

    assert!(client.public_timeline().is_shared());
    assert!(client.friends_timeline().is_shared());
    assert!(client.replies().is_shared());
    // Other result types keep their dedicated completions.
    assert!(!client.rate_limit_info().is_shared());

    let mut received = Vec::new();
    for _ in 0..3 {
        let statuses = receiver.recv().await.unwrap();
        received.push(statuses.iter().map(|s| s.id).collect::<Vec<_>>());
    }
    received.sort();
    assert_eq!(received, vec![vec![], vec![1], vec![2, 3]]);

    client.clear_receive_channel::<Vec<Status>>();
    assert_eq!(client.public_timeline().recv().await.unwrap()[0].id, 1);
}

#[tokio::test]
async fn followers_and_friends_requests() {
    let (client, transport) = client(
        MockTransport::default()
            .fixture("/statuses/followers.json", "followers")
            .route("/statuses/friends.json", "[]"),
    );

    let followers = client.followers("jb55", 2).recv().await.unwrap();
    assert_eq!(followers.len(), 3);
    let warning = client.pop_last_error().unwrap();
    assert_eq!(warning.severity, Severity::Warning);
    assert_eq!(warning.error.to_string(), "Remote error: User has been suspended");
    assert!(client.friends(UserRef::Authenticated, 1).recv().await.unwrap().is_empty());

    let calls = transport.calls();
    assert_eq!(calls[0].0.query(), Some("screen_name=jb55&page=2"));
    assert_eq!(calls[1].0.query(), None);

    // Users from lists, and their embedded statuses, are cached.
    assert!(client.cache_backend().users().contains(13));
    assert!(client.cache_backend().statuses().contains(77));
}

#[tokio::test]
async fn search_requests() {
    let (client, transport) = client(MockTransport::default().fixture("/search.json", "search"));

    let results = client.search_simple("rust").recv().await.unwrap();
    assert_eq!(results.len(), 3);
    // One malformed item and one item with an embedded error, reported separately.
    let reported = client.error_stream().drain();
    assert_eq!(reported.len(), 2);
    assert!(matches!(*reported[0].error, Error::JSONError(_)));
    assert_eq!(reported[1].severity, Severity::Warning);
    assert_eq!(reported[1].error.to_string(), "Remote error: Status unavailable");

    let results = client.search(SearchQuery::new("").lang("en")).recv().await.unwrap();
    assert!(results.is_empty());
    assert!(matches!(*client.pop_last_error().unwrap().error, Error::EmptyQuery));

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.host_str(), Some("search.example.com"));
    assert_eq!(calls[0].0.query(), Some("q=rust"));
}

#[tokio::test]
async fn post_update_requires_credentials() {
    let (mut client, transport) = client(MockTransport::default().route("/statuses/update.json", "{}"));

    assert!(!client.post_update("hello", None).recv().await.unwrap());
    assert!(matches!(*client.pop_last_error().unwrap().error, Error::NotAuthenticated(_)));
    assert_eq!(transport.call_count(), 0);

    client.set_credentials("jb55", "secret");
    assert!(client.is_authenticated());
    assert!(client.post_update("hello world", Some(880)).recv().await.unwrap());
    assert!(client.post_update("again", Some(0)).recv().await.unwrap());

    let calls = transport.calls();
    assert_eq!(
        calls[0].1,
        vec![
            ("status".to_string(), "hello world".to_string()),
            ("in_reply_to_status_id".to_string(), "880".to_string()),
        ]
    );
    assert_eq!(calls[1].1, vec![("status".to_string(), "again".to_string())]);

    assert!(!format!("{:?}", client).contains("secret"));

    client.clear_credentials();
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn rate_limit_info() {
    let (client, _) = client(MockTransport::default().fixture("/account/rate_limit_status.json", "rate_limit"));

    let limit = client.rate_limit_info().recv().await.unwrap();
    assert_eq!(limit.remaining_hits, 142);
    assert!(!client.has_errors());
}

#[tokio::test]
async fn replaced_cache_backend_is_used() {
    let (mut client, transport) = client(MockTransport::default().fixture("/users/show.json", "user_show"));
    let backend = Arc::new(CacheBackend::in_memory(Duration::from_secs(600)));
    backend.store_user(User {
        id: 9,
        screen_name: "cached".to_string(),
        ..Default::default()
    });
    client.set_cache_backend(backend.clone());

    assert_eq!(client.user(9).recv().await.unwrap().screen_name, "cached");
    assert_eq!(transport.call_count(), 0);
    assert_eq!(client.cache_backend().expire_time(), Duration::from_secs(600));
}
