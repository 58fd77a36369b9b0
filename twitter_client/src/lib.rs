mod cache;
mod config;
mod consts;
mod decode;
mod dispatch;
mod error;
mod error_buffer;
mod request;
mod response;
mod result;
mod transport;
mod util;

use tokio::sync::mpsc;

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use consts::*;
use dispatch::Worker;

pub use crate::cache::{Cache, CacheBackend, Identified, MemoryCache};
pub use crate::config::{ClientConfig, ClientIdentity, Credentials};
pub use crate::decode::decode;
pub use crate::dispatch::{Completion, Deliverable, ReceiveChannels};
pub use crate::error::{Error, ReportedError, Result, Severity};
pub use crate::error_buffer::{ErrorBuffer, ErrorStream};
pub use crate::request::{Endpoints, SearchQuery, Timeline, UserRef, UserResource};
pub use crate::result::*;
pub use crate::transport::{HttpTransport, Session, Transport};
pub use crate::util::parse_twitter_date;

/// Asynchronous client for the REST API.
///
/// Every getter returns a [`Completion`] right away and does its work on a spawned task,
/// so getters must be called from within a Tokio runtime. Failures never surface as
/// `Err`: the call still delivers an empty value, and the error lands in the error
/// buffer (see [`TwitterClient::pop_last_error`] and [`TwitterClient::error_stream`]).
#[derive(Clone)]
pub struct TwitterClient {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    endpoints: Arc<Endpoints>,
    cache: Arc<CacheBackend>,
    errors: Arc<ErrorBuffer>,
    channels: ReceiveChannels,
}

impl TwitterClient {
    pub fn new(config: ClientConfig) -> Result<TwitterClient> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> TwitterClient {
        let session = Session {
            credentials: config.credentials,
            identity: config.identity,
        };
        TwitterClient {
            transport,
            session: Arc::new(session),
            endpoints: Arc::new(Endpoints::new(config.api_root, config.search_root)),
            cache: Arc::new(CacheBackend::in_memory(config.cache_expiry)),
            errors: Arc::new(ErrorBuffer::new(ERROR_BUFFER_CAPACITY)),
            channels: ReceiveChannels::default(),
        }
    }

    // MARK: Configuration

    /// Credentials for all subsequent calls. Calls already issued keep the old ones.
    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.session_mut().credentials = Some(Credentials::new(username, password));
    }

    /// Subsequent calls go out unauthenticated.
    pub fn clear_credentials(&mut self) {
        self.session_mut().credentials = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.authenticated().is_some()
    }

    /// The `X-Twitter-Client`, `X-Twitter-Client-URL` and `X-Twitter-Client-Version` headers sent on POST.
    pub fn set_client_headers(&mut self, client: &str, url: &str, version: &str) {
        let identity = &mut self.session_mut().identity;
        identity.client = client.to_string();
        identity.client_url = url.to_string();
        identity.client_version = version.to_string();
    }

    pub fn set_client_string(&mut self, client: &str) {
        self.session_mut().identity.client = client.to_string();
    }

    pub fn set_user_agent(&mut self, agent: &str) {
        self.session_mut().identity.user_agent = agent.to_string();
    }

    pub fn set_cache_backend(&mut self, cache: Arc<CacheBackend>) {
        self.cache = cache;
    }

    pub fn cache_backend(&self) -> &Arc<CacheBackend> {
        &self.cache
    }

    /// Route every later result of type `T` into `sender` instead of a dedicated completion.
    ///
    /// Results of concurrent calls arrive in completion order, not call order.
    pub fn set_receive_channel<T: Deliverable>(&mut self, sender: mpsc::UnboundedSender<T>) {
        *T::slot_mut(&mut self.channels) = Some(sender);
    }

    pub fn clear_receive_channel<T: Deliverable>(&mut self) {
        *T::slot_mut(&mut self.channels) = None;
    }

    // MARK: Errors

    /// Take the most recent error. Subsequent calls return `None` until another error occurs.
    pub fn pop_last_error(&self) -> Option<ReportedError> {
        self.errors.pop_last_error()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    /// A handle for draining or monitoring reported errors.
    pub fn error_stream(&self) -> ErrorStream {
        ErrorStream::new(self.errors.clone())
    }

    // MARK: Statuses

    /// A status by id. Served from the cache while the cached copy is fresh.
    pub fn status(&self, id: i64) -> Completion<Status> {
        let (sink, completion) = self.channels.sink();
        if let Some(status) = self.cache.fresh_status(id) {
            tracing::debug!("Status {} served from cache", id);
            sink.deliver(status);
            return completion;
        }
        tracing::debug!("Status {} not cached, fetching", id);

        let worker = self.worker();
        tokio::spawn(async move { sink.deliver(worker.status(id).await) });
        completion
    }

    pub fn public_timeline(&self) -> Completion<Vec<Status>> {
        self.timeline(Timeline::Public)
    }

    /// The authenticated user's own statuses.
    pub fn user_timeline(&self) -> Completion<Vec<Status>> {
        self.timeline(Timeline::User)
    }

    /// The 20 most recent statuses of the authenticated user and their friends.
    pub fn friends_timeline(&self) -> Completion<Vec<Status>> {
        self.timeline(Timeline::Friends)
    }

    /// The 20 most recent mentions of the authenticated user.
    pub fn replies(&self) -> Completion<Vec<Status>> {
        self.timeline(Timeline::Replies)
    }

    pub fn timeline(&self, timeline: Timeline) -> Completion<Vec<Status>> {
        let (sink, completion) = self.channels.sink();
        let worker = self.worker();
        tokio::spawn(async move { sink.deliver(worker.timeline(timeline).await) });
        completion
    }

    /// Post a status as the authenticated user. Delivers whether the post went through.
    pub fn post_update(&self, text: &str, in_reply_to_id: Option<i64>) -> Completion<bool> {
        let (sink, completion) = self.channels.sink();
        let worker = self.worker();
        let text = text.to_string();
        tokio::spawn(async move { sink.deliver(worker.post_update(text, in_reply_to_id).await) });
        completion
    }

    // MARK: Users

    /// A user by id or screen name, or the authenticated user.
    /// Lookups by id are served from the cache while the cached copy is fresh.
    pub fn user(&self, user: impl Into<UserRef>) -> Completion<User> {
        let user = user.into();
        let (sink, completion) = self.channels.sink();
        if let Err(e) = user.validate() {
            self.errors.report(e);
            sink.deliver(User::default());
            return completion;
        }
        if let UserRef::Id(id) = user {
            if let Some(cached) = self.cache.fresh_user(id) {
                tracing::debug!("User {} served from cache", id);
                sink.deliver(cached);
                return completion;
            }
            tracing::debug!("User {} not cached, fetching", id);
        }

        let worker = self.worker();
        tokio::spawn(async move { sink.deliver(worker.user(user).await) });
        completion
    }

    pub fn followers(&self, user: impl Into<UserRef>, page: u32) -> Completion<Vec<User>> {
        self.users(UserResource::Followers, user.into(), page)
    }

    pub fn friends(&self, user: impl Into<UserRef>, page: u32) -> Completion<Vec<User>> {
        self.users(UserResource::Friends, user.into(), page)
    }

    fn users(&self, resource: UserResource, user: UserRef, page: u32) -> Completion<Vec<User>> {
        let (sink, completion) = self.channels.sink();
        if let Err(e) = user.validate() {
            self.errors.report(e);
            sink.deliver(Vec::new());
            return completion;
        }

        let worker = self.worker();
        tokio::spawn(async move { sink.deliver(worker.users(resource, user, page).await) });
        completion
    }

    // MARK: Search and account

    pub fn search(&self, query: SearchQuery) -> Completion<Vec<SearchResult>> {
        let (sink, completion) = self.channels.sink();
        if query.text.trim().is_empty() {
            self.errors.report(Error::EmptyQuery);
            sink.deliver(Vec::new());
            return completion;
        }

        let worker = self.worker();
        tokio::spawn(async move { sink.deliver(worker.search(query).await) });
        completion
    }

    pub fn search_simple(&self, text: &str) -> Completion<Vec<SearchResult>> {
        self.search(SearchQuery::new(text))
    }

    pub fn rate_limit_info(&self) -> Completion<RateLimit> {
        let (sink, completion) = self.channels.sink();
        let worker = self.worker();
        tokio::spawn(async move { sink.deliver(worker.rate_limit().await) });
        completion
    }
}

impl TwitterClient {
    fn session_mut(&mut self) -> &mut Session {
        Arc::make_mut(&mut self.session)
    }

    fn worker(&self) -> Worker {
        Worker {
            transport: self.transport.clone(),
            session: self.session.clone(),
            endpoints: self.endpoints.clone(),
            cache: self.cache.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl Debug for TwitterClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("session", &self.session)
            .field("endpoints", &self.endpoints)
            .field("cache", &self.cache)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}
