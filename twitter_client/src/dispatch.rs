// Delivery of results to callers, and the units of work that produce them.

use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use std::sync::Arc;

use twitter_util::build_params;

use crate::cache::CacheBackend;
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::error_buffer::ErrorBuffer;
use crate::request::{Endpoints, SearchQuery, Timeline, UserRef, UserResource};
use crate::response::{self, SearchResponse};
use crate::result::{RateLimit, RemoteError, SearchResult, Status, User};
use crate::transport::{Session, Transport};

// MARK: Completion

/// The pending result of one client call.
///
/// A dedicated completion receives exactly one value. When a shared receive channel is
/// installed for the result type, the value goes there instead, and this is [`Completion::Shared`].
#[derive(Debug)]
pub enum Completion<T> {
    Dedicated(oneshot::Receiver<T>),
    Shared,
}

impl<T> Completion<T> {
    /// Wait for the result. `None` for shared completions.
    pub async fn recv(self) -> Option<T> {
        match self {
            Completion::Dedicated(receiver) => receiver.await.ok(),
            Completion::Shared => None,
        }
    }

    /// Block the current thread until the result arrives. Must not be called from async code.
    pub fn blocking_recv(self) -> Option<T> {
        match self {
            Completion::Dedicated(receiver) => receiver.blocking_recv().ok(),
            Completion::Shared => None,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Completion::Shared)
    }
}

/// The sending half matching a [`Completion`]. Consumed by delivery, so a result is sent once.
#[derive(Debug)]
pub(crate) enum Sink<T> {
    Dedicated(oneshot::Sender<T>),
    Shared(mpsc::UnboundedSender<T>),
}

impl<T> Sink<T> {
    pub(crate) fn deliver(self, value: T) {
        let delivered = match self {
            Sink::Dedicated(sender) => sender.send(value).is_ok(),
            Sink::Shared(sender) => sender.send(value).is_ok(),
        };
        if !delivered {
            debug!("Receiver dropped before delivery");
        }
    }
}

/// Shared receive channels, at most one per result type.
#[derive(Debug, Clone, Default)]
pub struct ReceiveChannels {
    status: Option<mpsc::UnboundedSender<Status>>,
    statuses: Option<mpsc::UnboundedSender<Vec<Status>>>,
    user: Option<mpsc::UnboundedSender<User>>,
    users: Option<mpsc::UnboundedSender<Vec<User>>>,
    search_results: Option<mpsc::UnboundedSender<Vec<SearchResult>>>,
    rate_limit: Option<mpsc::UnboundedSender<RateLimit>>,
    posted: Option<mpsc::UnboundedSender<bool>>,
}

impl ReceiveChannels {
    pub(crate) fn sink<T: Deliverable>(&self) -> (Sink<T>, Completion<T>) {
        match T::slot(self) {
            Some(sender) if !sender.is_closed() => (Sink::Shared(sender.clone()), Completion::Shared),
            _ => {
                let (sender, receiver) = oneshot::channel();
                (Sink::Dedicated(sender), Completion::Dedicated(receiver))
            }
        }
    }
}

/// A result type that can be routed through a shared receive channel.
pub trait Deliverable: Send + Sized + 'static {
    #[doc(hidden)]
    fn slot(channels: &ReceiveChannels) -> &Option<mpsc::UnboundedSender<Self>>;
    #[doc(hidden)]
    fn slot_mut(channels: &mut ReceiveChannels) -> &mut Option<mpsc::UnboundedSender<Self>>;
}

macro_rules! deliverable {
    ($($ty:ty => $field:ident),+ $(,)?) => {
        $(
            impl Deliverable for $ty {
                fn slot(channels: &ReceiveChannels) -> &Option<mpsc::UnboundedSender<Self>> {
                    &channels.$field
                }

                fn slot_mut(channels: &mut ReceiveChannels) -> &mut Option<mpsc::UnboundedSender<Self>> {
                    &mut channels.$field
                }
            }
        )+
    };
}

deliverable! {
    Status => status,
    Vec<Status> => statuses,
    User => user,
    Vec<User> => users,
    Vec<SearchResult> => search_results,
    RateLimit => rate_limit,
    bool => posted,
}

// MARK: Worker

/// Everything a unit of work needs, snapshotted when the call is issued.
#[derive(Clone)]
pub(crate) struct Worker {
    pub transport: Arc<dyn Transport>,
    pub session: Arc<Session>,
    pub endpoints: Arc<Endpoints>,
    pub cache: Arc<CacheBackend>,
    pub errors: Arc<ErrorBuffer>,
}

impl Worker {
    /// Report `result`'s error, falling back to the type's empty value.
    fn settle<T: Default>(&self, result: Result<T>) -> T {
        result.unwrap_or_else(|e| {
            self.errors.report(e);
            T::default()
        })
    }

    fn report_remote<R: RemoteError>(&self, record: &R) {
        if let Some(error) = record.remote_error() {
            self.errors.report(Error::Remote(error.to_string()));
        }
    }

    /// An error status whose body still decodes yields the decoded record or remote error.
    async fn fetch<T: DeserializeOwned>(&self, url: reqwest::Url) -> Result<T> {
        let name = url.path().to_string();
        match self.transport.get(url, &self.session).await {
            Ok(content) => decode(&name, &content),
            Err(Error::HttpStatus { status, body }) => match decode(&name, &body) {
                Err(e) if !matches!(e, Error::Remote(_)) => {
                    debug!("Undecodable body with status {}: {}", status, e);
                    Err(Error::HttpStatus { status, body })
                }
                decoded => decoded,
            },
            Err(e) => Err(e),
        }
    }

    fn cache_status(&self, status: &Status, author: Option<User>) {
        if status.id != 0 {
            self.cache.store_status(status.clone());
        }
        if let Some(author) = author {
            self.cache.store_user(author);
        }
    }

    fn cache_user(&self, user: &User, last_status: Option<Status>) {
        if user.id != 0 {
            self.cache.store_user(user.clone());
        }
        if let Some(status) = last_status {
            self.cache.store_status(status);
        }
    }

    fn accept_status(&self, raw: response::Status) -> Status {
        let (status, author) = raw.into_parts();
        self.report_remote(&status);
        self.cache_status(&status, author);
        status
    }

    fn accept_user(&self, raw: response::User) -> User {
        let (user, last_status) = raw.into_parts();
        self.report_remote(&user);
        self.cache_user(&user, last_status);
        user
    }

    pub async fn status(&self, id: i64) -> Status {
        let result = self.try_status(id).await;
        self.settle(result)
    }

    pub async fn user(&self, user: UserRef) -> User {
        let result = self.try_user(user).await;
        self.settle(result)
    }

    pub async fn users(&self, resource: UserResource, user: UserRef, page: u32) -> Vec<User> {
        let result = self.try_users(resource, user, page).await;
        self.settle(result)
    }

    pub async fn timeline(&self, timeline: Timeline) -> Vec<Status> {
        let result = self.try_timeline(timeline).await;
        self.settle(result)
    }

    pub async fn search(&self, query: SearchQuery) -> Vec<SearchResult> {
        let result = self.try_search(query).await;
        self.settle(result)
    }

    pub async fn rate_limit(&self) -> RateLimit {
        let result = self.try_rate_limit().await;
        self.settle(result)
    }

    pub async fn post_update(&self, text: String, in_reply_to_id: Option<i64>) -> bool {
        let result = self.try_post_update(text, in_reply_to_id).await;
        self.settle(result)
    }

    async fn try_status(&self, id: i64) -> Result<Status> {
        let raw: response::Status = self.fetch(self.endpoints.status(id)?).await?;
        Ok(self.accept_status(raw))
    }

    async fn try_user(&self, user: UserRef) -> Result<User> {
        let url = self.endpoints.user_resource(UserResource::Show, &user, 0)?;
        let raw: response::User = self.fetch(url).await?;
        Ok(self.accept_user(raw))
    }

    async fn try_users(&self, resource: UserResource, user: UserRef, page: u32) -> Result<Vec<User>> {
        let url = self.endpoints.user_resource(resource, &user, page)?;
        let raw: Vec<response::User> = self.fetch(url).await?;
        Ok(raw.into_iter().map(|u| self.accept_user(u)).collect())
    }

    async fn try_timeline(&self, timeline: Timeline) -> Result<Vec<Status>> {
        let raw: Vec<response::Status> = self.fetch(self.endpoints.timeline(timeline)?).await?;
        Ok(raw.into_iter().map(|s| self.accept_status(s)).collect())
    }

    async fn try_search(&self, query: SearchQuery) -> Result<Vec<SearchResult>> {
        let response: SearchResponse = self.fetch(self.endpoints.search(&query)?).await?;
        let (results, malformed) = response.into_results();
        for e in malformed {
            self.errors.report(e.into());
        }
        for item in &results {
            self.report_remote(item);
        }
        Ok(results)
    }

    async fn try_rate_limit(&self) -> Result<RateLimit> {
        let limit: RateLimit = self.fetch(self.endpoints.rate_limit()?).await?;
        self.report_remote(&limit);
        Ok(limit)
    }

    async fn try_post_update(&self, text: String, in_reply_to_id: Option<i64>) -> Result<bool> {
        if self.session.authenticated().is_none() {
            return Err(Error::NotAuthenticated("posting an update".to_string()));
        }
        let status = text;
        let in_reply_to_status_id = in_reply_to_id.filter(|id| *id != 0);
        let form = build_params! {
            required status,
            optional in_reply_to_status_id,
        };
        self.transport.post(self.endpoints.update()?, &self.session, form).await?;
        Ok(true)
    }
}
