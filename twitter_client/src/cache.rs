//! Expiring in-memory cache for users and statuses.
//!
//! Entries are keyed by the record's own identifier and replaced wholesale on every store.
//! Expiry is checked by the caller through [`CacheBackend::user_expired`] and
//! [`CacheBackend::status_expired`]; an identifier that was never stored counts as expired.

use dashmap::DashMap;
use tokio::time::Instant;

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::result::{Status, User};

/// A value that knows the key it is cached under.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Storage for one kind of record. Implementations must be safe to share between tasks.
pub trait Cache<V>: Send + Sync {
    /// Insert the value under `value.id()`, replacing any previous entry.
    fn store(&self, value: V);
    fn contains(&self, id: i64) -> bool;
    fn get(&self, id: i64) -> Option<V>;
    /// When the entry for `id` was last stored, `None` if there is none.
    fn time_stored(&self, id: i64) -> Option<Instant>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// The default [`Cache`], backed by a concurrent map.
pub struct MemoryCache<V> {
    entries: DashMap<i64, CacheEntry<V>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        MemoryCache {
            entries: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Cache<V> for MemoryCache<V>
where
    V: Identified + Clone + Send + Sync,
{
    fn store(&self, value: V) {
        let entry = CacheEntry {
            stored_at: Instant::now(),
            value,
        };
        self.entries.insert(entry.value.id(), entry);
    }

    fn contains(&self, id: i64) -> bool {
        self.entries.contains_key(&id)
    }

    fn get(&self, id: i64) -> Option<V> {
        self.entries.get(&id).map(|entry| entry.value.clone())
    }

    fn time_stored(&self, id: i64) -> Option<Instant> {
        self.entries.get(&id).map(|entry| entry.stored_at)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The user and status caches of one client, with a shared expiry window.
pub struct CacheBackend {
    hit: AtomicU64,
    store: AtomicU64,
    users: Arc<dyn Cache<User>>,
    statuses: Arc<dyn Cache<Status>>,
    expire_time: Duration,
}

impl CacheBackend {
    /// Create a backend over custom caches.
    pub fn new(users: Arc<dyn Cache<User>>, statuses: Arc<dyn Cache<Status>>, expire_time: Duration) -> Self {
        CacheBackend {
            hit: AtomicU64::new(0),
            store: AtomicU64::new(0),
            users,
            statuses,
            expire_time,
        }
    }

    pub fn in_memory(expire_time: Duration) -> Self {
        Self::new(
            Arc::new(MemoryCache::<User>::new()),
            Arc::new(MemoryCache::<Status>::new()),
            expire_time,
        )
    }

    pub fn store_user(&self, user: User) {
        self.store.fetch_add(1, Ordering::Relaxed);
        self.users.store(user);
    }

    pub fn store_status(&self, status: Status) {
        self.store.fetch_add(1, Ordering::Relaxed);
        self.statuses.store(status);
    }

    /// Counts as a hit. Does not check expiry.
    pub fn get_user(&self, id: i64) -> Option<User> {
        self.hit.fetch_add(1, Ordering::Relaxed);
        self.users.get(id)
    }

    /// Counts as a hit. Does not check expiry.
    pub fn get_status(&self, id: i64) -> Option<Status> {
        self.hit.fetch_add(1, Ordering::Relaxed);
        self.statuses.get(id)
    }

    pub fn user_expired(&self, id: i64) -> bool {
        self.expired(self.users.time_stored(id))
    }

    pub fn status_expired(&self, id: i64) -> bool {
        self.expired(self.statuses.time_stored(id))
    }

    /// The cached user if present and not expired.
    pub fn fresh_user(&self, id: i64) -> Option<User> {
        if self.user_expired(id) {
            return None;
        }
        self.get_user(id)
    }

    /// The cached status if present and not expired.
    pub fn fresh_status(&self, id: i64) -> Option<Status> {
        if self.status_expired(id) {
            return None;
        }
        self.get_status(id)
    }

    pub fn hits(&self) -> u64 {
        self.hit.load(Ordering::Relaxed)
    }

    pub fn stores(&self) -> u64 {
        self.store.load(Ordering::Relaxed)
    }

    pub fn expire_time(&self) -> Duration {
        self.expire_time
    }

    pub fn users(&self) -> &dyn Cache<User> {
        self.users.as_ref()
    }

    pub fn statuses(&self) -> &dyn Cache<Status> {
        self.statuses.as_ref()
    }

    fn expired(&self, stored_at: Option<Instant>) -> bool {
        match stored_at {
            Some(stored_at) => Instant::now().saturating_duration_since(stored_at) >= self.expire_time,
            None => true,
        }
    }
}

impl Debug for CacheBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheBackend")
            .field("hit", &self.hits())
            .field("store", &self.stores())
            .field("users", &self.users.len())
            .field("statuses", &self.statuses.len())
            .field("expire_time", &self.expire_time)
            .finish()
    }
}
