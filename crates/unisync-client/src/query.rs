//! Keyed query cache.
//!
//! A [`QueryCache`] stores one value per [`QueryKey`] together with its fetch
//! status. Fetches go through [`QueryCache::fetch`], which serves fresh data
//! from the cache and otherwise runs the supplied fetcher. Every state change
//! is published on a `tokio::sync::watch` channel per key so views can follow
//! loading/error/data transitions as they happen.
//!
//! Writes made with [`QueryCache::set_data`] / [`QueryCache::update_data`]
//! while a fetch is in flight win over that fetch: call
//! [`QueryCache::cancel`] before an optimistic write and the in-flight result
//! is discarded when it lands.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::trace;

use crate::error::ClientError;

/// Ordered list of strings identifying a cached resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl From<&str> for QueryKey {
    fn from(s: &str) -> Self {
        Self(vec![s.to_string()])
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
}

impl<T> QuerySnapshot<T> {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
        }
    }

    /// Loading with nothing to show yet (first fetch).
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_none()
    }

    /// Loading while older data stays visible.
    pub fn is_refetching(&self) -> bool {
        self.status == QueryStatus::Loading && self.data.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Error(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Disabled queries never fetch; they only report cached data.
    pub enabled: bool,
    /// `None` keeps data fresh until it is invalidated.
    pub stale_time: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_time: None,
        }
    }
}

impl QueryOptions {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

struct Entry<T> {
    data: Option<T>,
    status: QueryStatus,
    updated_at: Option<Instant>,
    invalidated: bool,
    /// Replaced by every write and cancel; a fetch only stores its result if
    /// the sequence is unchanged when it lands. Drawn from a counter shared
    /// by the whole cache, so a re-created entry never reuses one.
    seq: u64,
    tx: watch::Sender<QuerySnapshot<T>>,
}

impl<T: Clone> Entry<T> {
    fn new(seq: u64) -> Self {
        let (tx, _) = watch::channel(QuerySnapshot::idle());
        Self {
            data: None,
            status: QueryStatus::Idle,
            updated_at: None,
            invalidated: false,
            seq,
            tx,
        }
    }

    fn snapshot(&self) -> QuerySnapshot<T> {
        QuerySnapshot {
            status: self.status.clone(),
            data: self.data.clone(),
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }

    fn is_fresh(&self, stale_time: Option<Duration>) -> bool {
        if self.data.is_none() || self.invalidated {
            return false;
        }
        match (stale_time, self.updated_at) {
            (None, _) => true,
            (Some(max_age), Some(at)) => at.elapsed() < max_age,
            (Some(_), None) => false,
        }
    }

    fn store(&mut self, data: T, seq: u64) {
        self.data = Some(data);
        self.status = QueryStatus::Success;
        self.updated_at = Some(Instant::now());
        self.invalidated = false;
        self.seq = seq;
        self.publish();
    }
}

/// Shared, cloneable cache of `T` values keyed by [`QueryKey`].
pub struct QueryCache<T> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<T>>>>,
    seq: Arc<AtomicU64>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            seq: Arc::clone(&self.seq),
        }
    }
}

impl<T: Clone + Send + 'static> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_data(&self, key: &QueryKey) -> Option<T> {
        self.lock().get(key).and_then(|e| e.data.clone())
    }

    pub fn snapshot(&self, key: &QueryKey) -> QuerySnapshot<T> {
        self.lock()
            .get(key)
            .map(Entry::snapshot)
            .unwrap_or_else(QuerySnapshot::idle)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.lock().contains_key(key)
    }

    /// Follow the state of `key`. The entry is created if missing.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QuerySnapshot<T>> {
        let seq = self.next_seq();
        self.lock()
            .entry(key.clone())
            .or_insert_with(|| Entry::new(seq))
            .tx
            .subscribe()
    }

    pub fn is_fresh(&self, key: &QueryKey, stale_time: Option<Duration>) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|e| e.is_fresh(stale_time))
    }

    /// Replace the cached value of `key`.
    pub fn set_data(&self, key: &QueryKey, data: T) {
        trace!(%key, "query data set");
        let seq = self.next_seq();
        self.lock()
            .entry(key.clone())
            .or_insert_with(|| Entry::new(seq))
            .store(data, seq);
    }

    /// Edit the cached value of `key` in place, starting from `T::default()`
    /// when nothing is cached yet.
    pub fn update_data<F>(&self, key: &QueryKey, f: F)
    where
        T: Default,
        F: FnOnce(&mut T),
    {
        let seq = self.next_seq();
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_insert_with(|| Entry::new(seq));
        let mut data = entry.data.take().unwrap_or_default();
        f(&mut data);
        entry.store(data, seq);
    }

    /// Edit the cached value only if one exists. Returns whether it did.
    pub fn update_existing<F>(&self, key: &QueryKey, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        match entry.data.take() {
            Some(mut data) => {
                f(&mut data);
                entry.store(data, self.next_seq());
                true
            }
            None => false,
        }
    }

    /// Mark `key` stale; the next fetch goes to the network.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Mark every key starting with `prefix` stale.
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        for (key, entry) in self.lock().iter_mut() {
            if key.starts_with(prefix) {
                entry.invalidated = true;
            }
        }
    }

    /// Discard the result of any fetch currently in flight for `key`.
    pub fn cancel(&self, key: &QueryKey) {
        let seq = self.next_seq();
        if let Some(entry) = self.lock().get_mut(key) {
            entry.seq = seq;
            if entry.status == QueryStatus::Loading {
                entry.status = if entry.data.is_some() {
                    QueryStatus::Success
                } else {
                    QueryStatus::Idle
                };
                entry.publish();
            }
        }
    }

    /// Drop `key` entirely. Fetches in flight for it are discarded.
    pub fn remove(&self, key: &QueryKey) -> Option<T> {
        let removed = self.lock().remove(key)?;
        removed.tx.send_replace(QuerySnapshot::idle());
        removed.data
    }

    /// Serve `key` from the cache when fresh, otherwise run `fetcher`.
    ///
    /// Disabled queries return whatever is cached without fetching.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Option<T>, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if !options.enabled {
            return Ok(self.get_data(key));
        }

        let fresh_seq = self.next_seq();
        let seq = {
            let mut entries = self.lock();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(fresh_seq));
            if entry.is_fresh(options.stale_time) {
                trace!(%key, "query served from cache");
                return Ok(entry.data.clone());
            }
            entry.status = QueryStatus::Loading;
            entry.publish();
            entry.seq
        };

        trace!(%key, "query fetching");
        let result = fetcher().await;

        let mut entries = self.lock();
        let current = entries.get_mut(key).filter(|e| e.seq == seq);
        match (result, current) {
            (Ok(data), Some(entry)) => {
                entry.store(data.clone(), self.next_seq());
                Ok(Some(data))
            }
            (Err(err), Some(entry)) => {
                entry.status = QueryStatus::Error(err.to_string());
                entry.publish();
                Err(err)
            }
            (Ok(_), None) => {
                trace!(%key, "query result discarded");
                Ok(entries.get(key).and_then(|e| e.data.clone()))
            }
            (Err(err), None) => Err(err),
        }
    }
}
