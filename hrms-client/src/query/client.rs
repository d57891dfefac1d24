// hrms-client/src/query/client.rs
// 查询缓存 - 去重、过期、失效

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;

use super::{QueryKey, RetryPolicy};
use crate::config::QueryConfig;
use crate::error::{ClientError, ClientResult};

type AnyValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<AnyValue, ClientError>>>;

/// Per-query overrides of the cache defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    pub stale_time: Option<Duration>,
    pub retry: Option<RetryPolicy>,
}

impl QueryOptions {
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn stale_minutes(minutes: u64) -> Self {
        Self::default().stale_time(Duration::from_secs(minutes * 60))
    }
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
    /// Callers currently awaiting `fetch`
    waiters: usize,
}

struct Entry {
    data: Option<AnyValue>,
    updated_at: Option<Instant>,
    invalidated: bool,
    in_flight: Option<InFlight>,
    last_access: Instant,
}

impl Entry {
    fn new() -> Self {
        Self {
            data: None,
            updated_at: None,
            invalidated: false,
            in_flight: None,
            last_access: Instant::now(),
        }
    }

    fn fresh_data(&self, stale_time: Duration) -> Option<&AnyValue> {
        if self.invalidated {
            return None;
        }
        match (&self.data, self.updated_at) {
            (Some(data), Some(at)) if at.elapsed() < stale_time => Some(data),
            _ => None,
        }
    }
}

/// Query/mutation cache
///
/// At most one request per key is in flight; concurrent callers await the
/// same shared future. Whichever caller observes the result first writes it
/// back, unless the key was invalidated in the meantime.
pub struct QueryClient {
    entries: DashMap<QueryKey, Entry>,
    config: QueryConfig,
    next_fetch_id: AtomicU64,
}

impl QueryClient {
    pub fn new(config: QueryConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            next_fetch_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Return cached data for `key` if fresh, otherwise fetch it
    pub async fn fetch<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> ClientResult<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let stale_time = options.stale_time.unwrap_or(self.config.stale_time);
        let retry = options.retry.unwrap_or(self.config.query_retry);

        let (fetch_id, shared) = {
            let mut entry = self.entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.last_access = Instant::now();

            if let Some(data) = entry.fresh_data(stale_time) {
                if let Some(value) = data.downcast_ref::<T>() {
                    tracing::trace!(key = %key, "Query cache hit");
                    return Ok(value.clone());
                }
                tracing::warn!(key = %key, "Cached value has a different type, refetching");
            }

            let joined = entry.in_flight.as_mut().map(|in_flight| {
                in_flight.waiters += 1;
                (in_flight.id, in_flight.fetch.clone())
            });
            match joined {
                Some(in_flight) => {
                    tracing::debug!(key = %key, "Joining in-flight query");
                    in_flight
                }
                None => {
                    let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                    let shared = run_with_retry(key.clone(), retry, fetcher).boxed().shared();
                    entry.in_flight = Some(InFlight {
                        id,
                        fetch: shared.clone(),
                        waiters: 1,
                    });
                    (id, shared)
                }
            }
        };

        let _waiter = Waiter {
            queries: self,
            key: &key,
            fetch_id,
        };
        let result = shared.await;
        self.settle(&key, fetch_id, &result);

        let value = result?;
        value.downcast_ref::<T>().cloned().ok_or_else(|| {
            ClientError::InvalidState(format!("query {key} resolved to a different type"))
        })
    }

    /// Run a mutation, retrying transient failures, then invalidate `invalidates`
    ///
    /// Invalidation happens only after a successful response; failures
    /// leave the cache untouched.
    pub async fn mutate<T, F, Fut>(&self, invalidates: &[QueryKey], mut mutation: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let retry = self.config.mutation_retry;
        let mut failures = 0;
        let value = loop {
            match mutation().await {
                Ok(value) => break value,
                Err(e) if retry.should_retry(&e, failures) => {
                    let delay = retry.backoff(failures);
                    failures += 1;
                    tracing::warn!(error = %e, attempt = failures, ?delay, "Mutation failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        };

        for key in invalidates {
            self.invalidate(key);
        }
        Ok(value)
    }

    /// Mark every entry under `prefix` stale and detach in-flight fetches
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                entry.invalidated = true;
                entry.in_flight = None;
                count += 1;
            }
        }
        tracing::debug!(prefix = %prefix, count, "Invalidated queries");
        count
    }

    pub fn invalidate_all(&self) {
        for mut entry in self.entries.iter_mut() {
            entry.invalidated = true;
            entry.in_flight = None;
        }
        tracing::debug!(count = self.entries.len(), "Invalidated all queries");
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
        tracing::debug!("Query cache cleared");
    }

    /// Evict entries idle for longer than `gc_time` with nothing in flight
    pub fn gc(&self) -> usize {
        let gc_time = self.config.gc_time;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.in_flight.is_some() || entry.last_access.elapsed() < gc_time);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "Evicted idle queries");
        }
        removed
    }

    /// Cached value for `key`, fresh or not
    pub fn cached<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.entries.get(key)?;
        entry.data.as_ref()?.downcast_ref::<T>().cloned()
    }

    /// Whether `key` holds data that would be served without a request
    pub fn is_fresh(&self, key: &QueryKey, stale_time: Option<Duration>) -> bool {
        let stale_time = stale_time.unwrap_or(self.config.stale_time);
        self.entries
            .get(key)
            .is_some_and(|entry| entry.fresh_data(stale_time).is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A waiter went away; the last one out detaches an unsettled fetch
    fn release(&self, key: &QueryKey, fetch_id: u64) {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return;
        };
        let abandoned = match entry.in_flight.as_mut() {
            Some(in_flight) if in_flight.id == fetch_id => {
                in_flight.waiters = in_flight.waiters.saturating_sub(1);
                in_flight.waiters == 0
            }
            _ => false,
        };
        if abandoned {
            entry.in_flight = None;
            tracing::debug!(key = %key, "Query abandoned by every caller");
        }
    }

    fn settle(&self, key: &QueryKey, fetch_id: u64, result: &Result<AnyValue, ClientError>) {
        let Some(mut entry) = self.entries.get_mut(key) else {
            return;
        };
        if !entry.in_flight.as_ref().is_some_and(|f| f.id == fetch_id) {
            // Already settled by another waiter, or invalidated mid-flight
            return;
        }
        entry.in_flight = None;
        match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.updated_at = Some(Instant::now());
                entry.invalidated = false;
            }
            Err(e) => {
                tracing::debug!(key = %key, error = %e, "Query failed");
            }
        }
    }
}

/// Registered for the duration of one `fetch` await, dropped on cancellation too
struct Waiter<'a> {
    queries: &'a QueryClient,
    key: &'a QueryKey,
    fetch_id: u64,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        self.queries.release(self.key, self.fetch_id);
    }
}

async fn run_with_retry<T, F, Fut>(
    key: QueryKey,
    retry: RetryPolicy,
    fetcher: F,
) -> Result<AnyValue, ClientError>
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let mut failures = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(Arc::new(value) as AnyValue),
            Err(e) if retry.should_retry(&e, failures) => {
                let delay = retry.backoff(failures);
                failures += 1;
                tracing::warn!(key = %key, error = %e, attempt = failures, ?delay, "Query failed, retrying");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn client() -> QueryClient {
        QueryClient::new(QueryConfig::default())
    }

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
        value: u32,
    ) -> impl Fn() -> BoxFuture<'static, ClientResult<u32>> + Send + Sync + 'static {
        move || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_fetches_share_one_request() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("dashboard");

        let (a, b, c) = tokio::join!(
            queries.fetch(key.clone(), QueryOptions::default(), counting_fetcher(calls.clone(), 7)),
            queries.fetch(key.clone(), QueryOptions::default(), counting_fetcher(calls.clone(), 8)),
            queries.fetch(key.clone(), QueryOptions::default(), counting_fetcher(calls.clone(), 9)),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (7, 7, 7));
        assert_eq!(queries.cached::<u32>(&key), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_time_controls_refetch() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("currentTimesheet");
        let options = QueryOptions::stale_minutes(2);

        queries.fetch(key.clone(), options, counting_fetcher(calls.clone(), 1)).await.unwrap();
        queries.fetch(key.clone(), options, counting_fetcher(calls.clone(), 1)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(121)).await;
        queries.fetch(key.clone(), options, counting_fetcher(calls.clone(), 2)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(queries.cached::<u32>(&key), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_by_prefix() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let one = QueryKey::new("teamTimesheets").with("page=0");
        let two = QueryKey::new("teamTimesheets").with("page=1");
        let other = QueryKey::new("managerStatistics");
        for key in [&one, &two, &other] {
            queries
                .fetch(key.clone(), QueryOptions::default(), counting_fetcher(calls.clone(), 1))
                .await
                .unwrap();
        }

        assert_eq!(queries.invalidate(&QueryKey::new("teamTimesheets")), 2);
        assert!(!queries.is_fresh(&one, None));
        assert!(!queries.is_fresh(&two, None));
        assert!(queries.is_fresh(&other, None));
        // Invalidated data stays readable until replaced
        assert_eq!(queries.cached::<u32>(&one), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidated_in_flight_result_is_not_cached() {
        let queries = Arc::new(client());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("timesheetHistory");

        let pending = {
            let queries = queries.clone();
            let key = key.clone();
            let fetcher = counting_fetcher(calls.clone(), 1);
            tokio::spawn(async move { queries.fetch(key, QueryOptions::default(), fetcher).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        queries.invalidate(&key);

        assert_eq!(pending.await.unwrap().unwrap(), 1);
        assert!(!queries.is_fresh(&key, None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result = queries
            .fetch(QueryKey::new("payInfo"), QueryOptions::default(), move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(ClientError::Server { status: 502, message: "bad gateway".into() })
                    } else {
                        Ok("ok".to_string())
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_errors_are_not_retried() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result = queries
            .fetch(QueryKey::new("profile"), QueryOptions::default(), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>(ClientError::Unauthorized { message: "expired".into() }) }
            })
            .await;
        assert!(result.unwrap_err().is_auth_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_invalidates_only_after_success() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("contactInfo");
        queries
            .fetch(key.clone(), QueryOptions::default(), counting_fetcher(calls.clone(), 1))
            .await
            .unwrap();

        let failed: ClientResult<()> = queries
            .mutate(&[key.clone()], || async {
                Err(ClientError::Validation {
                    status: 400,
                    message: "bad phone".into(),
                    field_errors: Default::default(),
                })
            })
            .await;
        assert!(failed.is_err());
        assert!(queries.is_fresh(&key, None));

        queries.mutate(&[key.clone()], || async { Ok(()) }).await.unwrap();
        assert!(!queries.is_fresh(&key, None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_evicts_idle_entries() {
        let queries = client();
        let calls = Arc::new(AtomicUsize::new(0));
        queries
            .fetch(QueryKey::new("profile"), QueryOptions::default(), counting_fetcher(calls.clone(), 1))
            .await
            .unwrap();
        assert_eq!(queries.gc(), 0);

        tokio::time::advance(Duration::from_secs(31 * 60)).await;
        assert_eq!(queries.gc(), 1);
        assert!(queries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_fetch_is_detached_and_evicted() {
        let queries = Arc::new(client());
        let key = QueryKey::new("payrollHistory");

        let pending = {
            let queries = queries.clone();
            let key = key.clone();
            tokio::spawn(async move {
                queries
                    .fetch(key, QueryOptions::default(), || async {
                        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                        Ok::<_, ClientError>(1u32)
                    })
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(queries.entries.get(&key).is_some_and(|e| e.in_flight.is_some()));

        // Caller navigated away
        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());
        assert!(queries.entries.get(&key).is_some_and(|e| e.in_flight.is_none()));

        tokio::time::advance(Duration::from_secs(31 * 60)).await;
        assert_eq!(queries.gc(), 1);
        assert!(queries.is_empty());

        // The next reader starts a fresh request
        let calls = Arc::new(AtomicUsize::new(0));
        let value = queries
            .fetch(key.clone(), QueryOptions::default(), counting_fetcher(calls.clone(), 2))
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remaining_waiter_keeps_shared_fetch_alive() {
        let queries = Arc::new(client());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new("directReports");

        let spawn_fetch = |value| {
            let queries = queries.clone();
            let key = key.clone();
            let fetcher = counting_fetcher(calls.clone(), value);
            tokio::spawn(async move { queries.fetch(key, QueryOptions::default(), fetcher).await })
        };
        let first = spawn_fetch(1);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = spawn_fetch(2);
        tokio::time::sleep(Duration::from_millis(10)).await;

        first.abort();
        let _ = first.await;
        assert_eq!(second.await.unwrap().unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(queries.cached::<u32>(&key), Some(1));
    }
}
