//! Single-flight memoization for upstream lookups
//!
//! A [`MemoMap`] caches the result of an async computation per string key for
//! the lifetime of the process. The in-flight future is stored under its key
//! before it is first polled, so concurrent callers with the same key always
//! join the same computation and the underlying work runs exactly once per
//! key. Entries are never evicted on success; cardinality is bounded by the
//! number of distinct builds and jobs the process ever sees.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

/// What to do with a computation that resolved to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Keep the failure cached; every later caller observes the same error.
    #[default]
    Pin,
    /// Evict a failed entry once its error has been delivered, so the next
    /// caller recomputes. Callers that joined the in-flight computation still
    /// all observe the identical failure.
    Retry,
}

type SharedResult<T, E> = Shared<BoxFuture<'static, Result<T, Arc<E>>>>;

pub struct MemoMap<T, E> {
    policy: FailurePolicy,
    entries: Mutex<HashMap<String, SharedResult<T, E>>>,
}

impl<T, E> MemoMap<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached result for `key`, or run `factory` to produce it.
    ///
    /// The factory is invoked at most once per key; its future is shared with
    /// every caller that arrives while it is still in flight. Errors are
    /// wrapped in `Arc` so all sharers receive the same failure.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, factory: F) -> Result<T, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let entry = {
            let mut entries = self.entries.lock().expect("memo map lock poisoned");
            match entries.get(key) {
                Some(existing) => existing.clone(),
                None => {
                    let fut = factory().map(|r| r.map_err(Arc::new)).boxed().shared();
                    entries.insert(key.to_string(), fut.clone());
                    fut
                }
            }
        };

        let result = entry.clone().await;

        if result.is_err() && self.policy == FailurePolicy::Retry {
            let mut entries = self.entries.lock().expect("memo map lock poisoned");
            // Only evict the entry we awaited; a concurrent retry may already
            // have installed a fresh computation under this key.
            if entries.get(key).is_some_and(|current| current.ptr_eq(&entry)) {
                entries.remove(key);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_callers_with_same_key_share_one_computation() {
        let memo: Arc<MemoMap<u32, String>> = Arc::new(MemoMap::new(FailurePolicy::Pin));
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    memo.get_or_compute("jobs/1234", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok(42)
                    })
                    .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_compute_independently() {
        let memo: MemoMap<String, String> = MemoMap::new(FailurePolicy::Pin);
        let calls = Arc::new(AtomicUsize::new(0));

        for key in ["a", "b", "a"] {
            let calls = Arc::clone(&calls);
            let value = memo
                .get_or_compute(key, move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(key.to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, key);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pinned_failure_is_returned_without_recomputing() {
        let memo: MemoMap<u32, String> = MemoMap::new(FailurePolicy::Pin);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let result = memo
                .get_or_compute("broken", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("upstream is down".to_string())
                })
                .await;
            assert_eq!(*result.unwrap_err(), "upstream is down");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_policy_evicts_failed_entries() {
        let memo: MemoMap<u32, String> = MemoMap::new(FailurePolicy::Retry);
        let calls = Arc::new(AtomicUsize::new(0));

        let attempts = Arc::clone(&calls);
        let first = memo
            .get_or_compute("flaky", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err("transient".to_string())
            })
            .await;
        assert!(first.is_err());

        let attempts = Arc::clone(&calls);
        let second = memo
            .get_or_compute("flaky", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(7)
            })
            .await;
        assert_eq!(second.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn successful_entries_survive_under_retry_policy() {
        let memo: MemoMap<u32, String> = MemoMap::new(FailurePolicy::Retry);
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let value = memo
                .get_or_compute("stable", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
            assert_eq!(value, 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
