use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::debug;

use crate::constants::FETCH_CACHE_CAPACITY;
use crate::error::Result;
use crate::models::RawQuotes;

/// Boundary to the quote provider
///
/// The sole network-facing interface of the pipeline and the only
/// point replaced by a mock in tests.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch daily quotes for every symbol over `[start, end]`
    ///
    /// Symbols without data are simply absent from the result; a fetch
    /// that yields nothing at all fails with `EmptyData`.
    async fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawQuotes>;
}

type CacheKey = (Vec<String>, NaiveDate, NaiveDate);

/// Memoizing wrapper around a `QuoteSource`
///
/// Keyed by the exact (sorted symbols, start, end) tuple. Entries are
/// never invalidated (historical data for a closed range is immutable);
/// FIFO eviction at capacity keeps long-running servers bounded.
pub struct MemoizedSource<S> {
    inner: S,
    cache: Mutex<FetchCache>,
}

struct FetchCache {
    entries: HashMap<CacheKey, RawQuotes>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl FetchCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &CacheKey) -> Option<RawQuotes> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CacheKey, value: RawQuotes) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, value);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<S: QuoteSource> MemoizedSource<S> {
    /// Wrap a source with the default cache capacity
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, FETCH_CACHE_CAPACITY)
    }

    /// Wrap a source with an explicit cache capacity
    pub fn with_capacity(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(FetchCache::new(capacity)),
        }
    }

    /// Number of cached (symbols, range) keys
    pub async fn cached_keys(&self) -> usize {
        self.cache.lock().await.len()
    }
}

#[async_trait]
impl<S: QuoteSource> QuoteSource for MemoizedSource<S> {
    async fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawQuotes> {
        let mut key_symbols = symbols.to_vec();
        key_symbols.sort();
        let key = (key_symbols, start, end);

        {
            let cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&key) {
                debug!(
                    "Fetch cache hit: {} symbols, {} to {}",
                    key.0.len(),
                    start,
                    end
                );
                return Ok(hit);
            }
        }

        let fetched = self.inner.fetch(symbols, start, end).await?;

        let mut cache = self.cache.lock().await;
        cache.insert(key, fetched.clone());
        Ok(fetched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::Quote;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteSource for CountingSource {
        async fn fetch(
            &self,
            symbols: &[String],
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<RawQuotes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbols.iter().any(|s| s == "BADTICKER") {
                return Err(AppError::EmptyData);
            }
            let mut raw = RawQuotes::new();
            for symbol in symbols {
                raw.insert(
                    symbol.clone(),
                    vec![Quote::new(start, 1.0, 1.0, 1.0, 1.0, 100)],
                );
            }
            Ok(raw)
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_identical_calls_fetch_once() {
        let source = MemoizedSource::new(CountingSource::new());
        let syms = symbols(&["AAPL", "MSFT"]);

        source
            .fetch(&syms, date(2020, 1, 1), date(2020, 1, 10))
            .await
            .unwrap();
        source
            .fetch(&syms, date(2020, 1, 1), date(2020, 1, 10))
            .await
            .unwrap();

        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_symbol_order_does_not_matter() {
        let source = MemoizedSource::new(CountingSource::new());

        source
            .fetch(&symbols(&["MSFT", "AAPL"]), date(2020, 1, 1), date(2020, 1, 10))
            .await
            .unwrap();
        source
            .fetch(&symbols(&["AAPL", "MSFT"]), date(2020, 1, 1), date(2020, 1, 10))
            .await
            .unwrap();

        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_range_fetches_again() {
        let source = MemoizedSource::new(CountingSource::new());
        let syms = symbols(&["AAPL"]);

        source
            .fetch(&syms, date(2020, 1, 1), date(2020, 1, 10))
            .await
            .unwrap();
        source
            .fetch(&syms, date(2020, 1, 1), date(2020, 1, 11))
            .await
            .unwrap();

        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let source = MemoizedSource::new(CountingSource::new());
        let syms = symbols(&["BADTICKER"]);

        assert!(source
            .fetch(&syms, date(2020, 1, 1), date(2020, 1, 10))
            .await
            .is_err());
        assert_eq!(source.cached_keys().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_eviction() {
        let source = MemoizedSource::with_capacity(CountingSource::new(), 2);
        let syms = symbols(&["AAPL"]);

        for day in 1..=3 {
            source
                .fetch(&syms, date(2020, 1, 1), date(2020, 1, day))
                .await
                .unwrap();
        }
        assert_eq!(source.cached_keys().await, 2);

        // Oldest key was evicted, so it fetches again
        source
            .fetch(&syms, date(2020, 1, 1), date(2020, 1, 1))
            .await
            .unwrap();
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 4);
    }
}
