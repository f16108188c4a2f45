//! Pipeline limits and dashboard defaults

/// Smallest accepted moving-average window
pub const MIN_MA_WINDOW: u32 = 2;

/// Largest accepted moving-average window
pub const MAX_MA_WINDOW: u32 = 200;

/// Default window for the first moving average
pub const DEFAULT_MA1_WINDOW: u32 = 20;

/// Default window for the second moving average
pub const DEFAULT_MA2_WINDOW: u32 = 50;

/// Symbols shown when the user has not entered any
pub const DEFAULT_SYMBOLS: &[&str] = &["MSFT", "GE", "AAPL"];

/// Default start of the date range (the dashboard's historical default)
pub const DEFAULT_START_DATE: &str = "2010-01-01";

/// Maximum number of (symbols, range) keys kept by the fetch memo cache
///
/// Historical data for a closed range is immutable, so entries are never
/// invalidated; capacity eviction alone bounds a long-running server.
pub const FETCH_CACHE_CAPACITY: usize = 32;

/// Requests allowed per minute against the quote provider
pub const FETCH_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// Retry attempts per symbol before the fetch gives up
pub const FETCH_MAX_RETRIES: u32 = 4;
