use chrono::{DateTime, NaiveDate, Utc};
use isahc::{config::Configurable, prelude::*, HttpClient, Request};
use serde_json::Value;
use std::time::{Duration as StdDuration, SystemTime};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::constants::FETCH_MAX_RETRIES;
use crate::error::{AppError, Result};
use crate::models::{Quote, QuoteSeries, RawQuotes};
use crate::services::source::QuoteSource;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Sliding-window rate limiter shared by all requests of one client
struct RateLimiter {
    /// Timestamps of recent requests
    request_timestamps: Mutex<Vec<SystemTime>>,
    /// Maximum requests allowed per minute
    rate_limit_per_minute: u32,
}

impl RateLimiter {
    fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            request_timestamps: Mutex::new(Vec::new()),
            rate_limit_per_minute,
        }
    }

    async fn acquire(&self) {
        let current_time = SystemTime::now();
        let mut timestamps = self.request_timestamps.lock().await;

        // Remove timestamps older than 1 minute
        timestamps.retain(|&timestamp| {
            current_time
                .duration_since(timestamp)
                .unwrap_or(StdDuration::from_secs(0))
                < StdDuration::from_secs(60)
        });

        // If at the rate limit, wait until the oldest request expires
        if timestamps.len() >= self.rate_limit_per_minute as usize {
            if let Some(&oldest_request) = timestamps.first() {
                let wait_time = StdDuration::from_secs(60)
                    - current_time
                        .duration_since(oldest_request)
                        .unwrap_or(StdDuration::from_secs(0));

                if !wait_time.is_zero() {
                    // Drop the lock before sleeping so other tasks can check
                    drop(timestamps);
                    sleep(wait_time + StdDuration::from_millis(100)).await;
                    let mut timestamps = self.request_timestamps.lock().await;
                    timestamps.push(current_time);
                    return;
                }
            }
        }

        timestamps.push(current_time);
    }
}

/// Quote client for the Yahoo Finance v8 chart endpoint
///
/// One GET per symbol; responses are the columnar JSON arrays
/// (`timestamp`, `open`, `high`, `low`, `close`, `volume`, optional
/// `adjclose`) decoded into `Quote` records.
pub struct YahooChartClient {
    client: HttpClient,
    base_url: String,
    user_agents: Vec<String>,
    random_agent: bool,
    rate_limiter: RateLimiter,
}

impl YahooChartClient {
    /// Create a client
    ///
    /// # Arguments
    /// * `random_agent` - Rotate browser user agents per request
    /// * `rate_limit_per_minute` - Sliding-window request budget
    pub fn new(random_agent: bool, rate_limit_per_minute: u32) -> Result<Self> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
            user_agents,
            random_agent,
            rate_limiter: RateLimiter::new(rate_limit_per_minute),
        })
    }

    fn get_user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    async fn make_request(&self, url: &str) -> Result<Value> {
        let mut last_error: Option<String> = None;

        for attempt in 0..FETCH_MAX_RETRIES {
            self.rate_limiter.acquire().await;

            if attempt > 0 {
                let delay = StdDuration::from_secs_f64(
                    2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>(),
                );
                let delay = delay.min(StdDuration::from_secs(30));
                let reason = last_error.as_deref().unwrap_or("unknown error");
                tracing::info!(
                    "Quote API retry backoff: attempt {}/{} - reason: {}, waiting {:.1}s",
                    attempt + 1,
                    FETCH_MAX_RETRIES,
                    reason,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let request = Request::builder()
                .uri(url)
                .method("GET")
                .header("Accept", "application/json, text/plain, */*")
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("User-Agent", self.get_user_agent())
                .body(())
                .map_err(|e| AppError::Network(format!("Request build error: {}", e)))?;

            match self.client.send_async(request).await {
                Ok(mut resp) => {
                    let status = resp.status();

                    if status.is_success() || status == 404 {
                        // Yahoo answers unknown symbols with 404 plus a JSON
                        // error body; both paths decode the same way
                        let text = resp
                            .text()
                            .await
                            .map_err(|e| AppError::Network(format!("Response body error: {}", e)))?;
                        return serde_json::from_str::<Value>(&text)
                            .map_err(|e| AppError::Parse(format!("Invalid JSON response: {}", e)));
                    } else if status == 429 {
                        last_error = Some("Too Many Requests (429)".to_string());
                        continue;
                    } else if status.is_server_error() {
                        last_error = Some(format!("Server error ({})", status.as_u16()));
                        continue;
                    } else {
                        return Err(AppError::Network(format!(
                            "HTTP error ({}) - not retryable",
                            status.as_u16()
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(format!("Network error: {}", e));
                    continue;
                }
            }
        }

        Err(AppError::Network(format!(
            "Max retries exceeded: {}",
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }

    /// Fetch one symbol's daily series; empty when the provider has no data
    async fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<QuoteSeries> {
        let url = chart_url(&self.base_url, symbol, start, end);
        debug!("Fetching {} [{} - {}]: {}", symbol, start, end, url);

        let payload = self.make_request(&url).await?;
        parse_chart_response(symbol, &payload, start, end)
    }
}

/// Build the chart request URL for one symbol and date range
fn chart_url(base_url: &str, symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
    let period1 = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
    // Use end of day so the end date itself is included
    let period2 = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();

    format!(
        "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
        base_url, symbol, period1, period2
    )
}

/// Decode one chart response into a sorted quote series
///
/// A provider-level error or an empty result decodes to an empty series
/// (the symbol is dropped upstream); malformed payloads are `Parse`
/// errors. Rows outside `[start, end]` and rows the provider nulled out
/// (halted days) are skipped.
fn parse_chart_response(
    symbol: &str,
    payload: &Value,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<QuoteSeries> {
    let chart = &payload["chart"];

    if !chart["error"].is_null() {
        let description = chart["error"]["description"]
            .as_str()
            .unwrap_or("unknown provider error");
        debug!("Provider error for {}: {}", symbol, description);
        return Ok(Vec::new());
    }

    let result = match chart["result"].get(0) {
        Some(result) => result,
        None => return Ok(Vec::new()),
    };

    let timestamps = match result["timestamp"].as_array() {
        Some(timestamps) => timestamps,
        // No trading days in range
        None => return Ok(Vec::new()),
    };

    let quote = &result["indicators"]["quote"][0];
    let required_keys = ["open", "high", "low", "close", "volume"];
    for key in &required_keys {
        if quote.get(key).is_none() {
            return Err(AppError::Parse(format!(
                "Missing key '{}' in response for {}",
                key, symbol
            )));
        }
    }

    let opens = quote["open"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Invalid opens for {}", symbol)))?;
    let highs = quote["high"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Invalid highs for {}", symbol)))?;
    let lows = quote["low"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Invalid lows for {}", symbol)))?;
    let closes = quote["close"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Invalid closes for {}", symbol)))?;
    let volumes = quote["volume"]
        .as_array()
        .ok_or_else(|| AppError::Parse(format!("Invalid volumes for {}", symbol)))?;

    let length = timestamps.len();
    if [opens.len(), highs.len(), lows.len(), closes.len(), volumes.len()]
        .iter()
        .any(|&len| len != length)
    {
        return Err(AppError::Parse(format!(
            "Inconsistent array lengths for {}",
            symbol
        )));
    }

    // Adjusted close is a separate, optional indicator block
    let adj_closes = result["indicators"]["adjclose"][0]["adjclose"].as_array();

    let mut series = Vec::new();
    for i in 0..length {
        let timestamp = timestamps[i].as_i64().ok_or_else(|| {
            AppError::Parse(format!("Invalid timestamp at index {} for {}", i, symbol))
        })?;
        let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
            .ok_or_else(|| {
                AppError::Parse(format!(
                    "Cannot convert timestamp {} at index {} for {}",
                    timestamp, i, symbol
                ))
            })?
            .date_naive();

        if date < start || date > end {
            continue;
        }

        // Halted or missing days arrive as nulls across the OHLC arrays
        let (open, high, low, close) = match (
            opens[i].as_f64(),
            highs[i].as_f64(),
            lows[i].as_f64(),
            closes[i].as_f64(),
        ) {
            (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
            _ => continue,
        };

        series.push(Quote {
            date,
            open,
            high,
            low,
            close,
            adj_close: adj_closes
                .and_then(|a| a.get(i))
                .and_then(|v| v.as_f64()),
            volume: volumes[i].as_u64().unwrap_or(0),
        });
    }

    series.sort_by_key(|q| q.date);
    series.dedup_by_key(|q| q.date);

    Ok(series)
}

#[async_trait::async_trait]
impl QuoteSource for YahooChartClient {
    async fn fetch(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RawQuotes> {
        let mut raw = RawQuotes::new();
        let mut last_error: Option<AppError> = None;

        for symbol in symbols {
            match self.fetch_symbol(symbol, start, end).await {
                Ok(series) if series.is_empty() => {
                    warn!("No data for {} in {} - {}", symbol, start, end);
                }
                Ok(series) => {
                    debug!("Fetched {} rows for {}", series.len(), symbol);
                    raw.insert(symbol.clone(), series);
                }
                Err(e) => {
                    warn!("Fetch failed for {}: {}", symbol, e);
                    last_error = Some(e);
                }
            }
        }

        if raw.is_empty() {
            // Distinguish "provider knows nothing" from "we never got through"
            return Err(last_error.unwrap_or(AppError::EmptyData));
        }

        Ok(raw)
    }
}
