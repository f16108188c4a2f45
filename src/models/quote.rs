use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PriceField;

/// One trading day's quote for a single symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Trading date of the observation
    pub date: NaiveDate,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price
    pub close: f64,

    /// Dividend- and split-adjusted close, when the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adj_close: Option<f64>,

    /// Trading volume (number of shares)
    pub volume: u64,
}

impl Quote {
    /// Create a quote with only the raw OHLCV fields
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close: None,
            volume,
        }
    }

    /// Create a quote carrying an adjusted close
    pub fn with_adj_close(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close: Some(adj_close),
            volume,
        }
    }

    /// Value of the requested price field, if this quote carries it
    pub fn field(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => Some(self.open),
            PriceField::High => Some(self.high),
            PriceField::Low => Some(self.low),
            PriceField::Close => Some(self.close),
            PriceField::AdjClose => self.adj_close,
            PriceField::Volume => Some(self.volume as f64),
        }
    }
}
