use serde::{Deserialize, Serialize};
use std::fmt;

/// Price field selectable from a quote series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    /// Opening price
    Open,
    /// Highest price of the day
    High,
    /// Lowest price of the day
    Low,
    /// Closing price
    Close,
    /// Dividend- and split-adjusted close
    AdjClose,
    /// Trading volume
    Volume,
}

impl PriceField {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "open" => Ok(PriceField::Open),
            "high" => Ok(PriceField::High),
            "low" => Ok(PriceField::Low),
            "close" => Ok(PriceField::Close),
            "adjclose" | "adj_close" | "adj close" => Ok(PriceField::AdjClose),
            "volume" => Ok(PriceField::Volume),
            _ => Err(format!(
                "Invalid price field: {}. Valid options: open, high, low, close, adj_close, volume",
                s
            )),
        }
    }

    /// Human-readable label used in titles and table headers
    pub fn label(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adj Close",
            PriceField::Volume => "Volume",
        }
    }

    /// Get all selectable fields
    pub fn all() -> Vec<PriceField> {
        vec![
            PriceField::Open,
            PriceField::High,
            PriceField::Low,
            PriceField::Close,
            PriceField::AdjClose,
            PriceField::Volume,
        ]
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Default for PriceField {
    fn default() -> Self {
        PriceField::Close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_field() {
        assert_eq!(PriceField::from_str("close"), Ok(PriceField::Close));
        assert_eq!(PriceField::from_str("Close"), Ok(PriceField::Close));
        assert_eq!(PriceField::from_str("adj_close"), Ok(PriceField::AdjClose));
        assert_eq!(PriceField::from_str("Adj Close"), Ok(PriceField::AdjClose));
        assert_eq!(PriceField::from_str("volume"), Ok(PriceField::Volume));
        assert!(PriceField::from_str("vwap").is_err());
    }

    #[test]
    fn test_label_roundtrip() {
        for field in PriceField::all() {
            assert_eq!(PriceField::from_str(field.label()), Ok(field));
        }
    }
}
