use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Frequency, PriceField};
use crate::constants::{DEFAULT_START_DATE, DEFAULT_SYMBOLS, MAX_MA_WINDOW, MIN_MA_WINDOW};
use crate::error::{AppError, Result};

/// One full dashboard configuration
///
/// A pipeline run is a pure function of this struct: any change to any
/// field means a fresh full run. `validate` must be called before the
/// config is handed to the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Requested ticker symbols (normalized to uppercase by `validate`)
    pub symbols: Vec<String>,

    /// Start of the date range (inclusive)
    pub start: NaiveDate,

    /// End of the date range (inclusive); must be after `start`
    pub end: NaiveDate,

    /// Which quote field populates the table
    pub field: PriceField,

    /// Resampling frequency
    pub frequency: Frequency,

    /// Rebase each column so its first valid value becomes 100
    pub normalize: bool,

    /// First moving-average window, when enabled
    pub ma1: Option<u32>,

    /// Second moving-average window, when enabled
    pub ma2: Option<u32>,
}

impl ChartConfig {
    /// Create a config for the given symbols with dashboard defaults
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            start: NaiveDate::parse_from_str(DEFAULT_START_DATE, "%Y-%m-%d")
                .expect("default start date is valid"),
            end: Utc::now().date_naive(),
            field: PriceField::default(),
            frequency: Frequency::default(),
            normalize: false,
            ma1: None,
            ma2: None,
        }
    }

    /// Normalize symbols and check every input invariant
    ///
    /// Fails with `InvalidConfig` on an empty symbol set, a start date
    /// not before the end date, or a moving-average window outside
    /// [MIN_MA_WINDOW, MAX_MA_WINDOW].
    pub fn validate(&mut self) -> Result<()> {
        self.symbols = normalize_symbols(&self.symbols);

        if self.symbols.is_empty() {
            return Err(AppError::InvalidConfig(
                "at least one ticker symbol is required".to_string(),
            ));
        }

        if self.start >= self.end {
            return Err(AppError::InvalidConfig(format!(
                "start date {} must be before end date {}",
                self.start, self.end
            )));
        }

        for window in self.windows() {
            if !(MIN_MA_WINDOW..=MAX_MA_WINDOW).contains(&window) {
                return Err(AppError::InvalidConfig(format!(
                    "moving-average window {} out of range [{}, {}]",
                    window, MIN_MA_WINDOW, MAX_MA_WINDOW
                )));
            }
        }

        Ok(())
    }

    /// Enabled moving-average windows, MA1 first
    pub fn windows(&self) -> Vec<u32> {
        [self.ma1, self.ma2].into_iter().flatten().collect()
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect())
    }
}

/// Trim, uppercase, drop empties, and dedup while preserving order
pub fn normalize_symbols(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();

    for entry in raw {
        let symbol = entry.trim().to_uppercase();
        if !symbol.is_empty() && seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    symbols
}

/// Split a comma-separated ticker list as typed into the dashboard
pub fn parse_symbol_list(input: &str) -> Vec<String> {
    input.split(',').map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(symbols: &[&str]) -> ChartConfig {
        let mut cfg = ChartConfig::new(symbols.iter().map(|s| s.to_string()).collect());
        cfg.start = date(2020, 1, 1);
        cfg.end = date(2020, 6, 30);
        cfg
    }

    #[test]
    fn test_validate_normalizes_symbols() {
        let mut cfg = config(&[" msft", "ge ", "MSFT", "", "aapl"]);
        cfg.validate().unwrap();
        assert_eq!(cfg.symbols, vec!["MSFT", "GE", "AAPL"]);
    }

    #[test]
    fn test_validate_rejects_empty_symbols() {
        let mut cfg = config(&["  ", ""]);
        assert!(matches!(
            cfg.validate(),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut cfg = config(&["AAPL"]);
        cfg.start = date(2020, 6, 30);
        cfg.end = date(2020, 1, 1);
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));

        // start == end is invalid too
        let mut cfg = config(&["AAPL"]);
        cfg.end = cfg.start;
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_bad_windows() {
        let mut cfg = config(&["AAPL"]);
        cfg.ma1 = Some(1);
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));

        let mut cfg = config(&["AAPL"]);
        cfg.ma2 = Some(201);
        assert!(matches!(cfg.validate(), Err(AppError::InvalidConfig(_))));

        let mut cfg = config(&["AAPL"]);
        cfg.ma1 = Some(2);
        cfg.ma2 = Some(200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_symbol_list() {
        let mut cfg = ChartConfig::new(parse_symbol_list("msft, ge,,aapl"));
        cfg.start = date(2020, 1, 1);
        cfg.end = date(2020, 6, 30);
        cfg.validate().unwrap();
        assert_eq!(cfg.symbols, vec!["MSFT", "GE", "AAPL"]);
    }
}
