mod chart_config;
mod frequency;
mod price_field;
mod quote;
mod table;
pub mod indicators;

pub use chart_config::{parse_symbol_list, ChartConfig};
pub use frequency::Frequency;
pub use price_field::PriceField;
pub use quote::Quote;
pub use table::{Column, PriceTable};

use std::collections::HashMap;

/// Quote series for a single symbol, sorted ascending by date
pub type QuoteSeries = Vec<Quote>;

/// Fetched market data (symbol -> quote series)
pub type RawQuotes = HashMap<String, QuoteSeries>;
