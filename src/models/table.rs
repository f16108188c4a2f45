use chrono::NaiveDate;
use serde::Serialize;

/// One symbol's values, aligned to the owning table's date index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Ticker symbol this column belongs to
    pub symbol: String,

    /// One entry per row; `None` marks a missing observation
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table with one value column per symbol
///
/// Rows are trading dates (sorted, unique); columns keep the order the
/// symbols were requested in. Every pipeline stage consumes one table
/// and produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    /// Row index
    pub dates: Vec<NaiveDate>,

    /// Columns in requested-symbol order
    pub columns: Vec<Column>,
}

impl PriceTable {
    /// Create an empty table over the given date index
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            columns: Vec::new(),
        }
    }

    /// Append a column; its length must match the date index
    pub fn push_column(&mut self, symbol: String, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.dates.len());
        self.columns.push(Column { symbol, values });
    }

    /// Look up a column by symbol
    pub fn column(&self, symbol: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.symbol == symbol)
    }

    /// Symbols present in the table, in column order
    pub fn symbols(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.symbol.as_str()).collect()
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// Drop columns whose values are entirely missing
    pub fn drop_empty_columns(mut self) -> Self {
        self.columns
            .retain(|c| c.values.iter().any(|v| v.is_some()));
        self
    }
}
