use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{PriceField, PriceTable, RawQuotes};

/// Extract one price field across all symbols into a date × symbol table
///
/// Row index is the sorted union of all observed dates; a symbol with no
/// observation on a date gets a missing value there. `order` fixes the
/// column order (the requested symbols); columns that end up entirely
/// missing are dropped, so the output column set is always a subset of
/// `order`. Fails with `FieldUnavailable` when no fetched series carries
/// the requested field at all.
pub fn select_field(raw: &RawQuotes, order: &[String], field: PriceField) -> Result<PriceTable> {
    let field_present = raw
        .values()
        .flatten()
        .any(|quote| quote.field(field).is_some());
    if !field_present {
        return Err(AppError::FieldUnavailable(field.label().to_string()));
    }

    let dates: Vec<NaiveDate> = raw
        .values()
        .flatten()
        .map(|quote| quote.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut table = PriceTable::new(dates);
    for symbol in order {
        let series = match raw.get(symbol) {
            Some(series) => series,
            None => continue,
        };

        let by_date: HashMap<NaiveDate, f64> = series
            .iter()
            .filter_map(|quote| quote.field(field).map(|value| (quote.date, value)))
            .collect();

        let values: Vec<Option<f64>> = table
            .dates
            .iter()
            .map(|date| by_date.get(date).copied())
            .collect();
        table.push_column(symbol.clone(), values);
    }

    debug!(
        "Selected {} into {} rows x {} columns",
        field,
        table.row_count(),
        table.column_count()
    );

    Ok(table.drop_empty_columns())
}
