use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{ChartConfig, PriceTable};

/// One named line for a chart widget
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSeries {
    /// Display name: the symbol, or "{symbol} MA{window}" for overlays
    pub name: String,

    /// (date, value) points; missing observations are simply absent
    pub points: Vec<(NaiveDate, f64)>,
}

/// A moving-average overlay: the window plus its table-shaped values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverageOverlay {
    pub window: u32,
    pub table: PriceTable,
}

/// Chart- and table-ready result of one pipeline run
///
/// This is the boundary handed to any rendering layer; it carries no
/// rendering-specific types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// Human title, e.g. "MSFT, GE | Close (Weekly) (Normalized → 100)"
    pub title: String,

    /// Base series per symbol, then one series per symbol per overlay
    pub series: Vec<LineSeries>,

    /// The final table, for tabular display
    pub table: PriceTable,

    /// Requested symbols absent from the final table (warning, not error)
    pub dropped_symbols: Vec<String>,
}

/// Shape the final table plus overlays into named line series
pub fn present(
    config: &ChartConfig,
    table: PriceTable,
    overlays: &[MovingAverageOverlay],
    dropped_symbols: Vec<String>,
) -> ChartData {
    let mut series = Vec::new();

    for column in &table.columns {
        series.push(line_series(
            column.symbol.clone(),
            &table.dates,
            &column.values,
        ));
    }

    for overlay in overlays {
        for column in &overlay.table.columns {
            series.push(line_series(
                format!("{} MA{}", column.symbol, overlay.window),
                &overlay.table.dates,
                &column.values,
            ));
        }
    }

    ChartData {
        title: title(config, &table),
        series,
        table,
        dropped_symbols,
    }
}

fn line_series(name: String, dates: &[NaiveDate], values: &[Option<f64>]) -> LineSeries {
    let points = dates
        .iter()
        .zip(values)
        .filter_map(|(&date, value)| value.map(|v| (date, v)))
        .collect();
    LineSeries { name, points }
}

fn title(config: &ChartConfig, table: &PriceTable) -> String {
    let norm_suffix = if config.normalize {
        " (Normalized → 100)"
    } else {
        ""
    };

    format!(
        "{} | {}{}{}",
        table.symbols().join(", "),
        config.field.label(),
        config.frequency.title_suffix(),
        norm_suffix
    )
}
