use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::indicators::rolling_mean;
use crate::models::{ChartConfig, PriceTable};
use crate::services::presenter::{present, ChartData, MovingAverageOverlay};
use crate::services::source::QuoteSource;
use crate::services::{normalizer, resampler, selector};

/// Run the full pipeline for one configuration
///
/// Validate → fetch → select field → resample → normalize → moving
/// averages → present. Every stage is a pure transform of the previous
/// stage's table; the fetch is the only side effect. Each run is a pure
/// function of (config, backing data).
pub async fn run<S: QuoteSource + ?Sized>(config: &ChartConfig, source: &S) -> Result<ChartData> {
    let mut config = config.clone();
    config.validate()?;

    debug!(
        "Pipeline run: {} symbols, {} to {}, {} {}",
        config.symbols.len(),
        config.start,
        config.end,
        config.field,
        config.frequency
    );

    let raw = source
        .fetch(&config.symbols, config.start, config.end)
        .await?;
    if raw.is_empty() {
        return Err(AppError::EmptyData);
    }

    let table = selector::select_field(&raw, &config.symbols, config.field)?;
    let table = resampler::resample(&table, config.frequency)?;
    let table = normalizer::normalize(&table, config.normalize);

    let overlays: Vec<MovingAverageOverlay> = config
        .windows()
        .into_iter()
        .map(|window| moving_average(&table, window))
        .collect();

    let dropped: Vec<String> = config
        .symbols
        .iter()
        .filter(|symbol| table.column(symbol).is_none())
        .cloned()
        .collect();
    if !dropped.is_empty() {
        warn!("Dropped symbols with no data: {}", dropped.join(", "));
    }

    Ok(present(&config, table, &overlays, dropped))
}

/// Table-shaped trailing mean; the base table is left untouched
fn moving_average(table: &PriceTable, window: u32) -> MovingAverageOverlay {
    let mut out = PriceTable::new(table.dates.clone());
    for column in &table.columns {
        out.push_column(
            column.symbol.clone(),
            rolling_mean(&column.values, window as usize),
        );
    }

    MovingAverageOverlay { window, table: out }
}
