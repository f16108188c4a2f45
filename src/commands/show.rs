use std::path::{Path, PathBuf};

use crate::constants::FETCH_RATE_LIMIT_PER_MINUTE;
use crate::error::{Error, Result};
use crate::models::{ChartConfig, PriceTable};
use crate::services::pipeline;
use crate::services::{ChartData, MemoizedSource, YahooChartClient};

/// Rows of the table printed to the terminal before truncating
const MAX_PRINTED_ROWS: usize = 15;

pub fn run(config: ChartConfig, csv_out: Option<PathBuf>) {
    match execute(config, csv_out) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn execute(config: ChartConfig, csv_out: Option<PathBuf>) -> Result<()> {
    // Create Tokio runtime
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(format!("Failed to create runtime: {}", e)))?;

    println!("⏳ Fetching data...");
    let chart = runtime.block_on(async {
        let client = YahooChartClient::new(true, FETCH_RATE_LIMIT_PER_MINUTE)?;
        let source = MemoizedSource::new(client);
        pipeline::run(&config, &source).await
    })?;

    print_chart(&chart);

    if let Some(path) = csv_out {
        export_csv(&chart.table, &path)?;
        println!("💾 Table written to {}", path.display());
    }

    Ok(())
}

fn print_chart(chart: &ChartData) {
    if !chart.dropped_symbols.is_empty() {
        println!("⚠️  Dropped (no data): {}", chart.dropped_symbols.join(", "));
    }

    println!("\n📈 {}", chart.title);
    for series in &chart.series {
        println!("   {} ({} points)", series.name, series.points.len());
    }
    println!();

    print_table(&chart.table);
}

fn print_table(table: &PriceTable) {
    print!("{:<12}", "date");
    for symbol in table.symbols() {
        print!(" {:>12}", symbol);
    }
    println!();

    let skipped = table.row_count().saturating_sub(MAX_PRINTED_ROWS);
    if skipped > 0 {
        println!("... ({} earlier rows)", skipped);
    }

    for row in skipped..table.row_count() {
        print!("{:<12}", table.dates[row].format("%Y-%m-%d"));
        for column in &table.columns {
            match column.values[row] {
                Some(value) => print!(" {:>12.2}", value),
                None => print!(" {:>12}", "-"),
            }
        }
        println!();
    }
}

/// Write the final table as CSV: a date column plus one column per symbol
fn export_csv(table: &PriceTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["date".to_string()];
    header.extend(table.symbols().iter().map(|s| s.to_string()));
    writer.write_record(&header)?;

    for row in 0..table.row_count() {
        let mut record = vec![table.dates[row].format("%Y-%m-%d").to_string()];
        for column in &table.columns {
            record.push(
                column.values[row]
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
