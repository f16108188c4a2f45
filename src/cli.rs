use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::constants::{DEFAULT_MA1_WINDOW, DEFAULT_MA2_WINDOW};
use crate::models::{parse_symbol_list, ChartConfig, Frequency, PriceField};

#[derive(Parser)]
#[command(name = "tickerdash")]
#[command(about = "Stock dashboard data pipeline", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, transform and print a chart table
    Show {
        /// Comma-separated ticker symbols
        #[arg(short, long)]
        symbols: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD, default: today)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Price field: open, high, low, close, adj_close, volume
        #[arg(long, default_value = "close")]
        field: String,

        /// Resampling frequency: daily, weekly, monthly
        #[arg(long, default_value = "daily")]
        frequency: String,

        /// Rebase each symbol so its first valid value is 100
        #[arg(long)]
        normalize: bool,

        /// Enable the first moving average, optionally with a window (2-200)
        #[arg(long, num_args = 0..=1)]
        ma1: Option<Option<u32>>,

        /// Enable the second moving average, optionally with a window (2-200)
        #[arg(long, num_args = 0..=1)]
        ma2: Option<Option<u32>>,

        /// Also write the final table to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

pub fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            symbols,
            start,
            end,
            field,
            frequency,
            normalize,
            ma1,
            ma2,
            csv,
        } => {
            let mut config = match symbols {
                Some(symbols) => ChartConfig::new(parse_symbol_list(&symbols)),
                None => ChartConfig::default(),
            };

            if let Some(start) = start {
                config.start = start;
            }
            if let Some(end) = end {
                config.end = end;
            }
            config.field = match PriceField::from_str(&field) {
                Ok(field) => field,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };
            config.frequency = match Frequency::from_str(&frequency) {
                Ok(frequency) => frequency,
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };
            config.normalize = normalize;
            config.ma1 = ma1.map(|window| window.unwrap_or(DEFAULT_MA1_WINDOW));
            config.ma2 = ma2.map(|window| window.unwrap_or(DEFAULT_MA2_WINDOW));

            commands::show::run(config, csv);
        }
        Commands::Serve { port } => {
            commands::serve::run(port);
        }
    }
}
