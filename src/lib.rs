//! tickerdash - stock dashboard data pipeline
//!
//! Fetches daily OHLCV series for a set of ticker symbols, selects one
//! price field into a date × symbol table, resamples it to daily, weekly
//! or monthly granularity, optionally rebases each column to 100, and
//! overlays up to two independent moving averages. The result is a set
//! of named line series plus the final table, ready for any chart or
//! table renderer.

pub mod cli;
pub mod commands;
pub mod constants;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
