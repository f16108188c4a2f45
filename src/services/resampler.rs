use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::{Frequency, PriceTable};

/// Downsample the table to the requested frequency
///
/// Weekly and monthly buckets keep the last non-missing observation per
/// column; buckets with no rows are omitted, and columns left entirely
/// missing are dropped. Daily is the identity transform. Fails with
/// `NoDataAfterResample` when nothing remains.
pub fn resample(table: &PriceTable, freq: Frequency) -> Result<PriceTable> {
    let resampled = match freq {
        Frequency::Daily => table.clone(),
        Frequency::Weekly => resample_weekly(table),
        Frequency::Monthly => resample_monthly(table),
    };

    let resampled = resampled.drop_empty_columns();
    if resampled.is_empty() {
        return Err(AppError::NoDataAfterResample);
    }

    debug!(
        "Resampled to {}: {} -> {} rows",
        freq,
        table.row_count(),
        resampled.row_count()
    );

    Ok(resampled)
}

/// Group rows into ISO calendar weeks, labeled with the week-end Sunday
fn resample_weekly(table: &PriceTable) -> PriceTable {
    // Rows grouped by week-end date; BTreeMap keeps buckets in order
    let mut buckets: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (row, &date) in table.dates.iter().enumerate() {
        buckets.entry(week_end(date)).or_default().push(row);
    }

    collapse_buckets(table, buckets.into_iter().collect())
}

/// Group rows by calendar month, labeled with the last observed day
fn resample_monthly(table: &PriceTable) -> PriceTable {
    let mut buckets: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (row, &date) in table.dates.iter().enumerate() {
        buckets.entry(month_start(date)).or_default().push(row);
    }

    // The month's label is its last calendar day with any observation
    let labeled = buckets
        .into_values()
        .map(|rows| {
            let label = table.dates[*rows.last().expect("bucket has rows")];
            (label, rows)
        })
        .collect();

    collapse_buckets(table, labeled)
}

/// Build the bucketed table: per column, last non-missing value per bucket
fn collapse_buckets(table: &PriceTable, buckets: Vec<(NaiveDate, Vec<usize>)>) -> PriceTable {
    let mut out = PriceTable::new(buckets.iter().map(|(label, _)| *label).collect());

    for column in &table.columns {
        let values: Vec<Option<f64>> = buckets
            .iter()
            .map(|(_, rows)| {
                rows.iter()
                    .rev()
                    .find_map(|&row| column.values[row])
            })
            .collect();
        out.push_column(column.symbol.clone(), values);
    }

    out
}

/// Sunday ending the ISO week (Monday-Sunday) that contains `date`
fn week_end(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
    date + Duration::days(days_to_sunday)
}

/// First calendar day of the month containing `date`
fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("valid month start")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> PriceTable {
        let mut table = PriceTable::new(dates);
        table.push_column("AAPL".to_string(), values);
        table
    }

    #[test]
    fn test_week_end_is_sunday() {
        // Wednesday Nov 6, 2025 -> Sunday Nov 9, 2025
        assert_eq!(week_end(date(2025, 11, 6)), date(2025, 11, 9));
        // A Sunday maps to itself
        assert_eq!(week_end(date(2025, 11, 9)), date(2025, 11, 9));
        // A Monday maps six days forward
        assert_eq!(week_end(date(2025, 11, 3)), date(2025, 11, 9));
    }

    #[test]
    fn test_daily_is_identity() {
        let input = table(
            vec![date(2020, 1, 2), date(2020, 1, 3)],
            vec![Some(1.0), Some(2.0)],
        );
        let output = resample(&input, Frequency::Daily).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_weekly_takes_last_observation() {
        // Thu 2020-01-02, Fri 2020-01-03 (week ending Sun 01-05),
        // Mon 2020-01-06 (week ending Sun 01-12)
        let input = table(
            vec![date(2020, 1, 2), date(2020, 1, 3), date(2020, 1, 6)],
            vec![Some(1.0), Some(2.0), Some(3.0)],
        );
        let output = resample(&input, Frequency::Weekly).unwrap();

        assert_eq!(output.dates, vec![date(2020, 1, 5), date(2020, 1, 12)]);
        assert_eq!(output.column("AAPL").unwrap().values, vec![Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_weekly_skips_trailing_missing() {
        // The last value of the week is missing; the bucket keeps the
        // last one that is present
        let input = table(
            vec![date(2020, 1, 2), date(2020, 1, 3)],
            vec![Some(1.0), None],
        );
        let output = resample(&input, Frequency::Weekly).unwrap();
        assert_eq!(output.column("AAPL").unwrap().values, vec![Some(1.0)]);
    }

    #[test]
    fn test_monthly_labels_last_observed_day() {
        let input = table(
            vec![
                date(2020, 1, 2),
                date(2020, 1, 31),
                date(2020, 2, 3),
                date(2020, 2, 27),
            ],
            vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
        );
        let output = resample(&input, Frequency::Monthly).unwrap();

        assert_eq!(output.dates, vec![date(2020, 1, 31), date(2020, 2, 27)]);
        assert_eq!(output.column("AAPL").unwrap().values, vec![Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_resampling_never_grows_the_table() {
        let dates: Vec<NaiveDate> = (1..=60)
            .map(|offset| date(2020, 1, 1) + Duration::days(offset))
            .collect();
        let values: Vec<Option<f64>> = (0..dates.len()).map(|i| Some(i as f64)).collect();
        let input = table(dates, values);

        let weekly = resample(&input, Frequency::Weekly).unwrap();
        let monthly = resample(&input, Frequency::Monthly).unwrap();

        assert!(weekly.row_count() <= input.row_count());
        assert!(monthly.row_count() <= weekly.row_count());
    }

    #[test]
    fn test_all_missing_column_dropped_and_empty_signalled() {
        let mut input = table(
            vec![date(2020, 1, 2), date(2020, 1, 3)],
            vec![None, None],
        );

        assert!(matches!(
            resample(&input, Frequency::Weekly),
            Err(AppError::NoDataAfterResample)
        ));

        // With a second live column, only the dead one is dropped
        input.push_column("MSFT".to_string(), vec![Some(5.0), Some(6.0)]);
        let output = resample(&input, Frequency::Weekly).unwrap();
        assert_eq!(output.symbols(), vec!["MSFT"]);
    }

    #[test]
    fn test_empty_table_signals_no_data() {
        let input = PriceTable::new(vec![]);
        assert!(matches!(
            resample(&input, Frequency::Monthly),
            Err(AppError::NoDataAfterResample)
        ));
    }
}
