//! Rolling-window calculations for table columns

/// Trailing simple moving average over a column that may contain gaps
///
/// # Arguments
/// * `values` - Column values; `None` marks a missing observation
/// * `window` - Number of trailing observations to average
///
/// # Returns
/// One entry per input row. Rows before the window is filled are `None`,
/// and so is any row whose trailing window contains a missing value.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];

    if window == 0 || values.len() < window {
        return out;
    }

    for i in (window - 1)..values.len() {
        let start_idx = i + 1 - window;
        let mut sum = 0.0;
        let mut complete = true;

        for value in &values[start_idx..=i] {
            match value {
                Some(v) => sum += v,
                None => {
                    complete = false;
                    break;
                }
            }
        }

        if complete {
            out[i] = Some(sum / window as f64);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_mean() {
        let values: Vec<Option<f64>> = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0]
            .into_iter()
            .map(Some)
            .collect();
        let ma3 = rolling_mean(&values, 3);

        assert_eq!(ma3[0], None); // Not enough data
        assert_eq!(ma3[1], None); // Not enough data
        assert_eq!(ma3[2], Some(11.0)); // (10+11+12)/3
        assert_eq!(ma3[3], Some(12.0)); // (11+12+13)/3
        assert_eq!(ma3[4], Some(13.0)); // (12+13+14)/3
        assert_eq!(ma3[5], Some(14.0)); // (13+14+15)/3
    }

    #[test]
    fn test_rolling_mean_short_input() {
        let values = vec![Some(10.0), Some(20.0)];
        assert_eq!(rolling_mean(&values, 5), vec![None, None]);
    }

    #[test]
    fn test_rolling_mean_window_with_gap() {
        let values = vec![Some(10.0), None, Some(30.0), Some(40.0), Some(50.0)];
        let ma2 = rolling_mean(&values, 2);

        assert_eq!(ma2[0], None); // warmup
        assert_eq!(ma2[1], None); // gap in window
        assert_eq!(ma2[2], None); // gap in window
        assert_eq!(ma2[3], Some(35.0));
        assert_eq!(ma2[4], Some(45.0));
    }

    #[test]
    fn test_rolling_mean_boundary_is_exact() {
        // For window W the first defined row is exactly index W-1
        let values: Vec<Option<f64>> = (1..=10).map(|v| Some(v as f64)).collect();
        let window = 4;
        let ma = rolling_mean(&values, window);

        for (i, value) in ma.iter().enumerate() {
            if i < window - 1 {
                assert_eq!(*value, None);
            } else {
                let expected: f64 =
                    (i + 1 - window..=i).map(|j| (j + 1) as f64).sum::<f64>() / window as f64;
                assert_eq!(*value, Some(expected));
            }
        }
    }
}
