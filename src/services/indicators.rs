/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until enough values exist
/// - `Some(avg)` after `window` values
///
/// `values` must already be in ascending chronological order.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    // Running sum via scan; the value that falls out of the window is subtracted.
    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }

            let out = if i + 1 >= window {
                Some(*sum / window as f64)
            } else {
                None
            };

            Some(out)
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let sum_sq = values
        .iter()
        .fold(0.0, |acc, &v| acc + (v - avg) * (v - avg));
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_waits_for_full_window() {
        let out = sma(&[10.0, 11.0, 12.0, 13.0], 5);
        assert!(out.iter().all(Option::is_none));

        let out = sma(&[10.0, 11.0, 12.0, 13.0, 14.0, 20.0], 5);
        assert_eq!(out[3], None);
        assert_eq!(out[4].map(round2), Some(12.0));
        assert_eq!(out[5].map(round2), Some(14.0));
    }

    #[test]
    fn sma_zero_window_is_empty() {
        assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn std_dev_matches_sample_formula() {
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138).abs() < 0.001);
        assert_eq!(sample_std_dev(&[1.0]), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-1.235_1), -1.24);
        assert_eq!(round2(2.0), 2.0);
    }
}
