//! Sample statistics with missing-value handling
//!
//! Views over a sample buffer use `None` as the missing-value sentinel.
//! The cleaned view additionally drops exact zeros (background) and every
//! occurrence of the buffer maximum (detector saturation).

/// Samples as a view, with NaN treated as missing
pub fn raw(samples: &[f64]) -> Vec<Option<f64>> {
    samples
        .iter()
        .map(|&v| if v.is_nan() { None } else { Some(v) })
        .collect()
}

/// Samples with zeros and the maximum value replaced by `None`
pub fn clean(samples: &[f64]) -> Vec<Option<f64>> {
    let max = samples
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))));

    samples
        .iter()
        .map(|&v| {
            if v.is_nan() || v == 0.0 || Some(v) == max {
                None
            } else {
                Some(v)
            }
        })
        .collect()
}

fn present(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied()
}

/// Mean of the present values
pub fn nan_mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = present(values).fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Population standard deviation (ddof = 0) of the present values
pub fn nan_std(values: &[Option<f64>]) -> Option<f64> {
    let mean = nan_mean(values)?;
    let (squares, count) = present(values).fold((0.0, 0usize), |(s, n), v| {
        let d = v - mean;
        (s + d * d, n + 1)
    });
    Some((squares / count as f64).sqrt())
}

pub fn nan_min(values: &[Option<f64>]) -> Option<f64> {
    present(values).reduce(f64::min)
}

pub fn nan_max(values: &[Option<f64>]) -> Option<f64> {
    present(values).reduce(f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_replaces_zeros_and_max() {
        let cleaned = clean(&[0.0, 1.0, 5.0, 2.0, 5.0, 0.0]);
        assert_eq!(
            cleaned,
            vec![None, Some(1.0), None, Some(2.0), None, None]
        );
    }

    #[test]
    fn test_clean_constant_buffer_is_all_missing() {
        let cleaned = clean(&[3.0, 3.0, 3.0]);
        assert!(cleaned.iter().all(Option::is_none));
        assert_eq!(nan_mean(&cleaned), None);
        assert_eq!(nan_std(&cleaned), None);
    }

    #[test]
    fn test_clean_empty_buffer() {
        assert!(clean(&[]).is_empty());
        assert_eq!(nan_max(&clean(&[])), None);
    }

    #[test]
    fn test_raw_keeps_zeros() {
        let view = raw(&[0.0, f64::NAN, 2.0]);
        assert_eq!(view, vec![Some(0.0), None, Some(2.0)]);
        assert_eq!(nan_mean(&view), Some(1.0));
    }

    #[test]
    fn test_statistics_ignore_missing() {
        let values = vec![Some(1.0), None, Some(3.0), None, Some(5.0)];
        assert_eq!(nan_mean(&values), Some(3.0));
        assert_eq!(nan_min(&values), Some(1.0));
        assert_eq!(nan_max(&values), Some(5.0));

        let std = nan_std(&values).unwrap();
        assert!((std - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_clean_then_mean_of_simple_row() {
        // 3 is the maximum and is dropped as saturated
        let cleaned = clean(&[1.0, 2.0, 3.0]);
        assert_eq!(nan_mean(&cleaned), Some(1.5));
    }
}
