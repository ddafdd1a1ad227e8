// Robust percentile normalization.

use thiserror::Error;

/// Lower edge of the robust band.
pub const LOWER_QUANTILE: f64 = 0.05;
/// Upper edge of the robust band.
pub const UPPER_QUANTILE: f64 = 0.95;

/// Reasons a series cannot be rescaled onto the percentile band.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DegenerateMetric {
    #[error("series is empty")]
    Empty,

    #[error("value at position {index} is not finite")]
    NonFinite { index: usize },

    #[error("percentile band [{low}, {high}] has zero width")]
    ZeroWidthBand { low: f64, high: f64 },

    #[error("maximum {max} is not positive, cannot scale by it")]
    NonPositiveMax { max: f64 },
}

/// The 5th and 95th percentile of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBand {
    pub low: f64,
    pub high: f64,
}

impl PercentileBand {
    /// Compute the band for `values`.
    ///
    /// Fails on an empty series, on any NaN/infinite value, and when the two
    /// percentiles coincide (constant columns, or too few distinct values).
    pub fn from_values(values: &[f64]) -> Result<Self, DegenerateMetric> {
        if values.is_empty() {
            return Err(DegenerateMetric::Empty);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DegenerateMetric::NonFinite { index });
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let low = quantile_sorted(&sorted, LOWER_QUANTILE);
        let high = quantile_sorted(&sorted, UPPER_QUANTILE);
        if high - low <= 0.0 {
            return Err(DegenerateMetric::ZeroWidthBand { low, high });
        }
        Ok(Self { low, high })
    }

    /// Rescale one value onto the band. Values outside the band land outside
    /// [0, 1]; nothing is clamped.
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.low) / (self.high - self.low)
    }
}

/// Quantile of an ascending, non-empty, finite slice using linear
/// interpolation between the two nearest order statistics.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Map a raw metric column onto its 5th–95th percentile band.
///
/// Order preserving: `a <= b` implies `normalize(a) <= normalize(b)`.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, DegenerateMetric> {
    let band = PercentileBand::from_values(values)?;
    Ok(values.iter().map(|v| band.scale(*v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn quantile_interpolates_between_order_statistics() {
        // rank = 0.05 * 4 = 0.2 -> 1 + 0.2 * (2 - 1)
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx_eq(quantile_sorted(&sorted, 0.05), 1.2, 1e-12));
        // rank = 0.95 * 4 = 3.8 -> 4 + 0.8 * (5 - 4)
        assert!(approx_eq(quantile_sorted(&sorted, 0.95), 4.8, 1e-12));
        assert!(approx_eq(quantile_sorted(&sorted, 0.5), 3.0, 1e-12));
    }

    #[test]
    fn quantile_of_single_value() {
        assert_eq!(quantile_sorted(&[7.0], 0.95), 7.0);
    }

    #[test]
    fn normalize_known_values() {
        let out = normalize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        // band = [1.2, 4.8], width 3.6
        assert!(approx_eq(out[0], (1.0 - 1.2) / 3.6, 1e-12));
        assert!(approx_eq(out[2], (3.0 - 1.2) / 3.6, 1e-12));
        assert!(approx_eq(out[4], (5.0 - 1.2) / 3.6, 1e-12));
    }

    #[test]
    fn normalize_is_not_clamped() {
        let out = normalize(&[0.0, 10.0, 11.0, 12.0, 100.0]).unwrap();
        assert!(out[0] < 0.0);
        assert!(out[4] > 1.0);
    }

    #[test]
    fn normalize_preserves_order_for_unsorted_input() {
        let values = [3.5, -1.0, 8.0, 2.0, 2.0, 40.0, 0.5, 7.25];
        let out = normalize(&values).unwrap();
        for i in 0..values.len() {
            for j in 0..values.len() {
                if values[i] < values[j] {
                    assert!(out[i] <= out[j], "order broken between {i} and {j}");
                }
            }
        }
    }

    #[test]
    fn normalize_is_deterministic() {
        let values = [4.0, 1.0, 9.0, 16.0, 25.0];
        assert_eq!(normalize(&values).unwrap(), normalize(&values).unwrap());
    }

    #[test]
    fn constant_column_is_degenerate() {
        let err = normalize(&[10.0; 6]).unwrap_err();
        assert_eq!(err, DegenerateMetric::ZeroWidthBand { low: 10.0, high: 10.0 });
    }

    #[test]
    fn empty_series_is_degenerate() {
        assert_eq!(normalize(&[]).unwrap_err(), DegenerateMetric::Empty);
    }

    #[test]
    fn single_value_is_degenerate() {
        assert!(matches!(
            normalize(&[3.0]),
            Err(DegenerateMetric::ZeroWidthBand { .. })
        ));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let err = normalize(&[1.0, f64::NAN, 3.0]).unwrap_err();
        assert_eq!(err, DegenerateMetric::NonFinite { index: 1 });
        let err = normalize(&[1.0, 2.0, f64::INFINITY]).unwrap_err();
        assert_eq!(err, DegenerateMetric::NonFinite { index: 2 });
    }
}
