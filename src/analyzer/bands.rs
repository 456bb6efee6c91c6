//! Historical reference bands for the bias-ratio series.
//!
//! Each band averages a true extreme of the lookback window with a percentile
//! close to that extreme, which damps a single outlier day while still
//! anchoring to the observed min/max.

use crate::analyzer::series::{self, Interpolation};
use crate::model::DomainError;

/// Percentile paired with the window minimum for the lower band.
pub const LOWER_PERCENTILE: f64 = 5.0;
/// Percentile paired with the window maximum for the upper band.
pub const UPPER_PERCENTILE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoricalBand {
    pub lower: f64,
    pub upper: f64,
}

impl HistoricalBand {
    /// Bands over the trailing `lookback` values of `bias`.
    pub fn estimate(bias: &[f64], lookback: usize) -> Result<Self, DomainError> {
        let window = series::require_tail(bias, lookback, "historical band lookback")?;
        Ok(Self {
            lower: lower_band(window)?,
            upper: upper_band(window)?,
        })
    }
}

/// Mean of the window minimum and its 5th percentile (rounded up to a sample).
pub fn lower_band(window: &[f64]) -> Result<f64, DomainError> {
    let min = series::min_value(window)?;
    let pct = series::percentile(window, LOWER_PERCENTILE, Interpolation::Higher)?;
    Ok((min + pct) / 2.0)
}

/// Mean of the window maximum and its 95th percentile (rounded down to a sample).
pub fn upper_band(window: &[f64]) -> Result<f64, DomainError> {
    let max = series::max_value(window)?;
    let pct = series::percentile(window, UPPER_PERCENTILE, Interpolation::Lower)?;
    Ok((max + pct) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_band_three_point_fixture() {
        // P5 "higher" on 3 samples lands on the middle value (-3.0)
        assert_eq!(lower_band(&[-8.0, -3.0, -1.0]).unwrap(), -5.5);
    }

    #[test]
    fn test_upper_band_three_point_fixture() {
        // P95 "lower" on 3 samples also lands on the middle value
        assert_eq!(upper_band(&[-8.0, -3.0, -1.0]).unwrap(), -2.0);
    }

    #[test]
    fn test_bands_on_twenty_one_samples() {
        // sorted 0..=20, P5 rank is exactly 1 and P95 rank exactly 19
        let window: Vec<f64> = (0..=20).rev().map(|v| v as f64 - 10.0).collect();
        assert_eq!(lower_band(&window).unwrap(), (-10.0 + -9.0) / 2.0);
        assert_eq!(upper_band(&window).unwrap(), (10.0 + 9.0) / 2.0);
    }

    #[test]
    fn test_bands_need_not_straddle_zero() {
        let band = HistoricalBand::estimate(&[1.0, 2.0, 3.0, 4.0], 4).unwrap();
        assert!(band.lower > 0.0);
        assert!(band.upper >= band.lower);
    }

    #[test]
    fn test_estimate_uses_trailing_window_only() {
        let bias = [-50.0, 1.0, 2.0, 3.0];
        let band = HistoricalBand::estimate(&bias, 3).unwrap();
        assert_eq!(band.lower, (1.0 + 2.0) / 2.0);
        assert_eq!(band.upper, (3.0 + 2.0) / 2.0);
    }

    #[test]
    fn test_empty_window_is_domain_error() {
        assert_eq!(lower_band(&[]), Err(DomainError::EmptyWindow));
        assert_eq!(upper_band(&[]), Err(DomainError::EmptyWindow));
    }

    #[test]
    fn test_estimate_insufficient_history() {
        let err = HistoricalBand::estimate(&[1.0, 2.0], 5).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientData { required: 5, available: 2, .. }
        ));
    }
}
