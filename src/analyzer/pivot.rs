use crate::analyzer::series;
use crate::model::DomainError;

/// Number of most recent bias-ratio samples inspected for a turn.
pub const PIVOT_SAMPLE_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotDirection {
    /// A trough in negative territory.
    Low,
    /// A peak in positive territory.
    High,
}

/// Fixed-lag reversal check over a short, oldest-first window.
///
/// The extremum (first occurrence) must sit strictly inside the window so that
/// at least one later sample shows the reversal. A `Low` additionally requires
/// both the trough and the latest sample to be negative; a `High` only
/// requires the peak to be positive.
pub fn detect_pivot(window: &[f64], direction: PivotDirection) -> Result<bool, DomainError> {
    if window.len() < PIVOT_SAMPLE_SIZE {
        return Err(DomainError::InsufficientData {
            what: "pivot window",
            required: PIVOT_SAMPLE_SIZE,
            available: window.len(),
        });
    }

    let last = window[window.len() - 1];
    let (extremum, sign_ok) = match direction {
        PivotDirection::Low => {
            let min = series::min_value(window)?;
            (min, min < 0.0 && last < 0.0)
        }
        PivotDirection::High => {
            let max = series::max_value(window)?;
            (max, max > 0.0)
        }
    };

    let interior = match series::first_position(window, extremum) {
        Some(pos) => pos > 0 && pos < window.len() - 1,
        None => false,
    };

    Ok(sign_ok && interior)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_pivot_in_middle() {
        assert!(detect_pivot(&[-5.0, -8.0, -3.0], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_low_pivot_not_yet_reversed() {
        assert!(!detect_pivot(&[-5.0, -3.0, -8.0], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_low_pivot_at_first_sample_is_not_a_turn() {
        assert!(!detect_pivot(&[-8.0, -5.0, -3.0], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_low_pivot_requires_last_sample_negative() {
        assert!(!detect_pivot(&[-5.0, -8.0, 0.5], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_low_pivot_requires_negative_trough() {
        assert!(!detect_pivot(&[3.0, 1.0, 2.0], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_high_pivot_in_middle() {
        assert!(detect_pivot(&[2.0, 6.0, 4.0], PivotDirection::High).unwrap());
        assert!(!detect_pivot(&[2.0, 4.0, 6.0], PivotDirection::High).unwrap());
        assert!(!detect_pivot(&[-2.0, -1.0, -3.0], PivotDirection::High).unwrap());
    }

    #[test]
    fn test_high_pivot_has_no_last_sample_guard() {
        // The mirror of a Low that already crossed zero still counts as a High.
        assert!(detect_pivot(&[2.0, 5.0, -1.0], PivotDirection::High).unwrap());
        assert!(!detect_pivot(&[-2.0, -5.0, 1.0], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_tied_extremum_uses_first_occurrence() {
        // first min at index 1 counts even though index 2 ties
        assert!(detect_pivot(&[-1.0, -4.0, -4.0], PivotDirection::Low).unwrap());
        // first min at index 0
        assert!(!detect_pivot(&[-4.0, -4.0, -1.0], PivotDirection::Low).unwrap());
    }

    #[test]
    fn test_short_window_is_domain_error() {
        assert!(matches!(
            detect_pivot(&[-1.0, -2.0], PivotDirection::Low),
            Err(DomainError::InsufficientData { required: 3, available: 2, .. })
        ));
    }
}
