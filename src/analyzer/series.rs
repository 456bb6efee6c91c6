// Shared helpers over plain f64 slices
use crate::model::DomainError;

/// How a percentile rank falling between two samples is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Take the next data point above the rank.
    Higher,
    /// Take the data point below the rank.
    Lower,
}

/// Returns the last `n` values, or all of them if fewer exist.
pub fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

/// Returns exactly the last `n` values or fails with `InsufficientData`.
pub fn require_tail<'a>(
    values: &'a [f64],
    n: usize,
    what: &'static str,
) -> Result<&'a [f64], DomainError> {
    if values.len() < n {
        return Err(DomainError::InsufficientData {
            what,
            required: n,
            available: values.len(),
        });
    }
    Ok(tail(values, n))
}

pub fn min_value(values: &[f64]) -> Result<f64, DomainError> {
    values
        .iter()
        .copied()
        .reduce(f64::min)
        .ok_or(DomainError::EmptyWindow)
}

pub fn max_value(values: &[f64]) -> Result<f64, DomainError> {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .ok_or(DomainError::EmptyWindow)
}

/// Index of the first element equal to `target`.
pub fn first_position(values: &[f64], target: f64) -> Option<usize> {
    values.iter().position(|&v| v == target)
}

/// Nearest-rank percentile over `values` (order irrelevant).
///
/// The virtual rank is `p / 100 * (n - 1)` on the sorted data; `Higher`
/// rounds it up to the next sample, `Lower` rounds it down.
pub fn percentile(values: &[f64], p: f64, interpolation: Interpolation) -> Result<f64, DomainError> {
    if values.is_empty() {
        return Err(DomainError::EmptyWindow);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() - 1;
    let mut rank = (p / 100.0) * last as f64;
    // Absorb float noise so an exact rank never skips a sample.
    if (rank - rank.round()).abs() < 1e-9 {
        rank = rank.round();
    }

    let index = match interpolation {
        Interpolation::Higher => rank.ceil(),
        Interpolation::Lower => rank.floor(),
    };
    Ok(sorted[(index.max(0.0) as usize).min(last)])
}
