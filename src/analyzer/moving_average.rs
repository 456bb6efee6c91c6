use crate::model::{DomainError, PriceSeries, SeriesPoint};

/// Simple moving average over `data`.
///
/// Each output is the mean of the `window` values ending at that index, so the
/// result is `window - 1` entries shorter than the input.
pub fn moving_average(data: &[f64], window: usize) -> Result<Vec<f64>, DomainError> {
    if window == 0 {
        return Err(DomainError::InvalidWindow(window));
    }
    if data.len() < window {
        return Err(DomainError::InsufficientData {
            what: "moving average",
            required: window,
            available: data.len(),
        });
    }
    Ok(data
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect())
}

/// Percentage deviation of `prices` from `averages`, aligned on their tails.
///
/// Both inputs are oldest-first; the output has the length of the shorter one
/// and is oldest-first as well.
pub fn bias_ratio(prices: &[f64], averages: &[f64]) -> Result<Vec<f64>, DomainError> {
    let overlap = prices.len().min(averages.len());
    let mut result = Vec::with_capacity(overlap);

    // Walk from the most recent shared day backwards.
    for i in 1..=overlap {
        let price = prices[prices.len() - i];
        let ma = averages[averages.len() - i];
        if ma == 0.0 {
            return Err(DomainError::ZeroMovingAverage {
                index: averages.len() - i,
            });
        }
        result.push((price - ma) / ma * 100.0);
    }

    result.reverse();
    Ok(result)
}

/// Moving average of a price series with each value dated by its last day.
pub fn dated_moving_average(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<SeriesPoint>, DomainError> {
    let values = moving_average(series.prices(), window)?;
    Ok(attach_dates(series, values))
}

/// Bias ratio of a price series against its own `window`-day moving average.
pub fn dated_bias_ratio(
    series: &PriceSeries,
    window: usize,
) -> Result<Vec<SeriesPoint>, DomainError> {
    let averages = moving_average(series.prices(), window)?;
    let values = bias_ratio(series.prices(), &averages)?;
    Ok(attach_dates(series, values))
}

fn attach_dates(series: &PriceSeries, values: Vec<f64>) -> Vec<SeriesPoint> {
    let skip = series.len() - values.len();
    series.dates()[skip..]
        .iter()
        .zip(values)
        .map(|(&date, value)| SeriesPoint { date, value })
        .collect()
}
