//! Per-security analysis session.
//!
//! Owns one security's price history and the parameters it is analyzed with.
//! The bias-ratio series is derived on first use and memoized for the life of
//! the session; the price history never changes after construction, so the
//! cache never needs invalidating.

use chrono::{Duration, NaiveDate};
use std::cell::OnceCell;
use tracing::debug;

use crate::analyzer::best_four_point::best_four_point;
use crate::analyzer::moving_average::{dated_bias_ratio, dated_moving_average};
use crate::analyzer::series::tail;
use crate::analyzer::{Analyzer, AssessmentEngine, RuleChecks};
use crate::model::{
    AnalysisError, AssessmentResult, DailyQuote, DomainError, PriceSeries, SeriesPoint,
};
use crate::provider::PriceProvider;

/// Calendar days of history requested from the provider.
pub const FETCH_CALENDAR_DAYS: i64 = 210;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParams {
    /// Bias-ratio samples the historical bands are computed over.
    pub lookback: usize,
    /// Window of the moving average offered for charting.
    pub ma_window: usize,
    /// Window of the moving average the bias ratio is measured against.
    pub bias_ma_window: usize,
    /// Most recent quotes kept from the fetched history.
    pub history_days: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            lookback: 20,
            ma_window: 5,
            bias_ma_window: 5,
            history_days: 180,
        }
    }
}

pub struct AnalysisSession {
    sid: String,
    quotes: Vec<DailyQuote>,
    series: PriceSeries,
    params: AnalysisParams,
    engine: AssessmentEngine,
    bias_cache: OnceCell<Vec<SeriesPoint>>,
}

impl AnalysisSession {
    pub fn new(
        sid: impl Into<String>,
        mut quotes: Vec<DailyQuote>,
        params: AnalysisParams,
    ) -> Result<Self, DomainError> {
        let engine = AssessmentEngine::new(params.lookback)?;
        if params.bias_ma_window == 0 {
            return Err(DomainError::InvalidWindow(params.bias_ma_window));
        }

        if quotes.len() > params.history_days {
            quotes.drain(..quotes.len() - params.history_days);
        }
        let series = PriceSeries::from_quotes(&quotes)?;

        let required = params.bias_ma_window + engine.required_history() - 1;
        if series.len() < required {
            return Err(DomainError::InsufficientData {
                what: "price history",
                required,
                available: series.len(),
            });
        }

        Ok(Self {
            sid: sid.into(),
            quotes,
            series,
            params,
            engine,
            bias_cache: OnceCell::new(),
        })
    }

    /// Fetches `FETCH_CALENDAR_DAYS` of history ending at `today` and builds a session.
    pub async fn load(
        provider: &dyn PriceProvider,
        sid: &str,
        params: AnalysisParams,
        today: NaiveDate,
    ) -> Result<Self, AnalysisError> {
        let from = today - Duration::days(FETCH_CALENDAR_DAYS);
        let quotes = provider.fetch_daily_prices(sid, from, today).await?;
        debug!("Fetched {} quotes for {} ({} .. {})", quotes.len(), sid, from, today);
        Ok(Self::new(sid, quotes, params)?)
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn quotes(&self) -> &[DailyQuote] {
        &self.quotes
    }

    /// Date of the latest quote, i.e. the day being assessed.
    pub fn trade_date(&self) -> NaiveDate {
        self.series.dates()[self.series.len() - 1]
    }

    /// The last `ndays` closing prices.
    pub fn price_series(&self, ndays: usize) -> Vec<SeriesPoint> {
        tail(&self.series.points(), ndays).to_vec()
    }

    /// Moving average over the whole history for an arbitrary window.
    pub fn moving_average_series(&self, window: usize) -> Result<Vec<SeriesPoint>, DomainError> {
        dated_moving_average(&self.series, window)
    }

    /// The last `ndays` points of the moving average over `params.ma_window`.
    pub fn configured_moving_average(&self, ndays: usize) -> Result<Vec<SeriesPoint>, DomainError> {
        let ma = self.moving_average_series(self.params.ma_window)?;
        Ok(tail(&ma, ndays).to_vec())
    }

    /// The last `ndays` bias ratios.
    pub fn bias_ratio_series(&self, ndays: usize) -> Result<Vec<SeriesPoint>, DomainError> {
        Ok(tail(self.bias_points()?, ndays).to_vec())
    }

    pub fn current_bias_ratio(&self) -> Result<f64, DomainError> {
        self.bias_points()?
            .last()
            .map(|p| p.value)
            .ok_or(DomainError::EmptyWindow)
    }

    /// Per-rule outcome for the latest day.
    pub fn evaluate(&self) -> Result<RuleChecks, DomainError> {
        self.engine.evaluate(&self.bias_values()?)
    }

    pub fn run_assessment(&self) -> Result<AssessmentResult, DomainError> {
        self.engine.assess(&self.bias_values()?)
    }

    /// Secondary volume/price classification of the latest quote.
    pub fn best_four_point(&self) -> Result<AssessmentResult, DomainError> {
        best_four_point(&self.quotes)
    }

    fn bias_points(&self) -> Result<&[SeriesPoint], DomainError> {
        if let Some(points) = self.bias_cache.get() {
            return Ok(points);
        }
        let points = dated_bias_ratio(&self.series, self.params.bias_ma_window)?;
        Ok(self.bias_cache.get_or_init(|| points))
    }

    fn bias_values(&self) -> Result<Vec<f64>, DomainError> {
        Ok(self.bias_points()?.iter().map(|p| p.value).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotes(closes: &[f64]) -> Vec<DailyQuote> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| DailyQuote::new(start + Duration::days(i as i64), c))
            .collect()
    }

    fn params(lookback: usize) -> AnalysisParams {
        AnalysisParams {
            lookback,
            ..AnalysisParams::default()
        }
    }

    #[test]
    fn test_bias_series_is_memoized() {
        let session = AnalysisSession::new("2337", quotes(&[10.0; 12]), params(5)).unwrap();
        let first = session.bias_points().unwrap().as_ptr();
        let second = session.bias_points().unwrap().as_ptr();
        assert!(std::ptr::eq(first, second));
        assert_eq!(session.bias_ratio_series(100).unwrap().len(), 12 - 5 + 1);
    }

    #[test]
    fn test_history_is_truncated_to_latest_days() {
        let closes: Vec<f64> = (1..=30).map(|v| v as f64).collect();
        let p = AnalysisParams {
            history_days: 12,
            ..params(5)
        };
        let session = AnalysisSession::new("2337", quotes(&closes), p).unwrap();
        assert_eq!(session.quotes().len(), 12);
        assert_eq!(session.price_series(100)[0].value, 19.0);
        assert_eq!(session.trade_date(), NaiveDate::from_ymd_opt(2024, 1, 30).unwrap());
    }

    #[test]
    fn test_insufficient_history_for_lookback() {
        // bias series needs 20 samples, i.e. 24 prices with a 5-day average
        let err = AnalysisSession::new("2337", quotes(&[10.0; 23]), params(20))
            .err()
            .unwrap();
        assert_eq!(
            err,
            DomainError::InsufficientData {
                what: "price history",
                required: 24,
                available: 23
            }
        );
        assert!(AnalysisSession::new("2337", quotes(&[10.0; 24]), params(20)).is_ok());
    }

    #[test]
    fn test_chart_queries_tail() {
        let closes: Vec<f64> = (1..=10).map(|v| v as f64).collect();
        let session = AnalysisSession::new("2337", quotes(&closes), params(3)).unwrap();

        let prices = session.price_series(3);
        assert_eq!(prices.iter().map(|p| p.value).collect::<Vec<_>>(), vec![8.0, 9.0, 10.0]);

        let ma = session.moving_average_series(5).unwrap();
        assert_eq!(ma.len(), 6);
        assert_eq!(ma.last().unwrap().value, 8.0);

        let bias = session.bias_ratio_series(2).unwrap();
        assert_eq!(bias.len(), 2);
        assert_eq!(bias[1].date, session.trade_date());
        assert!((bias[1].value - 25.0).abs() < 1e-9);
        assert!((session.current_bias_ratio().unwrap() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_configured_moving_average_follows_ma_window() {
        let closes: Vec<f64> = (1..=40).map(|v| v as f64).collect();
        let short = AnalysisSession::new(
            "2337",
            quotes(&closes),
            AnalysisParams { ma_window: 3, ..params(5) },
        )
        .unwrap();
        let long = AnalysisSession::new(
            "2337",
            quotes(&closes),
            AnalysisParams { ma_window: 30, ..params(5) },
        )
        .unwrap();

        let short_ma = short.configured_moving_average(5).unwrap();
        let long_ma = long.configured_moving_average(5).unwrap();
        assert_eq!(short_ma.len(), 5);
        assert_eq!(long_ma.len(), 5);
        assert_eq!(short_ma[4].value, 39.0);
        assert_eq!(long_ma[4].value, 25.5);
        assert_eq!(short_ma[4].date, long_ma[4].date);
        assert_ne!(short_ma, long_ma);

        // the bias series keeps its own window
        assert_eq!(
            short.bias_ratio_series(100).unwrap(),
            long.bias_ratio_series(100).unwrap()
        );
    }

    #[test]
    fn test_run_assessment_is_idempotent() {
        let closes = [50.0, 50.5, 49.8, 50.2, 50.1, 49.9, 50.3, 50.0, 49.7, 50.4, 50.2, 58.0];
        let session = AnalysisSession::new("2337", quotes(&closes), params(8)).unwrap();
        let first = session.run_assessment().unwrap();
        assert_eq!(first, session.run_assessment().unwrap());
        assert_eq!(first, session.evaluate().unwrap().classify());
    }
}
