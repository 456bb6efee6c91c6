// Core structs: DailyQuote, PriceSeries, AssessmentResult and the error types
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One trading day as delivered by a price provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl DailyQuote {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: None,
            volume: None,
        }
    }
}

/// A dated value, the tabular shape handed to charting collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Chronological closing prices with unique dates and strictly positive values.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self, DomainError> {
        if points.is_empty() {
            return Err(DomainError::InsufficientData {
                what: "price series",
                required: 1,
                available: 0,
            });
        }

        let mut dates = Vec::with_capacity(points.len());
        let mut prices = Vec::with_capacity(points.len());
        for (date, price) in points {
            if !price.is_finite() || price <= 0.0 {
                return Err(DomainError::InvalidPrice { date, price });
            }
            if let Some(prev) = dates.last() {
                if date <= *prev {
                    return Err(DomainError::UnorderedDates(date));
                }
            }
            dates.push(date);
            prices.push(price);
        }

        Ok(Self { dates, prices })
    }

    pub fn from_quotes(quotes: &[DailyQuote]) -> Result<Self, DomainError> {
        Self::new(quotes.iter().map(|q| (q.date, q.close)).collect())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Date of the most recent trading day.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn points(&self) -> Vec<SeriesPoint> {
        self.dates
            .iter()
            .zip(&self.prices)
            .map(|(&date, &value)| SeriesPoint { date, value })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
    None,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown direction '{0}'")]
pub struct ParseDirectionError(pub String);

impl std::str::FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            "none" => Ok(Self::None),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// Tag of a rule that fired during an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reason {
    /// Current bias ratio at or below the historical lower band.
    HistoricalLow,
    /// Negative bias ratio turned upward.
    NegativePivot,
    /// Current bias ratio at or above the historical upper band.
    HistoricalHigh,
    /// Positive bias ratio turned downward.
    PositivePivot,
    VolumeUpCloseUp,
    VolumeDownPriceHolds,
    Ma3TurnsUp,
    Ma3AboveMa6,
    VolumeUpCloseDown,
    VolumeDownPriceFalls,
    Ma3TurnsDown,
    Ma3BelowMa6,
}

impl Reason {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::HistoricalLow => "historical low",
            Self::NegativePivot => "negative pivot up",
            Self::HistoricalHigh => "historical high",
            Self::PositivePivot => "positive pivot down",
            Self::VolumeUpCloseUp => "volume up close up",
            Self::VolumeDownPriceHolds => "volume down price holds",
            Self::Ma3TurnsUp => "ma3 turns up",
            Self::Ma3AboveMa6 => "ma3 above ma6",
            Self::VolumeUpCloseDown => "volume up close down",
            Self::VolumeDownPriceFalls => "volume down price falls",
            Self::Ma3TurnsDown => "ma3 turns down",
            Self::Ma3BelowMa6 => "ma3 below ma6",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Outcome of one assessment call. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub direction: Direction,
    pub reasons: Vec<Reason>,
}

impl AssessmentResult {
    pub fn none() -> Self {
        Self {
            direction: Direction::None,
            reasons: Vec::new(),
        }
    }

    /// Buy wins whenever any buy rule fired; sell only applies otherwise.
    pub fn prioritized(buy: Vec<Reason>, sell: Vec<Reason>) -> Self {
        if !buy.is_empty() {
            Self {
                direction: Direction::Buy,
                reasons: buy,
            }
        } else if !sell.is_empty() {
            Self {
                direction: Direction::Sell,
                reasons: sell,
            }
        } else {
            Self::none()
        }
    }

    pub fn is_actionable(&self) -> bool {
        self.direction != Direction::None
    }

    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(Reason::tag)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Plain-text alert body, `None` when there is nothing to act on.
    pub fn message(&self) -> Option<String> {
        match self.direction {
            Direction::Buy => Some(format!("Buy  {}", self.reason_text())),
            Direction::Sell => Some(format!("Sell {}", self.reason_text())),
            Direction::None => None,
        }
    }

    /// Alert body: security label and trade date, then the message line.
    pub fn alert_text(&self, label: &str, trade_date: NaiveDate) -> Option<String> {
        self.message()
            .map(|message| format!("{} {}\n{}", label, trade_date, message))
    }
}

/// Persisted assessment row.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRecord {
    pub sid: String,
    pub trade_date: NaiveDate,
    pub direction: Direction,
    pub reasons: String,
    pub bias_ratio: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("empty window")]
    EmptyWindow,
    #[error("invalid window size {0}")]
    InvalidWindow(usize),
    #[error("moving average is zero at index {index}")]
    ZeroMovingAverage { index: usize },
    #[error("insufficient data for {what}: need {required}, have {available}")]
    InsufficientData {
        what: &'static str,
        required: usize,
        available: usize,
    },
    #[error("invalid price {price} on {date}")]
    InvalidPrice { date: NaiveDate, price: f64 },
    #[error("dates out of order or duplicated at {0}")]
    UnorderedDates(NaiveDate),
    #[error("quote on {0} lacks open price or volume")]
    MissingQuoteField(NaiveDate),
}

/// Price history could not be obtained.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("quote source unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed quote document: {0}")]
    Malformed(String),
    #[error("invalid security id '{0}'")]
    InvalidSecurity(String),
    #[error("no quotes for {sid} between {from} and {to}")]
    Empty {
        sid: String,
        from: NaiveDate,
        to: NaiveDate,
    },
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] ProviderError),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    ApiError(String),
    #[error("endpoint rejected message [{status}]: {body}")]
    Rejected { status: u16, body: String },
    #[error("endpoint unreachable")]
    Unreachable,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_price_series_accepts_chronological_positive_prices() {
        let series = PriceSeries::new(vec![(d(1), 10.0), (d(4), 10.5), (d(5), 11.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.last_date(), Some(d(5)));
        assert_eq!(series.prices(), &[10.0, 10.5, 11.0]);
    }

    #[test]
    fn test_price_series_rejects_duplicate_dates() {
        let err = PriceSeries::new(vec![(d(1), 10.0), (d(1), 10.5)]).unwrap_err();
        assert_eq!(err, DomainError::UnorderedDates(d(1)));
    }

    #[test]
    fn test_price_series_rejects_non_positive_price() {
        let err = PriceSeries::new(vec![(d(1), 10.0), (d(2), 0.0)]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidPrice { .. }));
    }

    #[test]
    fn test_price_series_rejects_empty() {
        assert!(matches!(
            PriceSeries::new(Vec::new()),
            Err(DomainError::InsufficientData { available: 0, .. })
        ));
    }

    #[test]
    fn test_message_format() {
        let buy = AssessmentResult {
            direction: Direction::Buy,
            reasons: vec![Reason::HistoricalLow, Reason::NegativePivot],
        };
        assert_eq!(
            buy.message().as_deref(),
            Some("Buy  historical low, negative pivot up")
        );

        let sell = AssessmentResult {
            direction: Direction::Sell,
            reasons: vec![Reason::HistoricalHigh],
        };
        assert_eq!(sell.message().as_deref(), Some("Sell historical high"));
        assert_eq!(AssessmentResult::none().message(), None);
    }

    #[test]
    fn test_only_buy_and_sell_are_actionable() {
        let sell = AssessmentResult::prioritized(Vec::new(), vec![Reason::PositivePivot]);
        assert!(sell.is_actionable());
        assert!(!AssessmentResult::none().is_actionable());
        assert!(!AssessmentResult::prioritized(Vec::new(), Vec::new()).is_actionable());
    }

    #[test]
    fn test_alert_text_prefixes_security_and_day() {
        let buy = AssessmentResult::prioritized(vec![Reason::NegativePivot], Vec::new());
        assert_eq!(
            buy.alert_text("2337 (Macronix)", d(8)).as_deref(),
            Some("2337 (Macronix) 2024-03-08\nBuy  negative pivot up")
        );
        assert_eq!(AssessmentResult::none().alert_text("2337", d(8)), None);
    }

    #[test]
    fn test_direction_round_trips_through_text() {
        for dir in [Direction::Buy, Direction::Sell, Direction::None] {
            assert_eq!(dir.to_string().parse::<Direction>().unwrap(), dir);
        }
        assert_eq!(
            "hold".parse::<Direction>(),
            Err(ParseDirectionError("hold".to_string()))
        );
    }
}
