//! The classic "four best buy/sell points" volume and price rules.
//!
//! Evaluated as a second opinion whenever the bias-ratio assessment fires.
//! Needs open price and volume on the last two quotes.

use crate::analyzer::moving_average::moving_average;
use crate::model::{AssessmentResult, DailyQuote, DomainError, Reason};

const SHORT_MA: usize = 3;
const LONG_MA: usize = 6;

/// Quotes required: a 6-day average plus one prior day for the 3-day trend.
pub const REQUIRED_QUOTES: usize = LONG_MA + 1;

/// Length of the latest same-direction run of `data`, signed by direction.
///
/// `+n` means the last `n` steps rose, `-n` means they did not rise.
/// Fewer than two values yield 0.
pub fn continuous(data: &[f64]) -> i32 {
    let steps: Vec<i32> = data
        .windows(2)
        .rev()
        .map(|w| if w[1] > w[0] { 1 } else { -1 })
        .collect();

    let Some(&latest) = steps.first() else {
        return 0;
    };
    let run = steps.iter().take_while(|&&s| s == latest).count() as i32;
    run * latest
}

struct Snapshot {
    close: f64,
    prev_close: f64,
    open: f64,
    volume: u64,
    prev_volume: u64,
    ma3_trend: i32,
    ma3: f64,
    ma6: f64,
}

impl Snapshot {
    fn build(quotes: &[DailyQuote]) -> Result<Self, DomainError> {
        if quotes.len() < REQUIRED_QUOTES {
            return Err(DomainError::InsufficientData {
                what: "best four point",
                required: REQUIRED_QUOTES,
                available: quotes.len(),
            });
        }

        let last = &quotes[quotes.len() - 1];
        let prev = &quotes[quotes.len() - 2];
        let (Some(open), Some(volume), Some(prev_volume)) = (last.open, last.volume, prev.volume)
        else {
            let missing = if last.open.is_none() || last.volume.is_none() {
                last.date
            } else {
                prev.date
            };
            return Err(DomainError::MissingQuoteField(missing));
        };

        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let ma3 = moving_average(&closes, SHORT_MA)?;
        let ma6 = moving_average(&closes, LONG_MA)?;

        Ok(Self {
            close: last.close,
            prev_close: prev.close,
            open,
            volume,
            prev_volume,
            ma3_trend: continuous(&ma3),
            ma3: ma3[ma3.len() - 1],
            ma6: ma6[ma6.len() - 1],
        })
    }

    fn buy_reasons(&self) -> Vec<Reason> {
        let checks = [
            (self.volume > self.prev_volume && self.close > self.open, Reason::VolumeUpCloseUp),
            (
                self.volume < self.prev_volume && self.close > self.prev_close,
                Reason::VolumeDownPriceHolds,
            ),
            (self.ma3_trend == 1, Reason::Ma3TurnsUp),
            (self.ma3 > self.ma6, Reason::Ma3AboveMa6),
        ];
        checks.into_iter().filter(|(hit, _)| *hit).map(|(_, r)| r).collect()
    }

    fn sell_reasons(&self) -> Vec<Reason> {
        let checks = [
            (self.volume > self.prev_volume && self.close < self.open, Reason::VolumeUpCloseDown),
            (
                self.volume < self.prev_volume && self.close < self.prev_close,
                Reason::VolumeDownPriceFalls,
            ),
            (self.ma3_trend == -1, Reason::Ma3TurnsDown),
            (self.ma3 < self.ma6, Reason::Ma3BelowMa6),
        ];
        checks.into_iter().filter(|(hit, _)| *hit).map(|(_, r)| r).collect()
    }
}

/// Classifies the latest quote; buy rules take priority over sell rules.
pub fn best_four_point(quotes: &[DailyQuote]) -> Result<AssessmentResult, DomainError> {
    let snapshot = Snapshot::build(quotes)?;

    Ok(AssessmentResult::prioritized(
        snapshot.buy_reasons(),
        snapshot.sell_reasons(),
    ))
}
