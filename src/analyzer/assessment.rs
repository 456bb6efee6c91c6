use crate::analyzer::bands::HistoricalBand;
use crate::analyzer::pivot::{detect_pivot, PivotDirection, PIVOT_SAMPLE_SIZE};
use crate::analyzer::series;
use crate::model::{AssessmentResult, DomainError, Reason};

/// Trait defining the interface for a bias-ratio assessor.
pub trait Analyzer {
    /// Evaluates every rule against the bias-ratio series (oldest first).
    fn evaluate(&self, bias: &[f64]) -> Result<RuleChecks, DomainError>;

    /// Classifies the current day. Buy rules take priority over sell rules.
    fn assess(&self, bias: &[f64]) -> Result<AssessmentResult, DomainError> {
        Ok(self.evaluate(bias)?.classify())
    }
}

/// Outcome of each individual rule, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleChecks {
    pub current: f64,
    pub band: HistoricalBand,
    pub historical_low: bool,
    pub negative_pivot: bool,
    pub historical_high: bool,
    pub positive_pivot: bool,
}

impl RuleChecks {
    pub fn buy_reasons(&self) -> Vec<Reason> {
        let mut reasons = Vec::new();
        if self.historical_low {
            reasons.push(Reason::HistoricalLow);
        }
        if self.negative_pivot {
            reasons.push(Reason::NegativePivot);
        }
        reasons
    }

    pub fn sell_reasons(&self) -> Vec<Reason> {
        let mut reasons = Vec::new();
        if self.historical_high {
            reasons.push(Reason::HistoricalHigh);
        }
        if self.positive_pivot {
            reasons.push(Reason::PositivePivot);
        }
        reasons
    }

    pub fn classify(&self) -> AssessmentResult {
        AssessmentResult::prioritized(self.buy_reasons(), self.sell_reasons())
    }
}

/// Stateless implementation of the assessor for a given lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentEngine {
    lookback: usize,
}

impl AssessmentEngine {
    pub fn new(lookback: usize) -> Result<Self, DomainError> {
        if lookback == 0 {
            return Err(DomainError::InvalidWindow(lookback));
        }
        Ok(Self { lookback })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    /// Bias-ratio samples needed before an assessment can run.
    pub fn required_history(&self) -> usize {
        self.lookback.max(PIVOT_SAMPLE_SIZE)
    }
}

impl Analyzer for AssessmentEngine {
    fn evaluate(&self, bias: &[f64]) -> Result<RuleChecks, DomainError> {
        series::require_tail(bias, self.required_history(), "assessment history")?;

        let current = bias[bias.len() - 1];
        let band = HistoricalBand::estimate(bias, self.lookback)?;
        let recent = series::tail(bias, PIVOT_SAMPLE_SIZE);

        Ok(RuleChecks {
            current,
            band,
            historical_low: current <= band.lower,
            negative_pivot: detect_pivot(recent, PivotDirection::Low)?,
            historical_high: current >= band.upper,
            positive_pivot: detect_pivot(recent, PivotDirection::High)?,
        })
    }
}
