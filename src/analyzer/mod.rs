// Analyzer module: pure computations over price and bias-ratio series.

pub mod assessment;
pub mod bands;
pub mod best_four_point;
pub mod moving_average;
pub mod pivot;
pub mod series;

// Re-export the main entry points for ease of use.
pub use assessment::{Analyzer, AssessmentEngine, RuleChecks};
pub use bands::{lower_band, upper_band, HistoricalBand};
pub use best_four_point::best_four_point;
pub use moving_average::{bias_ratio, moving_average};
pub use pivot::{detect_pivot, PivotDirection, PIVOT_SAMPLE_SIZE};
