use crate::model::{DailyQuote, ProviderError};
use chrono::NaiveDate;

/// Source of daily price history for one security.
///
/// Implementations return quotes sorted oldest first with unique dates.
#[async_trait::async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_daily_prices(
        &self,
        sid: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, ProviderError>;
}
