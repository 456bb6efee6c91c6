use crate::model::{DailyQuote, ProviderError};
use crate::normalizer::{normalize_quotes, restrict_to_range};
use crate::parser::{Parser, QuoteParser};
use crate::provider::traits::PriceProvider;
use crate::utils::is_valid_security_id;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Reads `<data_dir>/<sid>.json` quote documents exported by an external fetcher.
pub struct JsonFileProvider {
    data_dir: PathBuf,
    parser: QuoteParser,
}

impl JsonFileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            parser: QuoteParser::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn quote_path(&self, sid: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sid))
    }
}

#[async_trait::async_trait]
impl PriceProvider for JsonFileProvider {
    async fn fetch_daily_prices(
        &self,
        sid: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyQuote>, ProviderError> {
        if !is_valid_security_id(sid) {
            return Err(ProviderError::InvalidSecurity(sid.to_string()));
        }

        let path = self.quote_path(sid);
        let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            warn!("Failed to read quotes from {}: {}", path.display(), e);
            ProviderError::Io(e)
        })?;

        let mut quotes = self.parser.parse(&text)?;
        let parsed = quotes.len();
        normalize_quotes(&mut quotes);
        restrict_to_range(&mut quotes, from, to);
        debug!(
            "Loaded {} of {} quotes for {} from {}",
            quotes.len(),
            parsed,
            sid,
            path.display()
        );

        if quotes.is_empty() {
            return Err(ProviderError::Empty {
                sid: sid.to_string(),
                from,
                to,
            });
        }
        Ok(quotes)
    }
}
