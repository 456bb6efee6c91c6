// Quote document parsing: plain JSON arrays and TWSE STOCK_DAY responses
use crate::model::{DailyQuote, ProviderError};
use crate::utils::{parse_number, parse_roc_date};
use serde::Deserialize;
use serde_json::Value;

pub trait Parser {
    fn parse(&self, text: &str) -> Result<Vec<DailyQuote>, ProviderError>;
}

/// TWSE `STOCK_DAY` response body.
#[derive(Debug, Deserialize)]
struct TwseResponse {
    stat: String,
    #[serde(default)]
    data: Vec<Vec<String>>,
}

// Column positions inside a TWSE row.
const COL_DATE: usize = 0;
const COL_SHARES: usize = 1;
const COL_OPEN: usize = 3;
const COL_CLOSE: usize = 6;

pub struct QuoteParser;

impl QuoteParser {
    pub fn new() -> Self {
        Self
    }

    fn parse_twse(&self, value: Value) -> Result<Vec<DailyQuote>, ProviderError> {
        let response: TwseResponse =
            serde_json::from_value(value).map_err(|e| ProviderError::Malformed(e.to_string()))?;
        if response.stat != "OK" {
            return Err(ProviderError::Malformed(format!(
                "provider status '{}'",
                response.stat
            )));
        }

        let mut quotes = Vec::with_capacity(response.data.len());
        for row in &response.data {
            if row.len() <= COL_CLOSE {
                return Err(ProviderError::Malformed(format!(
                    "expected at least {} columns, got {}",
                    COL_CLOSE + 1,
                    row.len()
                )));
            }
            let date = parse_roc_date(&row[COL_DATE]).ok_or_else(|| {
                ProviderError::Malformed(format!("bad date '{}'", row[COL_DATE]))
            })?;
            // "--" marks a day without trades
            let Some(close) = parse_number(&row[COL_CLOSE]) else {
                continue;
            };

            quotes.push(DailyQuote {
                date,
                close,
                open: parse_number(&row[COL_OPEN]),
                volume: parse_number(&row[COL_SHARES]).map(|v| v as u64),
            });
        }

        Ok(quotes)
    }
}

impl Default for QuoteParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for QuoteParser {
    fn parse(&self, text: &str) -> Result<Vec<DailyQuote>, ProviderError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let is_twse = value.get("stat").is_some();
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| ProviderError::Malformed(e.to_string())),
            Value::Object(_) if is_twse => self.parse_twse(value),
            _ => Err(ProviderError::Malformed(
                "expected a quote array or a STOCK_DAY response".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_plain_array() {
        let text = r#"[
            {"date": "2024-01-02", "close": 59.0, "open": 59.3, "volume": 27839577},
            {"date": "2024-01-03", "close": 58.1}
        ]"#;
        let quotes = QuoteParser::new().parse(text).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].open, Some(59.3));
        assert_eq!(quotes[0].volume, Some(27_839_577));
        assert_eq!(quotes[1].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(quotes[1].open, None);
    }

    #[test]
    fn test_parse_twse_response() {
        let text = r#"{
            "stat": "OK",
            "fields": ["日期","成交股數","成交金額","開盤價","最高價","最低價","收盤價","漲跌價差","成交筆數"],
            "data": [
                ["113/01/02","27,839,577","1,643,539,806","59.30","59.40","58.70","59.00","-0.40","10,325"],
                ["113/01/03","1,000","59,000","--","--","--","--"," 0.00","0"],
                ["113/01/04","31,020,114","1,802,344,115","58.20","58.50","57.80","58.10","-0.90","12,004"]
            ]
        }"#;
        let quotes = QuoteParser::new().parse(text).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(quotes[0].close, 59.0);
        assert_eq!(quotes[0].open, Some(59.3));
        assert_eq!(quotes[0].volume, Some(27_839_577));
        assert_eq!(quotes[1].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_twse_error_status() {
        let text = r#"{"stat": "很抱歉，沒有符合條件的資料!"}"#;
        assert!(matches!(
            QuoteParser::new().parse(text),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_twse_bad_date() {
        let text = r#"{"stat": "OK", "data": [["113/13/02","1","1","1","1","1","1","0","1"]]}"#;
        assert!(matches!(
            QuoteParser::new().parse(text),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn test_unexpected_shape() {
        assert!(QuoteParser::new().parse("42").is_err());
        assert!(QuoteParser::new().parse("not json").is_err());
    }
}
