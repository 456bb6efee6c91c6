// Utility functions
use chrono::NaiveDate;

/// Offset between the ROC (Minguo) calendar year and the Gregorian year.
const ROC_YEAR_OFFSET: i32 = 1911;

/// Converts an ROC calendar date such as `113/01/02` into a `NaiveDate`.
pub fn parse_roc_date(text: &str) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let day: u32 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year + ROC_YEAR_OFFSET, month, day)
}

/// Parses a number printed with thousands separators. Placeholders such as
/// `--` for a day without trades yield `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True for ids made only of ASCII letters and digits, like `2330` or `00878`.
pub fn is_valid_security_id(sid: &str) -> bool {
    !sid.is_empty() && sid.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roc_date() {
        assert_eq!(
            parse_roc_date("113/01/02"),
            NaiveDate::from_ymd_opt(2024, 1, 2)
        );
        assert_eq!(parse_roc_date(" 99/12/31 "), NaiveDate::from_ymd_opt(2010, 12, 31));
        assert_eq!(parse_roc_date("113/02/30"), None);
        assert_eq!(parse_roc_date("2024-01-02"), None);
        assert_eq!(parse_roc_date("113/01/02/03"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("27,839,577"), Some(27_839_577.0));
        assert_eq!(parse_number(" 59.30 "), Some(59.3));
        assert_eq!(parse_number("--"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_security_id() {
        assert!(is_valid_security_id("2337"));
        assert!(is_valid_security_id("00878"));
        assert!(!is_valid_security_id("../etc"));
        assert!(!is_valid_security_id(""));
    }
}
