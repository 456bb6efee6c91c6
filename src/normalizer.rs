use crate::model::DailyQuote;
use chrono::NaiveDate;

/// Sorts quotes chronologically, keeps the last row seen for a repeated date
/// and drops rows without a usable closing price.
pub fn normalize_quotes(quotes: &mut Vec<DailyQuote>) {
    quotes.retain(|q| q.close.is_finite() && q.close > 0.0);
    quotes.sort_by_key(|q| q.date);

    let mut normalized: Vec<DailyQuote> = Vec::with_capacity(quotes.len());
    for quote in quotes.drain(..) {
        match normalized.last_mut() {
            Some(last) if last.date == quote.date => *last = quote,
            _ => normalized.push(quote),
        }
    }
    *quotes = normalized;
}

/// Keeps quotes dated within `[from, to]`.
pub fn restrict_to_range(quotes: &mut Vec<DailyQuote>, from: NaiveDate, to: NaiveDate) {
    quotes.retain(|q| q.date >= from && q.date <= to);
}
