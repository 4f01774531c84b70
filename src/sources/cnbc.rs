//! CNBC benchmark quote feed.
//!
//! CNBC serves one formatted quote object per benchmark. Numeric fields are
//! display strings ("4.275%", "UNCH") and the observation time is an epoch
//! millisecond string. The same shape carries both the treasury and the TIPS
//! benchmark feeds; only the requested symbols differ.

use serde::Deserialize;
use serde_json::Value;

use crate::quotes::record::OtrQuote;
use crate::sources::errors::SourceError;
use crate::sources::parse_decimal;
use crate::time::ms_to_utc;

#[derive(Debug, Deserialize)]
pub struct CnbcEnvelope {
    #[serde(rename = "FormattedQuoteResult")]
    pub result: CnbcQuoteResult,
}

#[derive(Debug, Deserialize)]
pub struct CnbcQuoteResult {
    #[serde(rename = "FormattedQuote", default)]
    pub quotes: Vec<CnbcQuote>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CnbcQuote {
    pub symbol: Option<String>,
    pub name: Option<String>,

    /// Yield display for bond symbols, e.g. "4.275%".
    pub last: Option<String>,

    /// Clean price display, e.g. "99.5156".
    pub bond_last_price: Option<String>,

    /// Epoch milliseconds, serialized as a string.
    pub last_time_msec: Option<String>,
}

/// Normalize one CNBC response into canonical benchmark quotes.
///
/// A quote missing its symbol or observation time is dropped on its own; a
/// response whose every quote is unusable is malformed.
pub fn normalize(raw: Value) -> Result<Vec<OtrQuote>, SourceError> {
    let envelope: CnbcEnvelope = serde_json::from_value(raw)?;
    let raw_quotes = envelope.result.quotes;
    let total = raw_quotes.len();

    let records: Vec<OtrQuote> = raw_quotes.into_iter().filter_map(normalize_quote).collect();
    if records.is_empty() && total > 0 {
        return Err(SourceError::MalformedResponse(
            "cnbc quotes missing symbol or timestamp".to_string(),
        ));
    }

    Ok(records)
}

fn normalize_quote(quote: CnbcQuote) -> Option<OtrQuote> {
    let symbol = quote.symbol?;
    let ts_ms: i64 = quote.last_time_msec.as_deref()?.parse().ok()?;
    let timestamp = ms_to_utc(ts_ms)?;

    let display_price = quote.bond_last_price.clone();
    Some(OtrQuote {
        standard_name: standard_name(&symbol),
        price: quote.bond_last_price.as_deref().and_then(parse_decimal),
        price_change: 0.0,
        yield_pct: quote.last.as_deref().and_then(parse_decimal),
        yield_change: 0.0,
        timestamp,
        display_price,
    })
}

/// Translate a CNBC bond symbol ("US10Y", "US5YTIP") into the dashboard's
/// benchmark naming ("US 10Y", "US 5Y TIP").
fn standard_name(symbol: &str) -> String {
    match symbol.strip_prefix("US") {
        Some(rest) => match rest.strip_suffix("TIP") {
            Some(tenor) => format!("US {tenor} TIP"),
            None => format!("US {rest}"),
        },
        None => symbol.to_owned(),
    }
}
