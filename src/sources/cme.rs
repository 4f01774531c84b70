//! CME quote feeds.
//!
//! Two shapes share this module: the delayed futures quote feed (one feed
//! per contract family) and the BrokerTec benchmark treasury price feed.
//! Both use the "-" placeholder for fields with no value off-hours and
//! comma-grouped volume strings; observation times are epoch milliseconds.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::quotes::record::{FuturesQuote, OtrQuote};
use crate::sources::errors::SourceError;
use crate::sources::{parse_decimal, parse_volume};
use crate::time::ms_to_utc;

#[derive(Debug, Deserialize)]
pub struct CmeEnvelope {
    #[serde(default)]
    pub quotes: Vec<CmeQuote>,
    #[serde(rename = "tradeDate")]
    pub trade_date: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CmeQuote {
    /// Contract code for futures ("ZNU6") or benchmark code for treasuries
    /// ("UST10Y").
    pub quote_code: Option<String>,

    pub product_name: Option<String>,
    pub expiration_month: Option<String>,

    /// Price displays, "-" when the contract has not traded.
    pub last: Option<String>,
    pub prior_settle: Option<String>,

    /// Comma-grouped contract volume.
    pub volume: Option<String>,

    /// "YYYYMMDD".
    pub expiration_date: Option<String>,

    /// Epoch milliseconds.
    pub last_updated: Option<i64>,
}

/// Normalize one futures feed response into canonical contract quotes.
pub fn normalize_futures(raw: Value) -> Result<Vec<FuturesQuote>, SourceError> {
    let envelope: CmeEnvelope = serde_json::from_value(raw)?;
    let raw_quotes = envelope.quotes;
    let total = raw_quotes.len();

    let records: Vec<FuturesQuote> = raw_quotes.into_iter().filter_map(normalize_contract).collect();
    if records.is_empty() && total > 0 {
        return Err(SourceError::MalformedResponse(
            "cme futures quotes missing code or update time".to_string(),
        ));
    }

    Ok(records)
}

fn normalize_contract(quote: CmeQuote) -> Option<FuturesQuote> {
    let ticker = quote.quote_code?;
    let timestamp = ms_to_utc(quote.last_updated?)?;

    let last = quote.last.as_deref().and_then(parse_decimal);
    let prior_settle = quote.prior_settle.as_deref().and_then(parse_decimal);

    Some(FuturesQuote {
        ticker,
        month: quote.expiration_month.unwrap_or_default(),
        product_name: quote.product_name.unwrap_or_default(),
        last,
        // The row's working price: last trade, else the prior settle.
        price: last.or(prior_settle),
        prior_settle,
        price_change: 0.0,
        volume: quote.volume.as_deref().and_then(parse_volume),
        expiration_date: quote
            .expiration_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y%m%d").ok()),
        timestamp,
    })
}

/// Normalize the BrokerTec benchmark price feed. CME quotes treasuries on
/// price only; yields stay absent and the yield change stays zero downstream.
pub fn normalize_otr(raw: Value) -> Result<Vec<OtrQuote>, SourceError> {
    let envelope: CmeEnvelope = serde_json::from_value(raw)?;
    let raw_quotes = envelope.quotes;
    let total = raw_quotes.len();

    let records: Vec<OtrQuote> = raw_quotes.into_iter().filter_map(normalize_benchmark).collect();
    if records.is_empty() && total > 0 {
        return Err(SourceError::MalformedResponse(
            "cme benchmark quotes missing code or update time".to_string(),
        ));
    }

    Ok(records)
}

fn normalize_benchmark(quote: CmeQuote) -> Option<OtrQuote> {
    let code = quote.quote_code?;
    let standard_name = benchmark_standard_name(&code)?;
    let timestamp = ms_to_utc(quote.last_updated?)?;

    let display_price = quote.last.clone();
    Some(OtrQuote {
        standard_name,
        price: quote.last.as_deref().and_then(parse_decimal),
        price_change: 0.0,
        yield_pct: None,
        yield_change: 0.0,
        timestamp,
        display_price,
    })
}

/// "UST10Y" -> "US 10Y".
fn benchmark_standard_name(code: &str) -> Option<String> {
    let tenor = code.strip_prefix("UST")?;
    let tenor = tenor.trim_start_matches('0');
    if tenor.is_empty() {
        return None;
    }
    Some(format!("US {tenor}"))
}
