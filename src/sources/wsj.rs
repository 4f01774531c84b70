//! WSJ market-data feed.
//!
//! Instruments arrive nested under `data.instruments`; prices and yields are
//! already numeric and observation times are ISO-8601.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::quotes::record::OtrQuote;
use crate::sources::errors::SourceError;
use crate::sources::tenor_standard_name;

#[derive(Debug, Deserialize)]
pub struct WsjEnvelope {
    pub data: WsjData,
}

#[derive(Debug, Deserialize)]
pub struct WsjData {
    #[serde(default)]
    pub instruments: Vec<WsjInstrument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsjInstrument {
    /// Dow Jones ticker, e.g. "TMUBMUSD10Y".
    pub ticker: Option<String>,
    pub common_name: Option<String>,
    pub bond: Option<WsjBond>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WsjBond {
    pub trade_price: Option<f64>,
    pub formatted_trade_price: Option<String>,
    pub yield_percent: Option<f64>,
}

pub fn normalize(raw: Value) -> Result<Vec<OtrQuote>, SourceError> {
    let envelope: WsjEnvelope = serde_json::from_value(raw)?;
    let instruments = envelope.data.instruments;
    let total = instruments.len();

    let records: Vec<OtrQuote> = instruments.into_iter().filter_map(normalize_instrument).collect();
    if records.is_empty() && total > 0 {
        return Err(SourceError::MalformedResponse(
            "wsj instruments missing ticker or timestamp".to_string(),
        ));
    }

    Ok(records)
}

fn normalize_instrument(instrument: WsjInstrument) -> Option<OtrQuote> {
    let ticker = instrument.ticker?;
    let standard_name = tenor_standard_name(&ticker)?;
    let timestamp = instrument.timestamp?;
    let bond = instrument.bond;

    Some(OtrQuote {
        standard_name,
        price: bond.as_ref().and_then(|b| b.trade_price),
        price_change: 0.0,
        yield_pct: bond.as_ref().and_then(|b| b.yield_percent),
        yield_change: 0.0,
        timestamp,
        display_price: bond.and_then(|b| b.formatted_trade_price),
    })
}
