//! MarketWatch quote feed.
//!
//! Responses carry instrument matches with typed value objects
//! (`{"Value": 4.275}`); observation times sit under composite trading.
//! Tickers share the Dow Jones scheme with WSJ.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::quotes::record::OtrQuote;
use crate::sources::errors::SourceError;
use crate::sources::tenor_standard_name;

#[derive(Debug, Deserialize)]
pub struct MwEnvelope {
    #[serde(rename = "InstrumentResponses", default)]
    pub responses: Vec<MwInstrumentResponse>,
}

#[derive(Debug, Deserialize)]
pub struct MwInstrumentResponse {
    #[serde(rename = "Matches", default)]
    pub matches: Vec<MwMatch>,
}

#[derive(Debug, Deserialize)]
pub struct MwMatch {
    #[serde(rename = "Instrument")]
    pub instrument: Option<MwInstrument>,
    #[serde(rename = "BondSpecific")]
    pub bond_specific: Option<MwBondSpecific>,
    #[serde(rename = "CompositeTrading")]
    pub composite_trading: Option<MwCompositeTrading>,
}

#[derive(Debug, Deserialize)]
pub struct MwInstrument {
    #[serde(rename = "Ticker")]
    pub ticker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MwBondSpecific {
    #[serde(rename = "Yield")]
    pub yield_value: Option<MwValue>,
    #[serde(rename = "TradePrice")]
    pub trade_price: Option<MwValue>,
}

#[derive(Debug, Deserialize)]
pub struct MwValue {
    #[serde(rename = "Value")]
    pub value: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MwCompositeTrading {
    #[serde(rename = "Last")]
    pub last: Option<MwLast>,
}

#[derive(Debug, Deserialize)]
pub struct MwLast {
    #[serde(rename = "Time")]
    pub time: Option<DateTime<Utc>>,
}

pub fn normalize(raw: Value) -> Result<Vec<OtrQuote>, SourceError> {
    let envelope: MwEnvelope = serde_json::from_value(raw)?;
    let matches: Vec<MwMatch> = envelope
        .responses
        .into_iter()
        .flat_map(|response| response.matches)
        .collect();
    let total = matches.len();

    let records: Vec<OtrQuote> = matches.into_iter().filter_map(normalize_match).collect();
    if records.is_empty() && total > 0 {
        return Err(SourceError::MalformedResponse(
            "marketwatch matches missing ticker or time".to_string(),
        ));
    }

    Ok(records)
}

fn normalize_match(m: MwMatch) -> Option<OtrQuote> {
    let ticker = m.instrument?.ticker?;
    let standard_name = tenor_standard_name(&ticker)?;
    let timestamp = m.composite_trading?.last?.time?;

    let (price, yield_pct) = match m.bond_specific {
        Some(bond) => (
            bond.trade_price.and_then(|v| v.value),
            bond.yield_value.and_then(|v| v.value),
        ),
        None => (None, None),
    };

    Some(OtrQuote {
        standard_name,
        price,
        price_change: 0.0,
        yield_pct,
        yield_change: 0.0,
        timestamp,
        display_price: None,
    })
}
