//! Static reference data: the TIPS cusip universe, per-cusip bond terms,
//! treasury benchmark terms, and the TIPS daily price snapshot.
//!
//! Reference data is fetched once at startup (no poller). The cusip list is
//! fetched first; per-cusip term fetches then fan out unordered, and one
//! cusip failing leaves every other cusip's terms intact.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::logger::warn_if_slow;
use crate::sources::client::DataClient;
use crate::sources::errors::SourceError;
use crate::store::QuoteStore;

/// Terms of one TIPS issue, keyed by cusip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondReference {
    pub cusip: String,
    pub standard_name: String,
    pub maturity_date: NaiveDate,
    pub coupon: f64,
}

/// Terms of one on-the-run treasury benchmark.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtrReference {
    pub standard_name: String,
    pub maturity_date: NaiveDate,
    pub coupon: f64,
}

/// One row of the TIPS daily price snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyPrice {
    pub cusip: String,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
struct CusipsEnvelope {
    cusips: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BondReferenceEnvelope {
    #[serde(rename = "referenceData")]
    reference_data: BondReference,
}

#[derive(Debug, Deserialize)]
struct OtrReferenceEnvelope {
    otr: HashMap<String, OtrReference>,
}

#[derive(Debug, Deserialize)]
struct DailyPricesEnvelope {
    #[serde(rename = "priceData")]
    price_data: Vec<DailyPrice>,
}

async fn fetch_tips_cusips(client: &DataClient, base: &str) -> Result<Vec<String>, SourceError> {
    let envelope: CusipsEnvelope = client.get_json(&format!("{base}/tips_cusips")).await?;
    Ok(envelope.cusips)
}

async fn fetch_tips_bond(
    client: &DataClient,
    base: &str,
    cusip: &str,
) -> Result<BondReference, SourceError> {
    let envelope: BondReferenceEnvelope = client
        .get_json(&format!("{base}/tips_reference_data/{cusip}"))
        .await?;
    Ok(envelope.reference_data)
}

async fn fetch_tsy_otr_reference(
    client: &DataClient,
    base: &str,
) -> Result<HashMap<String, OtrReference>, SourceError> {
    let envelope: OtrReferenceEnvelope =
        client.get_json(&format!("{base}/tsy_reference_data")).await?;
    Ok(envelope.otr)
}

async fn fetch_tips_daily_prices(
    client: &DataClient,
    base: &str,
) -> Result<Vec<DailyPrice>, SourceError> {
    let envelope: DailyPricesEnvelope = client.get_json(&format!("{base}/tips_prices")).await?;
    Ok(envelope.price_data)
}

/// One-shot startup fan-out. Every failure is contained to its own fetch;
/// the rest of the bootstrap proceeds.
#[instrument(skip(client, store), fields(base = %base))]
pub async fn run_reference_bootstrap(client: DataClient, base: String, store: QuoteStore) {
    match fetch_tips_cusips(&client, &base).await {
        Ok(cusips) => {
            info!(count = cusips.len(), "tips cusip universe loaded");
            store.set_tips_cusips(cusips.clone()).await;

            let fan_out = async {
                let mut fetches = FuturesUnordered::new();
                for cusip in cusips {
                    let client = client.clone();
                    let base = base.clone();
                    fetches.push(async move {
                        let result = fetch_tips_bond(&client, &base, &cusip).await;
                        (cusip, result)
                    });
                }

                while let Some((cusip, result)) = fetches.next().await {
                    match result {
                        Ok(bond) => store.upsert_tips_bond(bond).await,
                        Err(e) => warn!(%cusip, error = %e, "tips reference fetch failed"),
                    }
                }
            };
            warn_if_slow("tips_reference_fan_out", Duration::from_secs(30), fan_out).await;
        }
        Err(e) => warn!(error = %e, "tips cusip list fetch failed"),
    }

    match fetch_tsy_otr_reference(&client, &base).await {
        Ok(rows) => store.set_tsy_otr_reference(rows).await,
        Err(e) => warn!(error = %e, "treasury reference fetch failed"),
    }

    match fetch_tips_daily_prices(&client, &base).await {
        Ok(rows) => {
            info!(rows = rows.len(), "tips daily price snapshot loaded");
            store.set_tips_daily_prices(rows).await;
        }
        Err(e) => warn!(error = %e, "tips daily price fetch failed"),
    }

    info!("reference bootstrap complete");
}
