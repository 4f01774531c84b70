//! Canonical state store.
//!
//! One tree of per-namespace quote maps plus reference-data and model-result
//! branches. All mutation goes through the `apply_*`/`set_*` transitions
//! below: each takes the write guard, runs a pure merge to completion, and
//! swaps the affected branch, so readers never observe a partially applied
//! batch. Everything handed out is a clone; consumers cannot mutate state.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::quotes::merge::{apply_record, merge_batch, merge_family_batch, MergeOutcome};
use crate::quotes::record::{FuturesQuote, OtrQuote, TickQuote};
use crate::reference::{BondReference, DailyPrice, OtrReference};

/// Vendor namespaces of the treasury benchmark branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    Cnbc,
    Wsj,
    MarketWatch,
    Cme,
}

impl Vendor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Vendor::Cnbc => "cnbc",
            Vendor::Wsj => "wsj",
            Vendor::MarketWatch => "mw",
            Vendor::Cme => "cme",
        }
    }
}

pub type Namespace<R> = HashMap<String, R>;

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub tips_cusips: Vec<String>,
    pub tips_bonds: HashMap<String, BondReference>,
    pub tsy_otr: HashMap<String, OtrReference>,
    pub tips_daily_prices: Vec<DailyPrice>,
}

/// The whole state tree. Namespaces are independent: no cross-namespace
/// ordering is guaranteed and none is needed.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub tsy_otr: HashMap<Vendor, Namespace<OtrQuote>>,
    pub tips_otr: Namespace<OtrQuote>,
    pub futures: HashMap<String, Namespace<FuturesQuote>>,
    pub ticks: Namespace<TickQuote>,
    pub reference: ReferenceData,
    pub models: HashMap<String, Value>,
}

/// Cheap-to-clone handle on the shared state tree.
#[derive(Clone, Default)]
pub struct QuoteStore {
    inner: Arc<RwLock<DashboardState>>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================
    // Merge transitions
    // =========================

    /// Merge a benchmark batch into one treasury vendor namespace.
    pub async fn apply_tsy_otr(&self, vendor: Vendor, records: Vec<OtrQuote>) {
        let mut state = self.inner.write().await;
        let current = state.tsy_otr.entry(vendor).or_default();
        let next = merge_batch(current, records);
        *current = next;
    }

    /// Merge a benchmark batch into the TIPS namespace.
    pub async fn apply_tips_otr(&self, records: Vec<OtrQuote>) {
        let mut state = self.inner.write().await;
        let next = merge_batch(&state.tips_otr, records);
        state.tips_otr = next;
    }

    /// Merge a futures batch under its contract family.
    pub async fn apply_futures(&self, data_name: &str, records: Vec<FuturesQuote>) {
        let mut state = self.inner.write().await;
        let next = merge_family_batch(&state.futures, data_name, records);
        state.futures = next;
    }

    /// Merge one streamed tick into the live-tick namespace.
    pub async fn apply_tick(&self, record: TickQuote) -> MergeOutcome {
        let mut state = self.inner.write().await;
        let mut next = state.ticks.clone();
        let outcome = apply_record(&mut next, record);
        state.ticks = next;
        outcome
    }

    // =========================
    // Reference / model branches (last write wins, no merge)
    // =========================

    pub async fn set_tips_cusips(&self, cusips: Vec<String>) {
        self.inner.write().await.reference.tips_cusips = cusips;
    }

    pub async fn upsert_tips_bond(&self, bond: BondReference) {
        let mut state = self.inner.write().await;
        state.reference.tips_bonds.insert(bond.cusip.clone(), bond);
    }

    pub async fn set_tsy_otr_reference(&self, rows: HashMap<String, OtrReference>) {
        self.inner.write().await.reference.tsy_otr = rows;
    }

    pub async fn set_tips_daily_prices(&self, rows: Vec<DailyPrice>) {
        self.inner.write().await.reference.tips_daily_prices = rows;
    }

    /// Store an opaque model result under its model name.
    pub async fn set_model_result(&self, name: &str, result: Value) {
        let mut state = self.inner.write().await;
        state.models.insert(name.to_owned(), result);
    }

    // =========================
    // Read-only views
    // =========================

    pub async fn snapshot(&self) -> DashboardState {
        self.inner.read().await.clone()
    }

    pub async fn tsy_otr(&self, vendor: Vendor) -> Namespace<OtrQuote> {
        let state = self.inner.read().await;
        state.tsy_otr.get(&vendor).cloned().unwrap_or_default()
    }

    pub async fn tips_otr(&self) -> Namespace<OtrQuote> {
        self.inner.read().await.tips_otr.clone()
    }

    pub async fn futures_family(&self, data_name: &str) -> Namespace<FuturesQuote> {
        let state = self.inner.read().await;
        state.futures.get(data_name).cloned().unwrap_or_default()
    }

    pub async fn tick(&self, symbol: &str) -> Option<TickQuote> {
        self.inner.read().await.ticks.get(symbol).cloned()
    }

    pub async fn reference(&self) -> ReferenceData {
        self.inner.read().await.reference.clone()
    }

    pub async fn model_result(&self, name: &str) -> Option<Value> {
        self.inner.read().await.models.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn otr(name: &str, ts_secs: i64, price: f64) -> OtrQuote {
        OtrQuote {
            standard_name: name.to_string(),
            price: Some(price),
            price_change: 0.0,
            yield_pct: None,
            yield_change: 0.0,
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
            display_price: None,
        }
    }

    fn tick(symbol: &str, ts_secs: i64, price: f64) -> TickQuote {
        TickQuote {
            symbol: symbol.to_string(),
            price: Some(price),
            price_change: 0.0,
            day_volume: None,
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn vendor_namespaces_do_not_overwrite_each_other() {
        let store = QuoteStore::new();

        // Vendor A observes US 10Y at 10:00:00, vendor B at 10:00:05.
        let t0 = Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 8, 6, 10, 0, 5).unwrap();

        store
            .apply_tsy_otr(
                Vendor::Cnbc,
                vec![OtrQuote {
                    timestamp: t0,
                    ..otr("US 10Y", 0, 99.5)
                }],
            )
            .await;
        store
            .apply_tsy_otr(
                Vendor::Wsj,
                vec![OtrQuote {
                    timestamp: t1,
                    ..otr("US 10Y", 0, 99.7)
                }],
            )
            .await;

        let cnbc = store.tsy_otr(Vendor::Cnbc).await;
        let wsj = store.tsy_otr(Vendor::Wsj).await;

        assert_eq!(cnbc["US 10Y"].price, Some(99.5));
        assert_eq!(cnbc["US 10Y"].timestamp, t0);
        assert_eq!(wsj["US 10Y"].price, Some(99.7));
        assert_eq!(wsj["US 10Y"].timestamp, t1);
    }

    #[tokio::test]
    async fn tips_branch_is_independent_of_treasury_branch() {
        let store = QuoteStore::new();

        store.apply_tips_otr(vec![otr("US 10Y TIP", 100, 102.3)]).await;
        store
            .apply_tsy_otr(Vendor::Cnbc, vec![otr("US 10Y", 100, 99.5)])
            .await;

        assert!(store.tips_otr().await.contains_key("US 10Y TIP"));
        assert!(!store.tsy_otr(Vendor::Cnbc).await.contains_key("US 10Y TIP"));
    }

    #[tokio::test]
    async fn tick_merge_applies_the_timestamp_gate_per_frame() {
        let store = QuoteStore::new();

        assert_eq!(store.apply_tick(tick("JPY=X", 100, 147.2)).await, MergeOutcome::Seeded);
        assert_eq!(store.apply_tick(tick("JPY=X", 105, 147.5)).await, MergeOutcome::Accepted);
        assert_eq!(store.apply_tick(tick("JPY=X", 105, 147.5)).await, MergeOutcome::Squelched);
        assert_eq!(store.apply_tick(tick("JPY=X", 90, 140.0)).await, MergeOutcome::Stale);

        let stored = store.tick("JPY=X").await.unwrap();
        assert_eq!(stored.price, Some(147.5));
        assert_eq!(stored.price_change, 0.0);
    }

    #[tokio::test]
    async fn model_results_are_stored_opaquely() {
        let store = QuoteStore::new();
        let payload = serde_json::json!({ "knots": [1.0, 2.0], "converged": true });

        store.set_model_result("cpi_curve", payload.clone()).await;

        assert_eq!(store.model_result("cpi_curve").await, Some(payload));
        assert_eq!(store.model_result("bond_curve").await, None);
    }
}
