use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A quote record that can participate in the timestamp-gated merge.
///
/// Implementors expose the merge key, the vendor observation time, and the
/// numeric fields the engine derives change values from. `set_changes` is
/// called by the merge engine only; normalizers always emit zeroed change
/// fields.
pub trait MergeRecord: Clone {
    fn key(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
    fn price(&self) -> Option<f64>;
    fn yield_pct(&self) -> Option<f64> {
        None
    }
    fn set_changes(&mut self, price_change: f64, yield_change: f64);
}

/// Canonical on-the-run benchmark quote, one per standard name within a
/// vendor namespace.
///
/// `price_change`/`yield_change` are derived at merge time from the delta
/// against the previously accepted observation; vendors never supply them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtrQuote {
    /// Benchmark identifier, e.g. "US 10Y".
    pub standard_name: String,

    /// Clean price. Absent when the vendor publishes yield only.
    pub price: Option<f64>,
    pub price_change: f64,

    /// Yield to maturity in percent. Absent for price-only vendors.
    pub yield_pct: Option<f64>,
    pub yield_change: f64,

    /// Vendor-supplied observation time.
    pub timestamp: DateTime<Utc>,

    /// Vendor display price (handle-and-32nds text), passed through untouched.
    pub display_price: Option<String>,
}

impl MergeRecord for OtrQuote {
    fn key(&self) -> &str {
        &self.standard_name
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn price(&self) -> Option<f64> {
        self.price
    }

    fn yield_pct(&self) -> Option<f64> {
        self.yield_pct
    }

    fn set_changes(&mut self, price_change: f64, yield_change: f64) {
        self.price_change = price_change;
        self.yield_change = yield_change;
    }
}

/// Canonical futures contract quote, keyed by ticker within its contract
/// family.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturesQuote {
    /// Contract code, e.g. "ZNU6".
    pub ticker: String,

    /// Contract month display, e.g. "SEP 2026".
    pub month: String,
    pub product_name: String,

    /// Last traded price; absent off-hours (vendor sentinel).
    pub last: Option<f64>,

    /// Working price for the row: last trade, falling back to prior settle
    /// when the contract has not traded yet.
    pub price: Option<f64>,
    pub prior_settle: Option<f64>,
    pub price_change: f64,

    pub volume: Option<u64>,
    pub expiration_date: Option<NaiveDate>,
    pub timestamp: DateTime<Utc>,
}

impl MergeRecord for FuturesQuote {
    fn key(&self) -> &str {
        &self.ticker
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn price(&self) -> Option<f64> {
        self.price
    }

    fn set_changes(&mut self, price_change: f64, _yield_change: f64) {
        self.price_change = price_change;
    }
}

/// One streamed tick, keyed by instrument symbol in the live-tick namespace.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickQuote {
    pub symbol: String,
    pub price: Option<f64>,
    pub price_change: f64,
    pub day_volume: Option<u64>,
    pub timestamp: DateTime<Utc>,
}

impl MergeRecord for TickQuote {
    fn key(&self) -> &str {
        &self.symbol
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn price(&self) -> Option<f64> {
        self.price
    }

    fn set_changes(&mut self, price_change: f64, _yield_change: f64) {
        self.price_change = price_change;
    }
}
