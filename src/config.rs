#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL of the reference/model backend (cusip list, per-cusip bond
    /// terms, TIPS daily prices, curve builds).
    pub backend_endpoint: String,

    // =========================
    // Vendor quote endpoints
    // =========================
    /// CNBC benchmark treasury quote endpoint.
    pub cnbc_tsy_endpoint: String,

    /// CNBC benchmark TIPS quote endpoint.
    pub cnbc_tips_endpoint: String,

    /// WSJ benchmark treasury quote endpoint.
    pub wsj_endpoint: String,

    /// MarketWatch benchmark treasury quote endpoint.
    pub marketwatch_endpoint: String,

    /// CME BrokerTec benchmark treasury price endpoint.
    pub cme_otr_endpoint: String,

    /// Base URL for CME futures quote feeds; the contract family's data
    /// name is appended per poller.
    pub cme_futures_endpoint: String,

    /// Streaming quote websocket.
    pub tick_ws_url: String,

    // =========================
    // Polling configuration
    // =========================
    /// CME contract families polled for futures quotes. Each entry is a
    /// feed's data name and becomes the outer key of the futures branch.
    pub futures_feeds: Vec<String>,

    /// Symbols subscribed on the tick stream.
    pub tick_symbols: Vec<String>,

    /// Benchmark quote cadence, applied per vendor poller.
    ///
    /// Each vendor runs its own poller; a slow vendor delays only its own
    /// next cycle, never another vendor's.
    pub otr_poll_ms: u64,

    /// Futures quote cadence, applied per contract-family poller.
    pub futures_poll_ms: u64,

    /// TIPS benchmark quote cadence.
    pub tips_poll_ms: u64,

    /// Upper bound on one fetch cycle.
    ///
    /// A hung upstream costs one cycle, not the poller: the next cycle is
    /// scheduled only after the previous one resolves or times out.
    pub fetch_timeout_ms: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let backend_endpoint = std::env::var("BACKEND_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:5000".to_string());
        let tick_ws_url = std::env::var("TICK_WS_URL")
            .unwrap_or_else(|_| "wss://streamer.finance.yahoo.com".to_string());

        Self {
            cnbc_tsy_endpoint: format!("{backend_endpoint}/data/CNBC US Treasury Yields (intraday)"),
            cnbc_tips_endpoint: format!("{backend_endpoint}/data/CNBC US TIPS Yields (intraday)"),
            wsj_endpoint: format!("{backend_endpoint}/data/WSJ US Treasury Yields (intraday)"),
            marketwatch_endpoint: format!(
                "{backend_endpoint}/data/MarketWatch US Treasury Yields (intraday)"
            ),
            cme_otr_endpoint: format!("{backend_endpoint}/data/CME US Treasury Prices (intraday)"),
            cme_futures_endpoint: format!("{backend_endpoint}/data"),
            backend_endpoint,
            tick_ws_url,

            futures_feeds: [
                "CME 2Y UST Futures (intraday)",
                "CME 3Y UST Futures (intraday)",
                "CME 5Y UST Futures (intraday)",
                "CME 10Y UST Futures (intraday)",
                "CME 20Y UST Futures (intraday)",
                "CME 30Y UST Futures (intraday)",
                "CME Ultra-10Y UST Futures (intraday)",
                "CME Ultra-30Y UST Futures (intraday)",
                "CME 3M SOFR Futures (intraday)",
                "CME 1M SOFR Futures (intraday)",
                "CME 30D FF Futures (intraday)",
            ]
            .into_iter()
            .map(String::from)
            .collect(),

            tick_symbols: vec!["JPY=X".to_string(), "BTC-USD".to_string()],

            // Polling defaults:
            // - benchmarks refresh fast enough for an intraday monitor
            // - futures feeds are heavier payloads, polled a bit slower
            otr_poll_ms: 10_000,
            futures_poll_ms: 15_000,
            tips_poll_ms: 30_000,
            fetch_timeout_ms: 5_000,
        }
    }
}
