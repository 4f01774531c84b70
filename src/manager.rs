//! Startup/shutdown orchestration.
//!
//! Wires every configured source poller, the tick listener, and the
//! reference bootstrap onto one store instance. The manager owns the
//! cancellation token; teardown cancels it, then awaits every task, so no
//! fetch or merge survives the manager.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::quotes::record::OtrQuote;
use crate::reference::run_reference_bootstrap;
use crate::sources::client::DataClient;
use crate::sources::errors::SourceError;
use crate::sources::poller::run_source_poller;
use crate::sources::{cme, cnbc, marketwatch, wsj};
use crate::store::{QuoteStore, Vendor};
use crate::stream::decode::{PricingFrameDecoder, TickDecoder};
use crate::stream::ws::TickStreamClient;
use crate::stream::{TickListener, TickSubscription};

type OtrNormalizer = fn(Value) -> Result<Vec<OtrQuote>, SourceError>;

/// Which store branch a benchmark poller feeds.
#[derive(Clone, Copy)]
enum OtrTarget {
    Tsy(Vendor),
    Tips,
}

pub struct MarketDataManager {
    store: QuoteStore,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    listener: TickListener,
}

impl MarketDataManager {
    /// Start every configured source against a fresh store.
    pub fn start(cfg: &AppConfig) -> Result<Self, AppError> {
        let store = QuoteStore::new();
        let cancel = CancellationToken::new();
        let fetch_timeout = Duration::from_millis(cfg.fetch_timeout_ms);
        let client = DataClient::new(fetch_timeout)?;

        let mut tasks = Vec::new();
        let otr_every = Duration::from_millis(cfg.otr_poll_ms);
        let tips_every = Duration::from_millis(cfg.tips_poll_ms);

        // Benchmark treasury quotes, one independent poller per vendor.
        let benchmark_feeds: [(&str, &str, OtrNormalizer, OtrTarget, Duration); 5] = [
            (
                "tsy-otr-cnbc",
                cfg.cnbc_tsy_endpoint.as_str(),
                cnbc::normalize,
                OtrTarget::Tsy(Vendor::Cnbc),
                otr_every,
            ),
            (
                "tsy-otr-wsj",
                cfg.wsj_endpoint.as_str(),
                wsj::normalize,
                OtrTarget::Tsy(Vendor::Wsj),
                otr_every,
            ),
            (
                "tsy-otr-mw",
                cfg.marketwatch_endpoint.as_str(),
                marketwatch::normalize,
                OtrTarget::Tsy(Vendor::MarketWatch),
                otr_every,
            ),
            (
                "tsy-otr-cme",
                cfg.cme_otr_endpoint.as_str(),
                cme::normalize_otr,
                OtrTarget::Tsy(Vendor::Cme),
                otr_every,
            ),
            (
                "tips-otr-cnbc",
                cfg.cnbc_tips_endpoint.as_str(),
                cnbc::normalize,
                OtrTarget::Tips,
                tips_every,
            ),
        ];

        for (source_id, url, normalize, target, every) in benchmark_feeds {
            spawn_otr_poller(
                &mut tasks,
                client.clone(),
                store.clone(),
                cancel.child_token(),
                source_id.to_string(),
                url.to_string(),
                every,
                fetch_timeout,
                normalize,
                target,
            );
        }

        // Futures quotes, one independent poller per contract family.
        let futures_every = Duration::from_millis(cfg.futures_poll_ms);
        for feed in &cfg.futures_feeds {
            spawn_futures_poller(
                &mut tasks,
                client.clone(),
                store.clone(),
                cancel.child_token(),
                feed.clone(),
                format!("{}/{}", cfg.cme_futures_endpoint, feed),
                futures_every,
                fetch_timeout,
            );
        }

        // Reference data is a one-shot fan-out, not a poller.
        tasks.push(tokio::spawn(run_reference_bootstrap(
            client.clone(),
            cfg.backend_endpoint.clone(),
            store.clone(),
        )));

        let decoder: Arc<dyn TickDecoder> = Arc::new(PricingFrameDecoder);
        let stream_client = Arc::new(TickStreamClient::new(cfg.tick_ws_url.clone(), decoder));
        let listener = TickListener::start(
            stream_client,
            TickSubscription {
                symbols: cfg.tick_symbols.clone(),
            },
            store.clone(),
            cancel.child_token(),
        );

        info!(
            pollers = tasks.len(),
            tick_symbols = cfg.tick_symbols.len(),
            "market data manager started"
        );

        Ok(Self {
            store,
            cancel,
            tasks,
            listener,
        })
    }

    /// Read-only handle for consumers (renderers, curve requests).
    pub fn store(&self) -> &QuoteStore {
        &self.store
    }

    /// Stop every poller and close the tick listener. Pending timers are
    /// cancelled; an in-flight fetch is abandoned and cannot re-arm.
    pub async fn shutdown(self) {
        info!("stopping market data manager");
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
        self.listener.close().await;
        info!("market data manager stopped");
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_otr_poller(
    tasks: &mut Vec<JoinHandle<()>>,
    client: DataClient,
    store: QuoteStore,
    cancel: CancellationToken,
    source_id: String,
    url: String,
    every: Duration,
    fetch_timeout: Duration,
    normalize: OtrNormalizer,
    target: OtrTarget,
) {
    tasks.push(tokio::spawn(run_source_poller(
        source_id,
        every,
        fetch_timeout,
        cancel,
        move || {
            let client = client.clone();
            let store = store.clone();
            let url = url.clone();
            async move {
                let raw: Value = client.get_json(&url).await?;
                let records = normalize(raw)?;
                match target {
                    OtrTarget::Tsy(vendor) => store.apply_tsy_otr(vendor, records).await,
                    OtrTarget::Tips => store.apply_tips_otr(records).await,
                }
                Ok(())
            }
        },
    )));
}

#[allow(clippy::too_many_arguments)]
fn spawn_futures_poller(
    tasks: &mut Vec<JoinHandle<()>>,
    client: DataClient,
    store: QuoteStore,
    cancel: CancellationToken,
    data_name: String,
    url: String,
    every: Duration,
    fetch_timeout: Duration,
) {
    let source_id = format!("futures:{data_name}");
    tasks.push(tokio::spawn(run_source_poller(
        source_id,
        every,
        fetch_timeout,
        cancel,
        move || {
            let client = client.clone();
            let store = store.clone();
            let url = url.clone();
            let data_name = data_name.clone();
            async move {
                let raw: Value = client.get_json(&url).await?;
                let records = cme::normalize_futures(raw)?;
                store.apply_futures(&data_name, records).await;
                Ok(())
            }
        },
    )));
}
