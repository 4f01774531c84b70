//! Live tick stream: one persistent subscription feeding the live-tick
//! namespace through the same merge gate as the polled sources, one frame at
//! a time and strictly in arrival order.

pub mod decode;
pub mod ws;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, Sender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::quotes::merge::MergeOutcome;
use crate::quotes::record::TickQuote;
use crate::store::QuoteStore;

/// Instrument set requested once on connect.
#[derive(Debug, Clone)]
pub struct TickSubscription {
    pub symbols: Vec<String>,
}

/// Transport seam for the live tick feed.
#[async_trait]
pub trait TickStreamApi: Send + Sync {
    /// Stream decoded ticks into `sender` until the connection ends or
    /// `cancel` fires. A failure decoding a single frame must not end the
    /// stream; a transport failure may.
    async fn stream_ticks(
        &self,
        subscription: TickSubscription,
        sender: Sender<TickQuote>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()>;
}

/// Owns the stream task and the merge task for the live-tick namespace.
///
/// There is no reconnect here: if the connection dies, the namespace stops
/// updating and the tasks wind down. `close` releases the connection
/// deterministically.
pub struct TickListener {
    cancel: CancellationToken,
    stream_task: JoinHandle<()>,
    merge_task: JoinHandle<()>,
}

impl TickListener {
    pub fn start<A: TickStreamApi + 'static>(
        api: Arc<A>,
        subscription: TickSubscription,
        store: QuoteStore,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<TickQuote>(64);

        let stream_cancel = cancel.clone();
        let stream_task = tokio::spawn(async move {
            if let Err(e) = api.stream_ticks(subscription, tx, stream_cancel).await {
                warn!(error = %e, "tick stream ended with error");
            }
        });

        let merge_task = tokio::spawn(async move {
            while let Some(tick) = rx.recv().await {
                let symbol = tick.symbol.clone();
                if store.apply_tick(tick).await == MergeOutcome::Stale {
                    debug!(%symbol, "stale tick discarded");
                }
            }
            info!("tick merge loop drained");
        });

        Self {
            cancel,
            stream_task,
            merge_task,
        }
    }

    /// Close the connection and release both tasks.
    pub async fn close(self) {
        self.cancel.cancel();
        let _ = self.stream_task.await;
        let _ = self.merge_task.await;
    }
}
