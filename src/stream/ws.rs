//! WebSocket transport for the tick stream.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::mpsc::Sender;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::decode::TickDecoder;
use super::{TickStreamApi, TickSubscription};
use crate::quotes::record::TickQuote;

pub struct TickStreamClient {
    ws_url: String,
    decoder: Arc<dyn TickDecoder>,
}

impl TickStreamClient {
    pub fn new(ws_url: String, decoder: Arc<dyn TickDecoder>) -> Self {
        Self { ws_url, decoder }
    }
}

#[async_trait]
impl TickStreamApi for TickStreamClient {
    #[instrument(skip(self, sender, cancel), fields(url = %self.ws_url))]
    async fn stream_ticks(
        &self,
        subscription: TickSubscription,
        sender: Sender<TickQuote>,
        cancel: CancellationToken,
    ) -> anyhow::Result<()> {
        let (ws, _) = connect_async(&self.ws_url).await?;
        info!("tick stream connected");
        let (mut write, mut read) = ws.split();

        let subscribe = json!({ "subscribe": subscription.symbols });
        write.send(Message::Text(subscribe.to_string().into())).await?;

        loop {
            let message = tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = write.send(Message::Close(None)).await;
                    info!("tick stream closed on request");
                    return Ok(());
                }
                message = read.next() => message,
            };

            let Some(message) = message else {
                info!("tick stream ended by server");
                return Ok(());
            };

            let message = match message {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "tick stream transport error");
                    return Err(e.into());
                }
            };

            if message.is_ping() || message.is_pong() {
                continue;
            }

            let frame: Vec<u8> = match message {
                Message::Text(text) => text.as_bytes().to_vec(),
                Message::Binary(bytes) => bytes.to_vec(),
                Message::Close(_) => {
                    info!("tick stream closed by server");
                    return Ok(());
                }
                _ => continue,
            };

            match self.decoder.decode(&frame) {
                Ok(tick) => {
                    if sender.send(tick).await.is_err() {
                        // Receiver gone: the listener is shutting down.
                        return Ok(());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "dropping undecodable tick frame");
                }
            }
        }
    }
}
