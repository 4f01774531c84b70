//! Tick frame decoding collaborator.
//!
//! The wire carries base64-wrapped pricing messages. Format internals stay
//! behind `TickDecoder`, so the listener never depends on them and a format
//! change swaps one implementation.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use thiserror::Error;

use crate::quotes::record::TickQuote;
use crate::time::ms_to_utc;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("frame is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("pricing message malformed: {0}")]
    Malformed(String),
}

pub trait TickDecoder: Send + Sync {
    /// Decode one inbound frame into exactly one canonical tick. The result
    /// must carry at least the instrument key and the observation time.
    fn decode(&self, frame: &[u8]) -> Result<TickQuote, DecodeError>;
}

/// Default decoder: unwrap base64, parse the inner JSON pricing message.
#[derive(Debug, Default, Clone)]
pub struct PricingFrameDecoder;

#[derive(Debug, Deserialize)]
struct PricingMessage {
    id: String,
    price: Option<f64>,
    /// Epoch milliseconds.
    time: i64,
    #[serde(rename = "dayVolume")]
    day_volume: Option<u64>,
}

impl TickDecoder for PricingFrameDecoder {
    fn decode(&self, frame: &[u8]) -> Result<TickQuote, DecodeError> {
        let bytes = BASE64.decode(frame)?;
        let message: PricingMessage =
            serde_json::from_slice(&bytes).map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let timestamp = ms_to_utc(message.time)
            .ok_or_else(|| DecodeError::Malformed(format!("bad time {}", message.time)))?;

        Ok(TickQuote {
            symbol: message.id,
            price: message.price,
            price_change: 0.0,
            day_volume: message.day_volume,
            timestamp,
        })
    }
}
