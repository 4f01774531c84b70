//! Opaque model-result forwarding.
//!
//! Build requests and results belong to the curve backend; this layer posts
//! the request untouched and stores the response untouched under the model
//! name. Nothing here inspects either payload.

use serde_json::Value;
use tracing::info;

use crate::sources::client::DataClient;
use crate::sources::errors::SourceError;
use crate::store::QuoteStore;

pub async fn forward_build_request(
    client: &DataClient,
    store: &QuoteStore,
    url: &str,
    model_name: &str,
    request: Value,
) -> Result<(), SourceError> {
    let result: Value = client.post_json(url, &request).await?;
    store.set_model_result(model_name, result).await;
    info!(model = model_name, "model result stored");
    Ok(())
}
