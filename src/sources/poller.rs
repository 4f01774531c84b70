//! Generic source poller.
//!
//! One task per source. A cycle runs the fetch/normalize/merge closure to
//! completion (bounded by `fetch_timeout`), and only then re-arms after
//! `every`, so a slow upstream can never pile requests up behind itself.
//! Cycle failures are logged and swallowed; the next cycle proceeds on
//! schedule. The cancellation token is checked before every fetch and before
//! every re-arm, and an in-flight cycle is abandoned at cancellation, so no
//! fetch is ever issued after teardown.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::sources::errors::SourceError;

pub async fn run_source_poller<C, Fut>(
    source_id: String,
    every: Duration,
    fetch_timeout: Duration,
    cancel: CancellationToken,
    mut cycle: C,
) where
    C: FnMut() -> Fut,
    Fut: Future<Output = Result<(), SourceError>>,
{
    info!(
        source = %source_id,
        every_ms = every.as_millis() as u64,
        "source poller started"
    );

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = timeout(fetch_timeout, cycle()) => outcome,
        };

        match outcome {
            Ok(Ok(())) => debug!(source = %source_id, "cycle complete"),
            Ok(Err(e)) => {
                warn!(source = %source_id, error = %e, "cycle failed; retrying next interval")
            }
            Err(_) => warn!(
                source = %source_id,
                timeout_ms = fetch_timeout.as_millis() as u64,
                "cycle timed out; retrying next interval"
            ),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(every) => {}
        }
    }

    info!(source = %source_id, "source poller stopped");
}
