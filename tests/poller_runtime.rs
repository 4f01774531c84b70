use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use ratesdash::sources::errors::SourceError;
use ratesdash::sources::poller::run_source_poller;

#[tokio::test(start_paused = true)]
async fn rearm_waits_for_cycle_completion() {
    let starts: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let origin = tokio::time::Instant::now();
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_source_poller(
        "slow-vendor".to_string(),
        Duration::from_secs(5),
        Duration::from_secs(60),
        cancel.clone(),
        {
            let starts = starts.clone();
            move || {
                let starts = starts.clone();
                async move {
                    starts.lock().unwrap().push(origin.elapsed().as_secs());
                    // The fetch itself takes 3s.
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    Ok::<(), SourceError>(())
                }
            }
        },
    ));

    tokio::time::sleep(Duration::from_secs(20)).await;
    cancel.cancel();
    let _ = task.await;

    // 3s cycle + 5s interval: fetches start at 0, 8 and 16, never at 5.
    // The interval counts from completion, so a slow vendor cannot make
    // requests pile up behind each other.
    let starts = starts.lock().unwrap().clone();
    assert_eq!(starts, vec![0, 8, 16]);
}

#[tokio::test(start_paused = true)]
async fn hung_source_does_not_stall_other_pollers() {
    let healthy_calls = Arc::new(AtomicU32::new(0));
    let hung_calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();

    // This vendor hangs indefinitely; only its own cycle timeout (far in
    // the future here) would free it.
    let hung = tokio::spawn(run_source_poller(
        "hung-vendor".to_string(),
        Duration::from_secs(1),
        Duration::from_secs(3_600),
        cancel.clone(),
        {
            let hung_calls = hung_calls.clone();
            move || {
                let hung_calls = hung_calls.clone();
                async move {
                    hung_calls.fetch_add(1, Ordering::SeqCst);
                    std::future::pending::<()>().await;
                    Ok::<(), SourceError>(())
                }
            }
        },
    ));

    let healthy = tokio::spawn(run_source_poller(
        "healthy-vendor".to_string(),
        Duration::from_secs(1),
        Duration::from_secs(30),
        cancel.clone(),
        {
            let healthy_calls = healthy_calls.clone();
            move || {
                let healthy_calls = healthy_calls.clone();
                async move {
                    healthy_calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), SourceError>(())
                }
            }
        },
    ));

    tokio::time::sleep(Duration::from_secs(10)).await;
    cancel.cancel();
    let _ = hung.await;
    let _ = healthy.await;

    // The healthy poller kept its one-second cadence while the hung vendor
    // never got past its first fetch.
    assert!(healthy_calls.load(Ordering::SeqCst) >= 10);
    assert_eq!(hung_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cycle_timeout_frees_a_hung_fetch() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_source_poller(
        "flaky-vendor".to_string(),
        Duration::from_secs(2),
        Duration::from_secs(3),
        cancel.clone(),
        {
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move {
                    // The first fetch hangs; later fetches return promptly.
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        std::future::pending::<()>().await;
                    }
                    Ok::<(), SourceError>(())
                }
            }
        },
    ));

    tokio::time::sleep(Duration::from_secs(12)).await;
    cancel.cancel();
    let _ = task.await;

    // Timeout at 3s, re-arm at 5, then the normal cadence resumes:
    // fetches at 0(hangs), 5, 7, 9, 11.
    assert_eq!(calls.load(Ordering::SeqCst), 5);
}

#[tokio::test(start_paused = true)]
async fn failures_are_swallowed_and_polling_continues() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_source_poller(
        "erroring-vendor".to_string(),
        Duration::from_secs(1),
        Duration::from_secs(30),
        cancel.clone(),
        {
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), SourceError>(SourceError::MalformedResponse(
                        "vendor sent garbage".to_string(),
                    ))
                }
            }
        },
    ));

    tokio::time::sleep(Duration::from_secs(5)).await;
    cancel.cancel();
    let _ = task.await;

    // No backoff, no circuit breaker: the failing source just retries on
    // its natural cadence.
    assert!(calls.load(Ordering::SeqCst) >= 5);
}

#[tokio::test(start_paused = true)]
async fn cancelled_poller_never_fetches_again() {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run_source_poller(
        "doomed-vendor".to_string(),
        Duration::from_secs(1),
        Duration::from_secs(60),
        cancel.clone(),
        {
            let calls = calls.clone();
            move || {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok::<(), SourceError>(())
                }
            }
        },
    ));

    // Tear down while the first cycle is still in flight.
    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    let _ = task.await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
