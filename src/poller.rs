//! Live-stats poller.
//!
//! Fetches the `/stats` snapshot immediately, then on a fixed interval, and
//! delivers it to the subscriber only when it differs (full structural
//! equality) from the last delivered one. Fetch failures are logged and
//! skipped; the next tick is the retry. Teardown is guaranteed: the handle
//! joins the worker on `Drop`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ComplianceApi;
use crate::models::StatsSnapshot;

/// Sleep granularity for responsive shutdown.
const SLEEP_GRANULARITY: Duration = Duration::from_millis(100);

/// Handle for the polling thread.
///
/// Supports explicit `shutdown()` or automatic teardown on `Drop` — keep it
/// alive for as long as the subscriber should receive updates.
pub struct StatsPollerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl StatsPollerHandle {
    /// Request shutdown. The current fetch (if in flight) completes, but no
    /// further callbacks fire after the worker observes the flag.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl Drop for StatsPollerHandle {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

/// Start polling on a background thread.
pub fn start<F>(
    api: Arc<dyn ComplianceApi>,
    interval: Duration,
    on_change: F,
) -> StatsPollerHandle
where
    F: Fn(StatsSnapshot) + Send + 'static,
{
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    let handle = std::thread::spawn(move || {
        tracing::info!(interval_secs = interval.as_secs(), "Stats poller started");
        poll_loop(api.as_ref(), interval, &flag, &on_change);
        tracing::info!("Stats poller stopped");
    });

    StatsPollerHandle {
        shutdown,
        handle: Some(handle),
    }
}

fn poll_loop(
    api: &dyn ComplianceApi,
    interval: Duration,
    shutdown: &AtomicBool,
    on_change: &dyn Fn(StatsSnapshot),
) {
    let mut last_delivered: Option<StatsSnapshot> = None;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        match api.fetch_stats() {
            Ok(snapshot) => {
                if last_delivered.as_ref() != Some(&snapshot) {
                    on_change(snapshot.clone());
                    last_delivered = Some(snapshot);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stats fetch failed, retrying on next tick");
            }
        }

        // Sleep in small increments for responsive shutdown.
        let mut slept = Duration::ZERO;
        while slept < interval {
            if shutdown.load(Ordering::Relaxed) {
                return;
            }
            let step = SLEEP_GRANULARITY.min(interval - slept);
            std::thread::sleep(step);
            slept += step;
        }
    }
}
