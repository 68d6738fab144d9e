//! Fixed-delay background jobs.
//!
//! The next delay starts only after the previous run has finished, so a slow
//! run (a large pool refill, say) never overlaps the next one.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Run `job` on the blocking pool every `delay` until `shutdown` becomes `true`.
pub fn spawn_fixed_delay<F>(
    name: &'static str,
    delay: Duration,
    mut shutdown: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let job = Arc::new(job);
    tokio::spawn(async move {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        debug!(task = name, delay_ms, "Scheduled task started");
        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = shutdown.changed() => {
                    // Sender dropped or flipped: either way, stop
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                    continue;
                }
            }

            let job = Arc::clone(&job);
            if let Err(e) = tokio::task::spawn_blocking(move || job()).await {
                error!(task = name, error = %e, "Scheduled task panicked");
            }
        }
        debug!(task = name, "Scheduled task stopped");
    })
}
