use std::{collections::VecDeque, time::Duration};

use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use crate::error::ApiError;

/// Extra wait on top of the window so the oldest request is safely out of it.
const SAFETY_MARGIN: Duration = Duration::from_millis(100);

/// Grants at most `max_requests` permits per rolling `window`.
///
/// The timestamp window is owned by a single background task; callers only
/// send it a reply channel and wait. Requests are served strictly one after
/// another, so two callers can never both see "under the limit" for the same
/// slot. Clones share the same task.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    requests: mpsc::UnboundedSender<oneshot::Sender<Instant>>,
}

impl RateLimiter {
    /// Spawns the limiter task on the current tokio runtime.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, max_requests.max(1), window));
        Self { requests: tx }
    }

    /// Waits until one more request may be sent and returns the instant the
    /// permit was granted.
    pub async fn acquire(&self) -> Result<Instant, ApiError> {
        let (reply, granted) = oneshot::channel();
        self.requests
            .send(reply)
            .map_err(|_| ApiError::LimiterClosed)?;
        granted.await.map_err(|_| ApiError::LimiterClosed)
    }
}

async fn run(
    mut requests: mpsc::UnboundedReceiver<oneshot::Sender<Instant>>,
    max_requests: usize,
    window: Duration,
) {
    let mut sent: VecDeque<Instant> = VecDeque::with_capacity(max_requests);

    while let Some(reply) = requests.recv().await {
        prune(&mut sent, Instant::now(), window);

        if sent.len() >= max_requests {
            if let Some(&oldest) = sent.front() {
                let wake = oldest + window + SAFETY_MARGIN;
                tracing::debug!(
                    "Discogs rate limit reached, waiting {}ms",
                    wake.saturating_duration_since(Instant::now()).as_millis()
                );
                sleep_until(wake).await;
                prune(&mut sent, Instant::now(), window);
            }
        }

        let granted = Instant::now();
        sent.push_back(granted);
        // the caller may have given up waiting; the slot is spent either way
        let _ = reply.send(granted);
    }
}

fn prune(sent: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = sent.front() {
        if now.saturating_duration_since(oldest) > window {
            sent.pop_front();
        } else {
            break;
        }
    }
}
