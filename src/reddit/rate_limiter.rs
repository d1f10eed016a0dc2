// Request spacing for the Reddit API.
//
// Reddit asks unauthenticated clients to stay around one request per second
// and app-only OAuth clients under 100 per minute. Every request the client
// makes goes through `acquire`, which sleeps until the minimum interval since
// the previous request has passed.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

#[derive(Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Result<Self> {
        if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
            anyhow::bail!("Request rate must be a positive number, got {requests_per_second}");
        }
        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / requests_per_second),
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next request slot.
    ///
    /// The lock is held across the sleep: requests are strictly sequential,
    /// so a second caller simply queues behind the first.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + self.interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
