/// Dispatch pacing
///
/// Keeps consecutive upstream dispatches at least `min_interval` apart. The
/// worker is the only caller, so a single timestamp behind an async mutex is
/// all the state needed; the lock is released while sleeping.
use crate::logger::{self, LogTag};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns once at least `min_interval` has passed since the previous
    /// dispatch stamp; the first call returns immediately.
    pub async fn wait_turn(&self) {
        if self.min_interval.is_zero() {
            return;
        }

        let mut last = self.last_request.lock().await;
        let now = Instant::now();

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                logger::debug(
                    LogTag::Queue,
                    &format!("Pacing: waiting {} ms before next dispatch", wait.as_millis()),
                );

                drop(last);
                tokio::time::sleep(wait).await;

                let mut last = self.last_request.lock().await;
                *last = Some(Instant::now());
            } else {
                *last = Some(now);
            }
        } else {
            *last = Some(now);
        }
    }
}
