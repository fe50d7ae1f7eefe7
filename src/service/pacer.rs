use std::time::Duration;

/// Fixed inter-request pacing for bulk refreshes.
///
/// Failures get a slightly longer pause than successes since they often mean
/// the site is already unhappy with the request rate.
pub struct RefreshPacer {
    success_delay: Duration,
    failure_delay: Duration,
}

impl RefreshPacer {
    pub fn new(success_delay: Duration, failure_delay: Duration) -> Self {
        Self {
            success_delay,
            failure_delay,
        }
    }

    pub async fn after_success(&self) {
        tokio::time::sleep(self.success_delay).await;
    }

    pub async fn after_failure(&self) {
        tokio::time::sleep(self.failure_delay).await;
    }
}

impl Default for RefreshPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(800), Duration::from_millis(1000))
    }
}
