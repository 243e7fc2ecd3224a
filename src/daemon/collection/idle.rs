use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_IDLE_THRESHOLD_SECS: i64 = 30;

/// Decides whether the user went idle. Evaluated by polling, so detection happens up to one
/// polling period after the threshold has passed.
#[derive(Debug, Clone, Copy)]
pub struct IdleEvaluator {
    threshold: Duration,
}

impl IdleEvaluator {
    pub fn new(threshold: Duration) -> Self {
        Self { threshold }
    }

    pub fn is_idle(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_activity > self.threshold
    }
}
