use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing time across the application. The scheduler
/// sleeps on it and the service stamps every event with it, so tests can swap it for a clock
/// that follows tokio's paused time.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Clock anchored at a fixed wall time that advances together with tokio's clock. Combined with
/// `#[tokio::test(start_paused = true)]` it makes timer driven code deterministic.
#[derive(Clone)]
pub struct AnchoredClock {
    start_time: DateTime<Utc>,
    reference: Instant,
}

impl AnchoredClock {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            reference: Instant::now(),
        }
    }
}

#[async_trait]
impl Clock for AnchoredClock {
    fn time(&self) -> DateTime<Utc> {
        self.start_time + self.reference.elapsed()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
