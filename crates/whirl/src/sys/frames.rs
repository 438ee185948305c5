use std::time::Duration;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Frame scheduler for the daemon. Timestamps are milliseconds since the clock
/// was created, so they only ever grow.
#[derive(Debug)]
pub struct FrameClock {
    epoch: Instant,
    interval: Interval,
}

impl FrameClock {
    /// Must be called from inside the tokio runtime.
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            epoch: Instant::now(),
            interval,
        }
    }

    pub fn from_millis(period_ms: u64) -> Self {
        Self::new(Duration::from_millis(period_ms.max(1)))
    }

    pub async fn next(&mut self) -> f64 {
        let at = self.interval.tick().await;
        at.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0
    }

    /// Fires the next frame right away, dropping ticks that piled up while idle.
    pub fn restart(&mut self) {
        self.interval.reset_immediately();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timestamps_increase() {
        let mut clock = FrameClock::from_millis(5);
        let mut last = clock.next().await;
        for _ in 0..5 {
            let now = clock.next().await;
            assert!(now > last);
            last = now;
        }
    }
}
