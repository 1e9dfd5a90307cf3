// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fixed-interval timer whose first tick fires one period after creation.
#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
}

pub fn get_ticker(period: Duration) -> Ticker {
    let period = period.max(MIN_PERIOD);
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Ticker { interval }
}

impl Ticker {
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }

    pub fn stop(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_tick_waits_a_full_period() {
        let started = Instant::now();
        let mut ticker = get_ticker(Duration::from_millis(20));
        ticker.tick().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
        ticker.stop();
    }

    #[tokio::test]
    async fn zero_period_is_clamped() {
        let ticker = get_ticker(Duration::ZERO);
        assert_eq!(ticker.period(), MIN_PERIOD);
    }
}
