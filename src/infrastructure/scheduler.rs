//! Periodic triggers for the prune and select loops.

use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Interval, MissedTickBehavior};

pub trait Ticker {
    /// Resolve at the next tick
    fn tick(&mut self) -> impl Future<Output = ()>;
}

/// Ticker backed by a tokio interval. The first tick fires immediately.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Must be called from inside a tokio runtime
    pub fn new(period: Duration) -> Self {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

#[cfg(test)]
pub mod testing {
    use super::Ticker;
    use tokio::sync::mpsc;

    /// Ticks once per `()` pushed through its sender. Never ticks again
    /// once every sender is gone.
    pub struct ManualTicker {
        rx: mpsc::UnboundedReceiver<()>,
    }

    impl ManualTicker {
        pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
            let (tx, rx) = mpsc::unbounded_channel();
            (tx, Self { rx })
        }
    }

    impl Ticker for ManualTicker {
        async fn tick(&mut self) {
            if self.rx.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
    }
}
