use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// One firing of a phase timer, stamped with the timer's generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick {
    pub generation: u64,
}

/// A repeating timer driving one phase. Aborted on `cancel` or drop.
#[derive(Debug)]
pub struct PhaseTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl PhaseTimer {
    /// First tick fires after `delay + interval`, then every `interval`.
    pub fn spawn(
        generation: u64,
        delay: Duration,
        interval: Duration,
        tick_tx: mpsc::Sender<TimerTick>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + delay + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tick_tx.send(TimerTick { generation }).await.is_err() {
                    break;
                }
            }
        });

        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for PhaseTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
