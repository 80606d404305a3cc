use super::driver::{SimulatedTest, TickOutcome};
use super::timer::{PhaseTimer, TimerTick};
use super::tuning::Tuning;
use super::{SpeedTestResult, TestPhase};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

const MAX_SAMPLES: usize = 200;
/// Shortest tick period a timer will run with; zero would spin.
const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between `start` and the first latency tick.
    pub start_delay: Duration,
    pub tick_interval: Duration,
}

impl Timing {
    fn clamped(self) -> Self {
        Self {
            tick_interval: self.tick_interval.max(MIN_TICK_INTERVAL),
            ..self
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(500),
            tick_interval: Duration::from_millis(50),
        }
    }
}

/// A driver plus the one timer feeding it.
///
/// Ticks arrive on the channel whose sender was handed to `new`; the owner
/// passes each one back through `on_tick`. Ticks from a timer that has since
/// been replaced or cancelled are dropped.
pub struct TestSession {
    test: SimulatedTest,
    timing: Timing,
    timer: Option<PhaseTimer>,
    next_generation: u64,
    tick_tx: mpsc::Sender<TimerTick>,

    // Per-phase history for charts
    ping_samples: Vec<f64>,
    download_samples: Vec<f64>,
    upload_samples: Vec<f64>,
}

impl TestSession {
    pub fn new(
        tuning: Tuning,
        timing: Timing,
        seed: Option<u64>,
        tick_tx: mpsc::Sender<TimerTick>,
    ) -> Self {
        let test = match seed {
            Some(seed) => SimulatedTest::seeded(tuning, seed),
            None => SimulatedTest::new(tuning),
        };
        Self {
            test,
            timing: timing.clamped(),
            timer: None,
            next_generation: 0,
            tick_tx,
            ping_samples: Vec::new(),
            download_samples: Vec::new(),
            upload_samples: Vec::new(),
        }
    }

    pub fn phase(&self) -> TestPhase {
        self.test.phase()
    }

    pub fn result(&self) -> &SpeedTestResult {
        self.test.result()
    }

    pub fn tuning(&self) -> &Tuning {
        self.test.tuning()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Applies to the next timer spawned; a running phase keeps its pace.
    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing.clamped();
    }

    pub fn is_running(&self) -> bool {
        self.phase().is_running()
    }

    #[cfg(test)]
    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn samples(&self, phase: TestPhase) -> &[f64] {
        match phase {
            TestPhase::Ping => &self.ping_samples,
            TestPhase::Download => &self.download_samples,
            TestPhase::Upload => &self.upload_samples,
            TestPhase::Idle | TestPhase::Complete => &[],
        }
    }

    /// Fraction of `phase`'s threshold reached so far.
    pub fn progress(&self, phase: TestPhase) -> f64 {
        if self.phase().is_after(phase) {
            return 1.0;
        }
        self.tuning()
            .ramp(phase)
            .map(|ramp| ramp.progress(self.result().metric(phase)))
            .unwrap_or(0.0)
    }

    pub fn start(&mut self) {
        self.cancel_timer();
        self.test.start();
        self.clear_samples();
        info!(phase = self.phase().label(), "speed test started");
        self.spawn_timer(self.timing.start_delay);
    }

    pub fn reset(&mut self) {
        self.cancel_timer();
        let from = self.phase();
        self.test.reset();
        self.clear_samples();
        info!(from = from.label(), "speed test reset");
    }

    pub fn on_tick(&mut self, tick: TimerTick) {
        let live = self.timer.as_ref().map(PhaseTimer::generation);
        if live != Some(tick.generation) {
            trace!(generation = tick.generation, ?live, "discarding stale tick");
            return;
        }

        match self.test.tick() {
            TickOutcome::Inactive => self.cancel_timer(),
            TickOutcome::Climbing { phase, value } => {
                debug!(phase = phase.label(), value, "tick");
                self.push_sample(phase, value);
            }
            TickOutcome::Crossed { from, to, value } => {
                self.push_sample(from, value);
                self.cancel_timer();
                info!(phase = from.label(), value, next = to.label(), "phase finished");
                if to.is_running() {
                    self.spawn_timer(Duration::ZERO);
                } else {
                    let result = self.result();
                    info!(
                        ping_ms = result.ping_ms,
                        download_mbps = result.download_mbps,
                        upload_mbps = result.upload_mbps,
                        "speed test complete"
                    );
                }
            }
        }
    }

    fn spawn_timer(&mut self, delay: Duration) {
        self.next_generation += 1;
        self.timer = Some(PhaseTimer::spawn(
            self.next_generation,
            delay,
            self.timing.tick_interval,
            self.tick_tx.clone(),
        ));
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn push_sample(&mut self, phase: TestPhase, value: f64) {
        let samples = match phase {
            TestPhase::Ping => &mut self.ping_samples,
            TestPhase::Download => &mut self.download_samples,
            TestPhase::Upload => &mut self.upload_samples,
            TestPhase::Idle | TestPhase::Complete => return,
        };
        samples.push(value);
        if samples.len() > MAX_SAMPLES {
            samples.remove(0);
        }
    }

    fn clear_samples(&mut self) {
        self.ping_samples.clear();
        self.download_samples.clear();
        self.upload_samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{self, Instant};

    fn session(seed: u64) -> (TestSession, mpsc::Receiver<TimerTick>) {
        let (tx, rx) = mpsc::channel(32);
        let session = TestSession::new(Tuning::default(), Timing::default(), Some(seed), tx);
        (session, rx)
    }

    async fn drive_to(session: &mut TestSession, rx: &mut mpsc::Receiver<TimerTick>, phase: TestPhase) {
        while session.phase() != phase {
            let tick = rx.recv().await.expect("timer alive while running");
            session.on_tick(tick);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_run_reaches_complete_in_order() {
        let (mut session, mut rx) = session(21);
        session.start();
        assert_eq!(session.phase(), TestPhase::Ping);

        let mut phases = vec![session.phase()];
        while session.phase() != TestPhase::Complete {
            let tick = rx.recv().await.expect("tick");
            session.on_tick(tick);
            if phases.last() != Some(&session.phase()) {
                phases.push(session.phase());
            }
        }

        assert_eq!(
            phases,
            vec![TestPhase::Ping, TestPhase::Download, TestPhase::Upload, TestPhase::Complete]
        );
        assert!(!session.has_timer());
        let result = session.result();
        assert!((25.0..40.0).contains(&result.ping_ms));
        assert!((150.0..250.0).contains(&result.download_mbps));
        assert!((100.0..150.0).contains(&result.upload_mbps));
        assert_eq!(session.samples(TestPhase::Ping).last(), Some(&result.ping_ms));
        assert_eq!(session.progress(TestPhase::Upload), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_ticks_before_the_start_delay() {
        let (mut session, mut rx) = session(22);
        let started = Instant::now();
        session.start();

        let tick = rx.recv().await.expect("tick");
        assert!(started.elapsed() >= Duration::from_millis(550));
        session.on_tick(tick);
        assert_eq!(session.samples(TestPhase::Ping).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_run_stops_the_timer() {
        let (mut session, mut rx) = session(23);
        session.start();
        drive_to(&mut session, &mut rx, TestPhase::Download).await;
        let tick = rx.recv().await.expect("tick");
        session.on_tick(tick);

        session.reset();
        assert_eq!(session.phase(), TestPhase::Idle);
        assert!(!session.has_timer());

        time::sleep(Duration::from_secs(2)).await;
        while let Ok(tick) = rx.try_recv() {
            session.on_tick(tick);
        }
        assert_eq!(*session.result(), SpeedTestResult::default());
        assert!(session.samples(TestPhase::Download).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_ticks_are_ignored() {
        let (mut session, mut rx) = session(24);
        session.start();
        let old = rx.recv().await.expect("tick");
        session.on_tick(old);
        assert_eq!(session.samples(TestPhase::Ping).len(), 1);

        // Restarting swaps in a new timer; the old generation must not count.
        session.start();
        session.on_tick(old);
        assert_eq!(session.result().ping_ms, 0.0);
        assert!(session.samples(TestPhase::Ping).is_empty());

        session.on_tick(TimerTick { generation: u64::MAX });
        assert_eq!(session.result().ping_ms, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn each_phase_gets_a_fresh_timer() {
        let (mut session, mut rx) = session(25);
        session.start();
        let mut generations: Vec<u64> = Vec::new();
        while session.phase() != TestPhase::Complete {
            let tick = rx.recv().await.expect("tick");
            if generations.last() != Some(&tick.generation) {
                generations.push(tick.generation);
            }
            session.on_tick(tick);
        }
        assert_eq!(generations, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tick_interval_is_raised_to_the_minimum() {
        let (tx, mut rx) = mpsc::channel(32);
        let zero = Timing {
            start_delay: Duration::ZERO,
            tick_interval: Duration::ZERO,
        };
        let mut session = TestSession::new(Tuning::default(), zero, Some(26), tx);
        assert_eq!(session.timing().tick_interval, MIN_TICK_INTERVAL);

        session.start();
        drive_to(&mut session, &mut rx, TestPhase::Complete).await;
        assert!(session.result().upload_mbps >= 100.0);

        session.set_timing(zero);
        assert_eq!(session.timing().tick_interval, MIN_TICK_INTERVAL);
        assert_eq!(session.timing().start_delay, Duration::ZERO);
    }

    #[test]
    fn samples_are_capped_per_phase() {
        let (tx, _rx) = mpsc::channel(1);
        let mut session = TestSession::new(Tuning::default(), Timing::default(), Some(1), tx);
        for i in 0..MAX_SAMPLES + 5 {
            session.push_sample(TestPhase::Download, i as f64);
        }
        let kept = session.samples(TestPhase::Download);
        assert_eq!(kept.len(), MAX_SAMPLES);
        assert_eq!(kept[0], 5.0);
        assert!(session.samples(TestPhase::Upload).is_empty());
    }

    #[test]
    fn progress_tracks_threshold() {
        let (tx, _rx) = mpsc::channel(1);
        let session = TestSession::new(Tuning::default(), Timing::default(), Some(1), tx);
        assert_eq!(session.progress(TestPhase::Ping), 0.0);
        assert!(session.samples(TestPhase::Idle).is_empty());
    }
}
