use super::tuning::{RampStep, Tuning};
use super::{SpeedTestResult, TestPhase};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What a single tick did to the driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Nothing is running; state is unchanged.
    Inactive,
    Climbing { phase: TestPhase, value: f64 },
    /// `from`'s metric crossed its threshold and froze at `value`.
    Crossed {
        from: TestPhase,
        to: TestPhase,
        value: f64,
    },
}

/// The fake speed test state machine.
///
/// Owns the phase and the three metrics. Only `start`, `reset` and `tick`
/// mutate them; everything else reads through accessors.
#[derive(Debug)]
pub struct SimulatedTest<R = StdRng> {
    phase: TestPhase,
    result: SpeedTestResult,
    tuning: Tuning,
    rng: R,
}

impl SimulatedTest<StdRng> {
    pub fn new(tuning: Tuning) -> Self {
        Self::with_rng(tuning, StdRng::from_entropy())
    }

    pub fn seeded(tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(tuning, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulatedTest<R> {
    pub fn with_rng(tuning: Tuning, rng: R) -> Self {
        Self {
            phase: TestPhase::Idle,
            result: SpeedTestResult::default(),
            tuning,
            rng,
        }
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn result(&self) -> &SpeedTestResult {
        &self.result
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn start(&mut self) {
        self.result = SpeedTestResult::default();
        self.phase = TestPhase::Ping;
    }

    pub fn reset(&mut self) {
        self.result = SpeedTestResult::default();
        self.phase = TestPhase::Idle;
    }

    pub fn tick(&mut self) -> TickOutcome {
        let phase = self.phase;
        let Some(ramp) = self.tuning.ramp(phase).copied() else {
            return TickOutcome::Inactive;
        };
        let Some(metric) = self.result.metric_mut(phase) else {
            return TickOutcome::Inactive;
        };

        match ramp.advance(*metric, &mut self.rng) {
            RampStep::Climbing(value) => {
                *metric = value;
                TickOutcome::Climbing { phase, value }
            }
            RampStep::Crossed(value) => {
                *metric = value;
                self.phase = phase.next();
                TickOutcome::Crossed {
                    from: phase,
                    to: self.phase,
                    value,
                }
            }
        }
    }
}
