use super::TestPhase;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

/// How one metric climbs toward its threshold.
///
/// Every tick adds a uniform step in `[0, step_max)`. Once the running value
/// reaches `threshold` it is replaced by a uniform value in
/// `[threshold, threshold + snap_span)` and the phase ends.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MetricRamp {
    pub step_max: f64,
    pub threshold: f64,
    pub snap_span: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampStep {
    Climbing(f64),
    Crossed(f64),
}

impl MetricRamp {
    pub const fn new(step_max: f64, threshold: f64, snap_span: f64) -> Self {
        Self {
            step_max,
            threshold,
            snap_span,
        }
    }

    pub fn advance<R: Rng>(&self, current: f64, rng: &mut R) -> RampStep {
        let next = current + rng.gen_range(0.0..self.step_max);
        if next >= self.threshold {
            RampStep::Crossed(self.threshold + rng.gen_range(0.0..self.snap_span))
        } else {
            RampStep::Climbing(next)
        }
    }

    pub fn progress(&self, value: f64) -> f64 {
        (value / self.threshold).clamp(0.0, 1.0)
    }

    fn validate(&self, phase: TestPhase) -> Result<(), TuningError> {
        for (field, value) in [
            ("step_max", self.step_max),
            ("threshold", self.threshold),
            ("snap_span", self.snap_span),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TuningError::NotPositive {
                    phase: phase.label(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ping: MetricRamp,
    pub download: MetricRamp,
    pub upload: MetricRamp,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ping: MetricRamp::new(8.0, 25.0, 15.0),
            download: MetricRamp::new(15.0, 150.0, 100.0),
            upload: MetricRamp::new(10.0, 100.0, 50.0),
        }
    }
}

impl Tuning {
    pub fn ramp(&self, phase: TestPhase) -> Option<&MetricRamp> {
        match phase {
            TestPhase::Ping => Some(&self.ping),
            TestPhase::Download => Some(&self.download),
            TestPhase::Upload => Some(&self.upload),
            TestPhase::Idle | TestPhase::Complete => None,
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for phase in TestPhase::MEASURED {
            if let Some(ramp) = self.ramp(phase) {
                ramp.validate(phase)?;
            }
        }
        Ok(())
    }

    pub fn from_toml(source: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = toml::from_str(source).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TuningError {
    #[error("tuning parse error: {0}")]
    Parse(String),
    #[error("{phase}.{field} must be a positive finite number, got {value}")]
    NotPositive {
        phase: &'static str,
        field: &'static str,
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_fields() {
        let mut tuning = Tuning::default();
        tuning.download.step_max = 0.0;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotPositive {
                phase: "download",
                field: "step_max",
                value: 0.0,
            })
        );

        let mut tuning = Tuning::default();
        tuning.upload.snap_span = f64::NAN;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NotPositive { phase: "upload", field: "snap_span", .. })
        ));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let tuning = Tuning::from_toml(
            r#"
            [download]
            step_max = 40.0
            threshold = 900.0
            snap_span = 50.0
            "#,
        )
        .expect("valid tuning");
        assert_eq!(tuning.download, MetricRamp::new(40.0, 900.0, 50.0));
        assert_eq!(tuning.ping, Tuning::default().ping);
        assert_eq!(tuning.upload, Tuning::default().upload);
    }

    #[test]
    fn toml_with_bad_values_is_rejected() {
        let err = Tuning::from_toml(
            r#"
            [ping]
            step_max = 8.0
            threshold = -1.0
            snap_span = 15.0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("latency.threshold"));

        assert!(matches!(
            Tuning::from_toml("[ping]\nstep_max = \"fast\""),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn advance_snaps_into_range_on_crossing() {
        let ramp = MetricRamp::new(8.0, 25.0, 15.0);
        let mut rng = StdRng::seed_from_u64(7);
        match ramp.advance(24.999, &mut rng) {
            RampStep::Crossed(v) => assert!((25.0..40.0).contains(&v)),
            RampStep::Climbing(v) => assert!((24.999..25.0).contains(&v)),
        }
        match ramp.advance(100.0, &mut rng) {
            RampStep::Crossed(v) => assert!((25.0..40.0).contains(&v)),
            other => panic!("expected crossing, got {other:?}"),
        }
    }

    #[test]
    fn progress_is_clamped() {
        let ramp = MetricRamp::new(10.0, 100.0, 50.0);
        assert_eq!(ramp.progress(0.0), 0.0);
        assert_eq!(ramp.progress(50.0), 0.5);
        assert_eq!(ramp.progress(130.0), 1.0);
    }
}
