pub mod driver;
pub mod session;
pub mod timer;
pub mod tuning;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedTestResult {
    pub ping_ms: f64,
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

impl SpeedTestResult {
    /// Value of the metric owned by `phase`, zero for phases without one.
    pub fn metric(&self, phase: TestPhase) -> f64 {
        match phase {
            TestPhase::Ping => self.ping_ms,
            TestPhase::Download => self.download_mbps,
            TestPhase::Upload => self.upload_mbps,
            TestPhase::Idle | TestPhase::Complete => 0.0,
        }
    }

    pub(crate) fn metric_mut(&mut self, phase: TestPhase) -> Option<&mut f64> {
        match phase {
            TestPhase::Ping => Some(&mut self.ping_ms),
            TestPhase::Download => Some(&mut self.download_mbps),
            TestPhase::Upload => Some(&mut self.upload_mbps),
            TestPhase::Idle | TestPhase::Complete => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestPhase {
    Idle,
    Ping,
    Download,
    Upload,
    Complete,
}

impl TestPhase {
    /// The phases that own a metric, in the order a run visits them.
    pub const MEASURED: [TestPhase; 3] = [TestPhase::Ping, TestPhase::Download, TestPhase::Upload];

    pub fn next(self) -> Self {
        match self {
            TestPhase::Idle => TestPhase::Ping,
            TestPhase::Ping => TestPhase::Download,
            TestPhase::Download => TestPhase::Upload,
            TestPhase::Upload | TestPhase::Complete => TestPhase::Complete,
        }
    }

    /// True while a metric is being driven.
    pub fn is_running(self) -> bool {
        matches!(self, TestPhase::Ping | TestPhase::Download | TestPhase::Upload)
    }

    pub fn label(self) -> &'static str {
        match self {
            TestPhase::Idle => "idle",
            TestPhase::Ping => "latency",
            TestPhase::Download => "download",
            TestPhase::Upload => "upload",
            TestPhase::Complete => "complete",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            TestPhase::Ping => "ms",
            _ => "Mbps",
        }
    }

    /// Position in the run, used to tell finished phases from pending ones.
    pub(crate) fn ordinal(self) -> u8 {
        match self {
            TestPhase::Idle => 0,
            TestPhase::Ping => 1,
            TestPhase::Download => 2,
            TestPhase::Upload => 3,
            TestPhase::Complete => 4,
        }
    }

    /// True once a run has moved past `other`.
    pub fn is_after(self, other: TestPhase) -> bool {
        self.ordinal() > other.ordinal()
    }
}
