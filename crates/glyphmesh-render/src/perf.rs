// this_file: crates/glyphmesh-render/src/perf.rs

//! Build latency metrics.

use glyphmesh_core::{GlyphMeshError, Result};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Significant figures kept by the latency histogram.
const DEFAULT_PRECISION: u8 = 3;

/// Snapshot of recorded build latencies, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerfStats {
    pub builds: u64,
    pub failures: u64,
    pub mean_us: f64,
    pub p50_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

struct Recorded {
    latencies: Histogram<u64>,
    failures: u64,
}

/// Thread-safe latency recorder shared by parallel builds.
pub struct PerfMetrics {
    recorded: Mutex<Recorded>,
}

impl PerfMetrics {
    pub fn new() -> Result<Self> {
        Self::with_precision(DEFAULT_PRECISION)
    }

    /// Recorder keeping `sigfig` significant figures (0 to 5).
    pub fn with_precision(sigfig: u8) -> Result<Self> {
        let latencies = Histogram::new(sigfig).map_err(|err| {
            GlyphMeshError::invalid_config(format!("histogram precision {sigfig}: {err:?}"))
        })?;
        Ok(Self {
            recorded: Mutex::new(Recorded {
                latencies,
                failures: 0,
            }),
        })
    }

    pub fn record(&self, elapsed: Duration, succeeded: bool) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let mut recorded = self.recorded.lock();
        recorded.latencies.saturating_record(micros);
        if !succeeded {
            recorded.failures += 1;
        }
    }

    pub fn snapshot(&self) -> PerfStats {
        let recorded = self.recorded.lock();
        let latencies = &recorded.latencies;
        if latencies.is_empty() {
            return PerfStats {
                failures: recorded.failures,
                ..PerfStats::default()
            };
        }
        PerfStats {
            builds: latencies.len(),
            failures: recorded.failures,
            mean_us: latencies.mean(),
            p50_us: latencies.value_at_quantile(0.5),
            p99_us: latencies.value_at_quantile(0.99),
            max_us: latencies.max(),
        }
    }

    pub fn reset(&self) {
        let mut recorded = self.recorded.lock();
        recorded.latencies.reset();
        recorded.failures = 0;
    }
}

/// Timer for one build; call [`PerfScope::finish`] with the outcome.
pub struct PerfScope<'a> {
    metrics: &'a PerfMetrics,
    start: Instant,
}

impl<'a> PerfScope<'a> {
    pub fn start(metrics: &'a PerfMetrics) -> Self {
        Self {
            metrics,
            start: Instant::now(),
        }
    }

    pub fn finish(self, succeeded: bool) {
        self.metrics.record(self.start.elapsed(), succeeded);
    }
}
