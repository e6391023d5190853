//! The collection loop: one tick per period, every probe sampled, derived
//! rates computed, one atomic append to the shared history.
//!
//! Probes are failure-isolated: a probe that returns nothing (or panics)
//! degrades only its own metric for that tick. Ticks are strictly
//! serialized: an overrunning tick is followed immediately by the next one,
//! never overlapped.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::history::{MetricHistory, ProbeHealth, TickValues};
use crate::probe::{MetricKind, Probe, Reading};
use crate::rates::{PowerEstimator, ThroughputEstimator};

/// Default collection period.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

/// Runtime state for one registered probe.
struct ProbeState {
    probe: Box<dyn Probe>,
    failures: u64,
    healthy: bool,
}

/// Drives the probe set and owns the derived-rate estimators.
pub struct Collector {
    history: Arc<MetricHistory>,
    probes: Vec<ProbeState>,
    power: PowerEstimator,
    throughput: ThroughputEstimator,
    started: Instant,
}

impl Collector {
    pub fn new(history: Arc<MetricHistory>, probes: Vec<Box<dyn Probe>>) -> Self {
        Self {
            history,
            probes: probes
                .into_iter()
                .map(|probe| ProbeState {
                    probe,
                    failures: 0,
                    healthy: false,
                })
                .collect(),
            power: PowerEstimator::new(),
            throughput: ThroughputEstimator::new(),
            started: Instant::now(),
        }
    }

    /// Run one full probe-and-append cycle.
    pub fn tick(&mut self) {
        let t_secs = self.started.elapsed().as_secs_f64();
        let mut tick = TickValues {
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            ..TickValues::default()
        };
        let mut energy = None;
        let mut net = None;

        for state in &mut self.probes {
            let name = state.probe.name();
            let kind = state.probe.info().kind;
            let result = catch_unwind(AssertUnwindSafe(|| state.probe.sample()));
            let reading = match result {
                Ok(Some(reading)) => reading,
                Ok(None) => {
                    state.failures += 1;
                    state.healthy = false;
                    log::debug!("probe {name} produced no reading");
                    continue;
                }
                Err(_) => {
                    state.failures += 1;
                    state.healthy = false;
                    log::warn!("probe {name} panicked; metric degraded for this tick");
                    continue;
                }
            };
            state.healthy = true;

            match (kind, reading) {
                (MetricKind::CpuTemp, Reading::Scalar(v)) => tick.cpu_temp = Some(v),
                (MetricKind::CpuUsage, Reading::Scalar(v)) => tick.cpu_usage = Some(v),
                (MetricKind::CpuFreq, Reading::Scalar(v)) => tick.cpu_freq = Some(v),
                (MetricKind::CpuFan, Reading::Scalar(v)) => tick.cpu_fan = Some(v),
                (MetricKind::GpuFan, Reading::Scalar(v)) => tick.gpu_fan = Some(v),
                (MetricKind::CpuCores, Reading::PerCore(v)) => tick.cpu_cores = Some(v),
                (MetricKind::Gpu, Reading::Gpu(g)) => tick.gpu = Some(g),
                (MetricKind::Memory, Reading::Memory(m)) => tick.memory = Some(m),
                (MetricKind::CpuEnergy, Reading::Energy(e)) => energy = Some(e),
                (MetricKind::Network, Reading::Network(n)) => net = Some(n),
                (kind, reading) => {
                    state.healthy = false;
                    log::warn!("probe {name} returned {reading:?} for slot {kind}; ignored");
                }
            }
        }

        if let Some(e) = energy {
            tick.cpu_power = self.power.update(e.energy_uj, e.max_range_uj, t_secs);
        }
        if let Some(n) = net {
            tick.net = Some(self.throughput.update(n.rx_bytes, n.tx_bytes, t_secs));
        }

        let health = self
            .probes
            .iter()
            .map(|s| ProbeHealth {
                name: s.probe.name(),
                healthy: s.healthy,
                failures: s.failures,
            })
            .collect();
        self.history.append_tick(tick, health);
    }

    /// Tick every `period` until `stop` receives a message or its sender is
    /// dropped. Meant to run on a dedicated thread; an overrunning tick is
    /// followed by the next one immediately.
    pub fn run(mut self, period: Duration, stop: Receiver<()>) {
        log::info!("collector started, period {period:?}");
        loop {
            let t0 = Instant::now();
            self.tick();
            let wait = period.saturating_sub(t0.elapsed());
            match stop.recv_timeout(wait) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        log::info!("collector stopped");
    }
}
