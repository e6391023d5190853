//! Bounded rolling history of every metric series, shared between the
//! collector (sole writer) and any number of snapshot readers.
//!
//! All mutation goes through [`MetricHistory::append_tick`], which appends
//! exactly one entry to every series under a single write-lock hold. Readers
//! take [`MetricHistory::snapshot`] and get an independent copy, so a
//! snapshot can never observe some series at length N and others at N−1.

use std::collections::VecDeque;
use std::sync::RwLock;

use serde::Serialize;

use crate::probe::{GpuReading, MemoryReading};
use crate::rates::Throughput;

/// Default window: the last 60 ticks.
pub const DEFAULT_CAPACITY: usize = 60;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB_PER_GB: f64 = 1024.0;

/// One tick's worth of values, as delivered by the collector. `None` means
/// the probe (or estimator) produced nothing this tick; the store substitutes
/// zero at append time.
#[derive(Debug, Clone, Default)]
pub struct TickValues {
    /// Wall-clock tick label, `HH:MM:SS`.
    pub timestamp: String,
    pub cpu_temp: Option<f64>,
    pub cpu_usage: Option<f64>,
    pub cpu_cores: Option<Vec<f64>>,
    pub cpu_freq: Option<f64>,
    pub cpu_fan: Option<f64>,
    pub gpu_fan: Option<f64>,
    pub cpu_power: Option<f64>,
    pub gpu: Option<GpuReading>,
    pub memory: Option<MemoryReading>,
    pub net: Option<Throughput>,
}

/// Health of one probe as of the latest tick.
#[derive(Debug, Clone)]
pub struct ProbeHealth {
    pub name: &'static str,
    pub healthy: bool,
    pub failures: u64,
}

/// Point-in-time copy of the whole history window.
///
/// Field names are the wire contract of `GET /api/data`.
#[derive(Debug, Clone, Serialize)]
pub struct HistorySnapshot {
    pub timestamps: Vec<String>,
    pub cpu_temp: Vec<f64>,
    pub cpu_usage: Vec<f64>,
    pub cpu_cores: Vec<Vec<f64>>,
    pub cpu_freq: Vec<f64>,
    pub cpu_fan: Vec<f64>,
    pub gpu_fan: Vec<f64>,
    pub cpu_power: Vec<f64>,
    pub gpu_temp: Vec<f64>,
    pub gpu_power: Vec<f64>,
    pub gpu_util: Vec<f64>,
    pub gpu_mem_util: Vec<f64>,
    pub gpu_mem_used: Vec<f64>,
    pub gpu_mem_total: f64,
    pub gpu_freq: Vec<f64>,
    pub ram_used: Vec<f64>,
    pub ram_total: f64,
    pub num_cores: usize,
    pub net_download: Vec<f64>,
    pub net_upload: Vec<f64>,
}

/// Collection health summary for the `/health` endpoint.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: &'static str,
    pub window: usize,
    pub capacity: usize,
    pub probes: Vec<ProbeHealth>,
}

#[derive(Debug, Default)]
struct HistoryState {
    timestamps: VecDeque<String>,
    cpu_temp: VecDeque<f64>,
    cpu_usage: VecDeque<f64>,
    cpu_cores: VecDeque<Vec<f64>>,
    cpu_freq: VecDeque<f64>,
    cpu_fan: VecDeque<f64>,
    gpu_fan: VecDeque<f64>,
    cpu_power: VecDeque<f64>,
    gpu_temp: VecDeque<f64>,
    gpu_power: VecDeque<f64>,
    gpu_util: VecDeque<f64>,
    gpu_mem_util: VecDeque<f64>,
    gpu_mem_used: VecDeque<f64>,
    gpu_freq: VecDeque<f64>,
    ram_used: VecDeque<f64>,
    net_download: VecDeque<f64>,
    net_upload: VecDeque<f64>,
    ram_total: f64,
    gpu_mem_total: f64,
    num_cores: usize,
    probes: Vec<ProbeHealth>,
}

/// Thread-safe rolling metric history. Single writer, many readers.
pub struct MetricHistory {
    capacity: usize,
    inner: RwLock<HistoryState>,
}

fn push_bounded<T>(series: &mut VecDeque<T>, value: T, capacity: usize) {
    if series.len() >= capacity {
        series.pop_front();
    }
    series.push_back(value);
}

impl MetricHistory {
    /// Create an empty history retaining the last `capacity` ticks.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(HistoryState::default()),
        }
    }

    /// Window capacity in ticks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current window length in ticks.
    pub fn len(&self) -> usize {
        self.inner.read().expect("history lock poisoned").timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one tick to every series, substituting zero for absent values,
    /// and refresh gauges and probe health. The sole mutation entry point.
    pub fn append_tick(&self, tick: TickValues, probes: Vec<ProbeHealth>) {
        let cap = self.capacity;
        let mut state = self.inner.write().expect("history lock poisoned");

        push_bounded(&mut state.timestamps, tick.timestamp, cap);
        push_bounded(&mut state.cpu_temp, tick.cpu_temp.unwrap_or(0.0), cap);
        push_bounded(&mut state.cpu_usage, tick.cpu_usage.unwrap_or(0.0), cap);
        push_bounded(&mut state.cpu_freq, tick.cpu_freq.unwrap_or(0.0), cap);
        push_bounded(&mut state.cpu_fan, tick.cpu_fan.unwrap_or(0.0), cap);
        push_bounded(&mut state.gpu_fan, tick.gpu_fan.unwrap_or(0.0), cap);
        push_bounded(&mut state.cpu_power, tick.cpu_power.unwrap_or(0.0), cap);

        // Latch the core count on the first non-empty reading, then hold all
        // later vectors to that width.
        let mut cores = tick.cpu_cores.unwrap_or_default();
        if state.num_cores == 0 && !cores.is_empty() {
            state.num_cores = cores.len();
        }
        cores.resize(state.num_cores, 0.0);
        push_bounded(&mut state.cpu_cores, cores, cap);

        match tick.gpu {
            Some(g) => {
                push_bounded(&mut state.gpu_temp, g.temp_c, cap);
                push_bounded(&mut state.gpu_power, g.power_w, cap);
                push_bounded(&mut state.gpu_util, g.util_pct, cap);
                push_bounded(&mut state.gpu_mem_util, g.mem_util_pct, cap);
                // nvidia-smi reports MiB
                push_bounded(&mut state.gpu_mem_used, g.mem_used_mib / MIB_PER_GB, cap);
                push_bounded(&mut state.gpu_freq, g.freq_mhz, cap);
                state.gpu_mem_total = g.mem_total_mib / MIB_PER_GB;
            }
            None => {
                push_bounded(&mut state.gpu_temp, 0.0, cap);
                push_bounded(&mut state.gpu_power, 0.0, cap);
                push_bounded(&mut state.gpu_util, 0.0, cap);
                push_bounded(&mut state.gpu_mem_util, 0.0, cap);
                push_bounded(&mut state.gpu_mem_used, 0.0, cap);
                push_bounded(&mut state.gpu_freq, 0.0, cap);
            }
        }

        match tick.memory {
            Some(m) => {
                push_bounded(&mut state.ram_used, m.used_bytes as f64 / BYTES_PER_GB, cap);
                state.ram_total = m.total_bytes as f64 / BYTES_PER_GB;
            }
            None => push_bounded(&mut state.ram_used, 0.0, cap),
        }

        let net = tick.net.unwrap_or_default();
        push_bounded(&mut state.net_download, net.download_mbps, cap);
        push_bounded(&mut state.net_upload, net.upload_mbps, cap);

        state.probes = probes;
    }

    /// Take a consistent, independently owned copy of the whole window.
    pub fn snapshot(&self) -> HistorySnapshot {
        let state = self.inner.read().expect("history lock poisoned");
        HistorySnapshot {
            timestamps: state.timestamps.iter().cloned().collect(),
            cpu_temp: state.cpu_temp.iter().copied().collect(),
            cpu_usage: state.cpu_usage.iter().copied().collect(),
            cpu_cores: state.cpu_cores.iter().cloned().collect(),
            cpu_freq: state.cpu_freq.iter().copied().collect(),
            cpu_fan: state.cpu_fan.iter().copied().collect(),
            gpu_fan: state.gpu_fan.iter().copied().collect(),
            cpu_power: state.cpu_power.iter().copied().collect(),
            gpu_temp: state.gpu_temp.iter().copied().collect(),
            gpu_power: state.gpu_power.iter().copied().collect(),
            gpu_util: state.gpu_util.iter().copied().collect(),
            gpu_mem_util: state.gpu_mem_util.iter().copied().collect(),
            gpu_mem_used: state.gpu_mem_used.iter().copied().collect(),
            gpu_mem_total: state.gpu_mem_total,
            gpu_freq: state.gpu_freq.iter().copied().collect(),
            ram_used: state.ram_used.iter().copied().collect(),
            ram_total: state.ram_total,
            num_cores: state.num_cores,
            net_download: state.net_download.iter().copied().collect(),
            net_upload: state.net_upload.iter().copied().collect(),
        }
    }

    /// Summarize collection health for the `/health` endpoint.
    pub fn health_report(&self) -> HealthReport {
        let state = self.inner.read().expect("history lock poisoned");
        HealthReport {
            status: if state.timestamps.is_empty() {
                "starting"
            } else {
                "collecting"
            },
            window: state.timestamps.len(),
            capacity: self.capacity,
            probes: state.probes.clone(),
        }
    }
}

impl HistorySnapshot {
    /// Lengths of every per-tick series, for invariant checks.
    fn series_lengths(&self) -> [usize; 17] {
        [
            self.timestamps.len(),
            self.cpu_temp.len(),
            self.cpu_usage.len(),
            self.cpu_cores.len(),
            self.cpu_freq.len(),
            self.cpu_fan.len(),
            self.gpu_fan.len(),
            self.cpu_power.len(),
            self.gpu_temp.len(),
            self.gpu_power.len(),
            self.gpu_util.len(),
            self.gpu_mem_util.len(),
            self.gpu_mem_used.len(),
            self.gpu_freq.len(),
            self.ram_used.len(),
            self.net_download.len(),
            self.net_upload.len(),
        ]
    }

    /// True when every series holds exactly one entry per tick.
    pub fn is_aligned(&self) -> bool {
        let n = self.timestamps.len();
        self.series_lengths().iter().all(|&l| l == n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{GpuReading, MemoryReading};
    use std::sync::Arc;

    fn tick(label: &str) -> TickValues {
        TickValues {
            timestamp: label.to_string(),
            ..TickValues::default()
        }
    }

    fn full_tick(label: &str, v: f64) -> TickValues {
        TickValues {
            timestamp: label.to_string(),
            cpu_temp: Some(v),
            cpu_usage: Some(v),
            cpu_cores: Some(vec![v, v]),
            cpu_freq: Some(v),
            cpu_fan: Some(v),
            gpu_fan: Some(v),
            cpu_power: Some(v),
            gpu: Some(GpuReading {
                temp_c: v,
                power_w: v,
                util_pct: v,
                mem_util_pct: v,
                mem_used_mib: 1024.0,
                mem_total_mib: 8192.0,
                freq_mhz: v,
            }),
            memory: Some(MemoryReading {
                total_bytes: 32 * 1024 * 1024 * 1024,
                used_bytes: 8 * 1024 * 1024 * 1024,
            }),
            net: Some(Throughput {
                download_mbps: v,
                upload_mbps: v,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Alignment invariant
    // -----------------------------------------------------------------------

    #[test]
    fn empty_snapshot_is_aligned() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        let snap = h.snapshot();
        assert!(snap.is_aligned());
        assert_eq!(snap.timestamps.len(), 0);
    }

    #[test]
    fn absent_values_still_fill_every_series() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        h.append_tick(tick("00:00:01"), Vec::new());
        h.append_tick(full_tick("00:00:02", 1.0), Vec::new());
        h.append_tick(tick("00:00:03"), Vec::new());

        let snap = h.snapshot();
        assert!(snap.is_aligned());
        assert_eq!(snap.timestamps.len(), 3);
        assert_eq!(snap.cpu_temp, vec![0.0, 1.0, 0.0]);
        assert_eq!(snap.gpu_power, vec![0.0, 1.0, 0.0]);
        assert_eq!(snap.net_download, vec![0.0, 1.0, 0.0]);
    }

    // -----------------------------------------------------------------------
    // Capacity / eviction
    // -----------------------------------------------------------------------

    #[test]
    fn eviction_drops_exactly_the_oldest() {
        let h = MetricHistory::new(60);
        for i in 0..=60 {
            let mut t = tick(&format!("t{i}"));
            t.cpu_usage = Some(i as f64);
            h.append_tick(t, Vec::new());
        }
        let snap = h.snapshot();
        assert!(snap.is_aligned());
        assert_eq!(snap.cpu_usage.len(), 60);
        assert_eq!(snap.cpu_usage[0], 1.0);
        assert_eq!(snap.cpu_usage[59], 60.0);
        assert_eq!(snap.timestamps[0], "t1");
    }

    #[test]
    fn small_capacity_window_slides() {
        let h = MetricHistory::new(3);
        for i in 0..5 {
            let mut t = tick(&format!("t{i}"));
            t.cpu_temp = Some(i as f64);
            h.append_tick(t, Vec::new());
        }
        let snap = h.snapshot();
        assert_eq!(snap.cpu_temp, vec![2.0, 3.0, 4.0]);
    }

    // -----------------------------------------------------------------------
    // num_cores latch and per-core width
    // -----------------------------------------------------------------------

    #[test]
    fn num_cores_latches_on_first_success() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        h.append_tick(tick("t0"), Vec::new());
        assert_eq!(h.snapshot().num_cores, 0);
        assert_eq!(h.snapshot().cpu_cores[0].len(), 0);

        let mut t = tick("t1");
        t.cpu_cores = Some(vec![1.0, 2.0, 3.0, 4.0]);
        h.append_tick(t, Vec::new());
        assert_eq!(h.snapshot().num_cores, 4);
    }

    #[test]
    fn num_cores_never_relatches() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        let mut t = tick("t0");
        t.cpu_cores = Some(vec![1.0, 2.0]);
        h.append_tick(t, Vec::new());

        let mut t = tick("t1");
        t.cpu_cores = Some(vec![1.0, 2.0, 3.0, 4.0]);
        h.append_tick(t, Vec::new());

        let snap = h.snapshot();
        assert_eq!(snap.num_cores, 2);
        // Later readings are held to the latched width.
        assert_eq!(snap.cpu_cores[1], vec![1.0, 2.0]);
    }

    #[test]
    fn absent_cores_fill_with_zeros_at_latched_width() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        let mut t = tick("t0");
        t.cpu_cores = Some(vec![10.0, 20.0, 30.0]);
        h.append_tick(t, Vec::new());
        h.append_tick(tick("t1"), Vec::new());

        let snap = h.snapshot();
        assert_eq!(snap.cpu_cores[1], vec![0.0, 0.0, 0.0]);
        assert!(snap.cpu_cores.iter().all(|v| v.len() == snap.num_cores));
    }

    // -----------------------------------------------------------------------
    // Gauges
    // -----------------------------------------------------------------------

    #[test]
    fn gauges_are_sticky_across_failed_ticks() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        h.append_tick(full_tick("t0", 1.0), Vec::new());
        h.append_tick(tick("t1"), Vec::new());

        let snap = h.snapshot();
        assert_eq!(snap.ram_total, 32.0);
        assert_eq!(snap.gpu_mem_total, 8.0);
        // The windowed series still records the gap as zero.
        assert_eq!(snap.ram_used, vec![8.0, 0.0]);
        assert_eq!(snap.gpu_mem_used, vec![1.0, 0.0]);
    }

    // -----------------------------------------------------------------------
    // Serialization contract
    // -----------------------------------------------------------------------

    #[test]
    fn snapshot_serializes_with_wire_field_names() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        h.append_tick(full_tick("12:00:00", 2.0), Vec::new());
        let json = serde_json::to_value(h.snapshot()).unwrap();

        for key in [
            "timestamps",
            "cpu_temp",
            "cpu_usage",
            "cpu_cores",
            "cpu_freq",
            "cpu_fan",
            "gpu_fan",
            "cpu_power",
            "gpu_temp",
            "gpu_power",
            "gpu_util",
            "gpu_mem_util",
            "gpu_mem_used",
            "gpu_mem_total",
            "gpu_freq",
            "ram_used",
            "ram_total",
            "num_cores",
            "net_download",
            "net_upload",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["timestamps"][0], "12:00:00");
    }

    // -----------------------------------------------------------------------
    // Health report
    // -----------------------------------------------------------------------

    #[test]
    fn health_report_reflects_latest_tick() {
        let h = MetricHistory::new(DEFAULT_CAPACITY);
        assert_eq!(h.health_report().status, "starting");

        h.append_tick(
            tick("t0"),
            vec![ProbeHealth {
                name: "cpu_temp",
                healthy: true,
                failures: 0,
            }],
        );
        let report = h.health_report();
        assert_eq!(report.status, "collecting");
        assert_eq!(report.window, 1);
        assert_eq!(report.capacity, DEFAULT_CAPACITY);
        assert_eq!(report.probes.len(), 1);
        assert!(report.probes[0].healthy);
    }

    // -----------------------------------------------------------------------
    // Concurrency: one writer, many readers
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_readers_never_see_torn_state() {
        let h = Arc::new(MetricHistory::new(30));
        let writer = {
            let h = Arc::clone(&h);
            std::thread::spawn(move || {
                for i in 0..500 {
                    h.append_tick(full_tick(&format!("t{i}"), i as f64), Vec::new());
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let h = Arc::clone(&h);
                std::thread::spawn(move || {
                    let mut last_len = 0;
                    for _ in 0..500 {
                        let snap = h.snapshot();
                        assert!(snap.is_aligned(), "torn snapshot observed");
                        // Windows only grow (until capacity); never rewind.
                        assert!(snap.timestamps.len() >= last_len);
                        last_len = snap.timestamps.len().min(30);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for r in readers {
            r.join().unwrap();
        }
    }
}
