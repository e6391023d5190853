//! # hostpulse-core
//!
//! Hardware telemetry collection core for a single host.
//!
//! A fixed set of [`Probe`]s reads temperatures, fan speeds, utilization,
//! clocks, memory, and raw energy/network counters from OS utilities and
//! `/proc`-style pseudo-files. The [`Collector`] runs them once per tick,
//! turns the raw counters into rates ([`rates`]), and appends exactly one
//! entry per series to the shared [`MetricHistory`] window. Consumers take
//! consistent [`HistorySnapshot`]s concurrently with collection.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::sync::{Arc, mpsc};
//! use std::time::Duration;
//! use hostpulse_core::{Collector, MetricHistory, probes};
//!
//! let history = Arc::new(MetricHistory::new(60));
//! let collector = Collector::new(Arc::clone(&history), probes::default_set());
//!
//! let (stop_tx, stop_rx) = mpsc::channel();
//! let handle = std::thread::spawn(move || collector.run(Duration::from_secs(1), stop_rx));
//!
//! // ... serve history.snapshot() to consumers ...
//!
//! let _ = stop_tx.send(());
//! handle.join().unwrap();
//! ```

pub mod collector;
pub mod history;
pub mod probe;
pub mod probes;
pub mod rates;

pub use collector::{Collector, DEFAULT_PERIOD};
pub use history::{
    DEFAULT_CAPACITY, HealthReport, HistorySnapshot, MetricHistory, ProbeHealth, TickValues,
};
pub use probe::{
    EnergyReading, GpuReading, MemoryReading, MetricKind, NetCounters, Probe, ProbeInfo, Reading,
};
pub use rates::{MIN_ELAPSED_SECS, PowerEstimator, Throughput, ThroughputEstimator};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
