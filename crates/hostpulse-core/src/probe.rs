//! Abstract metric probe trait and the typed readings probes produce.
//!
//! Every metric source implements the [`Probe`] trait, which provides
//! metadata via [`ProbeInfo`], an availability check, and best-effort
//! sampling. A probe that cannot deliver a value for any reason (missing
//! utility, timeout, unparseable output) returns `None`; it never panics
//! into the caller and never substitutes a sentinel number.

/// Which history slot a probe feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// CPU package temperature (°C).
    CpuTemp,
    /// Overall CPU user utilization (%).
    CpuUsage,
    /// Per-core CPU utilization (%).
    CpuCores,
    /// CPU clock (MHz).
    CpuFreq,
    /// CPU fan speed (RPM).
    CpuFan,
    /// GPU fan speed (RPM).
    GpuFan,
    /// Raw CPU energy accumulator (µJ), input to the power estimator.
    CpuEnergy,
    /// Full NVIDIA GPU stats row.
    Gpu,
    /// System memory totals.
    Memory,
    /// Raw network byte counters, input to the throughput estimator.
    Network,
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CpuTemp => write!(f, "cpu_temp"),
            Self::CpuUsage => write!(f, "cpu_usage"),
            Self::CpuCores => write!(f, "cpu_cores"),
            Self::CpuFreq => write!(f, "cpu_freq"),
            Self::CpuFan => write!(f, "cpu_fan"),
            Self::GpuFan => write!(f, "gpu_fan"),
            Self::CpuEnergy => write!(f, "cpu_energy"),
            Self::Gpu => write!(f, "gpu"),
            Self::Memory => write!(f, "memory"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Metadata about a metric probe.
#[derive(Debug, Clone)]
pub struct ProbeInfo {
    /// Unique identifier (e.g. `"cpu_temp"`).
    pub name: &'static str,
    /// One-line human-readable description of the underlying source.
    pub description: &'static str,
    /// History slot this probe feeds.
    pub kind: MetricKind,
}

/// One NVIDIA GPU stats row as reported by `nvidia-smi`.
///
/// Memory fields stay in MiB here; the history store converts to GB when
/// appending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuReading {
    pub temp_c: f64,
    pub power_w: f64,
    pub util_pct: f64,
    pub mem_util_pct: f64,
    pub mem_used_mib: f64,
    pub mem_total_mib: f64,
    pub freq_mhz: f64,
}

/// System memory totals in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryReading {
    pub total_bytes: u64,
    pub used_bytes: u64,
}

/// Raw CPU energy accumulator sample.
///
/// `max_range_uj` is the counter's declared range, needed only to correct a
/// wraparound; it is `None` when the range file could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnergyReading {
    pub energy_uj: u64,
    pub max_range_uj: Option<u64>,
}

/// Monotonic byte counters summed across all non-loopback interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// A single successful probe result.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Scalar(f64),
    PerCore(Vec<f64>),
    Gpu(GpuReading),
    Memory(MemoryReading),
    Energy(EnergyReading),
    Network(NetCounters),
}

/// Trait that every metric probe must implement.
pub trait Probe: Send + Sync {
    /// Probe metadata.
    fn info(&self) -> &ProbeInfo;

    /// Check if this probe can operate on the current machine.
    fn is_available(&self) -> bool;

    /// Take one sample. `None` means the source was unavailable, timed out,
    /// or produced output the probe could not parse.
    fn sample(&self) -> Option<Reading>;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
