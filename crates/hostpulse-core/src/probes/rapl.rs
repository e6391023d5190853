//! CPU energy probe backed by the powercap RAPL interface.
//!
//! Reads the raw microjoule accumulator; converting successive samples into
//! watts is the power estimator's job, not the probe's.

use std::path::{Path, PathBuf};

use crate::probe::{EnergyReading, MetricKind, Probe, ProbeInfo, Reading};

use super::helpers::read_u64;

/// Default powercap root; the first RAPL zone holds the package counter.
const POWERCAP_ROOT: &str = "/sys/class/powercap";
const RAPL_ZONE: &str = "intel-rapl:0";

static RAPL_INFO: ProbeInfo = ProbeInfo {
    name: "cpu_energy",
    description: "CPU package energy accumulator from powercap RAPL (energy_uj)",
    kind: MetricKind::CpuEnergy,
};

/// Raw RAPL energy counter reads.
///
/// The zone root is injectable so tests can point the probe at a fake sysfs
/// tree.
pub struct RaplEnergyProbe {
    zone: PathBuf,
}

impl RaplEnergyProbe {
    pub fn new() -> Self {
        Self::with_root(Path::new(POWERCAP_ROOT))
    }

    /// Use `root` in place of `/sys/class/powercap`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            zone: root.join(RAPL_ZONE),
        }
    }
}

impl Default for RaplEnergyProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for RaplEnergyProbe {
    fn info(&self) -> &ProbeInfo {
        &RAPL_INFO
    }

    fn is_available(&self) -> bool {
        self.zone.join("energy_uj").exists()
    }

    fn sample(&self) -> Option<Reading> {
        let energy_uj = read_u64(&self.zone.join("energy_uj"))?;
        // The range is only needed when the counter wraps; its absence is not
        // a probe failure.
        let max_range_uj = read_u64(&self.zone.join("max_energy_range_uj"));
        Some(Reading::Energy(EnergyReading {
            energy_uj,
            max_range_uj,
        }))
    }
}
