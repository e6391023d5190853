//! All metric probe implementations.

pub mod helpers;

pub mod cpu;
pub mod gpu;
pub mod memory;
pub mod network;
pub mod rapl;
pub mod sensors;

use crate::probe::Probe;

/// The default probe inventory, one probe per history slot.
pub fn default_set() -> Vec<Box<dyn Probe>> {
    vec![
        // sensors
        Box::new(sensors::CpuTempProbe),
        Box::new(sensors::CpuFanProbe),
        Box::new(sensors::GpuFanProbe),
        // CPU
        Box::new(cpu::CpuUsageProbe),
        Box::new(cpu::CpuCoresProbe),
        Box::new(cpu::CpuFreqProbe),
        // GPU
        Box::new(gpu::GpuStatsProbe),
        // Memory
        Box::new(memory::MemoryProbe),
        // Counters feeding the derived-rate estimators
        Box::new(rapl::RaplEnergyProbe::new()),
        Box::new(network::NetDevProbe::new()),
    ]
}
