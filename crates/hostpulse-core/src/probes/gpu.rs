//! NVIDIA GPU probe backed by `nvidia-smi` structured query output.

use std::time::Duration;

use crate::probe::{GpuReading, MetricKind, Probe, ProbeInfo, Reading};

use super::helpers::{command_exists, run_command};

/// Timeout for one `nvidia-smi` invocation.
const NVIDIA_SMI_TIMEOUT: Duration = Duration::from_secs(2);

/// Fields requested from nvidia-smi, in the order [`parse_gpu_row`] expects.
const QUERY_FIELDS: &str = "temperature.gpu,power.draw,utilization.gpu,\
utilization.memory,memory.used,memory.total,clocks.current.graphics";

/// Parse one CSV row of `nvidia-smi --format=csv,noheader,nounits` output.
///
/// ```text
/// 54, 38.29, 12, 5, 1024, 8192, 1350
/// ```
fn parse_gpu_row(row: &str) -> Option<GpuReading> {
    let fields: Vec<f64> = row
        .split(',')
        .map(|f| f.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    if fields.len() != 7 {
        return None;
    }
    Some(GpuReading {
        temp_c: fields[0],
        power_w: fields[1],
        util_pct: fields[2],
        mem_util_pct: fields[3],
        mem_used_mib: fields[4],
        mem_total_mib: fields[5],
        freq_mhz: fields[6],
    })
}

/// Full GPU stats row from `nvidia-smi`. Multi-GPU machines report one row
/// per device; the first device is used.
pub struct GpuStatsProbe;

static GPU_INFO: ProbeInfo = ProbeInfo {
    name: "gpu",
    description: "NVIDIA GPU temperature, power, utilization, memory, and clock via nvidia-smi",
    kind: MetricKind::Gpu,
};

impl Probe for GpuStatsProbe {
    fn info(&self) -> &ProbeInfo {
        &GPU_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("nvidia-smi")
    }

    fn sample(&self) -> Option<Reading> {
        let query = format!("--query-gpu={QUERY_FIELDS}");
        let out = run_command(
            "nvidia-smi",
            &[&query, "--format=csv,noheader,nounits"],
            NVIDIA_SMI_TIMEOUT,
        )?;
        parse_gpu_row(out.lines().next()?).map(Reading::Gpu)
    }
}
