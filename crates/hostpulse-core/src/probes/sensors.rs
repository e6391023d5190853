//! Probes backed by lm-sensors' `sensors` utility: CPU package temperature
//! and CPU/GPU fan speeds.

use std::time::Duration;

use crate::probe::{MetricKind, Probe, ProbeInfo, Reading};

use super::helpers::{command_exists, first_f64, run_command};

/// Timeout for one `sensors` invocation.
const SENSORS_TIMEOUT: Duration = Duration::from_secs(2);

/// Temperature labels accepted for the CPU package, in preference order.
/// `Tctl`/`Tdie` are AMD k10temp labels, `Package id 0` is Intel coretemp.
const TEMP_LABELS: [&str; 3] = ["Tctl", "Tdie", "Package id 0"];

fn sensors_output() -> Option<String> {
    run_command("sensors", &[], SENSORS_TIMEOUT)
}

/// Extract a temperature in °C for the first matching label.
///
/// `sensors` rows look like:
/// ```text
/// Tctl:         +54.9°C
/// Package id 0:  +41.0°C  (high = +80.0°C, crit = +100.0°C)
/// ```
fn parse_temp(output: &str, labels: &[&str]) -> Option<f64> {
    for line in output.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        if !labels.contains(&key.trim()) {
            continue;
        }
        let value = rest.trim().trim_start_matches('+');
        if let Some(celsius) = value.split('°').next()
            && let Ok(v) = celsius.trim().parse::<f64>()
        {
            return Some(v);
        }
    }
    None
}

/// Extract a fan speed in RPM for an exact label.
///
/// ```text
/// cpu_fan:     1400 RPM
/// gpu_fan:        0 RPM
/// ```
fn parse_rpm(output: &str, label: &str) -> Option<f64> {
    for line in output.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        if key.trim() != label {
            continue;
        }
        let rest = rest.trim();
        if !rest.contains("RPM") {
            continue;
        }
        return first_f64(rest);
    }
    None
}

/// CPU package temperature from `sensors`.
pub struct CpuTempProbe;

static CPU_TEMP_INFO: ProbeInfo = ProbeInfo {
    name: "cpu_temp",
    description: "CPU package temperature from lm-sensors (Tctl/Tdie/Package id 0)",
    kind: MetricKind::CpuTemp,
};

impl Probe for CpuTempProbe {
    fn info(&self) -> &ProbeInfo {
        &CPU_TEMP_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("sensors")
    }

    fn sample(&self) -> Option<Reading> {
        parse_temp(&sensors_output()?, &TEMP_LABELS).map(Reading::Scalar)
    }
}

/// CPU fan speed from `sensors`.
pub struct CpuFanProbe;

static CPU_FAN_INFO: ProbeInfo = ProbeInfo {
    name: "cpu_fan",
    description: "CPU fan speed from lm-sensors (cpu_fan row)",
    kind: MetricKind::CpuFan,
};

impl Probe for CpuFanProbe {
    fn info(&self) -> &ProbeInfo {
        &CPU_FAN_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("sensors")
    }

    fn sample(&self) -> Option<Reading> {
        parse_rpm(&sensors_output()?, "cpu_fan").map(Reading::Scalar)
    }
}

/// GPU fan speed from `sensors`.
pub struct GpuFanProbe;

static GPU_FAN_INFO: ProbeInfo = ProbeInfo {
    name: "gpu_fan",
    description: "GPU fan speed from lm-sensors (gpu_fan row)",
    kind: MetricKind::GpuFan,
};

impl Probe for GpuFanProbe {
    fn info(&self) -> &ProbeInfo {
        &GPU_FAN_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("sensors")
    }

    fn sample(&self) -> Option<Reading> {
        parse_rpm(&sensors_output()?, "gpu_fan").map(Reading::Scalar)
    }
}
