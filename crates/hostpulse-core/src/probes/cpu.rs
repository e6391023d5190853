//! CPU probes: overall utilization via `top`, per-core utilization via
//! `mpstat`, and clock speed from `/proc/cpuinfo`.

use std::path::Path;
use std::time::Duration;

use crate::probe::{MetricKind, Probe, ProbeInfo, Reading};

use super::helpers::{command_exists, run_command};

/// Timeout for one `top -bn1` invocation.
const TOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout for one `mpstat -P ALL 1 1` invocation. mpstat itself samples for
/// a full second, so this bound sits above that.
const MPSTAT_TIMEOUT: Duration = Duration::from_secs(3);

const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Extract the user CPU percentage from `top -bn1` batch output.
///
/// The summary row looks like:
/// ```text
/// %Cpu(s):  5.9 us,  2.0 sy,  0.0 ni, 91.8 id,  0.2 wa,  0.0 hi,  0.1 si,  0.0 st
/// ```
fn parse_top_user_pct(output: &str) -> Option<f64> {
    for line in output.lines() {
        let Some(idx) = line.find("%Cpu(s):") else {
            continue;
        };
        let mut tokens = line[idx + "%Cpu(s):".len()..].split_whitespace();
        let value = tokens.next()?.parse::<f64>().ok()?;
        if tokens.next()?.starts_with("us") {
            return Some(value);
        }
        return None;
    }
    None
}

/// Extract per-core usage percentages from `mpstat -P ALL 1 1` output.
///
/// Only the trailing `Average:` rows with a numeric CPU id are used; usage is
/// 100 minus the idle column (last field), rounded to two decimals:
/// ```text
/// Average:     CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle
/// Average:     all    5.03    0.00    2.01    0.10    0.00    0.05    0.00    0.00    0.00   92.81
/// Average:       0    4.00    0.00    1.00    0.00    0.00    0.00    0.00    0.00    0.00   95.00
/// ```
fn parse_mpstat_cores(output: &str) -> Option<Vec<f64>> {
    let mut cores = Vec::new();
    for line in output.lines() {
        if !line.trim_start().starts_with("Average:") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 12 || !parts[1].chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let Some(idle) = parts.last().and_then(|v| v.parse::<f64>().ok()) else {
            continue;
        };
        let usage = 100.0 - idle;
        cores.push((usage * 100.0).round() / 100.0);
    }
    if cores.is_empty() { None } else { Some(cores) }
}

/// Extract the first `cpu MHz` value from `/proc/cpuinfo` contents.
///
/// ```text
/// cpu MHz         : 3593.250
/// ```
fn parse_cpuinfo_mhz(contents: &str) -> Option<f64> {
    for line in contents.lines() {
        if line.starts_with("cpu MHz")
            && let Some(value) = line.split(':').nth(1)
        {
            return value.trim().parse().ok();
        }
    }
    None
}

/// Overall CPU user utilization from `top`.
pub struct CpuUsageProbe;

static CPU_USAGE_INFO: ProbeInfo = ProbeInfo {
    name: "cpu_usage",
    description: "Overall CPU user utilization from top batch mode",
    kind: MetricKind::CpuUsage,
};

impl Probe for CpuUsageProbe {
    fn info(&self) -> &ProbeInfo {
        &CPU_USAGE_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("top")
    }

    fn sample(&self) -> Option<Reading> {
        let out = run_command("top", &["-bn1"], TOP_TIMEOUT)?;
        parse_top_user_pct(&out).map(Reading::Scalar)
    }
}

/// Per-core CPU utilization from `mpstat`.
pub struct CpuCoresProbe;

static CPU_CORES_INFO: ProbeInfo = ProbeInfo {
    name: "cpu_cores",
    description: "Per-core CPU utilization from mpstat averages",
    kind: MetricKind::CpuCores,
};

impl Probe for CpuCoresProbe {
    fn info(&self) -> &ProbeInfo {
        &CPU_CORES_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("mpstat")
    }

    fn sample(&self) -> Option<Reading> {
        let out = run_command("mpstat", &["-P", "ALL", "1", "1"], MPSTAT_TIMEOUT)?;
        parse_mpstat_cores(&out).map(Reading::PerCore)
    }
}

/// Current CPU clock from `/proc/cpuinfo`.
pub struct CpuFreqProbe;

static CPU_FREQ_INFO: ProbeInfo = ProbeInfo {
    name: "cpu_freq",
    description: "CPU clock speed from the first cpu MHz row of /proc/cpuinfo",
    kind: MetricKind::CpuFreq,
};

impl Probe for CpuFreqProbe {
    fn info(&self) -> &ProbeInfo {
        &CPU_FREQ_INFO
    }

    fn is_available(&self) -> bool {
        Path::new(CPUINFO_PATH).exists()
    }

    fn sample(&self) -> Option<Reading> {
        let contents = std::fs::read_to_string(CPUINFO_PATH).ok()?;
        parse_cpuinfo_mhz(&contents).map(Reading::Scalar)
    }
}
