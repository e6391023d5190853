//! System memory probe backed by `free -b`.

use std::time::Duration;

use crate::probe::{MemoryReading, MetricKind, Probe, ProbeInfo, Reading};

use super::helpers::{command_exists, run_command};

/// Timeout for one `free` invocation.
const FREE_TIMEOUT: Duration = Duration::from_secs(2);

/// Parse total and used bytes from the `Mem:` row of `free -b` output.
///
/// ```text
///                total        used        free      shared  buff/cache   available
/// Mem:     33567600640 10886046720  2110603264   578813952 20570950656 21681553920
/// Swap:     2147479552           0  2147479552
/// ```
fn parse_free(output: &str) -> Option<MemoryReading> {
    for line in output.lines() {
        if !line.starts_with("Mem:") {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            return None;
        }
        return Some(MemoryReading {
            total_bytes: parts[1].parse().ok()?,
            used_bytes: parts[2].parse().ok()?,
        });
    }
    None
}

/// RAM totals from `free`.
pub struct MemoryProbe;

static MEMORY_INFO: ProbeInfo = ProbeInfo {
    name: "memory",
    description: "Total and used system memory from free in byte mode",
    kind: MetricKind::Memory,
};

impl Probe for MemoryProbe {
    fn info(&self) -> &ProbeInfo {
        &MEMORY_INFO
    }

    fn is_available(&self) -> bool {
        command_exists("free")
    }

    fn sample(&self) -> Option<Reading> {
        parse_free(&run_command("free", &["-b"], FREE_TIMEOUT)?).map(Reading::Memory)
    }
}
