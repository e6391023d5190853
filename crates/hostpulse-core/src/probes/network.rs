//! Network counter probe backed by `/proc/net/dev`.
//!
//! Reports raw cumulative byte counters; the throughput estimator turns
//! successive samples into Mbps.

use std::path::{Path, PathBuf};

use crate::probe::{MetricKind, NetCounters, Probe, ProbeInfo, Reading};

const NET_DEV_PATH: &str = "/proc/net/dev";

static NETWORK_INFO: ProbeInfo = ProbeInfo {
    name: "network",
    description: "Cumulative rx/tx bytes over all non-loopback interfaces from /proc/net/dev",
    kind: MetricKind::Network,
};

/// Sum rx/tx byte counters across all non-loopback interfaces.
///
/// `/proc/net/dev` carries two header lines, then one row per interface:
/// ```text
/// Inter-|   Receive                                                |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
///     lo: 1839494   18327    0    0    0     0          0         0  1839494   18327    0    0    0     0       0          0
///   eth0: 98765432  654321    0    0    0     0          0         0  12345678  123456    0    0    0     0       0          0
/// ```
/// Received bytes are the first counter column, transmitted bytes the ninth.
fn parse_net_dev(contents: &str) -> Option<NetCounters> {
    let mut rx_bytes: u64 = 0;
    let mut tx_bytes: u64 = 0;
    let mut seen = false;

    for line in contents.lines().skip(2) {
        let Some((iface_raw, stats_raw)) = line.split_once(':') else {
            continue;
        };
        if iface_raw.trim() == "lo" {
            continue;
        }
        let fields: Vec<&str> = stats_raw.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }
        let (Ok(rx), Ok(tx)) = (fields[0].parse::<u64>(), fields[8].parse::<u64>()) else {
            continue;
        };
        rx_bytes += rx;
        tx_bytes += tx;
        seen = true;
    }

    if seen {
        Some(NetCounters { rx_bytes, tx_bytes })
    } else {
        None
    }
}

/// Cumulative network byte counters.
///
/// The source path is injectable so tests can feed a fake `/proc/net/dev`.
pub struct NetDevProbe {
    path: PathBuf,
}

impl NetDevProbe {
    pub fn new() -> Self {
        Self::with_path(Path::new(NET_DEV_PATH))
    }

    /// Read from `path` in place of `/proc/net/dev`.
    pub fn with_path(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl Default for NetDevProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for NetDevProbe {
    fn info(&self) -> &ProbeInfo {
        &NETWORK_INFO
    }

    fn is_available(&self) -> bool {
        self.path.exists()
    }

    fn sample(&self) -> Option<Reading> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        parse_net_dev(&contents).map(Reading::Network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NET_DEV_SAMPLE: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1839494   18327    0    0    0     0          0         0  1839494   18327    0    0    0     0       0          0
  eth0: 98765432  654321    0    0    0     0          0         0  12345678  123456    0    0    0     0       0          0
 wlan0:  1000000    9999    0    0    0     0          0         0   2000000   19999    0    0    0     0       0          0
";

    #[test]
    fn sums_non_loopback_interfaces() {
        let n = parse_net_dev(NET_DEV_SAMPLE).unwrap();
        assert_eq!(n.rx_bytes, 98_765_432 + 1_000_000);
        assert_eq!(n.tx_bytes, 12_345_678 + 2_000_000);
    }

    #[test]
    fn loopback_only_is_absent() {
        let contents = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1839494   18327    0    0    0     0          0         0  1839494   18327    0    0    0     0       0          0
";
        assert!(parse_net_dev(contents).is_none());
    }

    #[test]
    fn empty_input_is_absent() {
        assert!(parse_net_dev("").is_none());
    }

    #[test]
    fn sample_from_injected_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net_dev");
        std::fs::write(&path, NET_DEV_SAMPLE).unwrap();
        let probe = NetDevProbe::with_path(&path);
        assert!(probe.is_available());
        let Some(Reading::Network(n)) = probe.sample() else {
            panic!("expected network counters");
        };
        assert_eq!(n.rx_bytes, 99_765_432);
    }

    #[test]
    fn probe_metadata() {
        assert_eq!(NetDevProbe::new().name(), "network");
        assert_eq!(NETWORK_INFO.kind, MetricKind::Network);
    }
}
