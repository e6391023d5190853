//! Derived-rate estimators: watts from an energy accumulator and Mbps from
//! byte counters.
//!
//! Both estimators own the previous raw sample between ticks. The first call
//! seeds that state and reports a zero rate; every later call computes the
//! rate over the elapsed interval and reseeds unconditionally, so one bad
//! sample never poisons the next.

/// Shortest interval a rate is computed over, in seconds. Intervals below
/// this yield a zero rate instead of dividing by a near-zero elapsed time;
/// at the 1 s tick period the guard only engages under scheduler pathology.
pub const MIN_ELAPSED_SECS: f64 = 1e-3;

/// Converts successive energy-accumulator samples (µJ) into watts.
#[derive(Debug, Default)]
pub struct PowerEstimator {
    prev: Option<(u64, f64)>,
}

impl PowerEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw counter sample taken at monotonic time `t_secs`.
    ///
    /// Returns `Some(0.0)` on the seeding call, `Some(watts)` afterwards. A
    /// wrapped counter is corrected with `max_range_uj`; if the counter
    /// wrapped and no range is known the sample is unusable and `None` is
    /// returned for this tick only; state still advances.
    pub fn update(&mut self, energy_uj: u64, max_range_uj: Option<u64>, t_secs: f64) -> Option<f64> {
        let Some((prev_uj, prev_t)) = self.prev.replace((energy_uj, t_secs)) else {
            return Some(0.0);
        };

        let mut delta_uj = energy_uj as i64 - prev_uj as i64;
        if delta_uj < 0 {
            let Some(range) = max_range_uj else {
                log::warn!("energy counter wrapped but max range is unreadable; dropping sample");
                return None;
            };
            delta_uj += range as i64;
        }

        let elapsed = t_secs - prev_t;
        if elapsed < MIN_ELAPSED_SECS {
            return Some(0.0);
        }
        Some((delta_uj as f64 / 1_000_000.0) / elapsed)
    }
}

/// Download/upload rates in megabits per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Throughput {
    pub download_mbps: f64,
    pub upload_mbps: f64,
}

/// Converts successive rx/tx byte counters into [`Throughput`].
#[derive(Debug, Default)]
pub struct ThroughputEstimator {
    prev: Option<(u64, u64, f64)>,
}

impl ThroughputEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one pair of cumulative byte counters taken at monotonic time
    /// `t_secs`.
    ///
    /// Returns zero rates on the seeding call. Counter resets (an interface
    /// going away) show up as negative rates and are passed through rather
    /// than corrected; byte counters do not wrap at this timescale.
    pub fn update(&mut self, rx_bytes: u64, tx_bytes: u64, t_secs: f64) -> Throughput {
        let Some((prev_rx, prev_tx, prev_t)) = self.prev.replace((rx_bytes, tx_bytes, t_secs))
        else {
            return Throughput::default();
        };

        let elapsed = t_secs - prev_t;
        if elapsed < MIN_ELAPSED_SECS {
            return Throughput::default();
        }

        let rx_delta = rx_bytes as f64 - prev_rx as f64;
        let tx_delta = tx_bytes as f64 - prev_tx as f64;
        Throughput {
            download_mbps: (rx_delta / elapsed) * 8.0 / 1_000_000.0,
            upload_mbps: (tx_delta / elapsed) * 8.0 / 1_000_000.0,
        }
    }
}
