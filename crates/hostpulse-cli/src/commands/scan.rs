//! `hostpulse scan` — probe availability listing.

use hostpulse_core::probes;

pub fn run() {
    let probes = probes::default_set();
    let available = probes.iter().filter(|p| p.is_available()).count();

    println!("Metric probes on this machine:\n");
    for probe in &probes {
        let mark = if probe.is_available() { "✓" } else { "✗" };
        println!("  {mark} {:<12} {}", probe.name(), probe.info().description);
    }
    println!("\n{available}/{} probes available.", probes.len());
    if available < probes.len() {
        println!("Missing probes degrade to zero readings; collection still runs.");
    }
}
