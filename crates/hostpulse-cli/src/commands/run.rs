//! `hostpulse run` — collector thread plus HTTP server.

use std::sync::{Arc, mpsc};
use std::time::Duration;

use hostpulse_core::{Collector, MetricHistory, probes};

pub fn run(host: &str, port: u16, period_secs: u64, window: usize) -> std::io::Result<()> {
    let history = Arc::new(MetricHistory::new(window));
    let probes = probes::default_set();

    let available = probes.iter().filter(|p| p.is_available()).count();
    let base = format!("http://{host}:{port}");

    println!("hostpulse v{}", hostpulse_core::VERSION);
    println!("   {base}");
    println!(
        "   {available}/{} probes available, {period_secs}s tick, {window}-tick window",
        probes.len()
    );
    println!();
    println!("   Endpoints:");
    println!("     GET /            Dashboard (open {base} in a browser)");
    println!("     GET /api/data    Rolling metric history as JSON");
    println!("     GET /health      Collection status and per-probe health");
    println!();
    println!("   Run `hostpulse scan` to see which probes this machine supports.");
    println!();

    let collector = Collector::new(Arc::clone(&history), probes);
    let (stop_tx, stop_rx) = mpsc::channel();
    let handle =
        std::thread::spawn(move || collector.run(Duration::from_secs(period_secs.max(1)), stop_rx));

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(hostpulse_server::run_server(history, host, port));

    // Server is down (Ctrl-C or bind error); wind the collector down too.
    let _ = stop_tx.send(());
    if let Err(e) = handle.join() {
        log::error!("collector thread panicked: {e:?}");
    }
    result
}
