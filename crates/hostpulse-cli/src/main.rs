//! CLI for hostpulse — live hardware telemetry for this machine.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hostpulse")]
#[command(about = "hostpulse — live hardware telemetry dashboard for a single host")]
#[command(version = hostpulse_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect metrics every tick and serve the dashboard over HTTP
    Run {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = 5000)]
        port: u16,

        /// Seconds between collection ticks
        #[arg(long, default_value_t = 1)]
        period_secs: u64,

        /// Number of ticks retained per metric series
        #[arg(long, default_value_t = 60)]
        window: usize,
    },

    /// List all metric probes and whether each can run on this machine
    Scan,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            host,
            port,
            period_secs,
            window,
        } => {
            if let Err(e) = commands::run::run(&host, port, period_secs, window) {
                eprintln!("server error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Scan => commands::scan::run(),
    }
}
