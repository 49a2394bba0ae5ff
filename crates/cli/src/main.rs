//! DRAM controller timing-model CLI.
//!
//! This binary drives one memory controller from the command line. It performs:
//! 1. **Trace run:** Replay a JSON request trace and report latencies and statistics.
//! 2. **Timing dump:** Print the derived latencies and the scoped timing tables of a
//!    configuration.
//!
//! Log verbosity follows `RUST_LOG` (for example `RUST_LOG=dramsim_core=debug`).

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dramsim_core::MemControllerBuilder;
use dramsim_core::config::DramConfig;
use dramsim_core::sim::{TraceRunner, load_trace};

#[derive(Parser, Debug)]
#[command(
    name = "dramsim",
    author,
    version,
    about = "Cycle-level DRAM memory-controller timing model",
    long_about = "Replay request traces through a cycle-level DRAM controller model, or inspect the timing tables a configuration produces.\n\nExamples:\n  dramsim run --trace traces/stream.json\n  dramsim run --config configs/gddr5.json --trace traces/stream.json --verbose\n  dramsim timing --config configs/ddr4.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON trace through one controller.
    Run {
        /// JSON trace of timed read and write requests.
        #[arg(short, long)]
        trace: PathBuf,

        /// JSON controller configuration; defaults to DDR3-1600.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Give up after this many cycles.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Print the latency of every request.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the derived latencies and timing tables of a configuration.
    Timing {
        /// JSON controller configuration; defaults to DDR3-1600.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            trace,
            config,
            max_cycles,
            verbose,
        } => cmd_run(&trace, config.as_deref(), max_cycles, verbose),
        Commands::Timing { config } => cmd_timing(config.as_deref()),
    }
}

fn load_builder(config: Option<&Path>) -> MemControllerBuilder {
    let Some(path) = config else {
        return MemControllerBuilder::new();
    };
    match DramConfig::from_json_file(path) {
        Ok(config) => MemControllerBuilder::from_config(config),
        Err(e) => {
            eprintln!("Error loading config {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn cmd_run(trace_path: &Path, config: Option<&Path>, max_cycles: Option<u64>, verbose: bool) {
    let builder = load_builder(config);
    let entries = match load_trace(trace_path) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error loading trace {}: {e}", trace_path.display());
            process::exit(1);
        }
    };
    let ctrl = match builder.build("MemCtrl") {
        Ok(ctrl) => ctrl,
        Err(e) => {
            eprintln!("Error building controller: {e}");
            process::exit(1);
        }
    };

    println!("[*] Protocol: {}", builder.config().protocol);
    println!("[*] Trace: {} ({} requests)", trace_path.display(), entries.len());

    let mut runner = TraceRunner::new(ctrl);
    if let Some(limit) = max_cycles {
        runner = runner.with_max_cycles(limit);
    }

    let report = match runner.run(entries) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n[!] Run failed: {e}");
            println!("{}", runner.controller().stats());
            process::exit(1);
        }
    };

    info!(
        final_cycle = report.final_cycle,
        requests = report.completions.len(),
        "trace replay finished"
    );

    if verbose {
        println!();
        println!("{:>8} {:>6} {:>18} {:>10} {:>10} {:>8}", "id", "op", "address", "issued", "done", "latency");
        for c in &report.completions {
            println!(
                "{:>8} {:>6} {:>#18x} {:>10} {:>10} {:>8}",
                c.request_id,
                c.access,
                c.address,
                c.issued_at,
                c.completed_at,
                c.latency()
            );
        }
    }

    println!();
    println!("[*] Final cycle: {}", report.final_cycle);
    println!("[*] Mean latency: {:.2} cycles", report.mean_latency());
    println!("{}", report.stats);
}

fn cmd_timing(config: Option<&Path>) {
    let builder = load_builder(config);
    let derived = match builder.derived_timing() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let timing = match builder.generate_timing() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    println!("Protocol: {}", builder.config().protocol);
    println!();
    println!("{derived}");
    println!();
    print!("{timing}");
}
