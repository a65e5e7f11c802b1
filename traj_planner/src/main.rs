//! # Trajectory Planner Runner
//!
//! Loads a planner configuration and a move program, performs RT setup,
//! then drives the planner once per cycle and publishes telemetry as JSON
//! lines. Ctrl-C requests a cooperative abort: motion decelerates to rest
//! before the queue is discarded and the runner exits.

use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use traj_common::config::LogLevel;
use traj_planner::config::{LoadedConfig, load_config};
use traj_planner::program::Program;
use traj_planner::runner::{CycleRunner, rt_setup};

/// Trajectory planner runner: feeds a move program through the planner
#[derive(Parser, Debug)]
#[command(name = "traj_planner")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Paced real-time trajectory planner simulation")]
struct Args {
    /// Path to the planner configuration TOML.
    #[arg(long, default_value = "config/planner.toml")]
    config: PathBuf,

    /// Path to the move program TOML.
    #[arg(long, default_value = "config/program.toml")]
    program: PathBuf,

    /// Stop after this many cycles (overrides `[runner] max_cycles`).
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Request an abort after this many cycles.
    #[arg(long, value_name = "CYCLES")]
    abort_after: Option<u64>,

    /// Write telemetry records to this JSON-lines file.
    #[arg(long, value_name = "PATH")]
    telemetry: Option<PathBuf>,

    /// Run cycles back to back instead of sleeping to the cycle boundary.
    #[arg(long)]
    no_pacing: bool,

    /// CPU core to pin the RT thread to (overrides config).
    #[arg(long)]
    cpu_core: Option<usize>,

    /// SCHED_FIFO priority (overrides config).
    #[arg(long)]
    rt_priority: Option<i32>,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    // Config is needed before tracing for its log level; report load errors
    // on stderr.
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}: {e}", args.config.display());
            process::exit(1);
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!(
        "Trajectory planner v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );

    if let Err(e) = run(&args, config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Trajectory planner shutdown complete");
}

fn run(args: &Args, mut config: LoadedConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(max_cycles) = args.max_cycles {
        config.runner.max_cycles = max_cycles;
    }
    if args.no_pacing {
        config.runner.pacing = false;
    }
    if let Some(cpu_core) = args.cpu_core {
        config.runner.cpu_core = cpu_core;
    }
    if let Some(rt_priority) = args.rt_priority {
        config.runner.rt_priority = rt_priority;
    }
    config.runner.validate()?;

    info!(
        "Config OK: cycle_time={}µs, queue={}, v_max={}, a_max={}",
        config.planner.cycle_time_us,
        config.planner.queue_size,
        config.planner.max_velocity,
        config.planner.max_acceleration,
    );

    let program = Program::load(&args.program)?;
    info!(
        "Loaded program {} ({} commands)",
        args.program.display(),
        program.moves.len()
    );

    let mut runner = CycleRunner::new(&config, program)?.with_abort_after(args.abort_after);
    if let Some(path) = &args.telemetry {
        let file = File::create(path)?;
        runner = runner.with_telemetry(Box::new(BufWriter::new(file)));
        info!("Publishing telemetry to {}", path.display());
    }

    rt_setup(config.runner.cpu_core, config.runner.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        config.runner.cpu_core, config.runner.rt_priority
    );

    // Ctrl-C clears the flag; the runner turns that into an abort.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    let summary = runner.run(&running)?;
    info!(
        "Run finished: cycles={}, segments={}, rejected={}, unsent={}, aborted={}",
        summary.cycles,
        summary.segments_finished,
        summary.rejected,
        summary.unsent,
        summary.aborted
    );
    info!(
        "Final pose: x={:.6} y={:.6} z={:.6} a={:.6} b={:.6} c={:.6}",
        summary.final_pos.tran.x,
        summary.final_pos.tran.y,
        summary.final_pos.tran.z,
        summary.final_pos.a,
        summary.final_pos.b,
        summary.final_pos.c
    );
    info!(
        "Cycle stats: avg={}ns min={}ns max={}ns overruns={} telemetry_records={}",
        summary.stats.avg_cycle_ns(),
        summary.stats.min_cycle_ns,
        summary.stats.max_cycle_ns,
        summary.stats.overruns,
        summary.telemetry_records
    );

    Ok(())
}

fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::from(configured)
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
