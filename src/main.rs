//! # uart_scope entry point
//! Wires the acquisition core to a text monitor.
//!
//! ## Flow
//! - Parse flags → immutable `AcquisitionConfig`.
//! - Rolling windows (`C` × `W`, zero-filled) shared by `Arc` between producer and consumer.
//! - Acquirer thread: serial port or simulated sinusoids → parse → normalize → windows.
//! - Monitor on the main thread: snapshot + summary every refresh tick.
//! - Ctrl-C, `--duration` or a dead producer ends the monitor; the acquirer is then
//!   stopped with a bounded join.
//!
//! ## Exit codes
//! - `0` normal shutdown, `1` invalid configuration, `2` source could not be opened.

use clap::Parser;
use log::{error, info};
use std::{
    sync::{Arc, atomic::Ordering},
    time::Instant,
};

use uart_scope::{
    Acquirer, AcquirerState, RollingBuffer,
    cli::{Cli, EXIT_CONNECTION_FAILED, EXIT_INVALID_CONFIG, EXIT_OK, init_logging, interrupt_flag},
    display::monitor::Monitor,
};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let config = match cli.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INVALID_CONFIG;
        }
    };

    let buffers = match RollingBuffer::new(config.channels, config.window) {
        Ok(b) => Arc::new(b),
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_INVALID_CONFIG;
        }
    };

    let refresh = config.refresh_interval();
    let interrupted = interrupt_flag();
    let mut acquirer = Acquirer::new(config, buffers.clone());
    if let Err(e) = acquirer.start() {
        eprintln!("{}", e);
        return if e.is_connection() { EXIT_CONNECTION_FAILED } else { EXIT_INVALID_CONFIG };
    }
    info!("=== UART SCOPE START ===");

    let monitor = Monitor::new(buffers, cli.title.clone(), cli.style(), refresh);
    let until = cli.run_for().map(|d| Instant::now() + d);
    let ticks = monitor.run(until, || {
        !interrupted.load(Ordering::SeqCst) && acquirer.state() == AcquirerState::Running
    });
    if interrupted.load(Ordering::SeqCst) {
        info!("[Main] interrupted");
    }

    info!("[Main] {} monitor ticks, shutting down...", ticks);
    if !acquirer.stop() {
        error!("[Main] acquirer did not stop in time, exiting anyway");
    }
    info!("[Main] acquisition stats: {}", acquirer.stats().to_json());
    info!("=== UART SCOPE FINISHED ===");
    EXIT_OK
}
