//! Async acquisition entry point: same flags as `uart_scope`, tokio runtime instead
//! of a dedicated acquirer thread.
//!
//! Acquisition runs as a tokio task; the text monitor runs on a blocking thread and
//! shuts the task down through its `CancellationToken` when the duration elapses.

use clap::Parser;
use log::{error, info};
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;

use uart_scope::{
    RollingBuffer,
    advanced::async_acquirer::spawn_async_acquirer,
    cli::{Cli, EXIT_CONNECTION_FAILED, EXIT_INVALID_CONFIG, EXIT_OK, init_logging},
    display::monitor::Monitor,
};

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level());
    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
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

    let join_timeout = config.join_timeout();
    let refresh = config.refresh_interval();
    let cancel = CancellationToken::new();
    let acquirer = match spawn_async_acquirer(config, buffers.clone(), cancel.clone()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}", e);
            return if e.is_connection() { EXIT_CONNECTION_FAILED } else { EXIT_INVALID_CONFIG };
        }
    };
    info!("=== ASYNC UART SCOPE START ===");

    // Monitor on a blocking thread so redraw pacing never stalls the runtime
    let until = cli.run_for().map(|d| Instant::now() + d);
    let monitor = Monitor::new(buffers, cli.title.clone(), cli.style(), refresh);
    let monitor_token = cancel.clone();
    let monitor_handle = tokio::task::spawn_blocking(move || {
        let ticks = monitor.run(until, || !monitor_token.is_cancelled());
        monitor_token.cancel();
        ticks
    });

    tokio::select! {
        _ = cancel.cancelled() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            cancel.cancel();
        }
    }
    let (joined, stats) = acquirer.shutdown(join_timeout).await;
    if !joined {
        error!("async acquirer did not stop in time, exiting anyway");
    }
    if let Ok(ticks) = monitor_handle.await {
        info!("{} monitor ticks", ticks);
    }
    info!("acquisition stats: {}", stats.to_json());
    info!("=== ASYNC UART SCOPE FINISHED ===");
    EXIT_OK
}
