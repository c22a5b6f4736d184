//! cli.rs
//! Command-line surface shared by both binaries.
//!
//! ```text
//! uart_scope --port /dev/ttyUSB0 --baud 115200 --channels 1
//! uart_scope --port COM3 --baud 9600 --channels 3 --delimiter "," --window 500
//! uart_scope --test --channels 2
//! uart_scope --config bench.json --duration 30
//! ```

use clap::{ArgAction, Parser};
use log::warn;
use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crate::config::{
    AcquisitionConfig, DEFAULT_BAUD, DEFAULT_CHANNELS, DEFAULT_READ_TIMEOUT_MS, DEFAULT_WINDOW,
    SourceConfig,
};
use crate::display::monitor::PlotStyle;
use crate::error::{AcquireError, AcquireResult};

pub const EXIT_OK: i32 = 0;
pub const EXIT_INVALID_CONFIG: i32 = 1;
pub const EXIT_CONNECTION_FAILED: i32 = 2;

#[derive(Debug, Parser)]
#[command(name = "uart_scope", about = "Live view of numeric data coming from a UART/serial device")]
pub struct Cli {
    /// Serial port (e.g. /dev/ttyUSB0 or COM3)
    #[arg(short, long, required_unless_present_any = ["test", "config"])]
    pub port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD)]
    pub baud: u32,

    /// Number of numeric channels per line
    #[arg(short, long, default_value_t = DEFAULT_CHANNELS)]
    pub channels: usize,

    /// Delimiter between numbers in a line (default: any whitespace), e.g. ','
    #[arg(short, long)]
    pub delimiter: Option<String>,

    /// Samples to keep in the rolling window
    #[arg(short, long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Generate simulated data instead of reading a serial port
    #[arg(long)]
    pub test: bool,

    /// Load acquisition settings from a JSON file instead of the flags above
    #[arg(
        long,
        value_name = "FILE",
        conflicts_with_all = ["port", "test", "baud", "channels", "delimiter", "window", "read_timeout_ms"]
    )]
    pub config: Option<PathBuf>,

    /// Label for the monitor output
    #[arg(long, default_value = "UART Live Plot")]
    pub title: String,

    /// Scatter instead of line style
    #[arg(long)]
    pub scatter: bool,

    /// Stop after this many seconds (runs until killed otherwise)
    #[arg(long)]
    pub duration: Option<u64>,

    /// Serial read timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_READ_TIMEOUT_MS)]
    pub read_timeout_ms: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn to_config(&self) -> AcquireResult<AcquisitionConfig> {
        if let Some(path) = &self.config {
            return AcquisitionConfig::load(path);
        }
        let source = if self.test {
            SourceConfig::Simulated
        } else {
            match &self.port {
                Some(port) => SourceConfig::Serial {
                    port: port.clone(),
                    baud: self.baud,
                },
                None => {
                    return Err(AcquireError::InvalidConfig(
                        "Either --port must be provided, or use --test for simulated data.".into(),
                    ));
                }
            }
        };

        let config = AcquisitionConfig {
            channels: self.channels,
            window: self.window,
            delimiter: self.delimiter.clone(),
            source,
            read_timeout_ms: self.read_timeout_ms,
            ..AcquisitionConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn style(&self) -> PlotStyle {
        if self.scatter { PlotStyle::Scatter } else { PlotStyle::Line }
    }

    pub fn run_for(&self) -> Option<Duration> {
        self.duration.map(Duration::from_secs)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// `RUST_LOG` wins over the `-v` count when set.
pub fn init_logging(level: log::LevelFilter) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str()),
    )
    .format_timestamp_millis()
    .try_init();
}

/// Flag raised by Ctrl-C so the binary can run its bounded shutdown.
///
/// Only one handler can be installed per process; later calls log and return a flag
/// that never fires.
pub fn interrupt_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = flag.clone();
    if let Err(e) = ctrlc::set_handler(move || raised.store(true, Ordering::SeqCst)) {
        warn!("Ctrl-C handler not installed: {}", e);
    }
    flag
}
