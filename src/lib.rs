//! # uart_scope
//! Acquisition pipeline for numeric text streams from a serial link.
//!
//! ```text
//! Source (serial / simulated) → Acquirer → parse → normalize → Sink → RollingBuffer[C]
//!                                                                       ↑ snapshots
//!                                                                  Monitor (consumer)
//! ```
//!
//! - **Acquirer:** one background thread; cooperative stop flag polled between bounded reads.
//! - **RollingBuffer:** `C` windows of `W` samples, zero-filled, FIFO eviction.
//! - **Errors:** only failing to open the source is fatal; everything else is skipped.

pub mod acquisition;
pub mod advanced;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod utils;

pub use acquisition::acquirer::{Acquirer, AcquirerState};
pub use acquisition::parser::{normalize, parse_line};
pub use acquisition::sink::{ChannelSink, FnSink, Sink};
pub use config::{AcquisitionConfig, SourceConfig};
pub use display::rolling_buffer::RollingBuffer;
pub use error::{AcquireError, AcquireResult};
