//! serial.rs
//! Serial port line source (e.g. /dev/ttyUSB0, /dev/ttyACM0, COM3).
//!
//! Opens 8N1 with no flow control. Bytes are accumulated until `\n`; a line split
//! across reads is carried over, and a timeout with a partial line pending reports
//! EMPTY without discarding the partial bytes. Decoding is lossy.

use log::{debug, info, trace};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::{
    io::{ErrorKind, Read},
    thread,
    time::{Duration, Instant},
};

use super::source::LineSource;
use crate::error::{AcquireError, AcquireResult};

/// Longest line kept; anything longer is binary noise or a baud mismatch.
pub const MAX_LINE_BYTES: usize = 4096;
const READ_CHUNK: usize = 256;

/// Splits a byte stream into text lines.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Vec<u8>,
    discarded: u64,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
        if self.pending.len() > MAX_LINE_BYTES && !self.pending.contains(&b'\n') {
            trace!("discarding {} bytes without line terminator", self.pending.len());
            self.discarded += self.pending.len() as u64;
            self.pending.clear();
        }
    }

    /// Next complete line, terminator and trailing `\r` stripped.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|b| *b == b'\n')?;
        let raw: Vec<u8> = self.pending.drain(..=pos).collect();
        let text = String::from_utf8_lossy(&raw[..pos]);
        Some(text.trim_end_matches('\r').to_string())
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn discarded_bytes(&self) -> u64 {
        self.discarded
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

pub struct SerialLineSource {
    address: String,
    baud: u32,
    port: Option<Box<dyn SerialPort>>,
    port_timeout: Duration,
    assembler: LineAssembler,
}

impl SerialLineSource {
    /// Fails with `AcquireError::Connection` if the device cannot be opened.
    pub fn open(address: &str, baud: u32, timeout: Duration) -> AcquireResult<Self> {
        info!("Opening serial port: {} at {} baud", address, baud);

        let port = serialport::new(address, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| AcquireError::connection(address, e))?;

        info!("Serial port {} opened", address);
        Ok(Self::from_port(address, baud, port, timeout))
    }

    /// Wrap a port that is already open and configured.
    pub fn from_port(
        address: &str,
        baud: u32,
        mut port: Box<dyn SerialPort>,
        timeout: Duration,
    ) -> Self {
        let port_timeout = match port.set_timeout(timeout) {
            Ok(()) => timeout,
            Err(_) => port.timeout(),
        };
        Self {
            address: address.to_string(),
            baud,
            port: Some(port),
            port_timeout,
            assembler: LineAssembler::new(),
        }
    }
}

impl LineSource for SerialLineSource {
    fn read_line(&mut self, timeout: Duration) -> Option<String> {
        if let Some(line) = self.assembler.next_line() {
            return Some(line);
        }
        let port = self.port.as_mut()?;

        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            // Keep the per-read timeout inside the caller's budget
            if remaining < self.port_timeout || timeout > self.port_timeout {
                let wanted = remaining.min(timeout);
                if port.set_timeout(wanted).is_ok() {
                    self.port_timeout = wanted;
                }
            }

            match port.read(&mut chunk) {
                Ok(0) => {
                    // EOF from a hung-up device; hold the line for the rest of the budget
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return None;
                }
                Ok(n) => {
                    self.assembler.push(&chunk[..n]);
                    if let Some(line) = self.assembler.next_line() {
                        return Some(line);
                    }
                }
                Err(e) if e.kind() == ErrorKind::TimedOut => return None,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    debug!("[{}] serial read error: {}", self.address, e);
                    thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    return None;
                }
            }
        }
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            info!("Serial port {} closed", self.address);
        }
        self.assembler.clear();
    }

    fn describe(&self) -> String {
        format!("serial({} @ {} baud)", self.address, self.baud)
    }
}

impl Drop for SerialLineSource {
    fn drop(&mut self) {
        self.close();
    }
}
