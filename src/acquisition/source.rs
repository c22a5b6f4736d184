//! source.rs
//! Line sources feeding the acquirer.
//!
//! A source is opened by its constructor (fallible, the only fatal error), then read
//! one line at a time with a bounded timeout. `None` from `read_line` is the EMPTY
//! marker: timeout, decode noise or idle link. It is never an error.

use std::{
    collections::VecDeque,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crate::acquisition::serial::SerialLineSource;
use crate::config::SourceConfig;
use crate::error::{AcquireError, AcquireResult};

pub trait LineSource: Send {
    /// Block for at most `timeout` waiting for one complete line.
    fn read_line(&mut self, timeout: Duration) -> Option<String>;

    /// Release the transport. Must be idempotent.
    fn close(&mut self);

    fn describe(&self) -> String;
}

/// Open the transport named by `source`.
///
/// `SourceConfig::Simulated` has no line transport; the acquirer synthesizes vectors
/// directly, so asking for one here is a configuration error.
pub fn open_line_source(
    source: &SourceConfig,
    read_timeout: Duration,
) -> AcquireResult<Box<dyn LineSource>> {
    match source {
        SourceConfig::Serial { port, baud } => {
            let src = SerialLineSource::open(port, *baud, read_timeout)?;
            Ok(Box::new(src))
        }
        SourceConfig::Simulated => Err(AcquireError::InvalidConfig(
            "simulated source does not produce text lines".into(),
        )),
    }
}

/// In-memory line source for tests and offline replay.
pub struct ScriptedLineSource {
    lines: VecDeque<String>,
    idle_wait: bool,
    closed: Arc<AtomicBool>,
}

impl ScriptedLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            idle_wait: true,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// One line per `\n`, as a device would send them.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines().map(str::to_owned))
    }

    /// Sleep the full timeout once the script is exhausted, like an idle serial link.
    /// On by default; turn off to return EMPTY immediately.
    pub fn with_idle_wait(mut self, idle_wait: bool) -> Self {
        self.idle_wait = idle_wait;
        self
    }

    /// Flag flipped by `close`, readable after the source moved into the acquirer.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for ScriptedLineSource {
    fn read_line(&mut self, timeout: Duration) -> Option<String> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        match self.lines.pop_front() {
            Some(line) => Some(line),
            None => {
                if self.idle_wait {
                    thread::sleep(timeout);
                }
                None
            }
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
        self.lines.clear();
    }

    fn describe(&self) -> String {
        format!("scripted({} lines)", self.lines.len())
    }
}
