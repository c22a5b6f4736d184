//! acquirer.rs
//! Background producer: source → parse → normalize → sink.
//!
//! Lifecycle: Idle → Running → Stopping → Stopped.
//! - Opening happens on the caller's thread so a ConnectionError is returned by `start`.
//! - The read loop polls an atomic stop flag between bounded reads; shutdown latency is
//!   at most one read timeout.
//! - `stop` waits for the loop for at most the join timeout, then detaches it.

use crossbeam::channel::{Receiver, RecvTimeoutError, bounded};
use log::{debug, error, info, trace, warn};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
    thread::{self, JoinHandle},
};

use crate::acquisition::{
    parser::{normalize, parse_line},
    simulated::SimulatedSource,
    sink::Sink,
    source::{LineSource, open_line_source},
};
use crate::config::{AcquisitionConfig, SourceConfig};
use crate::error::{AcquireError, AcquireResult};
use crate::utils::stats::{AcquisitionStats, StatsSnapshot};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquirerState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl AcquirerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => AcquirerState::Idle,
            1 => AcquirerState::Running,
            2 => AcquirerState::Stopping,
            _ => AcquirerState::Stopped,
        }
    }
}

/// What the loop pulls from: text lines or synthesized vectors.
pub enum Feed {
    Lines(Box<dyn LineSource>),
    Simulated(SimulatedSource),
}

impl Feed {
    /// Open the feed described by `config`.
    pub fn open(config: &AcquisitionConfig) -> AcquireResult<Self> {
        match &config.source {
            SourceConfig::Simulated => Ok(Feed::Simulated(SimulatedSource::new(
                config.channels,
                config.sim_step,
                config.sim_interval(),
            ))),
            source => Ok(Feed::Lines(open_line_source(source, config.read_timeout())?)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Feed::Lines(src) => src.describe(),
            Feed::Simulated(_) => "simulated".to_string(),
        }
    }

    fn close(&mut self) {
        if let Feed::Lines(src) = self {
            src.close();
        }
    }
}

/// Parse one raw line and publish it; lines without numbers are counted and skipped.
pub fn publish_line(
    line: &str,
    config: &AcquisitionConfig,
    sink: &dyn Sink,
    stats: &AcquisitionStats,
) -> bool {
    stats.record_line();
    let parsed = parse_line(line, config.delimiter());
    if parsed.is_empty() {
        stats.record_empty();
        trace!("no numeric content in line {:?}", line);
        return false;
    }
    publish_vector(parsed, config, sink, stats)
}

/// Normalize to the configured channel count and hand to the sink.
pub fn publish_vector(
    values: Vec<f64>,
    config: &AcquisitionConfig,
    sink: &dyn Sink,
    stats: &AcquisitionStats,
) -> bool {
    let values = normalize(values, config.channels);
    if sink.publish(&values) {
        stats.record_published();
        true
    } else {
        stats.record_dropped();
        false
    }
}

/// Run one acquisition cycle: read, parse, normalize, publish.
///
/// Returns `true` if a vector was delivered to the sink.
pub fn acquire_once(
    feed: &mut Feed,
    config: &AcquisitionConfig,
    sink: &dyn Sink,
    stats: &AcquisitionStats,
) -> bool {
    match feed {
        Feed::Simulated(sim) => match sim.next_paced(config.read_timeout()) {
            Some(values) => {
                stats.record_line();
                publish_vector(values, config, sink, stats)
            }
            None => false,
        },
        Feed::Lines(src) => match src.read_line(config.read_timeout()) {
            Some(line) => publish_line(&line, config, sink, stats),
            None => {
                stats.record_timeout();
                false
            }
        },
    }
}

struct Worker {
    handle: JoinHandle<()>,
    done_rx: Receiver<()>,
}

pub struct Acquirer {
    config: Arc<AcquisitionConfig>,
    sink: Arc<dyn Sink>,
    state: Arc<AtomicU8>,
    running: Arc<AtomicBool>,
    stats: Arc<AcquisitionStats>,
    worker: Option<Worker>,
}

impl Acquirer {
    pub fn new(config: AcquisitionConfig, sink: Arc<dyn Sink>) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            state: Arc::new(AtomicU8::new(AcquirerState::Idle as u8)),
            running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(AcquisitionStats::new()),
            worker: None,
        }
    }

    pub fn state(&self) -> AcquirerState {
        AcquirerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.state() == AcquirerState::Running
    }

    /// Open the configured source and spawn the read loop.
    ///
    /// A source that cannot be opened moves the acquirer straight to `Stopped`.
    pub fn start(&mut self) -> AcquireResult<()> {
        self.ensure_idle()?;
        if let Err(e) = self.config.validate() {
            self.set_state(AcquirerState::Stopped);
            return Err(e);
        }
        match Feed::open(&self.config) {
            Ok(feed) => self.spawn(feed),
            Err(e) => {
                error!("Acquirer failed to open source: {}", e);
                self.set_state(AcquirerState::Stopped);
                Err(e)
            }
        }
    }

    /// Start with an already opened line source instead of the configured one.
    pub fn start_with_source(&mut self, source: Box<dyn LineSource>) -> AcquireResult<()> {
        self.ensure_idle()?;
        if let Err(e) = self.config.validate() {
            self.set_state(AcquirerState::Stopped);
            return Err(e);
        }
        self.spawn(Feed::Lines(source))
    }

    /// Signal the loop to stop and wait at most the join timeout.
    ///
    /// Returns `true` if the loop terminated within the bound. On timeout the thread is
    /// detached and will reach `Stopped` on its own once its read returns.
    pub fn stop(&mut self) -> bool {
        let Some(worker) = self.worker.take() else {
            return self.state() != AcquirerState::Stopping;
        };

        // Stopping only from Running; a loop that already exited stays Stopped
        let _ = self.state.compare_exchange(
            AcquirerState::Running as u8,
            AcquirerState::Stopping as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.running.store(false, Ordering::Release);

        let joined = match worker.done_rx.recv_timeout(self.config.join_timeout()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if worker.handle.join().is_err() {
                    error!("Acquirer thread panicked");
                    self.set_state(AcquirerState::Stopped);
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Acquirer did not stop within {:?}; detaching",
                    self.config.join_timeout()
                );
                false
            }
        };

        debug!("Acquirer stats: {:?}", self.stats.snapshot());
        joined
    }

    fn ensure_idle(&self) -> AcquireResult<()> {
        if self.state() != AcquirerState::Idle || self.worker.is_some() {
            return Err(AcquireError::AlreadyStarted);
        }
        Ok(())
    }

    fn set_state(&self, state: AcquirerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn spawn(&mut self, mut feed: Feed) -> AcquireResult<()> {
        let (done_tx, done_rx) = bounded::<()>(1);
        let config = self.config.clone();
        let sink = self.sink.clone();
        let running = self.running.clone();
        let state = self.state.clone();
        let stats = self.stats.clone();

        info!(
            "Acquirer starting: source={} channels={} window={}",
            feed.describe(),
            config.channels,
            config.window
        );

        self.running.store(true, Ordering::Release);
        self.set_state(AcquirerState::Running);

        let spawned = thread::Builder::new()
            .name("acquirer".into())
            .spawn(move || {
                let cycle = panic::catch_unwind(AssertUnwindSafe(|| {
                    while running.load(Ordering::Acquire) {
                        acquire_once(&mut feed, &config, sink.as_ref(), &stats);
                    }
                }));
                if cycle.is_err() {
                    error!("[Acquirer] acquisition loop panicked; stopping");
                    running.store(false, Ordering::Release);
                }
                feed.close();
                state.store(AcquirerState::Stopped as u8, Ordering::Release);
                debug!("[Acquirer] stopped.");
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(handle) => {
                self.worker = Some(Worker { handle, done_rx });
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                self.set_state(AcquirerState::Stopped);
                Err(AcquireError::Io(e))
            }
        }
    }
}

impl Drop for Acquirer {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}
