//! Async acquisition: tokio-based alternative to the threaded acquirer.
//!
//! Same pipeline (source → parse → normalize → sink) as a tokio task cancelled by a
//! `CancellationToken`. The simulated source is paced by `tokio::time::interval`;
//! blocking line sources are read on the blocking pool, one bounded read at a time,
//! so cancellation is observed within one read timeout.

use log::{debug, error, info};
use std::{sync::Arc, time::Duration};
use tokio::{
    task::{self, JoinHandle},
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::acquisition::{
    acquirer::{publish_line, publish_vector},
    simulated::SimulatedSource,
    sink::Sink,
    source::{LineSource, open_line_source},
};
use crate::config::{AcquisitionConfig, SourceConfig};
use crate::error::AcquireResult;
use crate::utils::stats::{AcquisitionStats, StatsSnapshot};

pub struct AsyncAcquirer {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
    stats: Arc<AcquisitionStats>,
}

impl AsyncAcquirer {
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Cancel and wait at most `join_timeout`.
    ///
    /// Returns whether the task finished in time, and the counters as of that point.
    pub async fn shutdown(self, join_timeout: Duration) -> (bool, StatsSnapshot) {
        self.cancel.cancel();
        let joined = match time::timeout(join_timeout, self.handle).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!("async acquirer task failed: {}", e);
                true
            }
            Err(_) => {
                error!("async acquirer did not stop within {:?}", join_timeout);
                false
            }
        };
        (joined, self.stats.snapshot())
    }
}

/// Open the configured source on the caller and spawn the acquisition task.
///
/// Must be called from within a tokio runtime. A source that cannot be opened is
/// reported here and no task is spawned.
pub fn spawn_async_acquirer(
    config: AcquisitionConfig,
    sink: Arc<dyn Sink>,
    cancel: CancellationToken,
) -> AcquireResult<AsyncAcquirer> {
    config.validate()?;
    let config = Arc::new(config);
    let stats = Arc::new(AcquisitionStats::new());

    let handle = match &config.source {
        SourceConfig::Simulated => {
            let (config, stats, cancel) = (config.clone(), stats.clone(), cancel.clone());
            tokio::spawn(async move {
                run_simulated(config, sink, stats, cancel).await;
                debug!("async simulated acquirer exited");
            })
        }
        source => {
            let src = open_line_source(source, config.read_timeout())?;
            let (config, stats, cancel) = (config.clone(), stats.clone(), cancel.clone());
            tokio::spawn(async move {
                run_lines(src, config, sink, stats, cancel).await;
                debug!("async line acquirer exited");
            })
        }
    };

    Ok(AsyncAcquirer { handle, cancel, stats })
}

async fn run_simulated(
    config: Arc<AcquisitionConfig>,
    sink: Arc<dyn Sink>,
    stats: Arc<AcquisitionStats>,
    cancel: CancellationToken,
) {
    let mut sim = SimulatedSource::new(config.channels, config.sim_step, config.sim_interval());
    let mut interval = time::interval(config.sim_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("async acquirer started: source=simulated channels={}", config.channels);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                stats.record_line();
                publish_vector(sim.sample(), &config, sink.as_ref(), &stats);
            }
        }
    }
}

async fn run_lines(
    src: Box<dyn LineSource>,
    config: Arc<AcquisitionConfig>,
    sink: Arc<dyn Sink>,
    stats: Arc<AcquisitionStats>,
    cancel: CancellationToken,
) {
    info!(
        "async acquirer started: source={} channels={}",
        src.describe(),
        config.channels
    );
    let timeout = config.read_timeout();
    let mut source = Some(src);

    while !cancel.is_cancelled() {
        let Some(mut src) = source.take() else { break };
        let read = task::spawn_blocking(move || {
            let line = src.read_line(timeout);
            (src, line)
        });
        let (src, line) = match read.await {
            Ok(r) => r,
            Err(e) => {
                error!("blocking read task failed: {}", e);
                break;
            }
        };
        source = Some(src);

        match line {
            Some(line) => {
                publish_line(&line, &config, sink.as_ref(), &stats);
            }
            None => stats.record_timeout(),
        }
    }

    if let Some(mut src) = source {
        src.close();
    }
}
