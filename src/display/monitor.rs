//! monitor.rs
//! Text consumer of the rolling windows, standing in for a plot redraw loop.
//!
//! Every refresh tick it copies the windows and logs one summary per channel. No lock
//! is held while logging.

use log::info;
use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use crate::display::rolling_buffer::RollingBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotStyle {
    Line,
    Scatter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub channel: usize,
    pub latest: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-channel latest/min/max over a snapshot taken with `snapshot_all`.
pub fn summarize(snapshot: &[Vec<f64>]) -> Vec<ChannelSummary> {
    snapshot
        .iter()
        .enumerate()
        .map(|(channel, window)| {
            let (min, max) = window
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(*v), hi.max(*v))
                });
            ChannelSummary {
                channel,
                latest: window.last().copied().unwrap_or(0.0),
                min,
                max,
            }
        })
        .collect()
}

pub struct Monitor {
    buffers: Arc<RollingBuffer>,
    title: String,
    style: PlotStyle,
    refresh: Duration,
}

impl Monitor {
    pub fn new(buffers: Arc<RollingBuffer>, title: impl Into<String>, style: PlotStyle, refresh: Duration) -> Self {
        Self {
            buffers,
            title: title.into(),
            style,
            refresh,
        }
    }

    /// One redraw: snapshot, then report.
    pub fn tick(&self) -> Vec<ChannelSummary> {
        let summaries = summarize(&self.buffers.snapshot_all());
        for s in &summaries {
            info!(
                "[{}] ch{} latest={:.4} min={:.4} max={:.4}",
                self.title, s.channel, s.latest, s.min, s.max
            );
        }
        summaries
    }

    /// Redraw on the refresh cadence until `until` passes or `alive` turns false.
    ///
    /// Returns the number of ticks performed.
    pub fn run(&self, until: Option<Instant>, alive: impl Fn() -> bool) -> u64 {
        info!(
            "[{}] monitoring {} channel(s), window={}, style={:?}",
            self.title,
            self.buffers.channels(),
            self.buffers.window(),
            self.style
        );
        let mut ticks = 0u64;
        let mut next = Instant::now() + self.refresh;
        while alive() {
            if let Some(deadline) = until {
                if Instant::now() >= deadline {
                    break;
                }
            }
            let now = Instant::now();
            if now < next {
                thread::sleep(next - now);
            }
            self.tick();
            ticks += 1;
            next += self.refresh;
        }
        ticks
    }
}
