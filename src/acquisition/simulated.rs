//! simulated.rs
//! Synthetic multi-channel signal used when no device is attached.
//! - Channel `i` follows `sin(t * (0.5 + 0.2i)) + 0.1(i+1) * sin(3.7t)`
//! - Periodic release: SpinSleeper paces emissions on a deadline schedule

use spin_sleep::{SpinSleeper, SpinStrategy};
use std::time::{Duration, Instant};

pub struct SimulatedSource {
    channels: usize,
    step: f64,
    interval: Duration,
    t: f64,
    next_due: Option<Instant>,
    sleeper: SpinSleeper,
}

impl SimulatedSource {
    pub fn new(channels: usize, step: f64, interval: Duration) -> Self {
        Self {
            channels,
            step,
            interval,
            t: 0.0,
            next_due: None,
            sleeper: SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread),
        }
    }

    /// Value of channel `ch` at logical time `t`.
    pub fn value_at(t: f64, ch: usize) -> f64 {
        let i = ch as f64;
        (t * (0.5 + i * 0.2)).sin() + 0.1 * (i + 1.0) * (t * 3.7).sin()
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    /// Restart the waveform at `t = 0` and emit the next vector immediately.
    pub fn reset(&mut self) {
        self.t = 0.0;
        self.next_due = None;
    }

    /// Produce the vector for the current time and advance by one step.
    pub fn sample(&mut self) -> Vec<f64> {
        let t = self.t;
        let values = (0..self.channels).map(|ch| Self::value_at(t, ch)).collect();
        self.t += self.step;
        values
    }

    /// Paced variant of [`sample`](Self::sample).
    ///
    /// Waits for the next release but never longer than `max_wait`, so a caller
    /// polling a stop flag stays responsive. Returns `None` if the release was not
    /// reached within `max_wait`. The first call releases immediately.
    pub fn next_paced(&mut self, max_wait: Duration) -> Option<Vec<f64>> {
        let now = Instant::now();
        let due = *self.next_due.get_or_insert(now);
        if now < due {
            self.sleeper.sleep((due - now).min(max_wait));
            if Instant::now() < due {
                return None;
            }
        }

        let values = self.sample();
        // Late releases do not accumulate into a burst
        self.next_due = Some((due + self.interval).max(Instant::now()));
        Some(values)
    }
}

impl Iterator for SimulatedSource {
    type Item = Vec<f64>;

    /// Unpaced: the sequence is infinite.
    fn next(&mut self) -> Option<Vec<f64>> {
        Some(self.sample())
    }
}
