//! rolling_buffer.rs
//! Per-channel rolling windows shared between the acquirer (sole writer) and the
//! display consumer (sole reader).
//!
//! Each channel sits behind its own mutex, held only for the push or the copy.
//! A snapshot of several channels can therefore straddle one appended vector;
//! that is acceptable for display purposes.

use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::error::{AcquireError, AcquireResult};

pub struct RollingBuffer {
    windows: Vec<Mutex<VecDeque<f64>>>,
    window: usize,
}

impl RollingBuffer {
    /// `channels` windows of `window` zeros each.
    pub fn new(channels: usize, window: usize) -> AcquireResult<Self> {
        if channels < 1 || window < 1 {
            return Err(AcquireError::InvalidConfig(format!(
                "rolling buffer needs channels >= 1 and window >= 1 (got {}x{})",
                channels, window
            )));
        }
        let windows = (0..channels)
            .map(|_| Mutex::new(VecDeque::from(vec![0.0; window])))
            .collect();
        Ok(Self { windows, window })
    }

    pub fn channels(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Push `value` onto `channel`, evicting the oldest sample. Unknown channels are ignored.
    pub fn append(&self, channel: usize, value: f64) {
        if let Some(slot) = self.windows.get(channel) {
            let mut w = slot.lock();
            if w.len() >= self.window {
                w.pop_front();
            }
            w.push_back(value);
        }
    }

    /// One value per channel, in channel order.
    pub fn append_vector(&self, values: &[f64]) {
        for (ch, v) in values.iter().enumerate().take(self.windows.len()) {
            self.append(ch, *v);
        }
    }

    /// Oldest-first copy of one channel's window.
    pub fn snapshot(&self, channel: usize) -> Option<Vec<f64>> {
        self.windows
            .get(channel)
            .map(|slot| slot.lock().iter().copied().collect())
    }

    pub fn snapshot_all(&self) -> Vec<Vec<f64>> {
        self.windows
            .iter()
            .map(|slot| slot.lock().iter().copied().collect())
            .collect()
    }

    /// Most recent sample per channel.
    pub fn latest(&self) -> Vec<f64> {
        self.windows
            .iter()
            .map(|slot| slot.lock().back().copied().unwrap_or(0.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn starts_zero_filled() {
        let buf = RollingBuffer::new(2, 5).unwrap();
        assert_eq!(buf.snapshot(0).unwrap(), vec![0.0; 5]);
        assert_eq!(buf.snapshot(1).unwrap(), vec![0.0; 5]);
        assert_eq!(buf.snapshot(2), None);
    }

    #[test]
    fn evicts_oldest_first() {
        let buf = RollingBuffer::new(1, 5).unwrap();
        for v in 1..=6 {
            buf.append(0, v as f64);
        }
        assert_eq!(buf.snapshot(0).unwrap(), vec![2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buf.latest(), vec![6.0]);
    }

    #[test]
    fn window_of_one() {
        let buf = RollingBuffer::new(1, 1).unwrap();
        buf.append(0, 3.0);
        buf.append(0, 4.0);
        assert_eq!(buf.snapshot(0).unwrap(), vec![4.0]);
    }

    #[test]
    fn vector_append_is_channel_ordered() {
        let buf = RollingBuffer::new(2, 3).unwrap();
        buf.append_vector(&[1.0, 2.0]);
        buf.append_vector(&[3.0, 4.0, 99.0]);
        assert_eq!(buf.snapshot_all(), vec![vec![0.0, 1.0, 3.0], vec![0.0, 2.0, 4.0]]);
    }

    #[test]
    fn out_of_range_append_is_ignored() {
        let buf = RollingBuffer::new(1, 2).unwrap();
        buf.append(7, 1.0);
        assert_eq!(buf.snapshot(0).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(RollingBuffer::new(0, 5).is_err());
        assert!(RollingBuffer::new(1, 0).is_err());
    }

    #[test]
    fn concurrent_appends_and_snapshots_keep_length() {
        const W: usize = 64;
        let buf = Arc::new(RollingBuffer::new(3, W).unwrap());

        let writers: Vec<_> = (0..2)
            .map(|id| {
                let b = buf.clone();
                thread::spawn(move || {
                    for i in 0..5_000 {
                        b.append(i % 3, (id * 10_000 + i) as f64);
                    }
                })
            })
            .collect();

        let readers: Vec<_> = (0..3)
            .map(|_| {
                let b = buf.clone();
                thread::spawn(move || {
                    for i in 0..2_000 {
                        let snap = b.snapshot(i % 3).unwrap();
                        assert_eq!(snap.len(), W);
                        for all in b.snapshot_all() {
                            assert_eq!(all.len(), W);
                        }
                    }
                })
            })
            .collect();

        for h in writers.into_iter().chain(readers) {
            h.join().unwrap();
        }
        assert!(buf.snapshot_all().iter().all(|s| s.len() == W));
    }
}
