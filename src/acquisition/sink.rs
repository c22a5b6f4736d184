//! sink.rs
//! Delivery of normalized sample vectors out of the acquirer.
//! A sink must never block the producer: it appends into bounded storage or drops.

use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use log::debug;
use std::sync::Arc;

use crate::display::rolling_buffer::RollingBuffer;

pub trait Sink: Send + Sync {
    /// Deliver one vector. Returns `false` if it was dropped.
    fn publish(&self, values: &[f64]) -> bool;
}

impl Sink for RollingBuffer {
    fn publish(&self, values: &[f64]) -> bool {
        self.append_vector(values);
        true
    }
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn publish(&self, values: &[f64]) -> bool {
        (**self).publish(values)
    }
}

/// Adapter for a plain callback.
pub struct FnSink<F>(pub F);

impl<F> Sink for FnSink<F>
where
    F: Fn(&[f64]) + Send + Sync,
{
    fn publish(&self, values: &[f64]) -> bool {
        (self.0)(values);
        true
    }
}

/// Bounded channel sink; drops on saturation instead of applying backpressure.
#[derive(Clone)]
pub struct ChannelSink {
    tx: Sender<Vec<f64>>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, Receiver<Vec<f64>>) {
        let (tx, rx) = bounded(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn queued(&self) -> usize {
        self.tx.len()
    }
}

impl Sink for ChannelSink {
    fn publish(&self, values: &[f64]) -> bool {
        match self.tx.try_send(values.to_vec()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                debug!("[ChannelSink] receiver gone, dropping vector");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn rolling_buffer_as_sink() {
        let buf = Arc::new(RollingBuffer::new(2, 2).unwrap());
        let sink: Arc<dyn Sink> = buf.clone();
        assert!(sink.publish(&[1.0, 2.0]));
        assert_eq!(buf.snapshot_all(), vec![vec![0.0, 1.0], vec![0.0, 2.0]]);
    }

    #[test]
    fn channel_sink_drops_when_full() {
        let (sink, rx) = ChannelSink::new(2);
        assert!(sink.publish(&[1.0]));
        assert!(sink.publish(&[2.0]));
        assert!(!sink.publish(&[3.0]));
        assert_eq!(sink.queued(), 2);
        assert_eq!(rx.recv().unwrap(), vec![1.0]);
        assert!(sink.publish(&[4.0]));
    }

    #[test]
    fn channel_sink_survives_disconnected_receiver() {
        let (sink, rx) = ChannelSink::new(1);
        drop(rx);
        assert!(!sink.publish(&[1.0]));
    }

    #[test]
    fn closure_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let sink = FnSink(move |v: &[f64]| {
            c.fetch_add(v.len(), Ordering::Relaxed);
        });
        sink.publish(&[1.0, 2.0, 3.0]);
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }
}
