// Display side: rolling windows and their read-only consumer.
// The acquirer appends, the monitor snapshots on its own cadence.

pub mod rolling_buffer;
pub mod monitor;
