// Shared helpers: acquisition counters.

pub mod stats;
