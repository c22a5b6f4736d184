// Acquisition side: turns a noisy line stream into fixed-width sample vectors.
// Source (serial, scripted or simulated) -> parser -> normalizer -> sink,
// driven by a cancellable background acquirer.

pub mod parser;
pub mod simulated;
pub mod source;
pub mod serial;
pub mod sink;
pub mod acquirer;
