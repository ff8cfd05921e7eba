//! Raster surfaces and their frame-stream tap.

/// CPU surface backed by `vello_cpu`.
pub mod cpu;
/// Draw-call recording surface for tests and debugging.
pub mod recording;
/// Fixed-rate frame sampling.
pub mod stream;
/// Surface capability trait and shared draw types.
pub mod surface;
