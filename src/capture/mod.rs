//! Live capture of a surface's frame stream into compressed segments.
//!
//! A [`session::CaptureSession`] samples frames at a fixed rate, feeds a
//! [`encoder::StreamEncoder`], and finalizes the segments it emits into one artifact.

/// Encoder trait and in-memory encoder.
pub mod encoder;
/// WebM encoding via system `ffmpeg`.
pub mod ffmpeg;
/// Capture state machine.
pub mod session;
