//! Textreel renders an animated text title onto a raster surface in real time and captures the
//! frame stream into a WebM video.
//!
//! - Drive an [`AnimationEngine`] against a [`Surface`] on every host refresh
//! - Sample the surface into a [`CaptureSession`] that feeds a [`StreamEncoder`]
//! - Finalize the capture into an [`Artifact`] and hand it to an [`Exporter`]
//!
//! [`Studio`] wires these together on a [`CpuSurface`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Animation engine, clock and variants.
pub mod animation;
/// Colors and text layout.
pub mod assets;
/// Live capture into encoded segments.
pub mod capture;
/// Artifacts and exporters.
pub mod export;
/// Core types and errors.
pub mod foundation;
/// Surfaces and frame sampling.
pub mod render;
/// Host loop tying animation and capture together.
pub mod studio;

pub use crate::foundation::core::{Affine, Extent, Fps, Point, Rect, Vec2};
pub use crate::foundation::error::{TextreelError, TextreelResult};

pub use crate::animation::config::{AnimationConfig, Variant};
pub use crate::animation::engine::{AnimationEngine, LoopHandle, TickReport, draw_frame};
pub use crate::assets::color::Color;
pub use crate::capture::encoder::{
    EncoderConfig, EncoderEvent, InMemoryEncoder, Segment, StreamEncoder, VideoCodec, WEBM_MIME,
};
pub use crate::capture::ffmpeg::{
    FfmpegWebmEncoder, FfmpegWebmOpts, ffmpeg_has_encoder, is_ffmpeg_on_path,
};
pub use crate::capture::session::{CaptureOpts, CaptureSession, RecordingState};
pub use crate::export::artifact::{Artifact, ArtifactId};
pub use crate::export::exporter::{DEFAULT_FILENAME, Exporter, FsExporter, LocationRef};
pub use crate::render::cpu::{CpuSurface, FontSet};
pub use crate::render::recording::{DrawCall, RecordingSurface};
pub use crate::render::stream::FrameStream;
pub use crate::render::surface::{
    FontWeight, FrameRGBA, Surface, TextAlign, TextBaseline, TextStyle,
};
pub use crate::studio::{RefreshClock, RefreshMode, Studio, StudioConfig};
