use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Fps;
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::render::surface::FrameRGBA;

/// Container mime type produced by every supported codec.
pub const WEBM_MIME: &str = "video/webm";

/// Video codec requested for a capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    /// VP9 in a WebM container.
    #[default]
    Vp9,
}

impl VideoCodec {
    /// Name of the `ffmpeg` encoder implementing this codec.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::Vp9 => "libvpx-vp9",
        }
    }

    /// Mime type of the container this codec is written into.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Vp9 => WEBM_MIME,
        }
    }
}

/// Configuration provided to a [`StreamEncoder`] when capture starts.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Rate frames are sampled at.
    pub sample_rate: Fps,
    /// Codec to encode with.
    pub codec: VideoCodec,
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,
}

impl EncoderConfig {
    /// Reject zero dimensions, an invalid rate or a zero bitrate.
    pub fn validate(&self) -> TextreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(TextreelError::validation(
                "encoder width/height must be non-zero",
            ));
        }
        self.sample_rate.validate()?;
        if self.bitrate_bps == 0 {
            return Err(TextreelError::validation("encoder bitrate must be > 0"));
        }
        Ok(())
    }
}

/// One compressed chunk of the capture stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// 0-based position among the segments of one capture.
    pub seq: u64,
    /// Encoded bytes.
    pub data: Vec<u8>,
}

/// Notifications delivered by an encoder, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EncoderEvent {
    /// A segment is ready.
    Segment(Segment),
    /// Every segment has been emitted.
    Finished,
    /// The encoder gave up; the message describes why.
    Failed(String),
}

/// Encoder contract for turning sampled frames into compressed segments.
///
/// Segments are delivered through the `events` channel given to `start`, with strictly increasing
/// `seq`. `stop` flushes the encoder and returns only after every remaining segment and a final
/// [`EncoderEvent::Finished`] have been sent.
pub trait StreamEncoder: Send {
    /// Prepare for a capture. Fails with `UnsupportedEncoding` when the codec is unavailable.
    fn start(
        &mut self,
        cfg: EncoderConfig,
        events: Sender<EncoderEvent>,
    ) -> TextreelResult<()>;

    /// Feed one sampled frame.
    fn push_frame(&mut self, frame: &FrameRGBA) -> TextreelResult<()>;

    /// Flush and finish the capture.
    fn stop(&mut self) -> TextreelResult<()>;
}

/// In-memory encoder for tests and debugging.
///
/// Emits the raw bytes of every `frames_per_segment` frames as one segment; a partial batch is
/// flushed on `stop`.
#[derive(Debug)]
pub struct InMemoryEncoder {
    supported: bool,
    frames_per_segment: usize,
    cfg: Option<EncoderConfig>,
    events: Option<Sender<EncoderEvent>>,
    pending: Vec<u8>,
    pending_frames: usize,
    next_seq: u64,
}

impl Default for InMemoryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEncoder {
    /// An encoder emitting one segment per frame.
    pub fn new() -> Self {
        Self {
            supported: true,
            frames_per_segment: 1,
            cfg: None,
            events: None,
            pending: Vec::new(),
            pending_frames: 0,
            next_seq: 0,
        }
    }

    /// An encoder whose host lacks every codec.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Batch `n` frames per segment (at least one).
    pub fn with_frames_per_segment(mut self, n: usize) -> Self {
        self.frames_per_segment = n.max(1);
        self
    }

    /// Configuration of the current or last capture.
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.cfg.as_ref()
    }

    fn emit_pending(&mut self) -> TextreelResult<()> {
        if self.pending_frames == 0 {
            return Ok(());
        }
        let events = self
            .events
            .as_ref()
            .ok_or_else(|| TextreelError::invalid_state("in-memory encoder not started"))?;
        let segment = Segment {
            seq: self.next_seq,
            data: std::mem::take(&mut self.pending),
        };
        self.next_seq += 1;
        self.pending_frames = 0;
        events
            .send(EncoderEvent::Segment(segment))
            .map_err(|_| TextreelError::encode("segment receiver dropped"))
    }
}

impl StreamEncoder for InMemoryEncoder {
    fn start(
        &mut self,
        cfg: EncoderConfig,
        events: Sender<EncoderEvent>,
    ) -> TextreelResult<()> {
        cfg.validate()?;
        if !self.supported {
            return Err(TextreelError::unsupported_encoding(format!(
                "codec {:?} is not available",
                cfg.codec
            )));
        }
        self.cfg = Some(cfg);
        self.events = Some(events);
        self.pending.clear();
        self.pending_frames = 0;
        self.next_seq = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> TextreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TextreelError::invalid_state("in-memory encoder not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TextreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.pending.extend_from_slice(&frame.data);
        self.pending_frames += 1;
        if self.pending_frames >= self.frames_per_segment {
            self.emit_pending()?;
        }
        Ok(())
    }

    fn stop(&mut self) -> TextreelResult<()> {
        if self.cfg.is_none() {
            return Err(TextreelError::invalid_state("in-memory encoder not started"));
        }
        self.emit_pending()?;
        if let Some(events) = self.events.take() {
            let _ = events.send(EncoderEvent::Finished);
        }
        self.cfg = None;
        Ok(())
    }
}
