use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::encoder::{EncoderConfig, EncoderEvent, Segment, StreamEncoder, VideoCodec};
use crate::export::artifact::Artifact;
use crate::foundation::core::Fps;
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::render::stream::FrameStream;
use crate::render::surface::Surface;

/// Default capture sample rate.
pub const DEFAULT_SAMPLE_HZ: u32 = 30;
/// Default target bitrate.
pub const DEFAULT_BITRATE_BPS: u32 = 2_500_000;

/// Capture parameters chosen when recording starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureOpts {
    /// Rate the surface is sampled at.
    pub sample_rate: Fps,
    /// Target bitrate in bits per second.
    pub bitrate_bps: u32,
    /// Requested codec.
    pub codec: VideoCodec,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            sample_rate: Fps {
                num: DEFAULT_SAMPLE_HZ,
                den: 1,
            },
            bitrate_bps: DEFAULT_BITRATE_BPS,
            codec: VideoCodec::Vp9,
        }
    }
}

/// Lifecycle of a [`CaptureSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordingState {
    /// Not started.
    Idle,
    /// Sampling frames.
    Recording,
    /// Finished, successfully or not.
    Stopped,
}

/// One capture of a surface's frame stream into a single [`Artifact`].
///
/// States only move forward: `Idle -> Recording -> Stopped`. A stopped session cannot be
/// restarted; create a new one instead.
pub struct CaptureSession {
    state: RecordingState,
    encoder: Box<dyn StreamEncoder>,
    opts: CaptureOpts,
    stream: Option<FrameStream>,
    events: Option<Receiver<EncoderEvent>>,
    segments: Vec<Segment>,
    next_seq: u64,
    encoder_finished: bool,
    frames_sampled: u64,
    artifact: Option<Artifact>,
}

impl CaptureSession {
    /// An idle session that will feed `encoder`.
    pub fn new(encoder: Box<dyn StreamEncoder>) -> Self {
        Self {
            state: RecordingState::Idle,
            encoder,
            opts: CaptureOpts::default(),
            stream: None,
            events: None,
            segments: Vec::new(),
            next_seq: 0,
            encoder_finished: false,
            frames_sampled: 0,
            artifact: None,
        }
    }

    /// Begin recording `surface`, sampling from host timestamp `now`.
    ///
    /// A detached surface makes this a no-op and the session stays `Idle`. If the encoder
    /// refuses the codec the error is returned and the session also stays `Idle`.
    #[tracing::instrument(skip(self, surface), fields(state = ?self.state))]
    pub fn start(
        &mut self,
        surface: &dyn Surface,
        opts: CaptureOpts,
        now: Duration,
    ) -> TextreelResult<()> {
        if self.state != RecordingState::Idle {
            return Err(TextreelError::invalid_state(format!(
                "cannot start a capture session in state {:?}",
                self.state
            )));
        }
        let Some(extent) = surface.extent() else {
            tracing::debug!("surface not attached; capture not started");
            return Ok(());
        };

        let cfg = EncoderConfig {
            width: extent.width,
            height: extent.height,
            sample_rate: opts.sample_rate,
            codec: opts.codec,
            bitrate_bps: opts.bitrate_bps,
        };
        cfg.validate()?;

        let (tx, rx) = mpsc::channel();
        self.encoder.start(cfg, tx)?;

        let mut stream = surface.as_frame_stream(opts.sample_rate);
        stream.anchor(now);

        self.stream = Some(stream);
        self.events = Some(rx);
        self.opts = opts;
        self.state = RecordingState::Recording;
        tracing::debug!(
            width = extent.width,
            height = extent.height,
            "capture started"
        );
        Ok(())
    }

    /// Feed the encoder one frame if a sample interval has elapsed, then collect segments.
    ///
    /// Returns whether a frame was sampled. Does nothing unless recording.
    ///
    /// An encoder failure or an out-of-order segment ends the capture: the error is returned once,
    /// the session moves to `Stopped` without an artifact, and the in-order segments received
    /// before the fault stay readable through [`CaptureSession::segments`].
    pub fn sample(&mut self, surface: &dyn Surface, now: Duration) -> TextreelResult<bool> {
        if self.state != RecordingState::Recording {
            return Ok(false);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(false);
        };

        let taken = match stream.poll(surface, now)? {
            Some(frame) => {
                if let Err(e) = self.encoder.push_frame(&frame) {
                    return Err(self.abort(e));
                }
                self.frames_sampled += 1;
                true
            }
            None => false,
        };
        if let Err(e) = self.drain() {
            return Err(self.abort(e));
        }
        Ok(taken)
    }

    /// Collect segments the encoder emitted since the last call, without sampling.
    ///
    /// Returns the number of new segments. Errors end the capture as described on
    /// [`CaptureSession::sample`].
    pub fn poll(&mut self) -> TextreelResult<usize> {
        if self.state != RecordingState::Recording {
            return Ok(0);
        }
        self.drain().map_err(|e| self.abort(e))
    }

    /// Finish the capture and finalize its segments into an artifact.
    ///
    /// A no-op returning `None` unless recording. The session ends `Stopped` even when the
    /// encoder fails to flush; in that case no artifact is produced and the error is returned.
    #[tracing::instrument(skip(self), fields(state = ?self.state))]
    pub fn stop(&mut self) -> TextreelResult<Option<&Artifact>> {
        if self.state != RecordingState::Recording {
            return Ok(None);
        }

        let flushed = self.encoder.stop();
        let drained = self.drain();
        self.state = RecordingState::Stopped;
        self.stream = None;
        self.events = None;
        flushed?;
        drained?;
        if !self.encoder_finished {
            tracing::warn!("encoder stopped without signalling completion");
        }

        let artifact = Artifact::from_segments(&self.segments, self.opts.codec.mime_type());
        tracing::debug!(
            segments = self.segments.len(),
            frames = self.frames_sampled,
            bytes = artifact.len(),
            "capture finalized"
        );
        Ok(Some(&*self.artifact.insert(artifact)))
    }

    fn drain(&mut self) -> TextreelResult<usize> {
        let Some(events) = self.events.as_ref() else {
            return Ok(0);
        };
        let mut received = 0usize;
        loop {
            match events.try_recv() {
                Ok(EncoderEvent::Segment(segment)) => {
                    if segment.seq != self.next_seq {
                        return Err(TextreelError::encode(format!(
                            "segment out of order: got seq {}, expected {}",
                            segment.seq, self.next_seq
                        )));
                    }
                    self.next_seq += 1;
                    self.segments.push(segment);
                    received += 1;
                }
                Ok(EncoderEvent::Finished) => self.encoder_finished = true,
                Ok(EncoderEvent::Failed(msg)) => return Err(TextreelError::encode(msg)),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(received)
    }

    /// Tear down a faulted capture and hand back the error that caused it.
    fn abort(&mut self, err: TextreelError) -> TextreelError {
        tracing::warn!(
            error = %err,
            segments = self.segments.len(),
            "capture aborted"
        );
        if let Err(stop_err) = self.encoder.stop() {
            tracing::debug!(error = %stop_err, "encoder stop after abort failed");
        }
        self.state = RecordingState::Stopped;
        self.stream = None;
        self.events = None;
        err
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Whether the session is `Recording`.
    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    /// Options of the current or last capture.
    pub fn opts(&self) -> &CaptureOpts {
        &self.opts
    }

    /// Segments received so far, in sequence order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Frames pushed to the encoder.
    pub fn frames_sampled(&self) -> u64 {
        self.frames_sampled
    }

    /// The finalized artifact; only present once `Stopped`.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if self.state == RecordingState::Recording {
            tracing::warn!(
                segments = self.segments.len(),
                "capture session dropped while recording; output discarded"
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/session.rs"]
mod tests;
