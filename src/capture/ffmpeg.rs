use std::io::{Read, Write as _};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use crate::capture::encoder::{EncoderConfig, EncoderEvent, Segment, StreamEncoder, VideoCodec};
use crate::foundation::core::Fps;
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// Options for [`FfmpegWebmEncoder`].
#[derive(Clone, Debug)]
pub struct FfmpegWebmOpts {
    /// Largest stdout read forwarded as one segment.
    pub segment_bytes: usize,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// libvpx `-deadline` value.
    pub deadline: String,
}

impl Default for FfmpegWebmOpts {
    fn default() -> Self {
        Self {
            segment_bytes: 64 * 1024,
            bg_rgba: [0, 0, 0, 255],
            deadline: "realtime".to_owned(),
        }
    }
}

/// Stream encoder that pipes raw frames into the system `ffmpeg` and forwards the WebM it writes
/// to stdout as segments.
///
/// The process is spawned on the first frame, so a capture stopped before any sample interval
/// elapsed emits no segments at all.
pub struct FfmpegWebmEncoder {
    opts: FfmpegWebmOpts,

    cfg: Option<EncoderConfig>,
    events: Option<Sender<EncoderEvent>>,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout_pump: Option<JoinHandle<std::io::Result<u64>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
}

impl FfmpegWebmEncoder {
    /// An idle encoder; nothing is spawned until the first frame.
    pub fn new(opts: FfmpegWebmOpts) -> Self {
        Self {
            opts,
            cfg: None,
            events: None,
            child: None,
            stdin: None,
            stdout_pump: None,
            stderr_drain: None,
            scratch: Vec::new(),
        }
    }

    fn spawn(&mut self) -> TextreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TextreelError::invalid_state("ffmpeg encoder not started"))?;
        let events = self
            .events
            .clone()
            .ok_or_else(|| TextreelError::invalid_state("ffmpeg encoder not started"))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque before writing (push_frame).
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.sample_rate);
        cmd.args(["-i", "pipe:0", "-an"]);
        push_codec_args(&mut cmd, cfg, &self.opts);
        cmd.args(["-f", "webm", "pipe:1"]);

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            bitrate_bps = cfg.bitrate_bps,
            "spawning ffmpeg"
        );
        let mut child = cmd.spawn().map_err(|e| {
            TextreelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TextreelError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| TextreelError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| TextreelError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        let segment_bytes = self.opts.segment_bytes.max(1);
        let stdout_pump = std::thread::spawn(move || {
            let mut buf = vec![0u8; segment_bytes];
            let mut seq = 0u64;
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                let segment = Segment {
                    seq,
                    data: buf[..n].to_vec(),
                };
                if events.send(EncoderEvent::Segment(segment)).is_err() {
                    break;
                }
                seq += 1;
            }
            Ok(seq)
        });
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stdout_pump = Some(stdout_pump);
        self.stderr_drain = Some(stderr_drain);
        Ok(())
    }

    fn join_process(&mut self) -> TextreelResult<()> {
        drop(self.stdin.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let segments = match self.stdout_pump.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| TextreelError::encode("ffmpeg stdout pump thread panicked"))?
                .map_err(|e| TextreelError::encode(format!("ffmpeg stdout read failed: {e}")))?,
            None => 0,
        };
        let status = child.wait().map_err(|e| {
            TextreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| TextreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| TextreelError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(TextreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }
        tracing::debug!(segments, "ffmpeg finished");
        Ok(())
    }
}

impl StreamEncoder for FfmpegWebmEncoder {
    #[tracing::instrument(skip_all, fields(codec = ?cfg.codec))]
    fn start(
        &mut self,
        cfg: EncoderConfig,
        events: Sender<EncoderEvent>,
    ) -> TextreelResult<()> {
        if self.cfg.is_some() {
            return Err(TextreelError::invalid_state(
                "ffmpeg encoder is already started",
            ));
        }
        cfg.validate()?;
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(TextreelError::validation(
                "ffmpeg encoder width/height must be even (required for yuv420p output)",
            ));
        }
        if !is_ffmpeg_on_path() {
            return Err(TextreelError::unsupported_encoding(
                "ffmpeg is required for WebM encoding, but was not found on PATH",
            ));
        }
        if !ffmpeg_has_encoder(cfg.codec.ffmpeg_encoder()) {
            return Err(TextreelError::unsupported_encoding(format!(
                "ffmpeg on PATH has no '{}' encoder",
                cfg.codec.ffmpeg_encoder()
            )));
        }

        self.scratch = vec![0u8; cfg.width as usize * cfg.height as usize * 4];
        self.cfg = Some(cfg);
        self.events = Some(events);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> TextreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TextreelError::invalid_state("ffmpeg encoder not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TextreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(TextreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        if self.child.is_none() {
            self.spawn()?;
        }

        flatten_over_bg_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TextreelError::invalid_state(
                "ffmpeg encoder is already finalized",
            ));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            TextreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn stop(&mut self) -> TextreelResult<()> {
        if self.cfg.take().is_none() {
            return Err(TextreelError::invalid_state("ffmpeg encoder not started"));
        }
        let joined = self.join_process();
        if let Some(events) = self.events.take() {
            let event = match &joined {
                Ok(()) => EncoderEvent::Finished,
                Err(e) => EncoderEvent::Failed(e.to_string()),
            };
            let _ = events.send(event);
        }
        joined
    }
}

impl Drop for FfmpegWebmEncoder {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            tracing::warn!("ffmpeg encoder dropped while running; killing process");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn push_codec_args(cmd: &mut Command, cfg: &EncoderConfig, opts: &FfmpegWebmOpts) {
    match cfg.codec {
        VideoCodec::Vp9 => {
            cmd.args([
                "-c:v",
                cfg.codec.ffmpeg_encoder(),
                "-b:v",
                &cfg.bitrate_bps.to_string(),
                "-deadline",
                &opts.deadline,
                "-cpu-used",
                "8",
                "-row-mt",
                "1",
                "-pix_fmt",
                "yuv420p",
            ]);
        }
    }
}

fn flatten_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> TextreelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TextreelError::validation(
            "flatten_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255_u16(bg_r, inv),
                s[1] as u16 + mul_div255_u16(bg_g, inv),
                s[2] as u16 + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(s[0] as u16, a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(s[1] as u16, a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(s[2] as u16, a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg -encoders` lists `name`.
pub fn ffmpeg_has_encoder(name: &str) -> bool {
    let Ok(output) = Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    if !output.status.success() {
        return false;
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|line| line.split_whitespace().nth(1) == Some(name))
}
