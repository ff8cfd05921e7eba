use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::animation::config::AnimationConfig;
use crate::animation::engine::{AnimationEngine, TickReport};
use crate::capture::encoder::StreamEncoder;
use crate::capture::ffmpeg::{FfmpegWebmEncoder, FfmpegWebmOpts};
use crate::capture::session::{CaptureOpts, CaptureSession};
use crate::export::exporter::{DEFAULT_FILENAME, Exporter, FsExporter, LocationRef};
use crate::foundation::core::{Extent, Fps};
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::render::cpu::{CpuSurface, FontSet};
use crate::render::surface::Surface;

/// Default surface size.
pub const DEFAULT_CANVAS: (u32, u32) = (800, 600);
/// Default host refresh rate.
pub const DEFAULT_REFRESH_HZ: u32 = 60;

/// JSON-facing configuration for a [`Studio`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Surface size.
    pub canvas: Extent,
    /// Regular face used for all text. Required by the CPU surface.
    pub font_path: Option<PathBuf>,
    /// Optional bold face for the title.
    pub bold_font_path: Option<PathBuf>,
    /// Initial animation.
    pub animation: AnimationConfig,
    /// Options used for every capture.
    pub capture: CaptureOpts,
    /// Directory downloads are written to.
    pub out_dir: PathBuf,
    /// Host refresh rate driving render ticks.
    pub refresh: Fps,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            canvas: Extent {
                width: DEFAULT_CANVAS.0,
                height: DEFAULT_CANVAS.1,
            },
            font_path: None,
            bold_font_path: None,
            animation: AnimationConfig::default(),
            capture: CaptureOpts::default(),
            out_dir: PathBuf::from("."),
            refresh: Fps {
                num: DEFAULT_REFRESH_HZ,
                den: 1,
            },
        }
    }
}

impl StudioConfig {
    /// Parse a config from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> TextreelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| TextreelError::serde(format!("parse studio config JSON: {e}")))
    }

    /// Read a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> TextreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TextreelError::validation(format!("open studio config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check the canvas, both rates and the bitrate.
    pub fn validate(&self) -> TextreelResult<()> {
        Extent::new(self.canvas.width, self.canvas.height)?;
        self.refresh.validate()?;
        self.capture.sample_rate.validate()?;
        if self.capture.bitrate_bps == 0 {
            return Err(TextreelError::validation("capture bitrate must be > 0"));
        }
        Ok(())
    }

    /// Load the configured font files.
    pub fn fonts(&self) -> TextreelResult<FontSet> {
        let regular = self.font_path.as_deref().ok_or_else(|| {
            TextreelError::validation("font_path is required to render text on the CPU surface")
        })?;
        FontSet::from_paths(regular, self.bold_font_path.as_deref())
    }
}

/// How a [`RefreshClock`] paces ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// Sleep so ticks land on wall-clock refresh boundaries.
    Realtime,
    /// Return synthetic timestamps immediately.
    Offline,
}

/// Paces host refresh ticks and produces their timestamps.
///
/// Timestamps are measured from the clock's creation; tick `n` is due at `n / rate` seconds.
#[derive(Debug)]
pub struct RefreshClock {
    rate: Fps,
    mode: RefreshMode,
    origin: Instant,
    ticks: u64,
}

impl RefreshClock {
    /// A clock ticking at `rate`, starting now.
    pub fn new(rate: Fps, mode: RefreshMode) -> TextreelResult<Self> {
        rate.validate()?;
        Ok(Self {
            rate,
            mode,
            origin: Instant::now(),
            ticks: 0,
        })
    }

    /// Ticks taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Timestamp of tick `n`.
    pub fn due(&self, n: u64) -> Duration {
        let nanos = u128::from(n) * 1_000_000_000 * u128::from(self.rate.den)
            / u128::from(self.rate.num);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Wait for (realtime) or step to (offline) the next tick and return its timestamp.
    pub fn next_tick(&mut self) -> Duration {
        let due = self.due(self.ticks);
        self.ticks += 1;
        match self.mode {
            RefreshMode::Offline => due,
            RefreshMode::Realtime => {
                let elapsed = self.origin.elapsed();
                if let Some(wait) = due.checked_sub(elapsed) {
                    std::thread::sleep(wait);
                }
                self.origin.elapsed()
            }
        }
    }
}

/// Owns a surface, the animation engine, the optional capture and the exporter, and interleaves
/// render ticks with capture sampling on the calling thread.
pub struct Studio<S: Surface = CpuSurface> {
    surface: S,
    engine: AnimationEngine,
    capture: Option<CaptureSession>,
    exporter: FsExporter,
    animation: AnimationConfig,
    capture_opts: CaptureOpts,
}

impl Studio<CpuSurface> {
    /// Build a studio on a CPU surface sized and styled by `cfg`.
    #[tracing::instrument(skip_all)]
    pub fn new(cfg: &StudioConfig) -> TextreelResult<Self> {
        cfg.validate()?;
        let fonts = cfg.fonts()?;
        let surface = CpuSurface::new(cfg.canvas, &fonts)?;
        Ok(Self::with_surface(surface, cfg))
    }
}

impl<S: Surface> Studio<S> {
    /// Build a studio on an existing surface and start the animation.
    pub fn with_surface(surface: S, cfg: &StudioConfig) -> Self {
        let mut engine = AnimationEngine::new();
        engine.initialize(&surface, cfg.animation.clone());
        Self {
            surface,
            engine,
            capture: None,
            exporter: FsExporter::new(&cfg.out_dir),
            animation: cfg.animation.clone(),
            capture_opts: cfg.capture.clone(),
        }
    }

    /// Replace the animation config; elapsed time restarts at `0`. An active capture continues.
    pub fn set_config(&mut self, config: AnimationConfig) {
        self.animation = config.clone();
        self.engine.reinitialize(&self.surface, config);
    }

    /// Start capturing with `encoder`, sampling from host timestamp `now`.
    pub fn start_recording(
        &mut self,
        encoder: Box<dyn StreamEncoder>,
        now: Duration,
    ) -> TextreelResult<()> {
        if self.capture.as_ref().is_some_and(CaptureSession::is_recording) {
            return Err(TextreelError::invalid_state("a capture is already recording"));
        }
        let mut session = CaptureSession::new(encoder);
        session.start(&self.surface, self.capture_opts.clone(), now)?;
        if session.is_recording() {
            self.capture = Some(session);
        }
        Ok(())
    }

    /// Start capturing to WebM through the system `ffmpeg`.
    pub fn start_recording_webm(&mut self, now: Duration) -> TextreelResult<()> {
        let opts = FfmpegWebmOpts {
            bg_rgba: self.animation.background_color.to_rgba8(),
            ..FfmpegWebmOpts::default()
        };
        self.start_recording(Box::new(FfmpegWebmEncoder::new(opts)), now)
    }

    /// Run one host refresh: the scheduled render tick, then a capture sample.
    pub fn advance(&mut self, now: Duration) -> TextreelResult<Option<TickReport>> {
        let report = self.engine.tick(&mut self.surface, now)?;
        if let Some(capture) = self.capture.as_mut() {
            capture.sample(&self.surface, now)?;
        }
        Ok(report)
    }

    /// Stop the active capture and export its artifact. `None` when nothing was recording.
    #[tracing::instrument(skip(self))]
    pub fn stop_recording(&mut self) -> TextreelResult<Option<LocationRef>> {
        let Some(capture) = self.capture.as_mut() else {
            return Ok(None);
        };
        let location = capture
            .stop()?
            .map(|artifact| self.exporter.to_location_ref(artifact));
        Ok(location)
    }

    /// Persist `location` under `filename` (default `video.webm`) in the output directory.
    pub fn download(
        &mut self,
        location: &LocationRef,
        filename: Option<&str>,
    ) -> TextreelResult<PathBuf> {
        self.exporter
            .trigger_download(location, filename.unwrap_or(DEFAULT_FILENAME))
    }

    /// Release a reference returned by `stop_recording`.
    pub fn release(&mut self, location: &LocationRef) -> bool {
        self.exporter.release(location)
    }

    /// Stop the animation loop. An active capture is left to the caller.
    pub fn dispose(&mut self) {
        self.engine.dispose();
    }

    /// The drawn surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to attach it.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The animation engine.
    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    /// The current or last capture session.
    pub fn capture(&self) -> Option<&CaptureSession> {
        self.capture.as_ref()
    }

    /// The exporter holding live references.
    pub fn exporter(&self) -> &FsExporter {
        &self.exporter
    }

    /// Animation config applied on the next (re)initialize.
    pub fn animation(&self) -> &AnimationConfig {
        &self.animation
    }
}
