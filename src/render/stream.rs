use std::time::Duration;

use crate::foundation::core::Fps;
use crate::foundation::error::TextreelResult;
use crate::render::surface::{FrameRGBA, Surface};

/// Fixed-rate tap over a [`Surface`].
///
/// The stream is anchored at a host timestamp; the first frame is due one interval later and
/// at most one frame is taken per [`FrameStream::poll`]. Intervals the host slept through are
/// dropped rather than replayed, so the sample clock never runs ahead of the host.
#[derive(Clone, Debug)]
pub struct FrameStream {
    fps: Fps,
    interval: Duration,
    next_due: Option<Duration>,
    frames_taken: u64,
}

impl FrameStream {
    /// An unanchored stream sampling at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            // Unvalidated rates can truncate to 0ns.
            interval: fps.interval().max(Duration::from_nanos(1)),
            next_due: None,
            frames_taken: 0,
        }
    }

    /// Sample rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Frames returned by `poll` so far.
    pub fn frames_taken(&self) -> u64 {
        self.frames_taken
    }

    /// Start the sample clock at `now`.
    pub fn anchor(&mut self, now: Duration) {
        self.next_due = Some(now.saturating_add(self.interval));
    }

    /// Take a frame from `surface` if a sample interval has elapsed since the last one.
    ///
    /// An unanchored stream anchors itself at `now` and yields nothing.
    pub fn poll(
        &mut self,
        surface: &dyn Surface,
        now: Duration,
    ) -> TextreelResult<Option<FrameRGBA>> {
        let Some(due) = self.next_due else {
            self.anchor(now);
            return Ok(None);
        };
        if now < due {
            return Ok(None);
        }

        let frame = surface.read_frame()?;
        self.next_due = Some(next_due_after(due, now, self.interval));
        self.frames_taken += 1;
        Ok(Some(frame))
    }
}

/// First interval boundary after `now`, counting from `due` (`due <= now`, `interval > 0`).
fn next_due_after(due: Duration, now: Duration, interval: Duration) -> Duration {
    let step = interval.as_nanos().max(1);
    let skipped = now.saturating_sub(due).as_nanos() / step + 1;
    let offset = skipped.saturating_mul(step);
    u64::try_from(offset)
        .ok()
        .and_then(|nanos| due.checked_add(Duration::from_nanos(nanos)))
        .unwrap_or(Duration::MAX)
}
