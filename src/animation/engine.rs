use std::time::Duration;

use crate::animation::clock::FrameClock;
use crate::animation::config::AnimationConfig;
use crate::animation::variant::Motion;
use crate::foundation::core::Point;
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::render::surface::{FontWeight, Surface, TextAlign, TextBaseline, TextStyle};

/// Title font size.
pub const TITLE_SIZE_PX: f32 = 48.0;
/// Elapsed-time overlay font size.
pub const OVERLAY_SIZE_PX: f32 = 16.0;
/// Overlay anchor measured from the top-right corner (x inset, y from top).
pub const OVERLAY_INSET_PX: (f64, f64) = (20.0, 30.0);

/// Identifies one run of the tick loop. Every (re)initialization issues a fresh handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopHandle(u64);

impl LoopHandle {
    /// Monotonic id, starting at 1 per engine.
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What one executed tick drew.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    /// Loop that ran the tick.
    pub handle: LoopHandle,
    /// Elapsed time the frame was drawn for.
    pub elapsed_ms: f64,
    /// Transform applied to the title.
    pub motion: Motion,
}

struct TickLoop {
    handle: LoopHandle,
    config: AnimationConfig,
    clock: FrameClock,
    scheduled: bool,
}

/// Drives the per-tick text animation on a [`Surface`].
///
/// At most one loop, and therefore one [`FrameClock`], is active at a time. The host calls
/// [`AnimationEngine::tick`] on every display refresh; a tick only runs if the active loop
/// scheduled it, and each executed tick schedules the next one.
#[derive(Default)]
pub struct AnimationEngine {
    active: Option<TickLoop>,
    issued: u64,
}

impl AnimationEngine {
    /// An engine with no loop.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a loop for `config`, returning its handle.
    ///
    /// A no-op returning `None` when `surface` is not attached. If a loop is already running
    /// this behaves like [`AnimationEngine::reinitialize`].
    #[tracing::instrument(skip_all, fields(variant = ?config.variant))]
    pub fn initialize(
        &mut self,
        surface: &dyn Surface,
        config: AnimationConfig,
    ) -> Option<LoopHandle> {
        if self.active.is_some() {
            return self.reinitialize(surface, config);
        }
        if surface.extent().is_none() {
            tracing::debug!("surface not attached; animation not started");
            return None;
        }

        self.issued += 1;
        let handle = LoopHandle(self.issued);
        self.active = Some(TickLoop {
            handle,
            config,
            clock: FrameClock::new(),
            scheduled: true,
        });
        tracing::debug!(handle = handle.0, "animation loop started");
        Some(handle)
    }

    /// Cancel the current loop and its clock, then start a fresh one from elapsed `0`.
    pub fn reinitialize(
        &mut self,
        surface: &dyn Surface,
        config: AnimationConfig,
    ) -> Option<LoopHandle> {
        self.dispose();
        self.initialize(surface, config)
    }

    /// Cancel the loop. Idempotent; no tick runs after this returns.
    pub fn dispose(&mut self) {
        if let Some(old) = self.active.take() {
            tracing::debug!(handle = old.handle.0, "animation loop disposed");
        }
    }

    /// Handle of the active loop.
    pub fn handle(&self) -> Option<LoopHandle> {
        self.active.as_ref().map(|l| l.handle)
    }

    /// Whether a loop is active.
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Configuration of the active loop.
    pub fn config(&self) -> Option<&AnimationConfig> {
        self.active.as_ref().map(|l| &l.config)
    }

    /// Elapsed milliseconds observed by the active loop's last tick.
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.active.as_ref().map(|l| l.clock.last_elapsed_ms())
    }

    /// Run the scheduled tick at host timestamp `now`.
    ///
    /// Returns `Ok(None)` when no loop is active. A failed draw stops the loop: the next tick is
    /// only scheduled after a successful frame.
    pub fn tick(
        &mut self,
        surface: &mut dyn Surface,
        now: Duration,
    ) -> TextreelResult<Option<TickReport>> {
        let Some(tick_loop) = self.active.as_mut() else {
            return Ok(None);
        };
        if !std::mem::take(&mut tick_loop.scheduled) {
            return Ok(None);
        }

        let elapsed_ms = tick_loop.clock.tick(now);
        let motion = draw_frame(surface, &tick_loop.config, elapsed_ms)?;
        tick_loop.scheduled = true;

        Ok(Some(TickReport {
            handle: tick_loop.handle,
            elapsed_ms,
            motion,
        }))
    }
}

/// Draw one complete animation frame for `elapsed_ms` and present it.
pub fn draw_frame(
    surface: &mut dyn Surface,
    config: &AnimationConfig,
    elapsed_ms: f64,
) -> TextreelResult<Motion> {
    let extent = surface
        .extent()
        .ok_or_else(|| TextreelError::render("surface is not attached"))?;

    surface.fill_rect(extent.rect(), config.background_color)?;

    let motion = config.variant.motion_at(elapsed_ms);
    surface.push_transform(motion.to_affine(extent.center()));
    let title = surface.draw_text(&config.text, Point::ORIGIN, &title_style(config));
    surface.pop_transform();
    title?;

    let overlay_origin = Point::new(
        f64::from(extent.width) - OVERLAY_INSET_PX.0,
        OVERLAY_INSET_PX.1,
    );
    surface.draw_text(
        &format_elapsed(elapsed_ms),
        overlay_origin,
        &overlay_style(config),
    )?;

    surface.present()?;
    Ok(motion)
}

/// Elapsed time as seconds with one decimal, e.g. `"1.5s"`.
pub fn format_elapsed(elapsed_ms: f64) -> String {
    format!("{:.1}s", elapsed_ms.max(0.0) / 1000.0)
}

fn title_style(config: &AnimationConfig) -> TextStyle {
    TextStyle {
        size_px: TITLE_SIZE_PX,
        weight: FontWeight::Bold,
        align: TextAlign::Center,
        baseline: TextBaseline::Middle,
        color: config.text_color,
    }
}

fn overlay_style(config: &AnimationConfig) -> TextStyle {
    TextStyle {
        size_px: OVERLAY_SIZE_PX,
        weight: FontWeight::Regular,
        align: TextAlign::Right,
        baseline: TextBaseline::Alphabetic,
        color: config.text_color,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/engine.rs"]
mod tests;
