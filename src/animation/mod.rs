//! Time-driven text animation.
//!
//! An [`engine::AnimationEngine`] owns one [`clock::FrameClock`] per loop and turns elapsed time
//! plus an [`config::AnimationConfig`] into draw calls against a surface.

/// Per-loop elapsed time.
pub mod clock;
/// Animation configuration.
pub mod config;
/// Loop lifecycle and frame drawing.
pub mod engine;
/// Motion formulas.
pub mod variant;
