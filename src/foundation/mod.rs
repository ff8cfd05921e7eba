//! Error taxonomy and core value types.

/// Frame rates, extents and geometry re-exports.
pub mod core;
/// Crate error type.
pub mod error;
pub(crate) mod math;
