//! Finalized artifacts and how they leave the process.

/// Finalized capture output.
pub mod artifact;
/// Handing artifacts to the filesystem.
pub mod exporter;
