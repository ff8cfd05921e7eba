//! Colors and text layout shared by surfaces and configuration.

/// Color values and their JSON forms.
pub mod color;
pub(crate) mod text;
