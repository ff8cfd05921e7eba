use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::export::artifact::{Artifact, ArtifactId};
use crate::foundation::error::{TextreelError, TextreelResult};
use crate::foundation::math::Fnv1a64;

/// File name used when the client does not choose one.
pub const DEFAULT_FILENAME: &str = "video.webm";

/// Opaque reference to an exported artifact, valid until released.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocationRef(String);

impl LocationRef {
    /// The reference string, e.g. `blob:textreel/...`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LocationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns finalized artifacts into retrievable references and persists them on request.
///
/// References are never released implicitly; callers own their lifetime.
pub trait Exporter {
    /// Reference for `artifact`. Calling this again for the same artifact returns the same ref.
    fn to_location_ref(&mut self, artifact: &Artifact) -> LocationRef;

    /// Persist the referenced bytes as `filename`, returning the written path.
    fn trigger_download(&mut self, location: &LocationRef, filename: &str)
    -> TextreelResult<PathBuf>;

    /// Invalidate `location`. Returns `false` if it was unknown or already released.
    fn release(&mut self, location: &LocationRef) -> bool;
}

struct Entry {
    artifact: ArtifactId,
    data: Arc<[u8]>,
    mime_type: &'static str,
}

/// [`Exporter`] writing downloads into a directory.
pub struct FsExporter {
    out_dir: PathBuf,
    overwrite: bool,
    by_artifact: HashMap<ArtifactId, LocationRef>,
    entries: HashMap<LocationRef, Entry>,
}

impl FsExporter {
    /// Exporter writing into `out_dir`, created on first download.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            overwrite: true,
            by_artifact: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    /// Refuse to replace existing files when `overwrite` is false.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Download directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// References that have not been released, in sorted order.
    pub fn live_refs(&self) -> Vec<LocationRef> {
        let mut refs: Vec<_> = self.entries.keys().cloned().collect();
        refs.sort();
        refs
    }

    /// Mime type of a live reference.
    pub fn mime_type(&self, location: &LocationRef) -> Option<&'static str> {
        self.entries.get(location).map(|e| e.mime_type)
    }
}

impl Exporter for FsExporter {
    fn to_location_ref(&mut self, artifact: &Artifact) -> LocationRef {
        if let Some(existing) = self.by_artifact.get(&artifact.id()) {
            return existing.clone();
        }

        let mut h = Fnv1a64::new_default();
        h.write_u64(artifact.len() as u64);
        h.write_bytes(artifact.data());
        let location = LocationRef(format!(
            "blob:textreel/{:016x}-{:016x}",
            artifact.id().get(),
            h.finish()
        ));

        self.by_artifact.insert(artifact.id(), location.clone());
        self.entries.insert(
            location.clone(),
            Entry {
                artifact: artifact.id(),
                data: artifact.bytes(),
                mime_type: artifact.mime_type(),
            },
        );
        tracing::debug!(%location, bytes = artifact.len(), "location ref created");
        location
    }

    #[tracing::instrument(skip(self, location), fields(location = %location))]
    fn trigger_download(
        &mut self,
        location: &LocationRef,
        filename: &str,
    ) -> TextreelResult<PathBuf> {
        let entry = self.entries.get(location).ok_or_else(|| {
            TextreelError::invalid_state(format!(
                "location ref '{location}' is unknown or released"
            ))
        })?;
        let name = normalize_file_name(filename)?;
        let path = self.out_dir.join(name);

        if !self.overwrite && path.exists() {
            return Err(TextreelError::export(format!(
                "refusing to overwrite '{}'",
                path.display()
            )));
        }
        ensure_parent_dir(&path)?;
        {
            use anyhow::Context as _;
            std::fs::write(&path, &entry.data)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
        }
        tracing::debug!(path = %path.display(), bytes = entry.data.len(), "download written");
        Ok(path)
    }

    fn release(&mut self, location: &LocationRef) -> bool {
        match self.entries.remove(location) {
            Some(entry) => {
                self.by_artifact.remove(&entry.artifact);
                tracing::debug!(%location, "location ref released");
                true
            }
            None => false,
        }
    }
}

impl Drop for FsExporter {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            tracing::warn!(
                count = self.entries.len(),
                refs = ?self.live_refs(),
                "exporter dropped with unreleased location refs"
            );
        }
    }
}

/// Validate a client-chosen download name: a single relative file name.
pub(crate) fn normalize_file_name(filename: &str) -> TextreelResult<&str> {
    let name = filename.trim();
    if name.is_empty() {
        return Err(TextreelError::validation("file name must be non-empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(TextreelError::validation(
            "file name must not contain path separators",
        ));
    }
    if name == "." || name == ".." {
        return Err(TextreelError::validation("file name must not be '.' or '..'"));
    }
    Ok(name)
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TextreelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/export/exporter.rs"]
mod tests;
