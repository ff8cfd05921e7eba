use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::capture::encoder::Segment;

static NEXT_ARTIFACT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique artifact identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(u64);

impl ArtifactId {
    fn next() -> Self {
        Self(NEXT_ARTIFACT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A finalized container: every segment of one capture concatenated in order.
#[derive(Clone, Debug)]
pub struct Artifact {
    id: ArtifactId,
    data: Arc<[u8]>,
    mime_type: &'static str,
}

impl Artifact {
    /// Concatenate `segments` (already in sequence order). Zero segments yield an empty artifact.
    pub fn from_segments(segments: &[Segment], mime_type: &'static str) -> Self {
        let total = segments.iter().map(|s| s.data.len()).sum();
        let mut data = Vec::with_capacity(total);
        for segment in segments {
            data.extend_from_slice(&segment.data);
        }
        Self {
            id: ArtifactId::next(),
            data: data.into(),
            mime_type,
        }
    }

    /// Process-unique id.
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    /// Container bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the bytes.
    pub fn bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Container mime type.
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the capture produced no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
