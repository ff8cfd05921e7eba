use super::*;
use crate::capture::encoder::{Segment, WEBM_MIME};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "textreel_exporter_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn artifact(bytes: &[u8]) -> Artifact {
    Artifact::from_segments(
        &[Segment {
            seq: 0,
            data: bytes.to_vec(),
        }],
        WEBM_MIME,
    )
}

#[test]
fn location_ref_is_idempotent_per_artifact() {
    let mut exp = FsExporter::new(temp_dir("idem"));
    let a = artifact(b"webm");
    let r1 = exp.to_location_ref(&a);
    let r2 = exp.to_location_ref(&a);
    assert_eq!(r1, r2);
    assert!(r1.as_str().starts_with("blob:textreel/"));
    assert_eq!(exp.live_refs(), vec![r1.clone()]);

    let other = exp.to_location_ref(&artifact(b"webm"));
    assert_ne!(other, r1);
    exp.release(&r1);
    exp.release(&other);
}

#[test]
fn download_writes_bytes_under_default_name() {
    let dir = temp_dir("download");
    let mut exp = FsExporter::new(&dir);
    let a = artifact(b"\x1a\x45\xdf\xa3payload");
    let r = exp.to_location_ref(&a);

    let path = exp.trigger_download(&r, DEFAULT_FILENAME).unwrap();
    assert_eq!(path, dir.join("video.webm"));
    assert_eq!(std::fs::read(&path).unwrap(), a.data());
    assert_eq!(exp.mime_type(&r), Some("video/webm"));

    assert!(exp.release(&r));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn released_ref_no_longer_resolves() {
    let dir = temp_dir("released");
    let mut exp = FsExporter::new(&dir);
    let r = exp.to_location_ref(&artifact(b"x"));
    assert!(exp.release(&r));
    assert!(!exp.release(&r));
    assert!(exp.live_refs().is_empty());

    let err = exp.trigger_download(&r, DEFAULT_FILENAME).unwrap_err();
    assert!(matches!(err, TextreelError::InvalidStateTransition(_)));
}

#[test]
fn empty_artifact_downloads_as_empty_file() {
    let dir = temp_dir("empty");
    let mut exp = FsExporter::new(&dir);
    let a = Artifact::from_segments(&[], WEBM_MIME);
    let r = exp.to_location_ref(&a);
    let path = exp.trigger_download(&r, "empty.webm").unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    exp.release(&r);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn overwrite_can_be_refused() {
    let dir = temp_dir("overwrite");
    let mut exp = FsExporter::new(&dir).with_overwrite(false);
    let r = exp.to_location_ref(&artifact(b"1"));
    exp.trigger_download(&r, "a.webm").unwrap();
    let err = exp.trigger_download(&r, "a.webm").unwrap_err();
    assert!(matches!(err, TextreelError::Export(_)));
    exp.release(&r);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn file_names_are_single_components() {
    assert_eq!(normalize_file_name(" clip.webm ").unwrap(), "clip.webm");
    for bad in ["", "  ", "../x.webm", "a/b.webm", "a\\b.webm", ".", ".."] {
        assert!(normalize_file_name(bad).is_err(), "accepted {bad:?}");
    }
}
