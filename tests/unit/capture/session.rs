use super::*;
use crate::animation::config::{AnimationConfig, Variant};
use crate::animation::engine::AnimationEngine;
use crate::capture::encoder::InMemoryEncoder;
use crate::foundation::core::Extent;
use crate::render::recording::RecordingSurface;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(Extent::new(8, 6).unwrap())
}

fn session() -> CaptureSession {
    CaptureSession::new(Box::new(InMemoryEncoder::new()))
}

#[test]
fn default_opts_match_fixed_target() {
    let opts = CaptureOpts::default();
    assert_eq!(opts.sample_rate, Fps::whole(30).unwrap());
    assert_eq!(opts.bitrate_bps, 2_500_000);
    assert_eq!(opts.codec, VideoCodec::Vp9);
}

#[test]
fn start_then_immediate_stop_yields_empty_artifact() {
    let s = surface();
    let mut cap = session();
    cap.start(&s, CaptureOpts::default(), ms(1_000)).unwrap();
    assert_eq!(cap.state(), RecordingState::Recording);

    // Same timestamp: no sample interval has elapsed.
    assert!(!cap.sample(&s, ms(1_000)).unwrap());
    let artifact = cap.stop().unwrap().unwrap();
    assert!(artifact.is_empty());
    assert_eq!(artifact.mime_type(), "video/webm");
    assert_eq!(cap.state(), RecordingState::Stopped);
    assert!(cap.segments().is_empty());
}

#[test]
fn samples_at_fixed_rate_and_drops_missed_intervals() {
    let s = surface();
    let mut cap = session();
    let opts = CaptureOpts {
        sample_rate: Fps::whole(10).unwrap(),
        ..CaptureOpts::default()
    };
    cap.start(&s, opts, ms(0)).unwrap();

    assert!(!cap.sample(&s, ms(50)).unwrap());
    assert!(cap.sample(&s, ms(100)).unwrap());
    assert!(!cap.sample(&s, ms(150)).unwrap());
    // A long stall yields one frame, not a burst.
    assert!(cap.sample(&s, ms(560)).unwrap());
    assert!(!cap.sample(&s, ms(590)).unwrap());
    assert!(cap.sample(&s, ms(600)).unwrap());

    assert_eq!(cap.frames_sampled(), 3);
    let seqs: Vec<u64> = cap.segments().iter().map(|s| s.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2]);
}

#[test]
fn segments_grow_while_recording_and_freeze_after_stop() {
    let mut s = surface();
    let mut engine = AnimationEngine::new();
    engine.initialize(&s, AnimationConfig::default()).unwrap();

    let mut cap = session();
    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();

    let mut last = 0;
    for t in (0..=500).step_by(16) {
        engine.tick(&mut s, ms(t)).unwrap();
        cap.sample(&s, ms(t)).unwrap();
        assert!(cap.segments().len() >= last);
        last = cap.segments().len();
    }
    assert!(last > 0);

    let len = cap.stop().unwrap().unwrap().len();
    let frame_len = Extent::new(8, 6).unwrap().rgba8_len();
    assert_eq!(len, last * frame_len);

    engine.tick(&mut s, ms(600)).unwrap();
    assert!(!cap.sample(&s, ms(600)).unwrap());
    assert_eq!(cap.poll().unwrap(), 0);
    assert_eq!(cap.segments().len(), last);
}

#[test]
fn stop_is_a_noop_when_idle_or_stopped() {
    let s = surface();
    let mut cap = session();
    assert!(cap.stop().unwrap().is_none());
    assert_eq!(cap.state(), RecordingState::Idle);

    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();
    cap.sample(&s, ms(40)).unwrap();
    let first_id = cap.stop().unwrap().unwrap().id();

    assert!(cap.stop().unwrap().is_none());
    assert_eq!(cap.state(), RecordingState::Stopped);
    assert_eq!(cap.artifact().unwrap().id(), first_id);
}

#[test]
fn states_only_move_forward() {
    let s = surface();
    let mut cap = session();
    let mut seen = vec![cap.state()];

    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();
    seen.push(cap.state());
    let err = cap.start(&s, CaptureOpts::default(), ms(10)).unwrap_err();
    assert!(matches!(err, TextreelError::InvalidStateTransition(_)));

    cap.stop().unwrap();
    seen.push(cap.state());
    let err = cap.start(&s, CaptureOpts::default(), ms(20)).unwrap_err();
    assert!(matches!(err, TextreelError::InvalidStateTransition(_)));

    assert_eq!(
        seen,
        vec![
            RecordingState::Idle,
            RecordingState::Recording,
            RecordingState::Stopped
        ]
    );
}

#[test]
fn detached_surface_leaves_session_idle() {
    let s = RecordingSurface::detached();
    let mut cap = session();
    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();
    assert_eq!(cap.state(), RecordingState::Idle);
    assert!(!cap.sample(&s, ms(100)).unwrap());
}

#[test]
fn unsupported_codec_is_surfaced_and_session_stays_idle() {
    let s = surface();
    let mut cap = CaptureSession::new(Box::new(InMemoryEncoder::unsupported()));
    let err = cap
        .start(&s, CaptureOpts::default(), ms(0))
        .unwrap_err();
    assert!(matches!(err, TextreelError::UnsupportedEncoding(_)));
    assert_eq!(cap.state(), RecordingState::Idle);
}

#[test]
fn config_change_mid_recording_leaves_session_untouched() {
    let mut s = surface();
    let mut engine = AnimationEngine::new();
    engine.initialize(&s, AnimationConfig::default()).unwrap();

    let mut cap = session();
    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();
    for t in (0..=200).step_by(16) {
        engine.tick(&mut s, ms(t)).unwrap();
        cap.sample(&s, ms(t)).unwrap();
    }
    let before = cap.segments().len();

    engine
        .reinitialize(&s, AnimationConfig::default().with_variant(Variant::Spin))
        .unwrap();
    assert_eq!(cap.state(), RecordingState::Recording);
    assert_eq!(cap.segments().len(), before);

    for t in (216..=400).step_by(16) {
        engine.tick(&mut s, ms(t)).unwrap();
        cap.sample(&s, ms(t)).unwrap();
    }
    assert!(cap.segments().len() > before);
    let seqs: Vec<u64> = cap.segments().iter().map(|s| s.seq).collect();
    assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
    assert!(cap.stop().unwrap().is_some());
}

#[test]
fn encoder_failure_is_surfaced() {
    struct FailingEncoder(Option<mpsc::Sender<EncoderEvent>>);

    impl StreamEncoder for FailingEncoder {
        fn start(
            &mut self,
            _cfg: EncoderConfig,
            events: mpsc::Sender<EncoderEvent>,
        ) -> TextreelResult<()> {
            self.0 = Some(events);
            Ok(())
        }

        fn push_frame(&mut self, _frame: &crate::render::surface::FrameRGBA) -> TextreelResult<()> {
            if let Some(tx) = &self.0 {
                tx.send(EncoderEvent::Failed("boom".to_owned())).unwrap();
            }
            Ok(())
        }

        fn stop(&mut self) -> TextreelResult<()> {
            Err(TextreelError::encode("flush failed"))
        }
    }

    let s = surface();
    let mut cap = CaptureSession::new(Box::new(FailingEncoder(None)));
    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();
    let err = cap.sample(&s, ms(40)).unwrap_err();
    assert!(matches!(err, TextreelError::Encode(ref m) if m == "boom"));

    // The failure already ended the capture.
    assert_eq!(cap.state(), RecordingState::Stopped);
    assert!(cap.stop().unwrap().is_none());
    assert!(cap.artifact().is_none());
    assert!(!cap.sample(&s, ms(80)).unwrap());
}

/// Emits one scripted batch of sequence numbers per pushed frame.
struct ScriptedEncoder {
    batches: std::collections::VecDeque<Vec<u64>>,
    events: Option<mpsc::Sender<EncoderEvent>>,
    stops: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl ScriptedEncoder {
    fn new(batches: Vec<Vec<u64>>) -> Self {
        Self {
            batches: batches.into(),
            events: None,
            stops: std::sync::Arc::default(),
        }
    }
}

impl StreamEncoder for ScriptedEncoder {
    fn start(
        &mut self,
        _cfg: EncoderConfig,
        events: mpsc::Sender<EncoderEvent>,
    ) -> TextreelResult<()> {
        self.events = Some(events);
        Ok(())
    }

    fn push_frame(&mut self, _frame: &crate::render::surface::FrameRGBA) -> TextreelResult<()> {
        let batch = self.batches.pop_front().unwrap_or_default();
        if let Some(tx) = &self.events {
            for seq in batch {
                tx.send(EncoderEvent::Segment(Segment {
                    seq,
                    data: vec![seq as u8],
                }))
                .unwrap();
            }
        }
        Ok(())
    }

    fn stop(&mut self) -> TextreelResult<()> {
        self.stops
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(tx) = self.events.take() {
            let _ = tx.send(EncoderEvent::Finished);
        }
        Ok(())
    }
}

#[test]
fn out_of_order_segment_ends_capture_and_keeps_valid_prefix() {
    let s = surface();
    let encoder = ScriptedEncoder::new(vec![vec![0], vec![2, 3], vec![4]]);
    let stops = std::sync::Arc::clone(&encoder.stops);
    let mut cap = CaptureSession::new(Box::new(encoder));
    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();

    assert!(cap.sample(&s, ms(40)).unwrap());
    assert_eq!(cap.segments().len(), 1);

    let err = cap.sample(&s, ms(80)).unwrap_err();
    assert!(matches!(err, TextreelError::Encode(ref m) if m.contains("out of order")));
    assert_eq!(cap.state(), RecordingState::Stopped);
    assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 1);

    // Segments collected before the gap are preserved and frozen.
    let seqs: Vec<u64> = cap.segments().iter().map(|s| s.seq).collect();
    assert_eq!(seqs, vec![0]);
    assert!(!cap.sample(&s, ms(120)).unwrap());
    assert_eq!(cap.poll().unwrap(), 0);
    assert_eq!(cap.segments().len(), 1);

    // The error is reported once; stop is then a no-op without an artifact.
    assert!(cap.stop().unwrap().is_none());
    assert!(cap.artifact().is_none());
    assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn in_order_batches_are_accepted() {
    let s = surface();
    let mut cap = CaptureSession::new(Box::new(ScriptedEncoder::new(vec![
        vec![0, 1],
        vec![],
        vec![2],
    ])));
    cap.start(&s, CaptureOpts::default(), ms(0)).unwrap();
    for t in [40, 80, 120] {
        assert!(cap.sample(&s, ms(t)).unwrap());
    }
    let artifact = cap.stop().unwrap().unwrap();
    assert_eq!(artifact.data(), &[0u8, 1, 2]);
}
