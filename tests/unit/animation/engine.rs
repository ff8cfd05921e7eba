use super::*;
use crate::animation::config::Variant;
use crate::animation::variant::{bounce_offset, spin_angle};
use crate::assets::color::Color;
use crate::foundation::core::{Affine, Extent};
use crate::render::recording::{DrawCall, RecordingSurface};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(Extent::new(800, 600).unwrap())
}

#[test]
fn detached_surface_is_a_silent_noop() {
    let mut engine = AnimationEngine::new();
    let mut s = RecordingSurface::detached();
    assert!(engine.initialize(&s, AnimationConfig::default()).is_none());
    assert!(!engine.is_running());
    assert!(engine.tick(&mut s, ms(0)).unwrap().is_none());
    assert!(s.calls().is_empty());
}

#[test]
fn first_tick_is_elapsed_zero_then_advances() {
    let mut engine = AnimationEngine::new();
    let mut s = surface();
    let handle = engine
        .initialize(&s, AnimationConfig::default())
        .unwrap();

    let r0 = engine.tick(&mut s, ms(10_000)).unwrap().unwrap();
    assert_eq!(r0.handle, handle);
    assert_eq!(r0.elapsed_ms, 0.0);

    let r1 = engine.tick(&mut s, ms(10_250)).unwrap().unwrap();
    assert_eq!(r1.elapsed_ms, 250.0);
    match r1.motion {
        Motion::Translate { dy } => assert!((dy - bounce_offset(250.0)).abs() < 1e-12),
        other => panic!("unexpected motion {other:?}"),
    }
    assert_eq!(engine.elapsed_ms(), Some(250.0));
}

#[test]
fn frame_draw_order_and_overlay_is_untransformed() {
    let mut engine = AnimationEngine::new();
    let mut s = surface();
    let cfg = AnimationConfig::default().with_variant(Variant::Spin);
    engine.initialize(&s, cfg.clone()).unwrap();
    engine.tick(&mut s, ms(0)).unwrap();
    s.take_calls();
    engine.tick(&mut s, ms(1_500)).unwrap();

    let calls = s.take_calls();
    assert_eq!(calls.len(), 4);

    let DrawCall::FillRect {
        rect,
        color,
        transform,
    } = &calls[0]
    else {
        panic!("expected background fill first, got {:?}", calls[0]);
    };
    assert_eq!(*rect, Extent::new(800, 600).unwrap().rect());
    assert_eq!(*color, cfg.background_color);
    assert_eq!(*transform, Affine::IDENTITY);

    let DrawCall::Text {
        text,
        origin,
        style,
        transform,
    } = &calls[1]
    else {
        panic!("expected title text, got {:?}", calls[1]);
    };
    assert_eq!(text, "Hello Video!");
    assert_eq!(*origin, Point::ORIGIN);
    assert_eq!(style.weight, FontWeight::Bold);
    assert_eq!(style.align, TextAlign::Center);
    assert_eq!(style.size_px, TITLE_SIZE_PX);
    let expected = Affine::translate((400.0, 300.0)) * Affine::rotate(spin_angle(1_500.0));
    assert_eq!(*transform, expected);

    let DrawCall::Text {
        text,
        origin,
        style,
        transform,
    } = &calls[2]
    else {
        panic!("expected overlay text, got {:?}", calls[2]);
    };
    assert_eq!(text, "1.5s");
    assert_eq!(*origin, Point::new(780.0, 30.0));
    assert_eq!(style.align, TextAlign::Right);
    assert_eq!(style.size_px, OVERLAY_SIZE_PX);
    assert_eq!(style.color, Color::WHITE);
    assert_eq!(*transform, Affine::IDENTITY);

    assert_eq!(calls[3], DrawCall::Present);
    assert_eq!(s.transform_depth(), 0);
}

#[test]
fn reinitialize_resets_elapsed_to_zero() {
    let mut engine = AnimationEngine::new();
    let mut s = surface();
    let first = engine
        .initialize(&s, AnimationConfig::default().with_variant(Variant::Wave))
        .unwrap();
    engine.tick(&mut s, ms(1_000)).unwrap();
    let before = engine.tick(&mut s, ms(3_400)).unwrap().unwrap();
    assert_eq!(before.elapsed_ms, 2_400.0);

    let second = engine
        .reinitialize(&s, AnimationConfig::default().with_variant(Variant::Wave))
        .unwrap();
    assert_ne!(first, second);

    let after = engine.tick(&mut s, ms(3_416)).unwrap().unwrap();
    assert_eq!(after.handle, second);
    assert_eq!(after.elapsed_ms, 0.0);
    assert_eq!(after.motion, Motion::Scale { factor: 1.0 });
}

#[test]
fn initialize_while_running_restarts_the_loop() {
    let mut engine = AnimationEngine::new();
    let mut s = surface();
    let first = engine.initialize(&s, AnimationConfig::default()).unwrap();
    engine.tick(&mut s, ms(0)).unwrap();
    engine.tick(&mut s, ms(900)).unwrap();

    let second = engine
        .initialize(&s, AnimationConfig::default().with_text("again"))
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(engine.config().unwrap().text, "again");
    let r = engine.tick(&mut s, ms(950)).unwrap().unwrap();
    assert_eq!(r.elapsed_ms, 0.0);
}

#[test]
fn dispose_is_idempotent_and_stops_ticks() {
    let mut engine = AnimationEngine::new();
    let mut s = surface();
    engine.initialize(&s, AnimationConfig::default()).unwrap();
    engine.tick(&mut s, ms(0)).unwrap();
    let presented = s.presented_count();

    engine.dispose();
    engine.dispose();
    assert!(!engine.is_running());
    assert!(engine.handle().is_none());
    assert!(engine.tick(&mut s, ms(16)).unwrap().is_none());
    assert!(engine.tick(&mut s, ms(32)).unwrap().is_none());
    assert_eq!(s.presented_count(), presented);
}

#[test]
fn format_elapsed_uses_one_decimal() {
    assert_eq!(format_elapsed(0.0), "0.0s");
    assert_eq!(format_elapsed(1_500.0), "1.5s");
    assert_eq!(format_elapsed(12_345.0), "12.3s");
}
