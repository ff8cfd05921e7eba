use super::*;

#[test]
fn fps_rejects_zero_terms() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::whole(60).is_ok());
}

#[test]
fn fps_interval_matches_rate() {
    let fps = Fps::whole(30).unwrap();
    let ms = fps.interval().as_secs_f64() * 1000.0;
    assert!((ms - 33.333).abs() < 1e-2);

    let ntsc = Fps::new(30_000, 1001).unwrap();
    assert!((ntsc.as_f64() - 29.97).abs() < 1e-2);
}

#[test]
fn extent_geometry() {
    let e = Extent::new(800, 600).unwrap();
    assert_eq!(e.center(), Point::new(400.0, 300.0));
    assert_eq!(e.rect(), Rect::new(0.0, 0.0, 800.0, 600.0));
    assert_eq!(e.rgba8_len(), 800 * 600 * 4);
    assert!(Extent::new(0, 10).is_err());
}

#[test]
fn fps_rejects_rates_with_zero_interval() {
    let err = Fps::new(u32::MAX, 1).unwrap_err();
    assert!(matches!(err, TextreelError::Validation(_)));
    assert_eq!(
        Fps {
            num: u32::MAX,
            den: 1
        }
        .interval(),
        Duration::ZERO
    );

    // Exactly 1ns per frame is still representable.
    let fps = Fps::new(1_000_000_000, 1).unwrap();
    assert_eq!(fps.interval(), Duration::from_nanos(1));
    assert_eq!(
        Fps::new(u32::MAX, 5).unwrap().interval(),
        Duration::from_nanos(1)
    );
}

#[test]
fn fps_interval_is_integer_nanos() {
    assert_eq!(
        Fps::whole(30).unwrap().interval(),
        Duration::from_nanos(33_333_333)
    );
    assert_eq!(
        Fps::new(30_000, 1001).unwrap().interval(),
        Duration::from_nanos(33_366_666)
    );
}
