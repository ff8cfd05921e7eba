use super::*;

fn sweep() -> impl Iterator<Item = f64> {
    // Dense near zero, then sparse out to ~3 hours.
    (0..2_000i32)
        .map(|i| f64::from(i) * 7.3)
        .chain((0..500i32).map(|i| f64::from(i) * 21_611.9))
}

#[test]
fn bounce_offset_stays_within_amplitude() {
    for e in sweep() {
        let dy = bounce_offset(e);
        assert!((-50.0..=0.0).contains(&dy), "e={e} dy={dy}");
    }
}

#[test]
fn spin_angle_stays_within_one_turn() {
    for e in sweep() {
        let a = spin_angle(e);
        assert!((0.0..TAU).contains(&a), "e={e} a={a}");
    }
}

#[test]
fn wave_scale_stays_within_depth() {
    for e in sweep() {
        let s = wave_scale(e);
        assert!((0.7..=1.3).contains(&s), "e={e} s={s}");
    }
}

#[test]
fn known_values() {
    assert_eq!(bounce_offset(0.0), 0.0);
    assert!((bounce_offset(250.0) - (-23.971)).abs() < 1e-3);
    assert!((spin_angle(1000.0) - 1.0).abs() < 1e-12);
    assert!((wave_scale(300.0) - 1.25244).abs() < 1e-4);
}

#[test]
fn spin_wraps_after_full_turn() {
    let e = TAU * 1000.0 + 500.0;
    assert!((spin_angle(e) - 0.5).abs() < 1e-9);
}

#[test]
fn bounce_rectification_period() {
    // |sin| repeats every pi * 500 ms, half the underlying sine period.
    let period = std::f64::consts::PI * 500.0;
    for e in [10.0, 123.0, 700.0] {
        assert!((bounce_offset(e) - bounce_offset(e + period)).abs() < 1e-9);
    }
}

#[test]
fn motion_affines_anchor_at_center() {
    let center = Point::new(400.0, 300.0);

    let t = Variant::Bounce.motion_at(250.0).to_affine(center);
    let p = t * Point::ORIGIN;
    assert!((p.x - 400.0).abs() < 1e-9);
    assert!((p.y - (300.0 + bounce_offset(250.0))).abs() < 1e-9);

    let r = Variant::Spin.motion_at(0.0).to_affine(center);
    assert_eq!(r * Point::ORIGIN, center);
    let r = Variant::Spin
        .motion_at(std::f64::consts::FRAC_PI_2 * 1000.0)
        .to_affine(center);
    let q = r * Point::new(10.0, 0.0);
    assert!((q.x - 400.0).abs() < 1e-9);
    assert!((q.y - 310.0).abs() < 1e-9);

    let s = Variant::Wave.motion_at(300.0).to_affine(center);
    let q = s * Point::new(10.0, 0.0);
    assert!((q.x - (400.0 + 10.0 * wave_scale(300.0))).abs() < 1e-9);
    assert_eq!(s * Point::ORIGIN, center);
}

#[test]
fn zero_elapsed_is_identity_motion() {
    assert_eq!(Variant::Bounce.motion_at(0.0), Motion::Translate { dy: 0.0 });
    assert_eq!(Variant::Spin.motion_at(0.0), Motion::Rotate { radians: 0.0 });
    assert_eq!(Variant::Wave.motion_at(0.0), Motion::Scale { factor: 1.0 });
}
