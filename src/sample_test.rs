use super::*;

#[test]
fn sampler_offsets_by_viewport_center() {
    let sampler = Sampler::new(Viewport::new(800.0, 600.0));
    let sample = sampler.sample(410.0, 320.0, 7);
    assert_eq!(sample, LocalSample::new(10.0, 20.0, 7));
}

#[test]
fn sampler_center_maps_to_origin() {
    let sampler = Sampler::default();
    let (cx, cy) = sampler.viewport().center();
    let sample = sampler.sample(cx, cy, 0);
    assert!(sample.x.abs() < f64::EPSILON);
    assert!(sample.y.abs() < f64::EPSILON);
}

#[test]
fn sanitized_replaces_non_finite_components() {
    let sample = LocalSample::new(f64::NAN, f64::INFINITY, 3).sanitized();
    assert_eq!(sample, LocalSample::new(0.0, 0.0, 3));

    let sample = LocalSample::new(f64::NEG_INFINITY, -4.5, 3).sanitized();
    assert_eq!(sample, LocalSample::new(0.0, -4.5, 3));
}

#[test]
fn sanitized_keeps_finite_values() {
    let sample = LocalSample::new(12.0, -21.25, 9);
    assert_eq!(sample.sanitized(), sample);
}

#[test]
fn parse_pointer_line_accepts_space_and_comma_separators() {
    assert_eq!(parse_pointer_line("10 20"), Some((10.0, 20.0)));
    assert_eq!(parse_pointer_line("  10.5,\t-3 \n"), Some((10.5, -3.0)));
    assert_eq!(parse_pointer_line("1, 2"), Some((1.0, 2.0)));
}

#[test]
fn parse_pointer_line_rejects_blank_and_garbage() {
    assert_eq!(parse_pointer_line(""), None);
    assert_eq!(parse_pointer_line("   "), None);
    assert_eq!(parse_pointer_line("10"), None);
    assert_eq!(parse_pointer_line("x y"), None);
    assert_eq!(parse_pointer_line("1 2 3"), None);
}
