#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

fn sample(x: f64, y: f64, t: f64) -> StrokePoint {
    StrokePoint::new(x, y, 0.5, t)
}

#[test]
fn new_stroke_is_empty() {
    let stroke = Stroke::new();
    assert!(stroke.is_empty());
    assert_eq!(stroke.len(), 0);
}

#[test]
fn push_appends_in_order() {
    let mut stroke = Stroke::new();
    stroke.push(sample(0.0, 0.0, 0.0));
    stroke.push(sample(10.0, 5.0, 16.0));
    stroke.push(sample(20.0, 8.0, 32.0));
    assert_eq!(stroke.len(), 3);

    let finished = stroke.finish();
    assert_eq!(finished.points()[0].x, 0.0);
    assert_eq!(finished.points()[1].x, 10.0);
    assert_eq!(finished.points()[2].x, 20.0);
}

#[test]
fn finish_preserves_pressure_and_timestamps() {
    let mut stroke = Stroke::new();
    stroke.push(StrokePoint::new(1.0, 2.0, 0.75, 48.0));
    let finished = stroke.finish();
    assert_eq!(finished.points()[0].pressure, 0.75);
    assert_eq!(finished.points()[0].timestamp_ms, 48.0);
}

#[test]
fn engine_points_strip_extra_channels() {
    let mut stroke = Stroke::new();
    stroke.push(StrokePoint::new(3.0, 4.0, 0.9, 100.0));
    stroke.push(StrokePoint::new(5.0, 6.0, 0.1, 116.0));
    let raw = stroke.finish().engine_points();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw[0].x, 3.0);
    assert_eq!(raw[0].y, 4.0);
    assert_eq!(raw[1].x, 5.0);
    assert_eq!(raw[1].y, 6.0);
}

#[test]
fn finished_empty_stroke_is_empty() {
    let finished = Stroke::new().finish();
    assert!(finished.is_empty());
    assert!(finished.engine_points().is_empty());
}

#[test]
fn stroke_serializes_round_trip() {
    let mut stroke = Stroke::new();
    stroke.push(sample(1.5, -2.5, 0.0));
    let finished = stroke.finish();
    let json = serde_json::to_string(&finished).unwrap();
    let back: FinishedStroke = serde_json::from_str(&json).unwrap();
    assert_eq!(finished, back);
}
