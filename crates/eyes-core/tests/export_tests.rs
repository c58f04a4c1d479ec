// Host-side integration tests for CSV and JSON frame export.

use eyes_core::constants::*;
use eyes_core::{
    frame_to_csv_line, parse_csv_line, render, EmotionFrame, EyesError, Frame, Scene,
    SocketGeometry, Timeline,
};

fn neutral_frame() -> Frame {
    let socket = SocketGeometry::base();
    render(&Scene {
        socket,
        pupils: socket.centers,
        emotion: EmotionFrame::neutral(),
    })
}

#[test]
fn csv_line_has_one_value_per_pixel() {
    let frame = neutral_frame();
    let line = frame_to_csv_line(&frame);
    let values: Vec<&str> = line.split(',').collect();
    assert_eq!(values.len(), MATRIX_PIXELS);
    assert!(values.iter().all(|v| *v == "0" || *v == "2040"));
    let lit = values.iter().filter(|v| **v == "2040").count();
    assert_eq!(lit, frame.lit_count());
    assert_eq!(values[12 * MATRIX_WIDTH + 10], "2040", "(10, 12) is eye white");
}

#[test]
fn csv_line_parses_back() {
    let frame = neutral_frame();
    let parsed = parse_csv_line(&format!("{}\n", frame_to_csv_line(&frame))).expect("valid line");
    assert_eq!(parsed, frame);
}

#[test]
fn csv_rejects_bad_values_and_lengths() {
    assert!(matches!(parse_csv_line("0,1,x"), Err(EyesError::Pixel(v)) if v == "x"));
    assert!(matches!(
        parse_csv_line("0,2040,0"),
        Err(EyesError::FrameSize { got: 3, .. })
    ));
}

#[test]
fn timeline_json_shape() {
    let mut timeline = Timeline::new();
    timeline.push(&neutral_frame(), 33);
    timeline.push(&Frame::new(), 400);
    let json = timeline.to_json().expect("serializable");

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let frames = value["frames"].as_array().expect("frames array");
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["duration_ms"], 33);
    let rows = frames[0]["pixels"].as_array().expect("pixel rows");
    assert_eq!(rows.len(), MATRIX_HEIGHT);
    assert!(rows
        .iter()
        .all(|r| r.as_array().map(|r| r.len()) == Some(MATRIX_WIDTH)));
    assert_eq!(rows[12][10], EXPORT_LIT_LEVEL);

    let back = Timeline::from_json(&json).expect("parses back");
    assert_eq!(back, timeline);
    assert_eq!(back.frames[0].to_frame().expect("valid frame"), neutral_frame());
    assert_eq!(back.total_duration_ms(), 433);
}

#[test]
fn missing_duration_defaults() {
    let row = format!("[{}]", vec!["0"; MATRIX_WIDTH].join(","));
    let rows = vec![row; MATRIX_HEIGHT].join(",");
    let json = format!("{{\"frames\":[{{\"pixels\":[{rows}]}}]}}");
    let timeline = Timeline::from_json(&json).expect("valid timeline");
    assert_eq!(timeline.frames[0].duration_ms, EXPORT_DEFAULT_FRAME_MS);
    assert_eq!(timeline.frames[0].to_frame().expect("valid frame").lit_count(), 0);
}

#[test]
fn ragged_frames_are_rejected() {
    let mut timeline = Timeline::new();
    timeline.push(&Frame::new(), 10);
    timeline.frames[0].pixels[3].pop();
    assert!(matches!(
        timeline.frames[0].to_frame(),
        Err(EyesError::FrameSize { .. })
    ));
    assert!(matches!(Timeline::from_json("{\"frames\":"), Err(EyesError::Json(_))));
}

#[test]
fn timeline_saves_and_loads() {
    let path = std::env::temp_dir().join(format!("eyes-timeline-{}.json", std::process::id()));
    let mut timeline = Timeline::new();
    timeline.push(&neutral_frame(), 120);
    timeline.save(&path).expect("write timeline");
    let loaded = Timeline::load(&path).expect("read timeline");
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, timeline);
}
