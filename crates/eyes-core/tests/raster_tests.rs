// Host-side integration tests for the matrix rasterizer.

use eyes_core::constants::*;
use eyes_core::{
    compose_scale, render, round_px, EmotionFrame, EyePair, EyesError, Frame, Scene, SocketGeometry,
};
use glam::IVec2;

fn scene(emotion: EmotionFrame) -> Scene {
    let socket = SocketGeometry::scaled(emotion.scale);
    Scene {
        socket,
        pupils: socket.centers,
        emotion,
    }
}

fn with(f: impl FnOnce(&mut EmotionFrame)) -> Scene {
    let mut emotion = EmotionFrame::neutral();
    f(&mut emotion);
    scene(emotion)
}

#[test]
fn rounding_is_half_up() {
    assert_eq!(round_px(2.5), 3);
    assert_eq!(round_px(2.49), 2);
    assert_eq!(round_px(-0.5), 0);
    assert_eq!(round_px(-1.5), -1);
    assert_eq!(round_px(-1.51), -2);
}

#[test]
fn socket_scaling_keeps_radii_positive() {
    assert_eq!(SocketGeometry::base().radius, IVec2::new(4, 6));
    assert_eq!(SocketGeometry::scaled(1.2).radius, IVec2::new(5, 7));
    assert_eq!(SocketGeometry::scaled(0.4).radius, IVec2::new(2, 2));
    assert_eq!(SocketGeometry::scaled(0.05).radius, IVec2::new(1, 1));
    assert_eq!(SocketGeometry::base().centers.left, left_eye_center());
}

#[test]
fn bridge_only_spans_a_real_gap() {
    let (min, max) = SocketGeometry::base().bridge().expect("base sockets leave a gap");
    assert_eq!((min.x, max.x), (12.0, 13.0));
    assert_eq!((min.y, max.y), (9.0, 15.0));
    assert!(SocketGeometry::scaled(1.2).bridge().is_none(), "touching sockets need no bridge");
}

#[test]
fn neutral_frame_has_whites_outline_and_pupils() {
    let frame = render(&scene(EmotionFrame::neutral()));
    assert!(frame.is_lit(10, 12), "left eye white");
    assert!(frame.is_lit(19, 12), "right eye white");
    assert!(frame.is_lit(8, 7) && frame.is_lit(8, 16), "white spans the socket height");
    assert!(!frame.is_lit(7, 13), "left pupil sits down-left of centre");
    assert!(!frame.is_lit(16, 13), "right pupil sits down-left of centre");
    assert!(!frame.is_lit(4, 12), "outline is dark");
    assert!(!frame.is_lit(8, 6), "outline above the white is dark");
    assert!(!frame.is_lit(0, 0));
    for y in 0..5 {
        assert_eq!(frame.row_lit_count(y), 0, "row {y} above the eyes lit");
    }
}

#[test]
fn pupil_follows_its_centre() {
    let mut s = scene(EmotionFrame::neutral());
    s.pupils = EyePair {
        left: s.socket.centers.left + IVec2::new(3, 0),
        right: s.socket.centers.right + IVec2::new(3, 0),
    };
    let frame = render(&s);
    assert!(frame.is_lit(7, 13), "old pupil spot uncovered");
    assert!(!frame.is_lit(10, 13), "pupil moved right");
}

#[test]
fn full_blink_closes_both_eyes() {
    let frame = render(&with(|e| e.blink = 1.0));
    assert_eq!(frame.lit_count(), 0, "lids must occlude whites, pupils and highlights\n{frame}");
}

#[test]
fn sleep_covers_top_only() {
    let frame = render(&with(|e| e.sleep = 1.0));
    // round(6 * 0.9) = 5 rows from the socket top at y = 6
    for y in 6..11 {
        assert_eq!(frame.row_lit_count(y), 0, "row {y} should be under the lid");
    }
    assert!(frame.row_lit_count(12) > 0, "middle of the eye stays open");
    assert!(frame.is_lit(8, 16), "no bottom lid while sleepy");
}

#[test]
fn squint_covers_top_and_bottom() {
    let frame = render(&with(|e| {
        e.squint = 1.0;
        e.scale = compose_scale(0.0, 0.0, 1.0);
    }));
    let socket = SocketGeometry::scaled(0.4);
    assert_eq!(socket.radius, IVec2::new(2, 2));
    // ry = 2: round(2 * 0.8) = 2 rows each side leaves nothing of a 4-row socket
    assert_eq!(frame.lit_count(), 0, "full squint on a squashed socket\n{frame}");

    let mut partial = scene(EmotionFrame::neutral());
    partial.emotion.squint = 1.0;
    let frame = render(&partial);
    // base socket, ry = 6: 5 rows from each edge
    for y in (6..11).chain(13..18) {
        assert_eq!(frame.row_lit_count(y), 0, "row {y} should be under a lid");
    }
    assert!(frame.row_lit_count(12) > 0, "a slit stays open");
}

#[test]
fn small_covers_take_at_least_one_row() {
    let mut s = scene(EmotionFrame::neutral());
    s.socket = SocketGeometry::scaled(1.2);
    let open = render(&s);
    s.emotion.blink = 0.01;
    let blinking = render(&s);
    // socket rows 5..19: the minimum lid closes row 5 and row 18 only
    assert!(open.row_lit_count(6) > 0);
    assert_eq!(blinking.row_lit_count(5), 0);
    assert_eq!(blinking.row_lit_count(6), open.row_lit_count(6));
    assert_eq!(blinking.row_lit_count(17), open.row_lit_count(17));
    assert_eq!(blinking.row_lit_count(18), 0);
}

#[test]
fn angry_brows_raise_inner_ends() {
    let mut s = scene(EmotionFrame::neutral());
    s.emotion.angry = 1.0;
    let frame = render(&s);
    // brow row y = 12 - 6 - 2 = 4, inner ends lifted by 2
    assert!(frame.is_lit(5, 4), "left brow outer end");
    assert!(frame.is_lit(10, 2), "left brow inner end raised");
    assert!(!frame.is_lit(10, 4), "left brow inner end not at base row");
    assert!(frame.is_lit(14, 2), "right brow inner end raised");
    assert!(frame.is_lit(19, 3), "right brow outer end");
    assert!(!frame.is_lit(14, 4), "right brow inner end not at base row");
}

#[test]
fn brows_and_sleep_lid_coexist() {
    let mut s = scene(EmotionFrame::neutral());
    s.emotion.angry = 1.0;
    s.emotion.sleep = 1.0;
    let frame = render(&s);
    assert!(frame.row_lit_count(2) > 0, "brows survive the sleep lid");
    assert_eq!(frame.row_lit_count(7), 0, "sleep lid still covers the eye top");
}

#[test]
fn frame_accessors_and_bounds() {
    let mut frame = Frame::new();
    frame.set(3, 4, true);
    frame.set(99, 0, true);
    assert!(frame.is_lit(3, 4));
    assert_eq!(frame.get(3, 4), 255);
    assert_eq!(frame.get(99, 0), 0, "out of range reads dark");
    assert_eq!(frame.lit_count(), 1);
    assert_eq!(frame.pixels().len(), MATRIX_PIXELS);

    let text = frame.to_string();
    assert_eq!(text.lines().count(), MATRIX_HEIGHT);
    assert!(text.lines().all(|l| l.len() == MATRIX_WIDTH));
}

#[test]
fn from_pixels_checks_size() {
    match Frame::from_pixels(&[0; 10]) {
        Err(EyesError::FrameSize { expected, got }) => {
            assert_eq!((expected, got), (MATRIX_PIXELS, 10));
        }
        other => panic!("expected size error, got {other:?}"),
    }
    let mut raw = vec![0u8; MATRIX_PIXELS];
    raw[MATRIX_WIDTH + 1] = 7;
    let frame = Frame::from_pixels(&raw).expect("valid size");
    assert!(frame.is_lit(1, 1));
    assert_eq!(frame.lit_count(), 1);
}
