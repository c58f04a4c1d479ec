//! Matrix rasterizer.
//!
//! Shapes live in continuous pixel space (a socket centred on integer `c` with
//! radius `r` spans `[c - r, c + r]`); a pixel is painted when its centre
//! `(x + 0.5, y + 0.5)` falls inside the shape. Drawing order is fixed: white
//! sockets and bridge, dark outlines, pupils with highlights, then the emotion
//! overlays so eyelids can fully occlude what is beneath them.

use crate::constants::*;
use crate::emotion::EmotionFrame;
use crate::error::{EyesError, Result};
use crate::gaze::EyePair;
use glam::{IVec2, Vec2};
use std::fmt;

pub const LIT: u8 = 255;
pub const DARK: u8 = 0;

/// Round to the nearest pixel, halves toward +∞.
#[inline]
pub fn round_px(v: f32) -> i32 {
    (v + 0.5).floor() as i32
}

/// One 25×25 single-intensity frame, row-major from the top-left.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pixels: [u8; MATRIX_PIXELS],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub const WIDTH: usize = MATRIX_WIDTH;
    pub const HEIGHT: usize = MATRIX_HEIGHT;

    pub fn new() -> Self {
        Self {
            pixels: [DARK; MATRIX_PIXELS],
        }
    }

    /// Build from row-major intensities; any non-zero value is lit.
    pub fn from_pixels(values: &[u8]) -> Result<Self> {
        if values.len() != MATRIX_PIXELS {
            return Err(EyesError::FrameSize {
                expected: MATRIX_PIXELS,
                got: values.len(),
            });
        }
        let mut frame = Self::new();
        for (dst, &v) in frame.pixels.iter_mut().zip(values) {
            *dst = if v != DARK { LIT } else { DARK };
        }
        Ok(frame)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels = [DARK; MATRIX_PIXELS];
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= Self::WIDTH || y >= Self::HEIGHT {
            return DARK;
        }
        self.pixels[y * Self::WIDTH + x]
    }

    pub fn is_lit(&self, x: usize, y: usize) -> bool {
        self.get(x, y) != DARK
    }

    pub fn set(&mut self, x: usize, y: usize, lit: bool) {
        if x < Self::WIDTH && y < Self::HEIGHT {
            self.pixels[y * Self::WIDTH + x] = if lit { LIT } else { DARK };
        }
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p != DARK).count()
    }

    pub fn row_lit_count(&self, y: usize) -> usize {
        (0..Self::WIDTH).filter(|&x| self.is_lit(x, y)).count()
    }

    /// Paint every pixel whose centre satisfies `inside`.
    fn paint(&mut self, lit: bool, inside: impl Fn(Vec2) -> bool) {
        for y in 0..Self::HEIGHT {
            for x in 0..Self::WIDTH {
                if inside(Vec2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    self.set(x, y, lit);
                }
            }
        }
    }

    pub fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, lit: bool) {
        self.paint(lit, |p| inside_ellipse(p - center, radii));
    }

    /// Stroke of `width` centred on the ellipse boundary.
    pub fn stroke_ellipse(&mut self, center: Vec2, radii: Vec2, width: f32, lit: bool) {
        let half = width * 0.5;
        let outer = radii + Vec2::splat(half);
        let inner = radii - Vec2::splat(half);
        self.paint(lit, |p| {
            let d = p - center;
            inside_ellipse(d, outer) && !(inner.min_element() > 0.0 && inside_ellipse(d, inner))
        });
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, lit: bool) {
        self.paint(lit, |p| p.distance_squared(center) <= radius * radius);
    }

    /// Filled ellipse with half-axes `half_axes` rotated clockwise by `degrees`.
    /// The minor half-axis is widened to half a pixel so slivers stay visible.
    pub fn fill_rotated_ellipse(&mut self, center: Vec2, half_axes: Vec2, degrees: f32, lit: bool) {
        let axes = half_axes.max(Vec2::splat(0.5));
        let rot = Vec2::from_angle(-degrees.to_radians());
        self.paint(lit, |p| inside_ellipse(rot.rotate(p - center), axes));
    }

    /// Half-open rectangle `[min, max)`.
    pub fn fill_rect(&mut self, min: Vec2, max: Vec2, lit: bool) {
        self.paint(lit, |p| p.cmpge(min).all() && p.cmplt(max).all());
    }

    /// Stroke of `width` centred on the rectangle's edges.
    pub fn stroke_rect(&mut self, min: Vec2, max: Vec2, width: f32, lit: bool) {
        let half = Vec2::splat(width * 0.5);
        let (omin, omax) = (min - half, max + half);
        let (imin, imax) = (min + half, max - half);
        self.paint(lit, |p| {
            let in_outer = p.cmpge(omin).all() && p.cmplt(omax).all();
            let in_inner = p.cmpge(imin).all() && p.cmplt(imax).all();
            in_outer && !in_inner
        });
    }

    /// Segment `a`–`b` with round caps.
    pub fn stroke_line(&mut self, a: Vec2, b: Vec2, width: f32, lit: bool) {
        let half = width * 0.5;
        self.paint(lit, |p| distance_to_segment(p, a, b) <= half);
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..Self::HEIGHT {
            for x in 0..Self::WIDTH {
                f.write_str(if self.is_lit(x, y) { "O" } else { "." })?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({} lit)\n{}", self.lit_count(), self)
    }
}

#[inline]
fn inside_ellipse(d: Vec2, radii: Vec2) -> bool {
    if radii.x <= 0.0 || radii.y <= 0.0 {
        return false;
    }
    (d.x * d.x) / (radii.x * radii.x) + (d.y * d.y) / (radii.y * radii.y) <= 1.0
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Socket placement and size for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SocketGeometry {
    pub centers: EyePair<IVec2>,
    pub radius: IVec2,
    pub outline: f32,
}

impl SocketGeometry {
    /// Base sockets scaled by an emotion factor; each radius stays at least 1px.
    pub fn scaled(scale: f32) -> Self {
        Self {
            centers: EyePair {
                left: left_eye_center(),
                right: right_eye_center(),
            },
            radius: IVec2::new(
                round_px(EYE_RADIUS_X as f32 * scale).max(1),
                round_px(EYE_RADIUS_Y as f32 * scale).max(1),
            ),
            outline: OUTLINE_WIDTH,
        }
    }

    pub fn base() -> Self {
        Self::scaled(1.0)
    }

    /// First row of the socket band, clipped to the matrix.
    pub fn top(&self) -> i32 {
        (self.centers.left.y - self.radius.y).max(0)
    }

    /// One past the last row of the socket band, clipped to the matrix.
    pub fn bottom(&self) -> i32 {
        (self.centers.left.y + self.radius.y).min(MATRIX_HEIGHT as i32)
    }

    /// Rectangle bridging the two sockets, if they do not already touch.
    pub fn bridge(&self) -> Option<(Vec2, Vec2)> {
        let left_edge = (self.centers.left.x + self.radius.x) as f32;
        let right_edge = (self.centers.right.x - self.radius.x) as f32;
        if right_edge - left_edge <= 0.0 {
            return None;
        }
        let cy = self.centers.left.y as f32;
        let half = self.radius.y as f32 / 2.0;
        Some((
            Vec2::new(left_edge, cy - half),
            Vec2::new(right_edge, cy + half),
        ))
    }
}

/// Everything the rasterizer needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scene {
    pub socket: SocketGeometry,
    /// Socket-clamped pupil centres.
    pub pupils: EyePair<IVec2>,
    pub emotion: EmotionFrame,
}

pub fn render(scene: &Scene) -> Frame {
    let mut frame = Frame::new();
    render_into(&mut frame, scene);
    frame
}

pub fn render_into(frame: &mut Frame, scene: &Scene) {
    frame.clear();
    let socket = &scene.socket;
    let radii = socket.radius.as_vec2();
    let centers = socket.centers.map(|c| c.as_vec2());
    let bridge = socket.bridge();

    // 1. eye whites
    frame.fill_ellipse(centers.left, radii, true);
    frame.fill_ellipse(centers.right, radii, true);
    if let Some((min, max)) = bridge {
        frame.fill_rect(min, max, true);
    }

    // 2. outlines
    frame.stroke_ellipse(centers.left, radii, socket.outline, false);
    frame.stroke_ellipse(centers.right, radii, socket.outline, false);
    if let Some((min, max)) = bridge {
        frame.stroke_rect(min, max, socket.outline, false);
    }

    // 3. pupils
    draw_pupil(frame, scene.pupils.left);
    draw_pupil(frame, scene.pupils.right);

    // 4. overlays
    draw_overlays(frame, socket, &scene.emotion);
}

fn draw_pupil(frame: &mut Frame, center: IVec2) {
    let r = PUPIL_RADIUS;
    // Sits slightly down-left of its nominal centre.
    let pupil = (center + IVec2::new(-r / 2, r / 2)).as_vec2();
    frame.fill_circle(pupil, r as f32, false);

    let r = r as f32;
    let highlight = pupil + Vec2::new(r * HIGHLIGHT_OFFSET, -r * HIGHLIGHT_OFFSET);
    let half_axes = Vec2::new(r * HIGHLIGHT_WIDTH, r * HIGHLIGHT_HEIGHT) * 0.5;
    frame.fill_rotated_ellipse(highlight, half_axes, HIGHLIGHT_ROTATION_DEG, true);
}

/// Rows covered by a lid for `amount` of the socket half-height, at least one.
#[inline]
fn lid_rows(radius_y: i32, amount: f32) -> i32 {
    round_px(radius_y as f32 * amount).max(1)
}

fn draw_overlays(frame: &mut Frame, socket: &SocketGeometry, emotion: &EmotionFrame) {
    let width = MATRIX_WIDTH as f32;
    let top = socket.top() as f32;
    let bottom = socket.bottom() as f32;
    let ry = socket.radius.y;

    let lids = |frame: &mut Frame, cover: i32, lower: bool| {
        let cover = cover as f32;
        frame.fill_rect(Vec2::new(0.0, top), Vec2::new(width, top + cover), false);
        if lower {
            frame.fill_rect(Vec2::new(0.0, bottom - cover), Vec2::new(width, bottom), false);
        }
    };

    if emotion.blink > 0.0 {
        lids(frame, lid_rows(ry, emotion.blink), true);
    }
    if emotion.sleep > 0.0 {
        lids(frame, lid_rows(ry, emotion.sleep * SLEEP_COVER_FRACTION), false);
    }
    if emotion.angry > 0.0 {
        draw_brows(frame, socket, emotion.angry);
    }
    if emotion.squint > 0.0 {
        lids(frame, lid_rows(ry, emotion.squint * SQUINT_COVER_FRACTION), true);
    }
}

fn draw_brows(frame: &mut Frame, socket: &SocketGeometry, angry: f32) {
    let rx = socket.radius.x;
    let rise = BROW_TILT_PX * angry;
    for (center, inner_right) in [(socket.centers.left, true), (socket.centers.right, false)] {
        let y = (center.y - socket.radius.y - BROW_GAP) as f32;
        let outer_x = (center.x - rx + 1) as f32;
        let inner_x = (center.x + rx - 1) as f32;
        // Inner ends (toward the nose) are raised.
        let (a, b) = if inner_right {
            (Vec2::new(outer_x, y), Vec2::new(inner_x, y - rise))
        } else {
            (Vec2::new(outer_x, y - rise), Vec2::new(inner_x, y))
        };
        frame.stroke_line(a, b, BROW_WIDTH, true);
    }
}

/// Consumer of rendered frames.
pub trait DisplaySink {
    fn submit(&mut self, frame: &Frame) -> Result<()>;

    /// Give the display back. Called once on teardown.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn submit(&mut self, frame: &Frame) -> Result<()> {
        (**self).submit(frame)
    }

    fn release(&mut self) -> Result<()> {
        (**self).release()
    }
}
