//! Pupil placement.
//!
//! A frame's pupil offsets come from one of two sources: the low-pass tilt
//! filter (sensor mode) or the idle motion generator (demo mode). Offsets are
//! rounded to whole pixels, limited per direction, and finally projected onto
//! the socket ellipse so the pupil never crosses the outline.

use crate::config::EyesConfig;
use crate::constants::*;
use crate::filter::TiltFilter;
use crate::idle::{stream_rng, AlwaysOnMotion, IdleMotion};
use crate::raster::{round_px, SocketGeometry};
use glam::{IVec2, Vec2};

/// Which source currently owns the gaze vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GazeMode {
    Sensor,
    Demo,
}

impl GazeMode {
    pub fn toggled(self) -> Self {
        match self {
            GazeMode::Sensor => GazeMode::Demo,
            GazeMode::Demo => GazeMode::Sensor,
        }
    }
}

/// A value per eye.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EyePair<T> {
    pub left: T,
    pub right: T,
}

impl<T: Copy> EyePair<T> {
    pub fn both(v: T) -> Self {
        Self { left: v, right: v }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> EyePair<U> {
        EyePair {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

/// Clamp an integer offset to the anisotropic travel box.
///
/// Rightward travel stops at +4, leftward at -2, upward at -5 and downward at +2.
#[inline]
pub fn apply_direction_limits(offset: IVec2) -> IVec2 {
    IVec2::new(
        offset.x.clamp(GAZE_LIMIT_LEFT, GAZE_LIMIT_RIGHT),
        offset.y.clamp(GAZE_LIMIT_UP, GAZE_LIMIT_DOWN),
    )
}

/// Per-direction safe radii for the pupil centre inside one socket.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafeRadii {
    pub right: f32,
    pub left: f32,
    pub up: f32,
    pub down: f32,
}

impl SafeRadii {
    /// Derive from socket radii and the pupil radius. Every radius is at least 1px.
    pub fn for_socket(radius: IVec2, pupil_radius: i32) -> Self {
        let inner_x = radius.x - pupil_radius;
        let inner_y = radius.y - pupil_radius;
        Self {
            right: (inner_x + SAFE_SLACK_RIGHT).max(1) as f32,
            left: (inner_x + SAFE_SLACK_LEFT).max(1) as f32,
            up: (inner_y + SAFE_SLACK_UP).max(1) as f32,
            down: (inner_y + SAFE_SLACK_DOWN).max(1) as f32,
        }
    }

    /// The (rx, ry) pair that bounds travel in the direction of `d`.
    #[inline]
    pub fn pick(&self, d: Vec2) -> Vec2 {
        let rx = if d.x > 0.0 { self.right } else { self.left };
        let ry = if d.y < 0.0 { self.up } else { self.down };
        Vec2::new(rx, ry)
    }
}

/// Normalized ellipse distance `dx²/rx² + dy²/ry²`; 1 on the boundary.
#[inline]
pub fn ellipse_distance(d: Vec2, radii: Vec2) -> f32 {
    (d.x * d.x) / (radii.x * radii.x) + (d.y * d.y) / (radii.y * radii.y)
}

/// Keep `d` if it lies inside the quadrant's ellipse, otherwise scale it back
/// along its own direction until it sits on the boundary.
pub fn project_onto_socket(d: Vec2, safe: &SafeRadii) -> Vec2 {
    let radii = safe.pick(d);
    let dist = ellipse_distance(d, radii);
    if dist <= 1.0 {
        return d;
    }
    d / dist.sqrt()
}

/// Integer version of [`project_onto_socket`] used for rasterizing.
pub fn clamp_to_socket(offset: IVec2, safe: &SafeRadii) -> IVec2 {
    let d = offset.as_vec2();
    let p = project_onto_socket(d, safe);
    if p == d {
        return offset;
    }
    IVec2::new(round_px(p.x), round_px(p.y))
}

/// Gaze vector times pixel range, rounded and direction limited.
#[inline]
pub fn limited_offset(pixels: Vec2) -> IVec2 {
    apply_direction_limits(IVec2::new(round_px(pixels.x), round_px(pixels.y)))
}

/// Owns the gaze sources and resolves pupil centres each frame.
pub struct GazeController {
    mode: GazeMode,
    pupil_range: i32,
    filter: TiltFilter,
    idle: IdleMotion,
    always_on: AlwaysOnMotion,
}

impl GazeController {
    pub fn new(config: &EyesConfig, now_ms: u64) -> Self {
        Self {
            mode: config.initial_mode,
            pupil_range: config.pupil_range,
            filter: TiltFilter::new(config.filter_alpha, config.tilt_divisor),
            idle: IdleMotion::new(
                stream_rng(config.seed, 1),
                config.demo_duration_ms.clone(),
                now_ms,
            ),
            always_on: AlwaysOnMotion::new(stream_rng(config.seed, 2), config.always_on_interval_ms),
        }
    }

    pub fn mode(&self) -> GazeMode {
        self.mode
    }

    /// Switch source. Entering demo mode starts a fresh pattern.
    pub fn set_mode(&mut self, mode: GazeMode, now_ms: u64) {
        if mode == GazeMode::Demo {
            self.idle.restart(now_ms);
        }
        if mode != self.mode {
            log::info!("[gaze] mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    pub fn filter(&self) -> &TiltFilter {
        &self.filter
    }

    pub fn idle(&self) -> &IdleMotion {
        &self.idle
    }

    pub fn on_tilt(&mut self, ax: f32, ay: f32) -> bool {
        self.filter.push_sample(ax, ay)
    }

    /// Hold the coarse always-on pose in the filter state.
    pub fn on_always_on_tick(&mut self, now_ms: u64) {
        let pose = self.always_on.pose_at(now_ms);
        self.filter.set_vector(pose);
    }

    /// Direction-limited pixel offsets for this instant, before socket clamping.
    pub fn offsets(&mut self, now_ms: u64) -> EyePair<IVec2> {
        match self.mode {
            GazeMode::Sensor => {
                let o = limited_offset(self.filter.vector() * self.pupil_range as f32);
                EyePair::both(o)
            }
            GazeMode::Demo => self.idle.offsets(now_ms).map(limited_offset),
        }
    }

    /// Clamped pupil centres for the given socket geometry.
    pub fn pupil_centers(&mut self, now_ms: u64, socket: &SocketGeometry) -> EyePair<IVec2> {
        let offsets = self.offsets(now_ms);
        let safe = SafeRadii::for_socket(socket.radius, PUPIL_RADIUS);
        EyePair {
            left: socket.centers.left + clamp_to_socket(offsets.left, &safe),
            right: socket.centers.right + clamp_to_socket(offsets.right, &safe),
        }
    }
}
