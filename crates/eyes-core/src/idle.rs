//! Procedural idle motion used when no live tilt input drives the pupils.
//!
//! The demo generator plays one randomly chosen pattern for 1.5–4 s, then
//! draws the next. The always-on generator is coarser: it picks a static pose
//! once per interval and holds it, trading fluid motion for fewer updates.

use crate::constants::*;
use crate::gaze::EyePair;
use glam::Vec2;
use rand::prelude::*;
use std::f32::consts::{PI, TAU};
use std::ops::RangeInclusive;

/// Motion recipe for one demo segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DemoPatternKind {
    LeftRight,
    UpDown,
    CrossEye,
    Apart,
    Drift,
    Stop,
}

impl DemoPatternKind {
    pub const ALL: [DemoPatternKind; 6] = [
        DemoPatternKind::LeftRight,
        DemoPatternKind::UpDown,
        DemoPatternKind::CrossEye,
        DemoPatternKind::Apart,
        DemoPatternKind::Drift,
        DemoPatternKind::Stop,
    ];

    /// Both pupils move together.
    pub fn is_coupled(self) -> bool {
        matches!(self, DemoPatternKind::LeftRight | DemoPatternKind::UpDown)
    }

    /// Pupils move independently of each other.
    pub fn is_independent(self) -> bool {
        matches!(
            self,
            DemoPatternKind::CrossEye | DemoPatternKind::Apart | DemoPatternKind::Drift
        )
    }

    /// Pixel offsets at normalized time `t` in \[0, 1\].
    pub fn offsets(self, t: f32, seed: f32) -> EyePair<Vec2> {
        let phase = TAU * t;
        let s = phase.sin();
        match self {
            DemoPatternKind::LeftRight => EyePair::both(Vec2::new(s * DEMO_RANGE_X, 0.0)),
            DemoPatternKind::UpDown => EyePair::both(Vec2::new(0.0, s * DEMO_RANGE_Y)),
            DemoPatternKind::CrossEye => {
                let base = s.abs() * DEMO_RANGE_X;
                EyePair {
                    left: Vec2::new(base, 0.0),
                    right: Vec2::new(-base, 0.0),
                }
            }
            DemoPatternKind::Apart => {
                let base = s.abs() * DEMO_RANGE_X;
                EyePair {
                    left: Vec2::new(-base, 0.0),
                    right: Vec2::new(base, 0.0),
                }
            }
            DemoPatternKind::Drift => {
                let wander = |shift: f32| {
                    Vec2::new(
                        (phase * DRIFT_RATE_X + seed + shift).sin() * DRIFT_AMPLITUDE_X,
                        (phase * DRIFT_RATE_Y + seed + shift).cos() * DRIFT_AMPLITUDE_Y,
                    )
                };
                EyePair {
                    left: wander(0.0),
                    right: wander(PI),
                }
            }
            DemoPatternKind::Stop => EyePair::both(Vec2::ZERO),
        }
    }
}

/// Weighted pattern draw: 10% stop, then 3:1 coupled vs independent,
/// split evenly inside each group.
pub fn choose_pattern<R: Rng + ?Sized>(rng: &mut R) -> DemoPatternKind {
    if rng.gen::<f32>() < STOP_PROBABILITY {
        return DemoPatternKind::Stop;
    }
    if rng.gen::<f32>() < COUPLED_SHARE {
        if rng.gen::<f32>() < 0.5 {
            DemoPatternKind::LeftRight
        } else {
            DemoPatternKind::UpDown
        }
    } else {
        const INDEPENDENT: [DemoPatternKind; 3] = [
            DemoPatternKind::CrossEye,
            DemoPatternKind::Apart,
            DemoPatternKind::Drift,
        ];
        let i = ((rng.gen::<f32>() * 3.0) as usize).min(2);
        INDEPENDENT[i]
    }
}

/// Derive an independent RNG stream from a base seed.
pub fn stream_rng(seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// One time-boxed demo segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DemoPattern {
    pub kind: DemoPatternKind,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub seed: f32,
}

impl DemoPattern {
    /// Normalized progress through the segment, clamped to \[0, 1\].
    pub fn progress(&self, now_ms: u64) -> f32 {
        let elapsed = now_ms.saturating_sub(self.start_ms);
        (elapsed as f32 / self.duration_ms.max(1) as f32).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }
}

/// Demo-mode generator cycling through randomly drawn patterns.
pub struct IdleMotion {
    rng: StdRng,
    duration_ms: RangeInclusive<u64>,
    pattern: DemoPattern,
}

impl IdleMotion {
    pub fn new(mut rng: StdRng, duration_ms: RangeInclusive<u64>, now_ms: u64) -> Self {
        let pattern = draw_pattern(&mut rng, &duration_ms, now_ms);
        Self {
            rng,
            duration_ms,
            pattern,
        }
    }

    pub fn pattern(&self) -> &DemoPattern {
        &self.pattern
    }

    /// Replace the current segment with a freshly drawn one starting at `now_ms`.
    pub fn restart(&mut self, now_ms: u64) {
        self.pattern = draw_pattern(&mut self.rng, &self.duration_ms, now_ms);
        log::debug!(
            "[gaze] demo pattern {:?} for {}ms",
            self.pattern.kind,
            self.pattern.duration_ms
        );
    }

    /// Per-eye pixel offsets at `now_ms`, rolling over to a new segment when due.
    pub fn offsets(&mut self, now_ms: u64) -> EyePair<Vec2> {
        if self.pattern.is_expired(now_ms) {
            self.restart(now_ms);
        }
        let t = self.pattern.progress(now_ms);
        self.pattern.kind.offsets(t, self.pattern.seed)
    }
}

fn draw_pattern(rng: &mut StdRng, duration_ms: &RangeInclusive<u64>, now_ms: u64) -> DemoPattern {
    let kind = choose_pattern(rng);
    DemoPattern {
        kind,
        start_ms: now_ms,
        duration_ms: rng.gen_range(duration_ms.clone()),
        seed: rng.gen::<f32>() * DRIFT_SEED_MAX,
    }
}

/// Static gaze vector held for a whole always-on interval.
pub fn always_on_pose<R: Rng + ?Sized>(kind: DemoPatternKind, rng: &mut R) -> Vec2 {
    let side = |rng: &mut R| if rng.gen::<bool>() { 1.0 } else { -1.0 };
    match kind {
        DemoPatternKind::LeftRight => Vec2::new(side(rng) * 0.8, 0.0),
        DemoPatternKind::UpDown => Vec2::new(0.0, side(rng) * 0.5),
        DemoPatternKind::CrossEye => Vec2::new(0.6, 0.0),
        DemoPatternKind::Apart => Vec2::new(-0.4, 0.0),
        DemoPatternKind::Drift => Vec2::new(
            rng.gen_range(-8..=8) as f32 / 10.0,
            rng.gen_range(-4..=4) as f32 / 10.0,
        ),
        DemoPatternKind::Stop => Vec2::ZERO,
    }
}

/// Coarse generator for the always-on display tick.
pub struct AlwaysOnMotion {
    rng: StdRng,
    interval_ms: u64,
    last_change_ms: Option<u64>,
    kind: DemoPatternKind,
    pose: Vec2,
}

impl AlwaysOnMotion {
    pub fn new(rng: StdRng, interval_ms: u64) -> Self {
        Self {
            rng,
            interval_ms,
            last_change_ms: None,
            kind: DemoPatternKind::Stop,
            pose: Vec2::ZERO,
        }
    }

    pub fn kind(&self) -> DemoPatternKind {
        self.kind
    }

    /// Current pose, resampled if the interval has run out (or never started).
    pub fn pose_at(&mut self, now_ms: u64) -> Vec2 {
        let due = match self.last_change_ms {
            None => true,
            Some(at) => now_ms.saturating_sub(at) >= self.interval_ms,
        };
        if due {
            self.last_change_ms = Some(now_ms);
            self.kind = *DemoPatternKind::ALL.choose(&mut self.rng).unwrap_or(&DemoPatternKind::Stop);
            self.pose = always_on_pose(self.kind, &mut self.rng);
            log::debug!("[gaze] always-on pose {:?} {:?}", self.kind, self.pose);
        }
        self.pose
    }
}
