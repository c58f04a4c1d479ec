use glam::Vec2;

/// Single-pole low-pass filter turning raw 2-axis tilt into a gaze vector.
///
/// Each sample is divided by `divisor`, clamped to \[-1, 1\] per axis and then
/// blended in with `filtered += alpha * (normalized - filtered)`. State carries
/// across samples until `reset`.
#[derive(Clone, Debug)]
pub struct TiltFilter {
    alpha: f32,
    divisor: f32,
    filtered: Vec2,
}

impl TiltFilter {
    pub fn new(alpha: f32, divisor: f32) -> Self {
        Self {
            alpha,
            divisor,
            filtered: Vec2::ZERO,
        }
    }

    /// Map a raw sample into the normalized \[-1, 1\]² square.
    #[inline]
    pub fn normalize(&self, ax: f32, ay: f32) -> Vec2 {
        Vec2::new(
            (ax / self.divisor).clamp(-1.0, 1.0),
            (ay / self.divisor).clamp(-1.0, 1.0),
        )
    }

    /// Feed one sample. Non-finite readings are dropped and return `false`.
    pub fn push_sample(&mut self, ax: f32, ay: f32) -> bool {
        if !ax.is_finite() || !ay.is_finite() {
            log::debug!("[gaze] dropped tilt sample ({ax}, {ay})");
            return false;
        }
        let n = self.normalize(ax, ay);
        self.filtered += self.alpha * (n - self.filtered);
        true
    }

    pub fn vector(&self) -> Vec2 {
        self.filtered
    }

    /// Overwrite the filtered state, e.g. with a held always-on pose.
    pub fn set_vector(&mut self, v: Vec2) {
        self.filtered = v.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    pub fn reset(&mut self) {
        self.filtered = Vec2::ZERO;
    }
}
