use crate::constants::*;
use crate::error::{EyesError, Result};
use crate::gaze::GazeMode;
use std::ops::RangeInclusive;

/// Runtime tuning for the eyes engine.
///
/// - `frame_interval_ms` / `step_interval_ms`: render tick and animation step periods
/// - `long_press_ms`: press length at which a release counts as a long press
/// - `second_blink_delay_ms` / `mode_switch_delay_ms`: long-press sequence timing
/// - `tilt_divisor` / `filter_alpha`: sensor normalisation and low-pass strength
/// - `pupil_range`: pixels per unit of gaze vector
/// - `demo_duration_ms`: bounds for each randomized demo pattern
/// - `always_on_interval_ms`: how long a coarse always-on pose is held
/// - `seed`: base seed for every random source
/// - `initial_mode`: gaze source at start-up
#[derive(Clone, Debug)]
pub struct EyesConfig {
    pub frame_interval_ms: u64,
    pub step_interval_ms: u64,
    pub long_press_ms: u64,
    pub second_blink_delay_ms: u64,
    pub mode_switch_delay_ms: u64,
    pub tilt_divisor: f32,
    pub filter_alpha: f32,
    pub pupil_range: i32,
    pub demo_duration_ms: RangeInclusive<u64>,
    pub always_on_interval_ms: u64,
    pub seed: u64,
    pub initial_mode: GazeMode,
}

impl Default for EyesConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: FRAME_INTERVAL_MS,
            step_interval_ms: STEP_INTERVAL_MS,
            long_press_ms: LONG_PRESS_MS,
            second_blink_delay_ms: SECOND_BLINK_DELAY_MS,
            mode_switch_delay_ms: MODE_SWITCH_DELAY_MS,
            tilt_divisor: TILT_DIVISOR,
            filter_alpha: FILTER_ALPHA,
            pupil_range: PUPIL_RANGE,
            demo_duration_ms: DEMO_MIN_DURATION_MS..=DEMO_MAX_DURATION_MS,
            always_on_interval_ms: ALWAYS_ON_INTERVAL_MS,
            seed: 42,
            initial_mode: GazeMode::Demo,
        }
    }
}

impl EyesConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_initial_mode(mut self, mode: GazeMode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 || self.step_interval_ms == 0 {
            return Err(EyesError::InvalidConfig(
                "tick intervals must be positive".into(),
            ));
        }
        if !(self.filter_alpha > 0.0 && self.filter_alpha <= 1.0) {
            return Err(EyesError::InvalidConfig(format!(
                "filter_alpha {} outside (0, 1]",
                self.filter_alpha
            )));
        }
        if !self.tilt_divisor.is_finite() || self.tilt_divisor == 0.0 {
            return Err(EyesError::InvalidConfig(format!(
                "tilt_divisor {} must be finite and non-zero",
                self.tilt_divisor
            )));
        }
        if self.pupil_range < 0 {
            return Err(EyesError::InvalidConfig("pupil_range is negative".into()));
        }
        if self.demo_duration_ms.is_empty() || *self.demo_duration_ms.start() == 0 {
            return Err(EyesError::InvalidConfig(format!(
                "demo duration range {:?} is empty or zero",
                self.demo_duration_ms
            )));
        }
        if self.always_on_interval_ms == 0 {
            return Err(EyesError::InvalidConfig(
                "always_on_interval_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}
