// Shared geometry and timing constants for the matrix eyes.

// Matrix
pub const MATRIX_WIDTH: usize = 25;
pub const MATRIX_HEIGHT: usize = 25;
pub const MATRIX_PIXELS: usize = MATRIX_WIDTH * MATRIX_HEIGHT;

// Socket layout (pixel coordinates, origin top-left)
pub const LEFT_EYE_CENTER: [i32; 2] = [8, 12];
pub const RIGHT_EYE_CENTER: [i32; 2] = [17, 12];
pub const EYE_RADIUS_X: i32 = 4; // horizontal radius before emotion scale
pub const EYE_RADIUS_Y: i32 = 6; // vertical radius (taller than wide)
pub const OUTLINE_WIDTH: f32 = 2.0;
pub const PUPIL_RADIUS: i32 = 2;

// Highlight sliver near the pupil's upper-right edge
pub const HIGHLIGHT_OFFSET: f32 = 0.6; // in pupil radii, along +x and -y
pub const HIGHLIGHT_WIDTH: f32 = 1.2; // in pupil radii
pub const HIGHLIGHT_HEIGHT: f32 = 0.2; // in pupil radii
pub const HIGHLIGHT_ROTATION_DEG: f32 = 25.0;

// Brow strokes (angry)
pub const BROW_WIDTH: f32 = 2.0;
pub const BROW_GAP: i32 = 2; // rows above the socket top
pub const BROW_TILT_PX: f32 = 2.0; // inner-end rise at full anger

// Gaze
pub const PUPIL_RANGE: i32 = 4; // pixels per unit of gaze vector
pub const GAZE_LIMIT_RIGHT: i32 = 4;
pub const GAZE_LIMIT_LEFT: i32 = -2;
pub const GAZE_LIMIT_UP: i32 = -5;
pub const GAZE_LIMIT_DOWN: i32 = 2;
pub const SAFE_SLACK_RIGHT: i32 = 1; // horizontal safe radius adjustments
pub const SAFE_SLACK_LEFT: i32 = -1;
pub const SAFE_SLACK_UP: i32 = 2; // vertical safe radius adjustments
pub const SAFE_SLACK_DOWN: i32 = -1;

// Tilt filter
pub const TILT_DIVISOR: f32 = 3.0; // raw accelerometer units per full deflection
pub const FILTER_ALPHA: f32 = 0.15;

// Emotion composition weights
pub const SURPRISE_SCALE_GAIN: f32 = 0.3;
pub const ANGRY_SCALE_GAIN: f32 = 0.2;
pub const SQUINT_SCALE_LOSS: f32 = 0.6;
pub const SLEEP_COVER_FRACTION: f32 = 0.9; // of socket half-height, top lid only
pub const SQUINT_COVER_FRACTION: f32 = 0.8; // of socket half-height, both lids

// Emotion timelines (ms)
pub const BLINK_DURATION_MS: u64 = 150;
pub const SURPRISE_DURATION_MS: u64 = 300;
pub const SLEEPY_DURATION_MS: u64 = 2000;
pub const ANGRY_DURATION_MS: u64 = 800;
pub const SQUINT_DURATION_MS: u64 = 800;
pub const PULSE_PEAK_AT: f32 = 0.5; // triangular shapes peak halfway
pub const SLEEPY_RISE_UNTIL: f32 = 0.3; // sleepy settles and holds after this

// Battery mood
pub const LOW_BATTERY_PERCENT: i32 = 30;
pub const CRITICAL_BATTERY_PERCENT: i32 = 15;
pub const LOW_SLEEP_BIAS: f32 = 0.3;
pub const CRITICAL_SLEEP_BIAS: f32 = 0.6;

// Scheduling (ms)
pub const FRAME_INTERVAL_MS: u64 = 33; // ~30 Hz
pub const STEP_INTERVAL_MS: u64 = 16;
pub const LONG_PRESS_MS: u64 = 700;
pub const SECOND_BLINK_DELAY_MS: u64 = 240;
pub const MODE_SWITCH_DELAY_MS: u64 = 520;

// Idle motion
pub const DEMO_MIN_DURATION_MS: u64 = 1500;
pub const DEMO_MAX_DURATION_MS: u64 = 4000;
pub const DEMO_RANGE_X: f32 = 4.0;
pub const DEMO_RANGE_Y: f32 = 2.0;
pub const DRIFT_AMPLITUDE_X: f32 = 2.0;
pub const DRIFT_AMPLITUDE_Y: f32 = 1.0;
pub const DRIFT_RATE_X: f32 = 0.6;
pub const DRIFT_RATE_Y: f32 = 0.4;
pub const DRIFT_SEED_MAX: f32 = 10.0;
pub const STOP_PROBABILITY: f32 = 0.10;
pub const COUPLED_SHARE: f32 = 0.75; // of the non-stop draws, the rest is independent
pub const ALWAYS_ON_INTERVAL_MS: u64 = 60_000;
pub const ALWAYS_ON_SLEEPY_ROLL: u32 = 5; // roll in 0..=100 below this -> sleepy
pub const ALWAYS_ON_ANGRY_ROLL: u32 = 10; // below this (and not sleepy) -> angry

// Frame export
pub const EXPORT_LIT_LEVEL: u16 = 2040;
pub const EXPORT_DEFAULT_FRAME_MS: u32 = 400;

#[inline]
pub fn left_eye_center() -> glam::IVec2 {
    glam::IVec2::from(LEFT_EYE_CENTER)
}

#[inline]
pub fn right_eye_center() -> glam::IVec2 {
    glam::IVec2::from(RIGHT_EYE_CENTER)
}
