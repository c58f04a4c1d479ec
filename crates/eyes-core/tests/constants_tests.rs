// Host-side sanity checks for tuning constants and config validation.

#![allow(clippy::assertions_on_constants)]

use eyes_core::constants::*;
use eyes_core::{EyesConfig, EyesError, GazeMode};

#[test]
fn sockets_are_mirrored_on_the_matrix() {
    assert_eq!(LEFT_EYE_CENTER[1], RIGHT_EYE_CENTER[1], "eyes share a row");
    assert_eq!(
        (LEFT_EYE_CENTER[0] + RIGHT_EYE_CENTER[0]) as usize,
        MATRIX_WIDTH,
        "eyes are symmetric about the matrix centre"
    );
    assert!(LEFT_EYE_CENTER[0] - EYE_RADIUS_X - 1 >= 0);
    assert!(RIGHT_EYE_CENTER[0] + EYE_RADIUS_X + 1 < MATRIX_WIDTH as i32);
    assert!(EYE_RADIUS_Y > EYE_RADIUS_X, "sockets are taller than wide");
}

#[test]
fn gaze_limits_favour_up_and_right() {
    assert!(GAZE_LIMIT_RIGHT > -GAZE_LIMIT_LEFT);
    assert!(-GAZE_LIMIT_UP > GAZE_LIMIT_DOWN);
    assert!(GAZE_LIMIT_RIGHT <= PUPIL_RANGE);
}

#[test]
fn long_press_sequence_timing_is_consistent() {
    assert!(
        SECOND_BLINK_DELAY_MS > BLINK_DURATION_MS + STEP_INTERVAL_MS,
        "second blink must not land on the still-active first one"
    );
    assert!(MODE_SWITCH_DELAY_MS > SECOND_BLINK_DELAY_MS + BLINK_DURATION_MS);
    assert!(LONG_PRESS_MS > FRAME_INTERVAL_MS);
    assert!(STEP_INTERVAL_MS < FRAME_INTERVAL_MS);
}

#[test]
fn weights_and_biases_are_fractions() {
    assert!((0.0..1.0).contains(&STOP_PROBABILITY));
    assert!((0.0..1.0).contains(&COUPLED_SHARE));
    assert!(LOW_SLEEP_BIAS < CRITICAL_SLEEP_BIAS && CRITICAL_SLEEP_BIAS <= 1.0);
    assert!(CRITICAL_BATTERY_PERCENT < LOW_BATTERY_PERCENT);
    assert!(ALWAYS_ON_SLEEPY_ROLL < ALWAYS_ON_ANGRY_ROLL);
}

#[test]
fn default_config_is_valid() {
    let config = EyesConfig::default();
    config.validate().expect("defaults must validate");
    assert_eq!(config.initial_mode, GazeMode::Demo);
    assert_eq!(config.frame_interval_ms, FRAME_INTERVAL_MS);
    assert_eq!(config.with_seed(7).seed, 7);
}

#[test]
fn bad_configs_are_rejected() {
    let bad = [
        EyesConfig {
            frame_interval_ms: 0,
            ..EyesConfig::default()
        },
        EyesConfig {
            filter_alpha: 1.5,
            ..EyesConfig::default()
        },
        EyesConfig {
            tilt_divisor: 0.0,
            ..EyesConfig::default()
        },
        EyesConfig {
            pupil_range: -1,
            ..EyesConfig::default()
        },
        EyesConfig {
            demo_duration_ms: 4_000..=1_500,
            ..EyesConfig::default()
        },
        EyesConfig {
            always_on_interval_ms: 0,
            ..EyesConfig::default()
        },
    ];
    for config in bad {
        assert!(
            matches!(config.validate(), Err(EyesError::InvalidConfig(_))),
            "accepted {config:?}"
        );
    }
}
