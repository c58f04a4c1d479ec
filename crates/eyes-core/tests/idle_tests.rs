// Host-side integration tests for demo pattern selection and idle motion.

use eyes_core::constants::*;
use eyes_core::{always_on_pose, choose_pattern, stream_rng, AlwaysOnMotion, DemoPatternKind, IdleMotion};
use glam::Vec2;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Replays fixed `gen::<f32>()` results in order, cycling.
struct ScriptedRng {
    values: Vec<f32>,
    next: usize,
}

impl ScriptedRng {
    fn new(values: &[f32]) -> Self {
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let v = self.values[self.next % self.values.len()];
        self.next += 1;
        // f32 sampling keeps the top 24 bits
        ((v * (1u32 << 24) as f32) as u32) << 8
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u32() as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[test]
fn scripted_draws_select_exact_patterns() {
    let cases: [(&[f32], DemoPatternKind); 6] = [
        (&[0.05], DemoPatternKind::Stop),
        (&[0.5, 0.2, 0.3], DemoPatternKind::LeftRight),
        (&[0.5, 0.2, 0.7], DemoPatternKind::UpDown),
        (&[0.5, 0.9, 0.1], DemoPatternKind::CrossEye),
        (&[0.5, 0.9, 0.5], DemoPatternKind::Apart),
        (&[0.5, 0.9, 0.9], DemoPatternKind::Drift),
    ];
    for (script, expected) in cases {
        let mut rng = ScriptedRng::new(script);
        assert_eq!(choose_pattern(&mut rng), expected, "script {script:?}");
    }
}

#[test]
fn zero_source_always_stops() {
    let mut rng = StepRng::new(0, 0);
    for _ in 0..10 {
        assert_eq!(choose_pattern(&mut rng), DemoPatternKind::Stop);
    }
}

#[test]
fn pattern_weights_converge() {
    let mut rng = StdRng::seed_from_u64(7);
    let n = 20_000;
    let mut stop = 0;
    let mut coupled = 0;
    let mut independent = 0;
    let mut left_right = 0;
    for _ in 0..n {
        let kind = choose_pattern(&mut rng);
        if kind == DemoPatternKind::Stop {
            stop += 1;
        } else if kind.is_coupled() {
            coupled += 1;
            if kind == DemoPatternKind::LeftRight {
                left_right += 1;
            }
        } else {
            assert!(kind.is_independent());
            independent += 1;
        }
    }
    let share = |c: i32| c as f64 / n as f64;
    assert!((share(stop) - 0.10).abs() < 0.02, "stop share {}", share(stop));
    assert!((share(coupled) - 0.675).abs() < 0.02, "coupled share {}", share(coupled));
    assert!(
        (share(independent) - 0.225).abs() < 0.02,
        "independent share {}",
        share(independent)
    );
    let lr = left_right as f64 / coupled as f64;
    assert!((lr - 0.5).abs() < 0.03, "left/right vs up/down split {lr}");
}

#[test]
fn pattern_offsets_follow_their_recipes() {
    let lr = DemoPatternKind::LeftRight.offsets(0.25, 0.0);
    assert!((lr.left.x - DEMO_RANGE_X).abs() < 1e-5 && lr.left == lr.right);

    let ud = DemoPatternKind::UpDown.offsets(0.75, 0.0);
    assert!((ud.left.y + DEMO_RANGE_Y).abs() < 1e-5 && ud.left.x == 0.0);

    for t in [0.25, 0.75] {
        let cross = DemoPatternKind::CrossEye.offsets(t, 0.0);
        assert!(cross.left.x > 3.99 && cross.right.x < -3.99, "cross-eye converges at {t}");
        let apart = DemoPatternKind::Apart.offsets(t, 0.0);
        assert!(apart.left.x < -3.99 && apart.right.x > 3.99, "apart diverges at {t}");
    }

    let stop = DemoPatternKind::Stop.offsets(0.4, 3.0);
    assert_eq!(stop.left, Vec2::ZERO);
    assert_eq!(stop.right, Vec2::ZERO);
}

#[test]
fn drift_is_small_and_decorrelated() {
    for i in 0..=20 {
        let t = i as f32 / 20.0;
        let d = DemoPatternKind::Drift.offsets(t, 4.2);
        assert!(d.left.x.abs() <= DRIFT_AMPLITUDE_X + 1e-5);
        assert!(d.left.y.abs() <= DRIFT_AMPLITUDE_Y + 1e-5);
        // right eye runs half a cycle out of phase
        assert!((d.left + d.right).length() < 1e-4, "t={t}: {d:?}");
    }
}

#[test]
fn idle_motion_rolls_over_when_pattern_expires() {
    let mut idle = IdleMotion::new(stream_rng(1, 1), DEMO_MIN_DURATION_MS..=DEMO_MAX_DURATION_MS, 0);
    let mut now = 0;
    for _ in 0..50 {
        let pattern = *idle.pattern();
        assert!(
            (DEMO_MIN_DURATION_MS..=DEMO_MAX_DURATION_MS).contains(&pattern.duration_ms),
            "duration {} out of range",
            pattern.duration_ms
        );
        assert!((0.0..=DRIFT_SEED_MAX).contains(&pattern.seed));

        idle.offsets(now + pattern.duration_ms - 1);
        assert_eq!(idle.pattern().start_ms, pattern.start_ms, "rolled over early");

        now += pattern.duration_ms;
        idle.offsets(now);
        assert_eq!(idle.pattern().start_ms, now, "did not roll over on expiry");
    }
}

#[test]
fn same_seed_replays_same_patterns() {
    let run = |seed| {
        let mut idle = IdleMotion::new(stream_rng(seed, 1), 1_500..=4_000, 0);
        (0..20)
            .map(|_| {
                let p = *idle.pattern();
                idle.restart(p.start_ms + p.duration_ms);
                (p.kind, p.duration_ms)
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn always_on_poses_match_table() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..50 {
        let lr = always_on_pose(DemoPatternKind::LeftRight, &mut rng);
        assert!(lr == Vec2::new(0.8, 0.0) || lr == Vec2::new(-0.8, 0.0));
        let ud = always_on_pose(DemoPatternKind::UpDown, &mut rng);
        assert!(ud == Vec2::new(0.0, 0.5) || ud == Vec2::new(0.0, -0.5));
        let drift = always_on_pose(DemoPatternKind::Drift, &mut rng);
        assert!(drift.x.abs() <= 0.8 + 1e-6 && drift.y.abs() <= 0.4 + 1e-6);
    }
    assert_eq!(always_on_pose(DemoPatternKind::CrossEye, &mut rng), Vec2::new(0.6, 0.0));
    assert_eq!(always_on_pose(DemoPatternKind::Apart, &mut rng), Vec2::new(-0.4, 0.0));
    assert_eq!(always_on_pose(DemoPatternKind::Stop, &mut rng), Vec2::ZERO);
}

#[test]
fn always_on_pose_is_held_for_the_interval() {
    let mut motion = AlwaysOnMotion::new(stream_rng(5, 2), ALWAYS_ON_INTERVAL_MS);
    let mut kinds = Vec::new();
    for interval in 0..30u64 {
        let start = interval * ALWAYS_ON_INTERVAL_MS;
        let pose = motion.pose_at(start);
        let kind = motion.kind();
        assert_eq!(motion.pose_at(start + ALWAYS_ON_INTERVAL_MS - 1), pose);
        assert_eq!(motion.kind(), kind);
        kinds.push(kind);
    }
    kinds.sort_by_key(|k| *k as u8);
    kinds.dedup();
    assert!(kinds.len() > 1, "always-on never changed category");
}
