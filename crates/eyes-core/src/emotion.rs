//! Emotion channels and their per-frame composition.
//!
//! Each expression is an independently timed channel in a fixed table keyed by
//! [`EmotionKind`]. A channel runs from trigger until its duration elapses,
//! following its shape curve; re-triggering an active channel does nothing.
//! Composition folds the table plus the persistent battery bias into one
//! [`EmotionFrame`].

use crate::battery::{BatteryMood, BatteryTier};
use crate::constants::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmotionKind {
    Blink,
    Surprise,
    Sleepy,
    Angry,
    Squint,
}

impl EmotionKind {
    pub const ALL: [EmotionKind; 5] = [
        EmotionKind::Blink,
        EmotionKind::Surprise,
        EmotionKind::Sleepy,
        EmotionKind::Angry,
        EmotionKind::Squint,
    ];

    /// Slot in per-kind tables.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn duration_ms(self) -> u64 {
        match self {
            EmotionKind::Blink => BLINK_DURATION_MS,
            EmotionKind::Surprise => SURPRISE_DURATION_MS,
            EmotionKind::Sleepy => SLEEPY_DURATION_MS,
            EmotionKind::Angry => ANGRY_DURATION_MS,
            EmotionKind::Squint => SQUINT_DURATION_MS,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            EmotionKind::Sleepy => Shape::RiseAndHold {
                rise_until: SLEEPY_RISE_UNTIL,
            },
            _ => Shape::Pulse {
                peak_at: PULSE_PEAK_AT,
            },
        }
    }
}

/// Progress curve over normalized time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Linear rise to 1 at `peak_at`, linear fall back to 0 at the end.
    Pulse { peak_at: f32 },
    /// Linear rise to 1 at `rise_until`, then held at 1.
    RiseAndHold { rise_until: f32 },
}

impl Shape {
    pub fn progress(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Shape::Pulse { peak_at } => {
                if t < peak_at {
                    t / peak_at
                } else {
                    1.0 - (t - peak_at) / (1.0 - peak_at)
                }
            }
            Shape::RiseAndHold { rise_until } => {
                if t < rise_until {
                    t / rise_until
                } else {
                    1.0
                }
            }
        }
    }
}

/// Timeline state for one expression.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmotionChannel {
    pub active: bool,
    pub progress: f32,
    pub start_ms: u64,
    pub duration_ms: u64,
}

/// Move one channel's progress to `now_ms`. Returns whether it is still running.
pub fn advance(channel: &mut EmotionChannel, shape: Shape, now_ms: u64) -> bool {
    if !channel.active {
        return false;
    }
    let elapsed = now_ms.saturating_sub(channel.start_ms);
    if elapsed >= channel.duration_ms {
        *channel = EmotionChannel::default();
        return false;
    }
    channel.progress = shape.progress(elapsed as f32 / channel.duration_ms as f32);
    true
}

/// Composed, single-instant emotion parameters consumed by the rasterizer.
///
/// Eyelid covers stay separate so they can overlap (squinting while sleepy).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmotionFrame {
    pub scale: f32,
    pub blink: f32,
    pub sleep: f32,
    pub angry: f32,
    pub squint: f32,
}

impl EmotionFrame {
    pub fn neutral() -> Self {
        Self {
            scale: 1.0,
            ..Self::default()
        }
    }
}

/// Multiplicative socket scale from surprise, anger and squint.
#[inline]
pub fn compose_scale(surprise: f32, angry: f32, squint: f32) -> f32 {
    (1.0 + SURPRISE_SCALE_GAIN * surprise)
        * (1.0 + ANGRY_SCALE_GAIN * angry)
        * (1.0 - SQUINT_SCALE_LOSS * squint)
}

pub struct EmotionEngine {
    channels: [EmotionChannel; 5],
    battery: BatteryMood,
}

impl Default for EmotionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionEngine {
    pub fn new() -> Self {
        Self {
            channels: [EmotionChannel::default(); 5],
            battery: BatteryMood::default(),
        }
    }

    pub fn channel(&self, kind: EmotionKind) -> &EmotionChannel {
        &self.channels[kind.index()]
    }

    pub fn is_active(&self, kind: EmotionKind) -> bool {
        self.channel(kind).active
    }

    pub fn progress(&self, kind: EmotionKind) -> f32 {
        self.channel(kind).progress
    }

    pub fn battery(&self) -> &BatteryMood {
        &self.battery
    }

    /// Start a channel's timeline. Returns `false` if it was already running.
    pub fn trigger(&mut self, kind: EmotionKind, now_ms: u64) -> bool {
        let ch = &mut self.channels[kind.index()];
        if ch.active {
            log::debug!("[emotion] {kind:?} already active, ignored");
            return false;
        }
        *ch = EmotionChannel {
            active: true,
            progress: 0.0,
            start_ms: now_ms,
            duration_ms: kind.duration_ms(),
        };
        log::debug!("[emotion] {kind:?} triggered at {now_ms}");
        true
    }

    /// Advance a single channel. Returns whether it is still running.
    pub fn step(&mut self, kind: EmotionKind, now_ms: u64) -> bool {
        let running = advance(&mut self.channels[kind.index()], kind.shape(), now_ms);
        if !running {
            log::debug!("[emotion] {kind:?} finished");
        }
        running
    }

    /// Advance every active channel.
    pub fn tick(&mut self, now_ms: u64) {
        for kind in EmotionKind::ALL {
            if self.is_active(kind) {
                self.step(kind, now_ms);
            }
        }
    }

    /// Apply a battery tier. Only a change of tier has any effect; the return
    /// value says whether it did.
    pub fn set_battery_tier(&mut self, tier: BatteryTier, now_ms: u64) -> bool {
        let Some(cue) = self.battery.transition(tier) else {
            return false;
        };
        if let Some(kind) = cue {
            self.trigger(kind, now_ms);
        }
        true
    }

    /// Fold all channels and the battery bias into this frame's parameters.
    pub fn compose(&self) -> EmotionFrame {
        let sleep = self.progress(EmotionKind::Sleepy) + self.battery.sleep_bias;
        EmotionFrame {
            scale: compose_scale(
                self.progress(EmotionKind::Surprise),
                self.progress(EmotionKind::Angry),
                self.progress(EmotionKind::Squint),
            ),
            blink: self.progress(EmotionKind::Blink),
            sleep: sleep.clamp(0.0, 1.0),
            angry: self.progress(EmotionKind::Angry),
            squint: self.progress(EmotionKind::Squint),
        }
    }
}
