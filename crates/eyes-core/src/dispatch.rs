//! Host event vocabulary and the single table mapping events to reactions.

use crate::emotion::EmotionKind;
use std::fmt;
use std::str::FromStr;

/// Discrete events delivered by the host toy channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToyEvent {
    Change,
    ActionDown,
    ActionUp,
    AlwaysOnTick,
}

impl ToyEvent {
    pub const ALL: [ToyEvent; 4] = [
        ToyEvent::Change,
        ToyEvent::ActionDown,
        ToyEvent::ActionUp,
        ToyEvent::AlwaysOnTick,
    ];

    /// Wire tag as sent by the host.
    pub fn tag(self) -> &'static str {
        match self {
            ToyEvent::Change => "change",
            ToyEvent::ActionDown => "action-down",
            ToyEvent::ActionUp => "action-up",
            ToyEvent::AlwaysOnTick => "always-on-tick",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.tag() == tag)
    }
}

impl fmt::Display for ToyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ToyEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown toy event '{s}'"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressOutcome {
    Short,
    Long,
}

/// Resolves press length by timestamp comparison at release.
#[derive(Clone, Debug)]
pub struct PressTracker {
    long_press_ms: u64,
    down_at: Option<u64>,
}

impl PressTracker {
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            long_press_ms,
            down_at: None,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.down_at.is_some()
    }

    /// A repeated down restarts the press.
    pub fn press(&mut self, now_ms: u64) {
        self.down_at = Some(now_ms);
    }

    /// `None` for a release with no matching press.
    pub fn release(&mut self, now_ms: u64) -> Option<PressOutcome> {
        let down_at = self.down_at.take()?;
        if now_ms.saturating_sub(down_at) >= self.long_press_ms {
            Some(PressOutcome::Long)
        } else {
            Some(PressOutcome::Short)
        }
    }
}

/// What the engine should do in response to one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    Trigger(EmotionKind),
    /// Double blink followed by a gaze mode flip.
    LongPress,
    /// Refresh the coarse always-on pose and roll for an ambient emotion.
    AlwaysOn,
}

pub struct Dispatcher {
    press: PressTracker,
}

impl Dispatcher {
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            press: PressTracker::new(long_press_ms),
        }
    }

    pub fn press(&self) -> &PressTracker {
        &self.press
    }

    pub fn dispatch(&mut self, event: ToyEvent, now_ms: u64) -> Option<Reaction> {
        let reaction = match event {
            ToyEvent::Change => Some(Reaction::Trigger(EmotionKind::Surprise)),
            ToyEvent::ActionDown => {
                self.press.press(now_ms);
                None
            }
            ToyEvent::ActionUp => match self.press.release(now_ms) {
                Some(PressOutcome::Short) => Some(Reaction::Trigger(EmotionKind::Squint)),
                Some(PressOutcome::Long) => Some(Reaction::LongPress),
                None => {
                    log::debug!("[dispatch] release without press at {now_ms}, dropped");
                    None
                }
            },
            ToyEvent::AlwaysOnTick => Some(Reaction::AlwaysOn),
        };
        log::debug!("[dispatch] {event} -> {reaction:?}");
        reaction
    }
}
