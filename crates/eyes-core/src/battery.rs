use crate::constants::*;
use crate::emotion::EmotionKind;

/// Discretized battery state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatteryTier {
    #[default]
    Normal,
    Low,
    Critical,
    Charging,
}

impl BatteryTier {
    /// Persistent sleepiness this tier adds on top of the sleepy channel.
    pub fn sleep_bias(self) -> f32 {
        match self {
            BatteryTier::Low => LOW_SLEEP_BIAS,
            BatteryTier::Critical => CRITICAL_SLEEP_BIAS,
            BatteryTier::Normal | BatteryTier::Charging => 0.0,
        }
    }

    /// Channel fired on entering this tier.
    pub fn entry_cue(self) -> Option<EmotionKind> {
        match self {
            BatteryTier::Low | BatteryTier::Critical => Some(EmotionKind::Sleepy),
            BatteryTier::Charging => Some(EmotionKind::Surprise),
            BatteryTier::Normal => None,
        }
    }
}

/// Raw battery broadcast as delivered by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatteryStatus {
    pub level: i32,
    pub scale: i32,
    pub charging: bool,
    pub full: bool,
    pub plugged: bool,
}

impl BatteryStatus {
    /// Integer charge percentage, or `None` when the fields are unusable.
    pub fn percent(&self) -> Option<i32> {
        if self.level < 0 || self.scale <= 0 {
            return None;
        }
        Some((self.level as i64 * 100 / self.scale as i64) as i32)
    }

    /// Tier for this status; `None` drops the sample.
    pub fn tier(&self) -> Option<BatteryTier> {
        let percent = self.percent()?;
        let tier = if self.charging || self.full || self.plugged {
            BatteryTier::Charging
        } else if percent < CRITICAL_BATTERY_PERCENT {
            BatteryTier::Critical
        } else if percent < LOW_BATTERY_PERCENT {
            BatteryTier::Low
        } else {
            BatteryTier::Normal
        };
        Some(tier)
    }
}

/// Battery-driven mood that outlives transient channels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BatteryMood {
    pub tier: BatteryTier,
    pub sleep_bias: f32,
}

impl BatteryMood {
    /// Edge-triggered update. `None` when the tier is unchanged, otherwise the
    /// entry cue (itself optional) of the new tier.
    pub fn transition(&mut self, tier: BatteryTier) -> Option<Option<EmotionKind>> {
        if tier == self.tier {
            return None;
        }
        log::info!("[battery] tier {:?} -> {:?}", self.tier, tier);
        self.tier = tier;
        self.sleep_bias = tier.sleep_bias();
        Some(tier.entry_cue())
    }
}
