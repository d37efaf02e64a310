//! Listener Capability
//!
//! The hearing passes only see listeners through [`Listener`]. Monsters,
//! NPCs and the avatar implement it; the engine never owns their state.

use serde::{Deserialize, Serialize};

use sound_events::{SoundEvent, SourceKind, Tripoint};

/// Hearing protection worn by a listener, in dB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HearingProtection {
    /// Always on (ear plugs, helmets)
    pub passive_db: i32,
    /// Electronic protection that only damps loud sounds
    pub active_db: i32,
}

impl HearingProtection {
    pub fn new(passive_db: i32, active_db: i32) -> Self {
        Self {
            passive_db,
            active_db,
        }
    }
}

/// How hard a sleeper is to wake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepDepth {
    #[default]
    Normal,
    Heavy,
    VeryHeavy,
}

impl SleepDepth {
    /// Number of d15 rolled against the felt dB when deciding to wake.
    pub fn wake_dice(self) -> u32 {
        match self {
            SleepDepth::Normal => 2,
            SleepDepth::Heavy => 3,
            SleepDepth::VeryHeavy => 6,
        }
    }
}

/// The loudest sound a listener noticed in a pass
#[derive(Debug, Clone, PartialEq)]
pub struct HeardSound {
    pub event: Option<SoundEvent>,
    /// Hundredths of a dB
    pub felt_volume: i32,
    pub ambient: i32,
}

/// Anything that can hear.
///
/// Only the first group of methods is required. The rest default to an
/// awake listener without sleep, sight or alarm clock, which is what
/// monsters and NPCs need.
pub trait Listener {
    fn kind(&self) -> SourceKind;

    fn position(&self) -> Tripoint;

    fn is_deaf(&self) -> bool;

    /// Add `turns` of deafness.
    fn add_deafness(&mut self, turns: u32);

    /// Called once per pass with the loudest sound, or `None` when nothing
    /// was heard.
    fn hear_sound(&mut self, event: Option<&SoundEvent>, felt_volume: i32, ambient: i32);

    fn can_hear(&self) -> bool {
        true
    }

    /// Multiplier on hearing range, 1.0 for ordinary hearing
    fn hearing_ability(&self) -> f32 {
        1.0
    }

    /// How far below the ambient floor this listener can still hear, in
    /// hundredths of a dB.
    fn hearing_margin(&self) -> i32 {
        ((1000.0 + 1000.0 * self.hearing_ability()).floor() as i32).min(4000)
    }

    fn hearing_protection(&self) -> HearingProtection {
        HearingProtection::default()
    }

    fn is_immune_to_deafness(&self) -> bool {
        false
    }

    fn feels_pain(&self) -> bool {
        true
    }

    fn pain(&self) -> i32 {
        0
    }

    fn mod_pain(&mut self, _amount: i32) {}

    fn is_asleep(&self) -> bool {
        false
    }

    fn sleep_depth(&self) -> SleepDepth {
        SleepDepth::Normal
    }

    fn under_narcosis(&self) -> bool {
        false
    }

    /// Lying down trying to fall asleep, but not asleep yet
    fn trying_to_sleep(&self) -> bool {
        false
    }

    fn slept_through_alarm(&self) -> bool {
        false
    }

    fn wake_up(&mut self) {}

    /// Turns left on a running alarm clock
    fn alarm_clock(&self) -> Option<u32> {
        None
    }

    fn turn_off_alarm_clock(&mut self) {}

    fn cancel_activity(&mut self) {}

    fn sees(&self, _p: Tripoint) -> bool {
        false
    }

    fn record_felt_loudness(&mut self, _volume: i32) {}

    /// Something caught the listener's attention
    fn distract(&mut self, _reason: &str) {}
}
