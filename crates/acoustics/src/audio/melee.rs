//! Melee Audio
//!
//! Swing and impact cues for a melee attack. The impact lands a short,
//! weapon-dependent moment after the swing.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use sound_events::{AudioCueId, Tripoint};

use super::{heard_angle, heard_volume, AudioCues, CueRequest};

pub mod melee_constants {
    /// Bashing weapons up to this volume swing with the small sample
    pub const SMALL_BASH_MAX_VOLUME: i32 = 8;
    /// Cutting and stabbing weapons up to this volume swing with the small sample
    pub const SMALL_CUT_MAX_VOLUME: i32 = 6;
    /// Quieter swing when someone else is attacking
    pub const OTHER_SWING_DAMPING: i32 = 30;
    pub const OTHER_IMPACT_DAMPING: i32 = 20;
    /// Impact delay per unit of weapon volume, in ms, against monsters
    pub const MONSTER_IMPACT_MS: (i32, i32) = (12, 16);
    /// Impact delay per unit of weapon volume, in ms, against anything else
    pub const OTHER_IMPACT_MS: (i32, i32) = (9, 12);
}

use melee_constants::*;

/// Skill a weapon is used with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSkill {
    Bashing,
    Cutting,
    Stabbing,
    #[default]
    Other,
}

/// A single melee attack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeleeSwing {
    pub attacker: Tripoint,
    pub target: Tripoint,
    pub hit: bool,
    pub target_is_monster: bool,
    /// Main material of the target, e.g. "flesh" or "steel"
    pub target_material: String,
    pub skill: WeaponSkill,
    /// Weapon volume in quarter litres
    pub weapon_volume: i32,
}

/// Variant of the swing sample for a weapon.
pub fn swing_variant(skill: WeaponSkill, weapon_volume: i32) -> &'static str {
    match skill {
        WeaponSkill::Bashing if weapon_volume <= SMALL_BASH_MAX_VOLUME => "small_bash",
        WeaponSkill::Bashing => "big_bash",
        WeaponSkill::Cutting | WeaponSkill::Stabbing if weapon_volume <= SMALL_CUT_MAX_VOLUME => {
            "small_cutting"
        }
        WeaponSkill::Cutting | WeaponSkill::Stabbing => "big_cutting",
        WeaponSkill::Other => "default",
    }
}

/// Cues for `swing` as heard by a listener at `listener`.
pub fn melee_cues(
    swing: &MeleeSwing,
    listener: Tripoint,
    volume_multiplier: f32,
    rng: &mut impl Rng,
) -> Vec<CueRequest> {
    let volume = heard_volume(listener, swing.attacker, volume_multiplier);
    let (swing_volume, impact_volume, swing_angle) = if swing.attacker == listener {
        (volume, volume, 0.0)
    } else {
        (
            (volume - OTHER_SWING_DAMPING).max(0),
            (volume - OTHER_IMPACT_DAMPING).max(0),
            heard_angle(listener, swing.attacker),
        )
    };

    let variant = swing_variant(swing.skill, swing.weapon_volume);
    let swing_delay = Duration::from_millis(rng.gen_range(1..=2));
    let mut cues = vec![CueRequest::new(AudioCueId::new("melee_swing", variant), swing_volume)
        .at_angle(swing_angle)
        .after(swing_delay)];

    if swing.hit {
        let weapon_volume = swing.weapon_volume.max(0);
        let (low, high) = if swing.target_is_monster {
            MONSTER_IMPACT_MS
        } else {
            OTHER_IMPACT_MS
        };
        let impact_ms = rng.gen_range(weapon_volume * low..=weapon_volume * high);
        let id = if swing.target_is_monster && swing.target_material == "steel" {
            "melee_hit_metal"
        } else {
            "melee_hit_flesh"
        };
        cues.push(
            CueRequest::new(AudioCueId::new(id, variant), impact_volume)
                .at_angle(heard_angle(listener, swing.target))
                .after(swing_delay + Duration::from_millis(impact_ms as u64)),
        );
    }
    cues
}

impl AudioCues {
    /// Queue the cues of a melee attack.
    pub fn play_melee(&self, swing: &MeleeSwing, listener: Tripoint, rng: &mut impl Rng) {
        if self.is_headless() {
            return;
        }
        for cue in melee_cues(swing, listener, self.volume_multiplier(), rng) {
            self.dispatch(cue);
        }
    }
}
