//! Listener Components
//!
//! The three kinds of entity that hear: monsters, NPCs and the avatar.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use sound_events::{mdb_to_db, FactionId, SoundCategory, SoundEvent, SourceKind, Tripoint};

use super::listener::{HearingProtection, HeardSound, Listener, SleepDepth};

/// A monster on the local map
#[derive(Component, Debug, Clone)]
pub struct Monster {
    pub name: String,
    pub position: Tripoint,
    /// Hears 30 dB below ambient instead of 20
    pub good_hearing: bool,
    pub can_hear: bool,
    pub deaf_turns: u32,
    pub last_heard: Option<HeardSound>,
    /// Where the monster goes to investigate a noise
    pub wander_target: Option<Tripoint>,
    /// How strongly it is drawn there, in dB
    pub wander_strength: i32,
}

impl Monster {
    pub fn new(name: impl Into<String>, position: Tripoint) -> Self {
        Self {
            name: name.into(),
            position,
            good_hearing: false,
            can_hear: true,
            deaf_turns: 0,
            last_heard: None,
            wander_target: None,
            wander_strength: 0,
        }
    }

    pub fn with_good_hearing(mut self) -> Self {
        self.good_hearing = true;
        self
    }

    /// Count down deafness by one turn.
    pub fn end_turn(&mut self) {
        self.deaf_turns = self.deaf_turns.saturating_sub(1);
    }
}

impl Listener for Monster {
    fn kind(&self) -> SourceKind {
        SourceKind::Monster
    }

    fn position(&self) -> Tripoint {
        self.position
    }

    fn is_deaf(&self) -> bool {
        self.deaf_turns > 0
    }

    fn add_deafness(&mut self, turns: u32) {
        self.deaf_turns = self.deaf_turns.saturating_add(turns);
    }

    fn hear_sound(&mut self, event: Option<&SoundEvent>, felt_volume: i32, ambient: i32) {
        if let Some(event) = event {
            let strength = mdb_to_db(felt_volume);
            if strength > self.wander_strength || self.wander_target.is_none() {
                self.wander_target = Some(event.origin);
                self.wander_strength = strength;
            }
        }
        self.last_heard = Some(HeardSound {
            event: event.cloned(),
            felt_volume,
            ambient,
        });
    }

    fn can_hear(&self) -> bool {
        self.can_hear
    }

    fn hearing_margin(&self) -> i32 {
        if self.good_hearing {
            3000
        } else {
            2000
        }
    }

    fn feels_pain(&self) -> bool {
        false
    }
}

/// A non-player character
#[derive(Component, Debug, Clone)]
pub struct Npc {
    pub name: String,
    pub position: Tripoint,
    pub faction: FactionId,
    pub hearing_ability: f32,
    pub protection: HearingProtection,
    pub deaf_turns: u32,
    pub pain: i32,
    pub feels_pain: bool,
    pub last_heard: Option<HeardSound>,
    /// Set when the NPC hears something worth reacting to
    pub alerted_by: Option<Tripoint>,
}

impl Npc {
    pub fn new(name: impl Into<String>, position: Tripoint, faction: FactionId) -> Self {
        Self {
            name: name.into(),
            position,
            faction,
            hearing_ability: 1.0,
            protection: HearingProtection::default(),
            deaf_turns: 0,
            pain: 0,
            feels_pain: true,
            last_heard: None,
            alerted_by: None,
        }
    }

    /// Count down deafness by one turn.
    pub fn end_turn(&mut self) {
        self.deaf_turns = self.deaf_turns.saturating_sub(1);
    }
}

impl Listener for Npc {
    fn kind(&self) -> SourceKind {
        SourceKind::Npc
    }

    fn position(&self) -> Tripoint {
        self.position
    }

    fn is_deaf(&self) -> bool {
        self.deaf_turns > 0
    }

    fn add_deafness(&mut self, turns: u32) {
        self.deaf_turns = self.deaf_turns.saturating_add(turns);
    }

    fn hear_sound(&mut self, event: Option<&SoundEvent>, felt_volume: i32, ambient: i32) {
        if let Some(event) = event {
            let alarming = matches!(
                event.category,
                SoundCategory::Combat | SoundCategory::Alarm | SoundCategory::Alert | SoundCategory::Order
            );
            if alarming && event.faction != self.faction {
                self.alerted_by = Some(event.origin);
            }
        }
        self.last_heard = Some(HeardSound {
            event: event.cloned(),
            felt_volume,
            ambient,
        });
    }

    fn hearing_ability(&self) -> f32 {
        self.hearing_ability
    }

    fn hearing_protection(&self) -> HearingProtection {
        self.protection
    }

    fn feels_pain(&self) -> bool {
        self.feels_pain
    }

    fn pain(&self) -> i32 {
        self.pain
    }

    fn mod_pain(&mut self, amount: i32) {
        self.pain += amount;
    }
}

/// Sleep state of the avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SleepState {
    pub asleep: bool,
    /// Lying down but not asleep yet
    pub trying: bool,
    pub depth: SleepDepth,
    /// Drugged or anaesthetised sleep nothing can interrupt
    pub narcosis: bool,
    pub slept_through_alarm: bool,
}

/// The player's avatar
#[derive(Component, Debug, Clone)]
pub struct Avatar {
    pub position: Tripoint,
    pub hearing_ability: f32,
    pub protection: HearingProtection,
    pub deaf_turns: u32,
    pub pain: i32,
    pub feels_pain: bool,
    pub sleep: SleepState,
    /// Turns until the alarm clock rings
    pub alarm_clock: Option<u32>,
    pub sight_radius: i32,
    /// Loudest felt volume this turn
    pub felt_loudness: i32,
    pub distractions: Vec<String>,
    pub activity: Option<String>,
    pub last_heard: Option<HeardSound>,
}

impl Avatar {
    pub fn new(position: Tripoint) -> Self {
        Self {
            position,
            hearing_ability: 1.0,
            protection: HearingProtection::default(),
            deaf_turns: 0,
            pain: 0,
            feels_pain: true,
            sleep: SleepState::default(),
            alarm_clock: None,
            sight_radius: 6,
            felt_loudness: 0,
            distractions: Vec::new(),
            activity: None,
            last_heard: None,
        }
    }

    pub fn asleep(mut self, depth: SleepDepth) -> Self {
        self.sleep.asleep = true;
        self.sleep.depth = depth;
        self
    }

    /// Count down deafness and the alarm clock, reset the loudness meter.
    ///
    /// A clock with one turn left keeps ringing until perception turns it off.
    pub fn end_turn(&mut self) {
        self.deaf_turns = self.deaf_turns.saturating_sub(1);
        self.felt_loudness = 0;
        if let Some(turns) = self.alarm_clock {
            if turns > 1 {
                self.alarm_clock = Some(turns - 1);
            }
        }
    }
}

impl Listener for Avatar {
    fn kind(&self) -> SourceKind {
        SourceKind::Player
    }

    fn position(&self) -> Tripoint {
        self.position
    }

    fn is_deaf(&self) -> bool {
        self.deaf_turns > 0
    }

    fn add_deafness(&mut self, turns: u32) {
        self.deaf_turns = self.deaf_turns.saturating_add(turns);
    }

    fn hear_sound(&mut self, event: Option<&SoundEvent>, felt_volume: i32, ambient: i32) {
        self.last_heard = Some(HeardSound {
            event: event.cloned(),
            felt_volume,
            ambient,
        });
    }

    fn hearing_ability(&self) -> f32 {
        self.hearing_ability
    }

    /// The avatar's margin is not capped.
    fn hearing_margin(&self) -> i32 {
        (1000.0 + 1000.0 * self.hearing_ability).floor() as i32
    }

    fn hearing_protection(&self) -> HearingProtection {
        self.protection
    }

    fn feels_pain(&self) -> bool {
        self.feels_pain
    }

    fn pain(&self) -> i32 {
        self.pain
    }

    fn mod_pain(&mut self, amount: i32) {
        self.pain += amount;
    }

    fn is_asleep(&self) -> bool {
        self.sleep.asleep
    }

    fn sleep_depth(&self) -> SleepDepth {
        self.sleep.depth
    }

    fn under_narcosis(&self) -> bool {
        self.sleep.narcosis
    }

    fn trying_to_sleep(&self) -> bool {
        self.sleep.trying && !self.sleep.asleep
    }

    fn slept_through_alarm(&self) -> bool {
        self.sleep.slept_through_alarm
    }

    fn wake_up(&mut self) {
        self.sleep.asleep = false;
        self.sleep.trying = false;
        self.sleep.narcosis = false;
    }

    fn alarm_clock(&self) -> Option<u32> {
        self.alarm_clock
    }

    fn turn_off_alarm_clock(&mut self) {
        self.alarm_clock = None;
        self.sleep.slept_through_alarm = false;
    }

    fn cancel_activity(&mut self) {
        self.activity = None;
    }

    fn sees(&self, p: Tripoint) -> bool {
        p.z == self.position.z && self.position.square_dist_2d(p) <= self.sight_radius
    }

    fn record_felt_loudness(&mut self, volume: i32) {
        self.felt_loudness = self.felt_loudness.max(volume);
    }

    fn distract(&mut self, reason: &str) {
        self.distractions.push(reason.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shout(faction: &str) -> SoundEvent {
        SoundEvent::new(Tripoint::new(4, 4, 0), 6000, SoundCategory::Alert, "a shout")
            .from_npc()
            .with_faction(FactionId::new(faction))
    }

    #[test]
    fn test_monster_margin_and_wander() {
        let mut zombie = Monster::new("zombie", Tripoint::new(0, 0, 0));
        assert_eq!(zombie.hearing_margin(), 2000);
        assert_eq!(zombie.clone().with_good_hearing().hearing_margin(), 3000);

        zombie.hear_sound(Some(&shout("any")), 4500, 4000);
        assert_eq!(zombie.wander_target, Some(Tripoint::new(4, 4, 0)));
        assert_eq!(zombie.wander_strength, 45);

        zombie.hear_sound(None, 0, 4000);
        assert_eq!(zombie.wander_target, Some(Tripoint::new(4, 4, 0)));
        assert!(zombie.last_heard.as_ref().map_or(false, |h| h.event.is_none()));
    }

    #[test]
    fn test_npc_alerted_by_other_factions() {
        let mut guard = Npc::new("guard", Tripoint::new(1, 1, 0), FactionId::new("old_guard"));
        guard.hear_sound(Some(&shout("old_guard")), 5000, 4000);
        assert_eq!(guard.alerted_by, None);

        guard.hear_sound(Some(&shout("raiders")), 5000, 4000);
        assert_eq!(guard.alerted_by, Some(Tripoint::new(4, 4, 0)));
    }

    #[test]
    fn test_npc_margin_capped() {
        let mut npc = Npc::new("scout", Tripoint::default(), FactionId::none());
        npc.hearing_ability = 1.5;
        assert_eq!(npc.hearing_margin(), 2500);
        npc.hearing_ability = 5.0;
        assert_eq!(npc.hearing_margin(), 4000);
    }

    #[test]
    fn test_avatar_sleep_and_sight() {
        let mut avatar = Avatar::new(Tripoint::new(10, 10, 0)).asleep(SleepDepth::Heavy);
        assert!(avatar.is_asleep());
        assert_eq!(avatar.sleep_depth(), SleepDepth::Heavy);
        avatar.wake_up();
        assert!(!avatar.is_asleep());

        assert!(avatar.sees(Tripoint::new(14, 6, 0)));
        assert!(!avatar.sees(Tripoint::new(17, 10, 0)));
        assert!(!avatar.sees(Tripoint::new(10, 10, 1)));

        avatar.hearing_ability = 5.0;
        assert_eq!(avatar.hearing_margin(), 6000);
    }

    #[test]
    fn test_tick_timers() {
        let mut zombie = Monster::new("zombie", Tripoint::default());
        zombie.deaf_turns = 2;
        let mut avatar = Avatar::new(Tripoint::default());
        avatar.alarm_clock = Some(2);
        avatar.felt_loudness = 9000;

        zombie.end_turn();
        avatar.end_turn();
        assert_eq!(zombie.deaf_turns, 1);
        assert_eq!(avatar.alarm_clock, Some(1));
        assert_eq!(avatar.felt_loudness, 0);

        zombie.end_turn();
        avatar.end_turn();
        assert_eq!(zombie.deaf_turns, 0);
        assert_eq!(avatar.alarm_clock, Some(1));
    }
}
