//! Creature Hearing System
//!
//! Feeds monsters and NPCs the loudest sound reaching their tile and applies
//! hearing damage from anything past the deafening threshold.

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::debug;

use sound_events::mdb_to_db;

use crate::components::creatures::{Monster, Npc};
use crate::components::field::SoundFieldRegistry;
use crate::components::listener::Listener;
use crate::components::map::LocalMap;
use crate::systems::ambient::{vertical_attenuation, Weather};
use crate::SimRng;

pub mod hearing_constants {
    /// Felt volume where a sound may start to deafen
    pub const DEAFENING_THRESHOLD: i32 = 14_000;
    /// Felt volume that always deafens
    pub const DEAFENING_GUARANTEE: i32 = 16_000;
    /// Shift of both thresholds per point of hearing ability above 1.0
    pub const ABILITY_SHIFT: f32 = 200.0;
    /// Deafness lasts one turn per dB above this
    pub const DEAFNESS_OFFSET_DB: i32 = 130;
    /// Cap on deafness added to an already deaf listener (four minutes)
    pub const MAX_AGGRAVATED_DEAFNESS: u32 = 240;
    /// Ringing ears stop hurting more past this pain
    pub const EAR_PAIN_CEILING: i32 = 10;
    pub const MAX_EAR_PAIN: i32 = 2;
}

use hearing_constants::*;

/// Felt-volume band in which a sound may deafen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeafeningBand {
    pub threshold: i32,
    pub guarantee: i32,
}

impl Default for DeafeningBand {
    fn default() -> Self {
        Self {
            threshold: DEAFENING_THRESHOLD,
            guarantee: DEAFENING_GUARANTEE,
        }
    }
}

impl DeafeningBand {
    /// Band for a listener whose hearing is `ability` times ordinary.
    ///
    /// Sharper ears are hurt by quieter sounds.
    pub fn for_ability(ability: f32) -> Self {
        let shift = ABILITY_SHIFT * (ability - 1.0);
        Self {
            threshold: (DEAFENING_THRESHOLD as f32 - shift).floor().max(0.0) as i32,
            guarantee: (DEAFENING_GUARANTEE as f32 - shift).floor().max(0.0) as i32,
        }
    }

    /// Does a sound felt at `felt` deafen? Inside the band the chance grows
    /// linearly from the threshold to the guarantee.
    pub fn roll(&self, felt: i32, rng: &mut impl Rng) -> bool {
        if felt < self.threshold {
            false
        } else if felt >= self.guarantee {
            true
        } else {
            felt >= rng.gen_range(self.threshold..=self.guarantee)
        }
    }
}

/// What a loud sound did to a listener's ears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HearingDamage {
    Unharmed,
    /// A hearing listener lost its hearing
    Deafened { turns: u32 },
    /// An already deaf listener got worse
    Aggravated { turns: u32, pain: i32, ache: bool },
}

impl HearingDamage {
    pub fn is_harmed(&self) -> bool {
        !matches!(self, HearingDamage::Unharmed)
    }
}

/// Roll deafening for a sound felt at `felt` and apply the result.
pub fn apply_hearing_damage<L, R>(
    listener: &mut L,
    felt: i32,
    band: DeafeningBand,
    rng: &mut R,
) -> HearingDamage
where
    L: Listener + ?Sized,
    R: Rng,
{
    if !band.roll(felt, rng) || listener.is_immune_to_deafness() {
        return HearingDamage::Unharmed;
    }
    let turns = (mdb_to_db(felt) - DEAFNESS_OFFSET_DB).max(1) as u32;

    if !listener.is_deaf() {
        listener.add_deafness(turns);
        return HearingDamage::Deafened { turns };
    }

    let turns = turns.min(MAX_AGGRAVATED_DEAFNESS);
    listener.add_deafness(turns);
    let ache = listener.feels_pain();
    let mut pain = 0;
    if ache && listener.pain() < EAR_PAIN_CEILING {
        pain = rng.gen_range(0..=MAX_EAR_PAIN);
        listener.mod_pain(pain);
    }
    HearingDamage::Aggravated { turns, pain, ache }
}

/// Outcome of one listener's pass over the registry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HearingReport {
    /// Index into the registry of the sound passed to the listener
    pub heard: Option<usize>,
    pub felt_volume: i32,
    pub ambient: i32,
    pub damage: Vec<HearingDamage>,
}

/// Let a monster or NPC hear this turn's sounds.
///
/// Every audible field risks hearing damage, even for deaf listeners. Of the
/// fields loud enough to hear over the ambient floor, only the loudest is
/// passed on, and `hear_sound` is called exactly once (with `None` when
/// nothing got through). Listeners that cannot hear are skipped entirely.
pub fn hear_sounds<L, R>(
    listener: &mut L,
    registry: &SoundFieldRegistry,
    map: &LocalMap,
    weather: &Weather,
    rng: &mut R,
) -> HearingReport
where
    L: Listener + ?Sized,
    R: Rng,
{
    let mut report = HearingReport::default();
    if !listener.can_hear() {
        return report;
    }

    let pos = listener.position();
    let ambient = weather.ambient_floor(pos.z, map.is_sheltered(pos));
    let audible_from = ambient - listener.hearing_margin();
    let protection = listener.hearing_protection();
    let band = DeafeningBand::default();
    report.ambient = ambient;

    let mut loudest: Option<(usize, i32)> = None;
    for (index, field) in registry.fields().iter().enumerate() {
        let tile = field.volume_at(pos);
        if tile <= 0 {
            continue;
        }
        let heard = tile - vertical_attenuation(field.origin().z, pos.z);

        let damage = apply_hearing_damage(
            listener,
            heard - protection.passive_db - protection.active_db,
            band,
            rng,
        );
        if damage.is_harmed() {
            report.damage.push(damage);
        }
        if listener.is_deaf() {
            continue;
        }

        // Creatures ignore the footsteps of their own kind.
        let event = &field.event;
        if event.movement_noise && event.source_kind() == listener.kind() {
            continue;
        }

        let felt = heard - protection.passive_db;
        if felt <= 0 || felt < audible_from {
            continue;
        }
        if loudest.map_or(true, |(_, best)| felt > best) {
            loudest = Some((index, felt));
        }
    }

    match loudest {
        Some((index, felt)) if !listener.is_deaf() => {
            listener.hear_sound(Some(&registry.fields()[index].event), felt, ambient);
            report.heard = Some(index);
            report.felt_volume = felt;
        }
        _ => listener.hear_sound(None, 0, ambient),
    }
    report
}

/// System: Monsters and NPCs hear the turn's sounds
pub fn process_creature_hearing(
    mut registry: ResMut<SoundFieldRegistry>,
    map: Res<LocalMap>,
    weather: Res<Weather>,
    mut rng: ResMut<SimRng>,
    mut monsters: Query<&mut Monster>,
    mut npcs: Query<&mut Npc>,
) {
    let mut deafened = 0usize;
    for mut monster in monsters.iter_mut() {
        let report = hear_sounds(&mut *monster, &registry, &map, &weather, &mut rng.0);
        deafened += report.damage.len();
    }
    for mut npc in npcs.iter_mut() {
        let report = hear_sounds(&mut *npc, &registry, &map, &weather, &mut rng.0);
        deafened += report.damage.len();
    }
    if deafened > 0 {
        debug!(deafened, "Creatures took hearing damage");
    }

    for field in registry.fields_mut() {
        field.heard_by_monsters = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::grid::Grid;
    use crate::components::field::SoundField;
    use crate::components::listener::HearingProtection;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sound_events::{Season, SoundCategory, SoundEvent, Tripoint};

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    fn open_map() -> LocalMap {
        let mut map = LocalMap::new(1, Tripoint::default());
        map.add_level(0);
        map.refresh_absorption(Season::Summer);
        map
    }

    fn calm() -> Weather {
        Weather {
            sound_attn_db: 0,
            windspeed_mph: 0,
            season: Season::Summer,
        }
    }

    /// A field that is `volume` everywhere on a 12x12 level.
    fn flat_field(event: SoundEvent, volume: i16) -> SoundField {
        SoundField::new(event, Grid::new(12, 12, volume))
    }

    #[test]
    fn test_band_for_ability() {
        assert_eq!(DeafeningBand::for_ability(1.0), DeafeningBand::default());
        let sharp = DeafeningBand::for_ability(2.0);
        assert_eq!(sharp.threshold, 13_800);
        assert_eq!(sharp.guarantee, 15_800);
        let absurd = DeafeningBand::for_ability(200.0);
        assert_eq!(absurd.threshold, 0);
    }

    #[test]
    fn test_band_roll_edges() {
        let band = DeafeningBand::default();
        let mut rng = rng();
        for _ in 0..100 {
            assert!(!band.roll(13_999, &mut rng));
            assert!(band.roll(16_000, &mut rng));
        }
    }

    #[test]
    fn test_band_roll_is_proportional() {
        let band = DeafeningBand::default();
        let mut rng = rng();
        let hits = (0..4000).filter(|_| band.roll(15_000, &mut rng)).count();
        // P = 1001/2001
        assert!((1700..2300).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn test_deafening_duration() {
        let mut zombie = Monster::new("zombie", Tripoint::default());
        let damage = apply_hearing_damage(&mut zombie, 17_000, DeafeningBand::default(), &mut rng());
        assert_eq!(damage, HearingDamage::Deafened { turns: 40 });
        assert_eq!(zombie.deaf_turns, 40);
    }

    #[test]
    fn test_aggravated_deafness_hurts() {
        let mut npc = Npc::new("guard", Tripoint::default(), Default::default());
        npc.deaf_turns = 5;
        let damage = apply_hearing_damage(&mut npc, 19_100, DeafeningBand::default(), &mut rng());
        match damage {
            HearingDamage::Aggravated { turns, pain, ache } => {
                assert_eq!(turns, 61);
                assert!(ache);
                assert!((0..=2).contains(&pain));
                assert_eq!(npc.pain, pain);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(npc.deaf_turns, 66);
    }

    #[test]
    fn test_quiet_sound_is_harmless() {
        let mut npc = Npc::new("guard", Tripoint::default(), Default::default());
        let damage = apply_hearing_damage(&mut npc, 9_000, DeafeningBand::default(), &mut rng());
        assert_eq!(damage, HearingDamage::Unharmed);
        assert!(!npc.is_deaf());
    }

    #[test]
    fn test_monster_hears_loudest_only() {
        let map = open_map();
        let mut registry = SoundFieldRegistry::new();
        let quiet = SoundEvent::new(Tripoint::new(1, 1, 0), 5000, SoundCategory::Speech, "a voice").from_npc();
        let loud = SoundEvent::new(Tripoint::new(9, 9, 0), 8000, SoundCategory::Combat, "a gunshot").from_npc();
        registry.push(flat_field(quiet, 3000));
        registry.push(flat_field(loud, 5000));

        let mut zombie = Monster::new("zombie", Tripoint::new(5, 5, 0));
        let report = hear_sounds(&mut zombie, &registry, &map, &calm(), &mut rng());
        assert_eq!(report.heard, Some(1));
        assert_eq!(report.felt_volume, 5000);
        assert_eq!(zombie.wander_target, Some(Tripoint::new(9, 9, 0)));
        let heard = zombie.last_heard.expect("hear_sound called");
        assert_eq!(heard.ambient, 4000);
    }

    #[test]
    fn test_below_margin_is_not_heard() {
        let map = open_map();
        let mut registry = SoundFieldRegistry::new();
        let rustle = SoundEvent::new(Tripoint::new(1, 1, 0), 3000, SoundCategory::Movement, "rustling");
        // ambient 40 dB, margin 20 dB
        registry.push(flat_field(rustle, 1999));

        let mut zombie = Monster::new("zombie", Tripoint::new(5, 5, 0));
        let report = hear_sounds(&mut zombie, &registry, &map, &calm(), &mut rng());
        assert_eq!(report.heard, None);
        assert!(zombie.last_heard.as_ref().map_or(false, |h| h.event.is_none()));

        let mut keen = Monster::new("wolf", Tripoint::new(5, 5, 0)).with_good_hearing();
        let report = hear_sounds(&mut keen, &registry, &map, &calm(), &mut rng());
        assert_eq!(report.heard, Some(0));
    }

    #[test]
    fn test_own_kind_footsteps_ignored() {
        let map = open_map();
        let mut registry = SoundFieldRegistry::new();
        let shuffle = SoundEvent::new(Tripoint::new(1, 1, 0), 4000, SoundCategory::Movement, "shuffling")
            .movement()
            .from_monster();
        registry.push(flat_field(shuffle, 3500));

        let mut zombie = Monster::new("zombie", Tripoint::new(5, 5, 0));
        assert_eq!(hear_sounds(&mut zombie, &registry, &map, &calm(), &mut rng()).heard, None);

        let mut npc = Npc::new("scout", Tripoint::new(5, 5, 0), Default::default());
        assert_eq!(hear_sounds(&mut npc, &registry, &map, &calm(), &mut rng()).heard, Some(0));
    }

    #[test]
    fn test_deafened_listener_hears_nothing() {
        let map = open_map();
        let mut registry = SoundFieldRegistry::new();
        let blast = SoundEvent::new(Tripoint::new(1, 1, 0), 19_100, SoundCategory::Combat, "an explosion");
        registry.push(flat_field(blast, 17_000));

        let mut npc = Npc::new("guard", Tripoint::new(5, 5, 0), Default::default());
        let report = hear_sounds(&mut npc, &registry, &map, &calm(), &mut rng());
        assert_eq!(report.heard, None);
        assert_eq!(report.damage, vec![HearingDamage::Deafened { turns: 40 }]);
        assert!(npc.is_deaf());
        assert!(npc.last_heard.as_ref().map_or(false, |h| h.event.is_none()));
    }

    #[test]
    fn test_protection_reduces_felt_volume() {
        let map = open_map();
        let mut registry = SoundFieldRegistry::new();
        let blast = SoundEvent::new(Tripoint::new(1, 1, 0), 19_100, SoundCategory::Combat, "an explosion");
        registry.push(flat_field(blast, 17_000));

        let mut npc = Npc::new("guard", Tripoint::new(5, 5, 0), Default::default());
        npc.protection = HearingProtection::new(2000, 2000);
        let report = hear_sounds(&mut npc, &registry, &map, &calm(), &mut rng());
        assert!(report.damage.is_empty());
        assert_eq!(report.heard, Some(0));
        assert_eq!(report.felt_volume, 15_000);
    }

    #[test]
    fn test_cannot_hear_is_skipped() {
        let map = open_map();
        let mut registry = SoundFieldRegistry::new();
        let shout = SoundEvent::new(Tripoint::new(1, 1, 0), 6000, SoundCategory::Alert, "a shout");
        registry.push(flat_field(shout, 5000));

        let mut statue = Monster::new("statue", Tripoint::new(5, 5, 0));
        statue.can_hear = false;
        let report = hear_sounds(&mut statue, &registry, &map, &calm(), &mut rng());
        assert_eq!(report, HearingReport::default());
        assert!(statue.last_heard.is_none());
    }
}
