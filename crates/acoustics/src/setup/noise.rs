//! Village Noise
//!
//! Systems that keep the demo village noisy: footsteps, talk, the odd
//! gunshot or thunderclap, and fights where villagers meet monsters.

use bevy_ecs::prelude::*;
use rand::Rng;
use tracing::debug;

use sound_events::{FactionId, MonsterFactionId, SoundCategory, SoundEvent, Tripoint};

use crate::audio::{AudioCues, MeleeSwing, WeaponSkill};
use crate::components::creatures::{Avatar, Monster, Npc};
use crate::components::map::LocalMap;
use crate::systems::emission::{FootstepSource, PendingSounds};
use crate::SimRng;

pub mod noise_constants {
    pub const MONSTER_FOOTSTEP_ODDS: u32 = 3;
    pub const TALK_ODDS: u32 = 8;
    pub const GUNSHOT_ODDS: u32 = 25;
    pub const THUNDER_ODDS: u32 = 40;
    pub const FOOTSTEP_VOLUME: i32 = 2500;
    pub const TALK_VOLUME: i32 = 6000;
    pub const FIGHT_VOLUME: i32 = 8000;
    pub const GUNSHOT_VOLUME: i32 = 15_500;
    pub const THUNDER_VOLUME: i32 = 12_000;
}

use noise_constants::*;

/// System: Creatures and weather make their noises for the turn
pub fn make_village_noise(
    mut pending: ResMut<PendingSounds>,
    map: Res<LocalMap>,
    mut rng: ResMut<SimRng>,
    monsters: Query<&Monster>,
    npcs: Query<&Npc>,
    avatars: Query<&Avatar>,
) {
    let rng = &mut rng.0;
    let avatar = avatars.iter().next().map(|a| a.position);
    let size = map.size() as i32;

    for monster in monsters.iter() {
        if rng.gen_ratio(1, MONSTER_FOOTSTEP_ODDS) {
            if let Err(e) = pending.add_footstep(
                monster.position,
                FOOTSTEP_VOLUME,
                "shuffling footsteps",
                FootstepSource::Monster(MonsterFactionId::new("zombie")),
                avatar,
            ) {
                debug!(monster = %monster.name, error = %e, "Monster footsteps not queued");
            }
        }
    }

    for npc in npcs.iter() {
        if rng.gen_ratio(1, TALK_ODDS) {
            let event = SoundEvent::new(npc.position, TALK_VOLUME, SoundCategory::Speech, "someone talking")
                .from_npc()
                .with_faction(npc.faction.clone());
            if let Err(e) = pending.emit_sound(event) {
                debug!(npc = %npc.name, error = %e, "Talk not queued");
            }
        }
        let fighting = monsters
            .iter()
            .any(|m| m.position.z == npc.position.z && m.position.square_dist_2d(npc.position) <= 1);
        if fighting {
            let event = SoundEvent::new(npc.position, FIGHT_VOLUME, SoundCategory::Combat, "a fight")
                .from_npc()
                .with_faction(npc.faction.clone());
            if let Err(e) = pending.emit_sound(event) {
                debug!(npc = %npc.name, error = %e, "Fight not queued");
            }
        }
    }

    if let Some(position) = avatar {
        if let Err(e) = pending.add_footstep(
            position,
            FOOTSTEP_VOLUME,
            "your footsteps",
            FootstepSource::Character(FactionId::none()),
            avatar,
        ) {
            debug!(error = %e, "Avatar footsteps not queued");
        }
    }

    if rng.gen_ratio(1, GUNSHOT_ODDS) {
        let origin = Tripoint::new(rng.gen_range(0..size), rng.gen_range(0..size), 0);
        let event = SoundEvent::new(origin, GUNSHOT_VOLUME, SoundCategory::Combat, "a gunshot")
            .from_npc()
            .with_audio("fire_gun", "default");
        if let Err(e) = pending.emit_sound(event) {
            debug!(error = %e, "Gunshot not queued");
        }
    }
    if rng.gen_ratio(1, THUNDER_ODDS) {
        let origin = Tripoint::new(rng.gen_range(0..size), rng.gen_range(0..size), 0);
        if let Err(e) = pending.ambient_sound(origin, THUNDER_VOLUME, SoundCategory::Weather, "thunder") {
            debug!(error = %e, "Thunder not queued");
        }
    }
}

/// System: Villagers swing at adjacent monsters
pub fn villagers_fight(
    audio: Option<Res<AudioCues>>,
    mut rng: ResMut<SimRng>,
    monsters: Query<&Monster>,
    npcs: Query<&Npc>,
    avatars: Query<&Avatar>,
) {
    let Some(audio) = audio else {
        return;
    };
    let Some(listener) = avatars.iter().next().map(|a| a.position) else {
        return;
    };
    for npc in npcs.iter() {
        let target = monsters
            .iter()
            .find(|m| m.position.z == npc.position.z && m.position.square_dist_2d(npc.position) <= 1);
        if let Some(target) = target {
            let swing = MeleeSwing {
                attacker: npc.position,
                target: target.position,
                hit: rng.0.gen_bool(0.6),
                target_is_monster: true,
                target_material: "flesh".to_string(),
                skill: WeaponSkill::Bashing,
                weapon_volume: 10,
            };
            debug!(npc = %npc.name, monster = %target.name, hit = swing.hit, "Melee swing");
            audio.play_melee(&swing, listener, &mut rng.0);
        }
    }
}

/// System: Monsters shamble toward the last thing they heard
pub fn wander_monsters(map: Res<LocalMap>, mut monsters: Query<&mut Monster>) {
    for mut monster in monsters.iter_mut() {
        let Some(target) = monster.wander_target else {
            continue;
        };
        let here = monster.position;
        if here == target {
            monster.wander_target = None;
            monster.wander_strength = 0;
            continue;
        }
        let next = Tripoint::new(
            here.x + (target.x - here.x).signum(),
            here.y + (target.y - here.y).signum(),
            here.z,
        );
        if map.in_bounds(next) {
            monster.position = next;
        }
    }
}
