//! Turn Schedule
//!
//! One turn of sound: forget last turn's markers, refresh dirty absorption,
//! propagate queued sounds, then the horde, creature and player passes in
//! that order. Fields live for a single turn; markers until the next one
//! starts.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::audio::AudioCues;
use crate::components::creatures::{Avatar, Monster, Npc};
use crate::components::field::SoundFieldRegistry;
use crate::components::map::LocalMap;
use crate::output::markers::SoundMarkers;
use crate::output::messages::MessageLog;
use crate::systems::absorption::refresh_absorption;
use crate::systems::ambient::Weather;
use crate::systems::emission::{propagate_pending_sounds, PendingSounds};
use crate::systems::hearing::process_creature_hearing;
use crate::systems::horde::{emit_horde_signals, HordeSignals};
use crate::systems::perception::process_player_perception;
use crate::{SimRng, SimulationState};

/// System: Forget last turn's sound markers
pub fn clear_sound_markers(mut markers: ResMut<SoundMarkers>) {
    markers.reset();
}

/// System: Drop this turn's sound fields
pub fn clear_sound_fields(mut registry: ResMut<SoundFieldRegistry>) {
    registry.reset();
}

/// System: Count down listener timers
pub fn tick_listener_timers(
    mut monsters: Query<&mut Monster>,
    mut npcs: Query<&mut Npc>,
    mut avatars: Query<&mut Avatar>,
) {
    for mut monster in monsters.iter_mut() {
        monster.end_turn();
    }
    for mut npc in npcs.iter_mut() {
        npc.end_turn();
    }
    for mut avatar in avatars.iter_mut() {
        avatar.end_turn();
    }
}

/// Build the schedule run once per turn.
pub fn build_turn_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            clear_sound_markers,
            refresh_absorption,
            propagate_pending_sounds,
            emit_horde_signals,
            process_creature_hearing,
            process_player_perception,
            clear_sound_fields,
            tick_listener_timers,
        )
            .chain(),
    );
    schedule
}

/// Insert every resource the turn schedule reads.
pub fn insert_sound_resources(world: &mut World, map: LocalMap, weather: Weather, seed: u64) {
    world.insert_resource(SimulationState::default());
    world.insert_resource(SimRng(SmallRng::seed_from_u64(seed)));
    world.insert_resource(map);
    world.insert_resource(weather);
    world.insert_resource(PendingSounds::new());
    world.insert_resource(SoundFieldRegistry::new());
    world.insert_resource(SoundMarkers::new());
    world.insert_resource(MessageLog::new());
    world.insert_resource(HordeSignals::new());
    if !world.contains_resource::<AudioCues>() {
        world.insert_resource(AudioCues::headless());
    }
}
