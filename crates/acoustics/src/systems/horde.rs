//! Horde Signal System
//!
//! Very loud sounds reach past the local map and draw in distant hordes.
//! Signal strength is computed in whole dB.

use bevy_ecs::prelude::*;
use tracing::debug;

use sound_events::{mdb_to_db, SoundEvent, Tripoint};

use crate::components::field::SoundFieldRegistry;
use crate::components::map::LocalMap;
use crate::events::types::HordeSignal;
use crate::systems::absorption::terrain_sound_attenuation;
use crate::systems::ambient::Weather;

pub mod horde_constants {
    /// Quietest sound, after vertical loss, that hordes can react to (dB)
    pub const MIN_HORDE_VOLUME_DB: i32 = 110;
    /// Loss over the distance to a horde (dB)
    pub const DISTANCE_LOSS_DB: i32 = 50;
    /// Loss per underground level between the sound and the surface (dB)
    pub const UNDERGROUND_LOSS_DB: i32 = 42;
    pub const MAX_VERTICAL_LOSS_DB: i32 = 191;
    pub const MIN_SIGNAL: i32 = 8;
    pub const MAX_SIGNAL: i32 = 26;
    /// dB per point of signal
    pub const DB_PER_SIGNAL: f32 = 3.333;
}

use horde_constants::*;

/// Receiver of horde signals, usually the overmap.
pub trait HordeSink {
    fn signal_hordes(&mut self, region: Tripoint, strength: i32);
}

/// Resource collecting this turn's horde signals
#[derive(Resource, Debug, Default)]
pub struct HordeSignals {
    signals: Vec<HordeSignal>,
}

impl HordeSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> &[HordeSignal] {
        &self.signals
    }

    pub fn drain(&mut self) -> Vec<HordeSignal> {
        std::mem::take(&mut self.signals)
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }
}

impl HordeSink for HordeSignals {
    fn signal_hordes(&mut self, region: Tripoint, strength: i32) {
        self.signals.push(HordeSignal { region, strength });
    }
}

/// Loss for a sound made at level `z` to reach the surface. Height above
/// ground costs nothing at horde distances.
pub fn horde_vertical_loss(z: i32) -> i32 {
    if z < 0 {
        (UNDERGROUND_LOSS_DB * -z).min(MAX_VERTICAL_LOSS_DB)
    } else {
        0
    }
}

/// Signal strength reaching hordes for a sound of `volume_db`, or 0 when it
/// drowns in the ambient noise.
pub fn horde_signal_strength(volume_db: i32, terrain_db: i32, vertical_db: i32, ambient_db: i32) -> i32 {
    let heard = volume_db - DISTANCE_LOSS_DB - terrain_db - vertical_db;
    if heard < ambient_db {
        return 0;
    }
    let signal = MIN_SIGNAL + (heard as f32 / DB_PER_SIGNAL).ceil() as i32;
    signal.clamp(MIN_SIGNAL, MAX_SIGNAL)
}

/// Signal strength for `event`, or `None` when it is too quiet to consider.
pub fn horde_signal_for(event: &SoundEvent, map: &LocalMap, weather: &Weather) -> Option<i32> {
    let volume = mdb_to_db(event.volume);
    let vertical = horde_vertical_loss(event.origin.z);
    if volume - vertical < MIN_HORDE_VOLUME_DB {
        return None;
    }
    let land_use = map.land_use_at(event.origin);
    let terrain = i32::from(terrain_sound_attenuation(land_use, weather.season, true));
    match horde_signal_strength(volume, terrain, vertical, weather.outdoor_ambient_db()) {
        0 => None,
        strength => Some(strength),
    }
}

/// Send a signal for every field loud enough to reach a horde.
pub fn signal_hordes_for(
    registry: &SoundFieldRegistry,
    map: &LocalMap,
    weather: &Weather,
    sink: &mut impl HordeSink,
) -> usize {
    let mut sent = 0;
    for field in registry.fields() {
        let event = &field.event;
        if let Some(strength) = horde_signal_for(event, map, weather) {
            let region = map.absolute_submap(event.origin);
            debug!(%region, strength, description = %event.description, "Signalling hordes");
            sink.signal_hordes(region, strength);
            sent += 1;
        }
    }
    sent
}

/// System: Loud sounds signal distant hordes
pub fn emit_horde_signals(
    registry: Res<SoundFieldRegistry>,
    map: Res<LocalMap>,
    weather: Res<Weather>,
    mut signals: ResMut<HordeSignals>,
) {
    signal_hordes_for(&registry, &map, &weather, &mut *signals);
}
