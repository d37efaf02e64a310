//! Sound Field Components
//!
//! A [`SoundField`] is the result of propagating one [`SoundEvent`] across
//! its map level. Fields live for a single turn in the
//! [`SoundFieldRegistry`].

use bevy_ecs::prelude::*;

use sound_events::{SoundEvent, Tripoint};

use super::grid::Grid;

/// Volume of one event at every tile of its level.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundField {
    pub event: SoundEvent,
    /// Hundredths of a dB, 0 where the sound never reached
    volume: Grid<i16>,
    pub heard_by_player: bool,
    pub heard_by_monsters: bool,
}

impl SoundField {
    pub fn new(event: SoundEvent, volume: Grid<i16>) -> Self {
        Self {
            event,
            volume,
            heard_by_player: false,
            heard_by_monsters: false,
        }
    }

    /// Volume at the tile under `p`, ignoring `p.z`.
    ///
    /// Listeners on other levels read the same column and apply vertical
    /// attenuation themselves.
    pub fn volume_at(&self, p: Tripoint) -> i32 {
        i32::from(self.volume.value_or_default(p.x, p.y))
    }

    pub fn volume_grid(&self) -> &Grid<i16> {
        &self.volume
    }

    /// Number of tiles the sound reached.
    pub fn reached_tiles(&self) -> usize {
        self.volume.iter().filter(|(_, _, v)| **v > 0).count()
    }

    pub fn origin(&self) -> Tripoint {
        self.event.origin
    }
}

/// Resource holding all sound fields produced this turn
#[derive(Resource, Debug, Default)]
pub struct SoundFieldRegistry {
    fields: Vec<SoundField>,
}

impl SoundFieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: SoundField) {
        self.fields.push(field);
    }

    pub fn fields(&self) -> &[SoundField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [SoundField] {
        &mut self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Drop every field; called at the end of each turn.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    /// Drop fields that both monsters and the player have already processed.
    pub fn cull_heard(&mut self) {
        self.fields
            .retain(|field| !(field.heard_by_player && field.heard_by_monsters));
    }

    /// Origins of every live field, and of those made by monsters.
    pub fn monster_sounds(&self) -> (Vec<Tripoint>, Vec<Tripoint>) {
        let all = self.fields.iter().map(SoundField::origin).collect();
        let monsters = self
            .fields
            .iter()
            .filter(|field| field.event.from_monster)
            .map(SoundField::origin)
            .collect();
        (all, monsters)
    }
}
