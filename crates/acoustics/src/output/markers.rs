//! Sound Markers
//!
//! Approximate positions of unseen sounds, queried by the renderer.

use bevy_ecs::prelude::*;
use std::collections::BTreeMap;

use sound_events::{SoundEvent, Tripoint};

/// Resource mapping marker positions to the sound placed there
#[derive(Resource, Debug, Default)]
pub struct SoundMarkers {
    markers: BTreeMap<Tripoint, SoundEvent>,
}

impl SoundMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a marker unless one is already at `position`.
    pub fn place(&mut self, position: Tripoint, event: SoundEvent) -> bool {
        if self.markers.contains_key(&position) {
            return false;
        }
        self.markers.insert(position, event);
        true
    }

    /// Positions of every marker, in coordinate order.
    pub fn get_footstep_markers(&self) -> Vec<Tripoint> {
        self.markers.keys().copied().collect()
    }

    /// Description of the marker at `position`; empty when there is none.
    pub fn sound_at(&self, position: Tripoint) -> String {
        match self.markers.get(&position) {
            None => String::new(),
            Some(event) if event.description.is_empty() => "a sound".to_string(),
            Some(event) => event.description.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.markers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }
}
