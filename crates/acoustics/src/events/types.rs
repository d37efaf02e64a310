//! Log Record Types
//!
//! Records written to the JSONL sound log.

use serde::{Deserialize, Serialize};

use sound_events::{SoundEvent, Tripoint};

use crate::components::field::SoundField;

/// One propagated sound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundRecord {
    pub record_id: String,
    pub turn: u64,
    pub event: SoundEvent,
    /// Tiles on the origin level the sound reached
    pub tiles_reached: usize,
}

impl SoundRecord {
    pub fn from_field(record_id: impl Into<String>, turn: u64, field: &SoundField) -> Self {
        Self {
            record_id: record_id.into(),
            turn,
            event: field.event.clone(),
            tiles_reached: field.reached_tiles(),
        }
    }
}

/// One horde signal sent to the overmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HordeSignal {
    /// Absolute submap coordinate
    pub region: Tripoint,
    pub strength: i32,
}
