//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // sound-events = { path = "../sound-events", features = ["test-fixtures"] }
//!
//! use sound_events::fixtures;
//!
//! let events = fixtures::sample_events();
//! ```

use crate::{SoundCategory, SoundEvent, Tripoint};

/// Returns sample events from the fixtures file.
///
/// Contains 6 events:
/// - 1 player gunshot with an audio cue
/// - 1 monster footstep
/// - 1 NPC shout
/// - 1 ambient alarm with an audio cue
/// - 1 underground crash
/// - 1 weather rumble
pub fn sample_events() -> Vec<SoundEvent> {
    let jsonl = include_str!("../tests/fixtures/sample_sounds.jsonl");
    jsonl
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            SoundEvent::from_jsonl(l).unwrap_or_else(|e| {
                panic!("Failed to parse sound line: {}\nError: {}", l, e)
            })
        })
        .collect()
}

/// A 60 dB player gunshot at the given point.
pub fn gunshot_at(origin: Tripoint) -> SoundEvent {
    SoundEvent::new(origin, 6000, SoundCategory::Combat, "a gunshot").from_player()
}

/// Quiet monster footsteps at the given point.
pub fn monster_footsteps_at(origin: Tripoint, volume: i32) -> SoundEvent {
    SoundEvent::new(origin, volume, SoundCategory::Movement, "footsteps")
        .from_monster()
        .movement()
}
