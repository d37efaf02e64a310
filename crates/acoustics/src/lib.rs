//! Acoustic Propagation and Perception Engine Library
//!
//! Sounds are queued during a turn, flood-filled over each map level's
//! absorption grid, and then heard by hordes, creatures and the player.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod audio;
pub mod components;
pub mod config;
pub mod events;
pub mod output;
pub mod schedule;
pub mod setup;
pub mod systems;

pub use components::*;

pub use schedule::{build_turn_schedule, insert_sound_resources};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);

/// Global simulation state resource
#[derive(Resource, Debug, Default)]
pub struct SimulationState {
    pub current_turn: u64,
    pub max_turns: u64,
}
