//! ECS Systems
//!
//! Absorption, propagation and the three listener passes.

pub mod absorption;
pub mod ambient;
pub mod emission;
pub mod hearing;
pub mod horde;
pub mod perception;
pub mod propagation;

// Re-export commonly used systems
pub use absorption::{refresh_absorption, terrain_sound_attenuation, AbsorptionCache};
pub use ambient::{sound_distance, vertical_attenuation, Weather};
pub use emission::{
    propagate_pending_sounds, propagate_sounds, validate_sound, FootstepSource, PendingSounds,
    SoundRejected,
};
pub use hearing::{
    apply_hearing_damage, hear_sounds, process_creature_hearing, DeafeningBand, HearingDamage,
    HearingReport,
};
pub use horde::{
    emit_horde_signals, horde_signal_strength, signal_hordes_for, HordeSignals, HordeSink,
};
pub use perception::{
    describe_sound, perceive_sounds, process_player_perception, PerceptionOutput,
};
pub use propagation::propagate;
