//! Shared sound event types for the acoustics simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod event;
pub mod point;
pub mod season;
pub mod units;

#[cfg(feature = "test-fixtures")]
pub mod fixtures;

// Re-export event types
pub use event::{
    AudioCueId, FactionId, MonsterFactionId, SoundCategory, SoundEvent, SourceKind,
};

// Re-export geometry types
pub use point::{Compass, Tripoint};

pub use season::{ParseSeasonError, Season};

pub use units::{
    db_to_mdb, mdb_to_db, AUDIBILITY_FLOOR, CENTIBELS_PER_DB, MAXIMUM_VOLUME_ATMOSPHERE,
    MINIMUM_INTEREST,
};
