//! Output
//!
//! What the engine hands back to the game: player messages and sound markers.

pub mod markers;
pub mod messages;

pub use markers::*;
pub use messages::*;
