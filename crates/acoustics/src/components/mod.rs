//! ECS Components
//!
//! Map, sound field and listener state.

pub mod creatures;
pub mod field;
pub mod grid;
pub mod listener;
pub mod map;

pub use creatures::*;
pub use field::*;
pub use grid::*;
pub use listener::*;
pub use map::*;
