//! World Setup
//!
//! The demo village: map, listeners and the systems that make noise in it.

pub mod listeners;
pub mod noise;
pub mod village;

pub use listeners::*;
pub use noise::*;
pub use village::*;
