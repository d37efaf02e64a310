//! Sound Log
//!
//! JSONL records of every propagated sound.

pub mod logger;
pub mod types;

pub use logger::*;
pub use types::*;
