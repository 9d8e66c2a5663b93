//! Core data types: exchange and direction enums, status values and funding
//! event records.

pub mod enums;
pub mod event;

pub use enums::*;
pub use event::*;
