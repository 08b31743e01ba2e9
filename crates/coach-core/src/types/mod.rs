//! Core type definitions used across the coaching notification workspace.

pub mod day;
pub mod id;

pub use day::{DayWindow, MAX_TRAILING_DAYS, local_hour};
pub use id::*;
