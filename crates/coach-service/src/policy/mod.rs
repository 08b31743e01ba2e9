//! Admission control: the ordered checks every notification must pass.

pub mod decision;
pub mod engine;

pub use decision::{Decision, PolicyReason};
pub use engine::PolicyEngine;
