//! Step definitions for finish-task scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
