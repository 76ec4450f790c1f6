//! Adapter implementations of the todo ports.

pub mod filesystem;
pub mod memory;
