//! Personal todo lists stored inside person records.
//!
//! Tasks are ranked by a continuous priority score, addressed by running
//! indices, edited one at a time and written back to every configured
//! database replica in turn. The module follows hexagonal architecture:
//!
//! - Domain types and algorithms in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
