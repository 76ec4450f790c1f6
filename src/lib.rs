//! Grouptodo: prioritised todo lists for a files-as-database research
//! group tool.
//!
//! Each person record carries a `todos` sequence. This crate ranks those
//! tasks, hands out running indices so operators can address them, applies
//! field-level edits and propagates every change across the configured
//! database replicas.
//!
//! # Architecture
//!
//! Grouptodo follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (files, memory)
//!
//! # Modules
//!
//! - [`todo`]: Task model, scoring, indexing, editing and replica sync
//! - [`config`]: Run-control and per-user configuration files
//! - [`logging`]: Process-wide logger bootstrap
//! - [`cli`]: Command-line surface and rendering

pub mod cli;
pub mod config;
pub mod logging;
pub mod todo;
