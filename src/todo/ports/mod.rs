//! Port contracts for todo persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by todo services.

pub mod document_store;

pub use document_store::{
    Document, DocumentFilter, DocumentStore, DocumentStoreError, DocumentStoreResult, ID_KEY,
    WriteOutcome,
};
