//! In-memory adapters.

mod document_store;

pub use document_store::InMemoryDocumentStore;
