//! Document store port: single-document reads and upserting writes over
//! named collections in named databases.

use crate::todo::domain::{DatabaseName, PersonId};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Key under which documents carry their identifier.
pub const ID_KEY: &str = "_id";

/// Result type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

/// Equality filter on top-level document keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    fields: Document,
}

impl DocumentFilter {
    /// Matches the document whose `_id` equals `id`.
    #[must_use]
    pub fn by_id(id: &PersonId) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_KEY.to_owned(), Value::String(id.as_str().to_owned()));
        Self { fields }
    }

    /// Adds an equality condition.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Returns the filter conditions.
    #[must_use]
    pub const fn fields(&self) -> &Document {
        &self.fields
    }

    /// Returns the `_id` condition when it is a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_KEY).and_then(Value::as_str)
    }

    /// Returns `true` when every condition equals the document's value.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| document.get(key) == Some(expected))
    }
}

/// What an `update_one` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// An existing document was patched.
    Updated,
    /// No document matched and a new one was inserted.
    Inserted,
    /// No document matched and `upsert` was off.
    NoMatch,
}

/// Blocking document store contract.
pub trait DocumentStore: Send + Sync {
    /// Returns the first document in `collection` matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError`] when the database is unknown or the
    /// collection cannot be read.
    fn find_one(
        &self,
        database: &DatabaseName,
        collection: &str,
        filter: &DocumentFilter,
    ) -> DocumentStoreResult<Option<Document>>;

    /// Writes the top-level keys of `patch` onto the first document matching
    /// `filter`. With `upsert`, a missing document is inserted built from
    /// the filter conditions and the patch.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError`] when the database is unknown or the
    /// write fails.
    fn update_one(
        &self,
        database: &DatabaseName,
        collection: &str,
        filter: &DocumentFilter,
        patch: Document,
        upsert: bool,
    ) -> DocumentStoreResult<WriteOutcome>;
}

/// Errors returned by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    /// The database name is not configured in this store.
    #[error("unknown database: {0}")]
    UnknownDatabase(DatabaseName),

    /// The stored collection could not be decoded.
    #[error("collection {collection} in {database} is malformed: {reason}")]
    MalformedCollection {
        /// Database holding the collection.
        database: DatabaseName,
        /// Collection name.
        collection: String,
        /// Decoder message.
        reason: String,
    },

    /// An upsert needs a string `_id` condition to key the new document.
    #[error("upsert into {0} requires a string _id filter")]
    MissingUpsertKey(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DocumentStoreError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
