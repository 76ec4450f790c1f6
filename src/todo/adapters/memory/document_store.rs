//! In-memory document store for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::todo::{
    domain::DatabaseName,
    ports::{
        Document, DocumentFilter, DocumentStore, DocumentStoreError, DocumentStoreResult,
        WriteOutcome,
    },
};

/// Thread-safe in-memory document store holding several named databases.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    databases: HashMap<DatabaseName, HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    /// Creates a store with no databases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the given empty databases.
    #[must_use]
    pub fn with_databases(databases: impl IntoIterator<Item = DatabaseName>) -> Self {
        let databases = databases
            .into_iter()
            .map(|name| (name, HashMap::new()))
            .collect();
        Self {
            state: Arc::new(RwLock::new(InMemoryStoreState { databases })),
        }
    }

    /// Appends a document to a collection, creating the database and
    /// collection as needed.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Persistence`] when the state lock is
    /// poisoned.
    pub fn insert(
        &self,
        database: &DatabaseName,
        collection: &str,
        document: Document,
    ) -> DocumentStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            DocumentStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state
            .databases
            .entry(database.clone())
            .or_default()
            .entry(collection.to_owned())
            .or_default()
            .push(document);
        Ok(())
    }

    /// Returns a copy of every document in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::UnknownDatabase`] when the database does
    /// not exist.
    pub fn documents(
        &self,
        database: &DatabaseName,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Document>> {
        let state = self.state.read().map_err(|err| {
            DocumentStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let collections = state
            .databases
            .get(database)
            .ok_or_else(|| DocumentStoreError::UnknownDatabase(database.clone()))?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn find_one(
        &self,
        database: &DatabaseName,
        collection: &str,
        filter: &DocumentFilter,
    ) -> DocumentStoreResult<Option<Document>> {
        let state = self.state.read().map_err(|err| {
            DocumentStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let collections = state
            .databases
            .get(database)
            .ok_or_else(|| DocumentStoreError::UnknownDatabase(database.clone()))?;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|document| filter.matches(document)))
            .cloned())
    }

    fn update_one(
        &self,
        database: &DatabaseName,
        collection: &str,
        filter: &DocumentFilter,
        patch: Document,
        upsert: bool,
    ) -> DocumentStoreResult<WriteOutcome> {
        let mut state = self.state.write().map_err(|err| {
            DocumentStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let documents = state
            .databases
            .get_mut(database)
            .ok_or_else(|| DocumentStoreError::UnknownDatabase(database.clone()))?
            .entry(collection.to_owned())
            .or_default();

        if let Some(existing) = documents
            .iter_mut()
            .find(|document| filter.matches(document))
        {
            existing.extend(patch);
            return Ok(WriteOutcome::Updated);
        }
        if !upsert {
            return Ok(WriteOutcome::NoMatch);
        }
        let mut inserted = filter.fields().clone();
        inserted.extend(patch);
        documents.push(inserted);
        Ok(WriteOutcome::Inserted)
    }
}
