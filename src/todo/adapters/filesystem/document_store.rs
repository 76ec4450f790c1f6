//! Directory-backed document store.
//!
//! Each database is a directory and each collection a `<collection>.json`
//! file holding one JSON object keyed by document `_id`.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use log::debug;
use serde_json::{Map, Value};

use crate::todo::{
    domain::DatabaseName,
    ports::{
        Document, DocumentFilter, DocumentStore, DocumentStoreError, DocumentStoreResult, ID_KEY,
        WriteOutcome,
    },
};

const COLLECTION_EXTENSION: &str = "json";

/// Document store reading and writing JSON collection files.
#[derive(Debug, Clone, Default)]
pub struct FileSystemDocumentStore {
    roots: BTreeMap<DatabaseName, Utf8PathBuf>,
}

impl FileSystemDocumentStore {
    /// Creates a store from `(database, directory)` pairs.
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = (DatabaseName, Utf8PathBuf)>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// Returns the directory backing `database`, if configured.
    #[must_use]
    pub fn root(&self, database: &DatabaseName) -> Option<&Utf8Path> {
        self.roots.get(database).map(Utf8PathBuf::as_path)
    }

    fn open_root(&self, database: &DatabaseName, create: bool) -> DocumentStoreResult<Dir> {
        let root = self
            .root(database)
            .ok_or_else(|| DocumentStoreError::UnknownDatabase(database.clone()))?;
        if create {
            Dir::create_ambient_dir_all(root, ambient_authority())
                .map_err(DocumentStoreError::persistence)?;
        }
        Dir::open_ambient_dir(root, ambient_authority()).map_err(DocumentStoreError::persistence)
    }

    fn load_collection(
        &self,
        database: &DatabaseName,
        collection: &str,
    ) -> DocumentStoreResult<Vec<Document>> {
        let dir = match self.open_root(database, false) {
            Ok(dir) => dir,
            Err(DocumentStoreError::Persistence(err)) if is_not_found(err.as_ref()) => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        let contents = match dir.read_to_string(collection_file(collection)) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(DocumentStoreError::persistence(err)),
        };
        decode_collection(&contents).map_err(|reason| DocumentStoreError::MalformedCollection {
            database: database.clone(),
            collection: collection.to_owned(),
            reason,
        })
    }

    fn save_collection(
        &self,
        database: &DatabaseName,
        collection: &str,
        documents: &[Document],
    ) -> DocumentStoreResult<()> {
        let mut keyed = Map::new();
        for document in documents {
            let id = document
                .get(ID_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| DocumentStoreError::MissingUpsertKey(collection.to_owned()))?;
            keyed.insert(id.to_owned(), Value::Object(document.clone()));
        }
        let encoded = serde_json::to_string_pretty(&Value::Object(keyed))
            .map_err(DocumentStoreError::persistence)?;

        let dir = self.open_root(database, true)?;
        let final_name = collection_file(collection);
        let staging_name = format!("{final_name}.tmp");
        dir.write(&staging_name, encoded.as_bytes())
            .map_err(DocumentStoreError::persistence)?;
        dir.rename(&staging_name, &dir, &final_name)
            .map_err(DocumentStoreError::persistence)?;
        debug!(
            "event=collection_saved database={database} collection={collection} documents={}",
            documents.len()
        );
        Ok(())
    }
}

impl DocumentStore for FileSystemDocumentStore {
    fn find_one(
        &self,
        database: &DatabaseName,
        collection: &str,
        filter: &DocumentFilter,
    ) -> DocumentStoreResult<Option<Document>> {
        Ok(self
            .load_collection(database, collection)?
            .into_iter()
            .find(|document| filter.matches(document)))
    }

    fn update_one(
        &self,
        database: &DatabaseName,
        collection: &str,
        filter: &DocumentFilter,
        patch: Document,
        upsert: bool,
    ) -> DocumentStoreResult<WriteOutcome> {
        let mut documents = self.load_collection(database, collection)?;
        let outcome = if let Some(existing) = documents
            .iter_mut()
            .find(|document| filter.matches(document))
        {
            existing.extend(patch);
            WriteOutcome::Updated
        } else if upsert {
            if filter.id().is_none() {
                return Err(DocumentStoreError::MissingUpsertKey(collection.to_owned()));
            }
            let mut inserted = filter.fields().clone();
            inserted.extend(patch);
            documents.push(inserted);
            WriteOutcome::Inserted
        } else {
            return Ok(WriteOutcome::NoMatch);
        };
        self.save_collection(database, collection, &documents)?;
        Ok(outcome)
    }
}

fn collection_file(collection: &str) -> String {
    format!("{collection}.{COLLECTION_EXTENSION}")
}

fn is_not_found(err: &(dyn std::error::Error + Send + Sync + 'static)) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io_err| io_err.kind() == io::ErrorKind::NotFound)
}

/// Decodes a collection file into documents, restoring `_id` from the key.
fn decode_collection(contents: &str) -> Result<Vec<Document>, String> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let keyed: Map<String, Value> =
        serde_json::from_str(contents).map_err(|err| err.to_string())?;
    keyed
        .into_iter()
        .map(|(id, value)| match value {
            Value::Object(mut document) => {
                document
                    .entry(ID_KEY.to_owned())
                    .or_insert_with(|| Value::String(id));
                Ok(document)
            }
            other => Err(format!("document {id} is not an object: {other}")),
        })
        .collect()
}
