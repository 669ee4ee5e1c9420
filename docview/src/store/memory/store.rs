use crate::collection::Document;
use crate::errors::{ErrorKind, ViewError, ViewResult};
use crate::filter::MatchSpec;
use crate::store::RecordStoreProvider;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

/// In-memory implementation of a record store.
///
/// # Purpose
/// `InMemoryStore` keeps named collections of documents in memory. It is the
/// store embedded callers and tests evaluate views against.
///
/// # Characteristics
/// - **Thread-Safe**: collections live in a `DashMap`; writers and scans may run concurrently
/// - **Snapshot Scans**: `scan` copies a collection under its shard lock, so one
///   scan never observes a half-applied write
/// - **Shared State**: clones share the same collections
/// - **No Persistence**: all data is lost when the last clone is dropped
///
/// # Usage
/// ```text
/// let store = InMemoryStore::new();
/// store.insert("listingsAndReviews", doc!{ name: "A", price: 100 })?;
/// let record_store = RecordStore::new(store.clone());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new()),
        }
    }

    /// Creates an empty collection. Existing collections are left untouched.
    pub fn create_collection(&self, collection: &str) -> ViewResult<()> {
        self.inner.create_collection(collection)
    }

    /// Appends a document to a collection, creating the collection if needed.
    pub fn insert(&self, collection: &str, document: Document) -> ViewResult<()> {
        self.inner.insert_many(collection, vec![document]).map(|_| ())
    }

    /// Appends documents to a collection in order. Returns the number inserted.
    pub fn insert_many<I>(&self, collection: &str, documents: I) -> ViewResult<usize>
    where
        I: IntoIterator<Item = Document>,
    {
        self.inner.insert_many(collection, documents.into_iter().collect())
    }

    /// Removes every document of a collection that matches `spec`.
    /// Returns the number of removed documents.
    pub fn remove_where(&self, collection: &str, spec: &MatchSpec) -> ViewResult<usize> {
        self.inner.remove_where(collection, spec)
    }

    /// Removes all documents of a collection, keeping the collection.
    pub fn clear(&self, collection: &str) -> ViewResult<()> {
        self.inner.clear(collection)
    }

    /// Drops a collection. Returns `true` if it existed.
    pub fn drop_collection(&self, collection: &str) -> bool {
        self.inner.collections.remove(collection).is_some()
    }

    /// Number of documents in a collection; zero for unknown collections.
    pub fn size(&self, collection: &str) -> usize {
        self.inner
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Imports a database dump shaped `{ "<collection>": [ {..}, .. ], .. }`.
    ///
    /// Extended JSON wrappers such as `{"$oid": ..}` are unwrapped. The whole
    /// dump is decoded before anything is inserted, so a malformed dump leaves
    /// the store unchanged. Returns the number of imported documents.
    pub fn load_json_dump(&self, json: &str) -> ViewResult<usize> {
        let dump: serde_json::Value = serde_json::from_str(json).map_err(|err| {
            log::error!("Failed to parse json dump: {}", err);
            ViewError::from(err)
        })?;
        let collections = decode_dump(dump)?;

        let mut count = 0;
        for (name, documents) in collections {
            count += self.inner.insert_many(&name, documents)?;
        }
        log::debug!("Imported {} documents from json dump", count);
        Ok(count)
    }

    /// Reads and imports a dump file. See [InMemoryStore::load_json_dump].
    pub fn load_json_dump_file<P: AsRef<Path>>(&self, path: P) -> ViewResult<usize> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|err| {
            log::error!("Failed to read json dump {}: {}", path.display(), err);
            ViewError::from(err)
        })?;
        self.load_json_dump(&json)
    }
}

impl RecordStoreProvider for InMemoryStore {
    fn scan(&self, collection: &str) -> ViewResult<Vec<Document>> {
        self.inner.scan(collection)
    }

    fn has_collection(&self, collection: &str) -> ViewResult<bool> {
        Ok(self.inner.collections.contains_key(collection))
    }

    fn collection_names(&self) -> ViewResult<BTreeSet<String>> {
        Ok(self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }
}

fn decode_dump(dump: serde_json::Value) -> ViewResult<Vec<(String, Vec<Document>)>> {
    let serde_json::Value::Object(map) = dump else {
        log::error!("Json dump must be an object of collections");
        return Err(ViewError::new(
            "Json dump must be an object of collections",
            ErrorKind::EncodingError,
        ));
    };

    let mut collections = Vec::with_capacity(map.len());
    for (name, documents) in map {
        let serde_json::Value::Array(items) = documents else {
            log::error!("Collection {} in json dump is not an array", name);
            return Err(ViewError::new(
                &format!("Collection {} in json dump is not an array", name),
                ErrorKind::EncodingError,
            ));
        };

        let documents = items
            .into_iter()
            .map(Document::from_json)
            .collect::<ViewResult<Vec<_>>>()
            .map_err(|err| {
                ViewError::new_with_cause(
                    &format!("Invalid document in collection {}", name),
                    ErrorKind::EncodingError,
                    err,
                )
            })?;
        collections.push((name, documents));
    }
    Ok(collections)
}

#[derive(Default)]
struct InMemoryStoreInner {
    collections: DashMap<String, Vec<Document>>,
}

impl InMemoryStoreInner {
    fn new() -> InMemoryStoreInner {
        InMemoryStoreInner {
            collections: DashMap::new(),
        }
    }

    fn validate_name(collection: &str) -> ViewResult<()> {
        if collection.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(ViewError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidSpec,
            ));
        }
        Ok(())
    }

    fn create_collection(&self, collection: &str) -> ViewResult<()> {
        Self::validate_name(collection)?;
        self.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    fn insert_many(&self, collection: &str, documents: Vec<Document>) -> ViewResult<usize> {
        Self::validate_name(collection)?;
        let count = documents.len();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(count)
    }

    fn remove_where(&self, collection: &str, spec: &MatchSpec) -> ViewResult<usize> {
        let Some(mut documents) = self.collections.get_mut(collection) else {
            return Ok(0);
        };

        // evaluate first so a failing spec leaves the collection intact
        let mut keep = Vec::with_capacity(documents.len());
        for document in documents.iter() {
            keep.push(!spec.matches(document)?);
        }

        let before = documents.len();
        let mut flags = keep.into_iter();
        documents.retain(|_| flags.next().unwrap_or(true));
        Ok(before - documents.len())
    }

    fn clear(&self, collection: &str) -> ViewResult<()> {
        if let Some(mut documents) = self.collections.get_mut(collection) {
            documents.clear();
        }
        Ok(())
    }

    fn scan(&self, collection: &str) -> ViewResult<Vec<Document>> {
        Ok(self
            .collections
            .get(collection)
            .map(|documents| documents.clone())
            .unwrap_or_default())
    }
}
