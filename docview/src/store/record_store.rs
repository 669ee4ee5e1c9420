use crate::collection::Document;
use crate::errors::ViewResult;
use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;

/// Contract of the document store that views are evaluated against.
///
/// # Key Responsibilities
/// - **Full Scan**: return every document currently in a named collection
/// - **Read Consistency**: one `scan` call observes a single consistent set of
///   documents, even when writers run concurrently
///
/// Ordering of scanned documents is unspecified unless a sort stage imposes one.
///
/// # Implementations
/// - `InMemoryStore`: shared in-memory collections, used by tests and embedded callers
pub trait RecordStoreProvider: Send + Sync {
    /// Returns every document in the named collection at call time.
    ///
    /// A collection that does not exist scans as empty.
    fn scan(&self, collection: &str) -> ViewResult<Vec<Document>>;

    /// Checks whether the named collection exists.
    fn has_collection(&self, collection: &str) -> ViewResult<bool>;

    /// Returns the names of all collections in the store.
    fn collection_names(&self) -> ViewResult<BTreeSet<String>>;
}

/// Shared handle to a [RecordStoreProvider].
///
/// Cloning is cheap; all clones reach the same underlying store.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<dyn RecordStoreProvider>,
}

impl RecordStore {
    /// Wraps a provider implementation.
    pub fn new<T: RecordStoreProvider + 'static>(inner: T) -> Self {
        RecordStore { inner: Arc::new(inner) }
    }
}

impl Deref for RecordStore {
    type Target = Arc<dyn RecordStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
