use crate::collection::Document;
use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::ViewResult;
use crate::pipeline::{run, PipelineDefinition};
use crate::store::RecordStore;
use crate::view_config::CacheMode;

use super::ViewDefinition;

/// A registered view: a definition plus, in [CacheMode::Cached], the last
/// materialized result.
pub struct View {
    definition: ViewDefinition,
    cache: Atomic<Option<Vec<Document>>>,
}

impl View {
    pub(crate) fn new(definition: ViewDefinition) -> Self {
        View {
            definition,
            cache: atomic(None),
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn source(&self) -> &str {
        self.definition.source()
    }

    pub fn pipeline(&self) -> &PipelineDefinition {
        self.definition.pipeline()
    }

    pub fn definition(&self) -> &ViewDefinition {
        &self.definition
    }

    /// Returns `true` if a materialized result is held.
    pub fn is_cached(&self) -> bool {
        self.cache.read_with(|cache| cache.is_some())
    }

    /// Produces the view's result against the store's current contents, or
    /// the held result in [CacheMode::Cached].
    pub(crate) fn materialize(&self, store: &RecordStore, cache_mode: CacheMode) -> ViewResult<Vec<Document>> {
        if cache_mode == CacheMode::Cached {
            if let Some(cached) = self.cache.read_with(|cache| cache.clone()) {
                log::debug!("Serving view {} from cache", self.name());
                return Ok(cached);
            }
        }

        let result = run(store, self.source(), self.pipeline())?;
        if cache_mode == CacheMode::Cached {
            self.cache.write_with(|cache| *cache = Some(result.clone()));
        }
        Ok(result)
    }

    pub(crate) fn invalidate(&self) {
        self.cache.write_with(|cache| *cache = None);
    }
}
