use indexmap::IndexMap;
use itertools::Itertools;
use std::sync::Arc;

use crate::collection::Document;
use crate::common::{atomic, Atomic, LockHandle, LockRegistry, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, ViewError, ViewResult};
use crate::pipeline::PipelineDefinition;
use crate::store::RecordStore;
use crate::view_builder::ViewRegistryBuilder;
use crate::view_config::ViewConfig;

use super::{View, ViewDefinition};

/// Registry binding view names to their definitions.
///
/// Each registry is an independent, owned value; clones share the same views.
/// Operations on one name are mutually exclusive: registration, drop and
/// invalidation take the name's write lock, queries its read lock.
///
/// # Lifecycle
/// `create_view` registers a name (nothing is evaluated), `query` materializes
/// it against the current contents of its source collection and `drop_view`
/// unregisters it.
#[derive(Clone)]
pub struct ViewRegistry {
    inner: Arc<ViewRegistryInner>,
}

impl ViewRegistry {
    /// Creates a registry with the default configuration.
    pub fn new(store: RecordStore) -> Self {
        ViewRegistry::with_config(store, ViewConfig::new())
    }

    /// Creates a builder for a registry over `store`.
    pub fn builder(store: RecordStore) -> ViewRegistryBuilder {
        ViewRegistryBuilder::new(store)
    }

    pub(crate) fn with_config(store: RecordStore, config: ViewConfig) -> Self {
        config.initialize();
        ViewRegistry {
            inner: Arc::new(ViewRegistryInner {
                store,
                config,
                views: atomic(IndexMap::new()),
                lock_registry: LockRegistry::new(),
            }),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.inner.store
    }

    /// Registers a view. The pipeline is not executed.
    ///
    /// # Errors
    ///
    /// - [ErrorKind::DuplicateName] if the name is already registered
    /// - [ErrorKind::InvalidSpec] for an empty name or source, or, with strict
    ///   field usage, a stage reading a field an earlier projection removed
    pub fn create_view(&self, name: &str, source: &str, pipeline: PipelineDefinition) -> ViewResult<()> {
        let definition = ViewDefinition::new(name, source, pipeline)?;
        self.inner.create_view(definition)
    }

    /// Registers a view from a [ViewDefinition].
    pub fn create_view_from_definition(&self, definition: ViewDefinition) -> ViewResult<()> {
        self.inner.create_view(definition)
    }

    /// Registers a view from its JSON definition. See [ViewDefinition::from_json].
    pub fn create_view_from_json(&self, json: &str) -> ViewResult<()> {
        let definition = ViewDefinition::from_json_str(json)?;
        self.inner.create_view(definition)
    }

    /// Materializes a view.
    ///
    /// # Errors
    ///
    /// [ErrorKind::NotFound] if the name is not registered, or the error of the
    /// first failing stage.
    pub fn query(&self, name: &str) -> ViewResult<Vec<Document>> {
        self.inner.query(name)
    }

    /// Unregisters a view and discards its cached result.
    ///
    /// # Errors
    ///
    /// [ErrorKind::NotFound] if the name is not registered, including a
    /// second drop of the same name.
    pub fn drop_view(&self, name: &str) -> ViewResult<()> {
        self.inner.drop_view(name)
    }

    pub fn has_view(&self, name: &str) -> bool {
        self.inner.views.read_with(|views| views.contains_key(name))
    }

    /// Registered view names, in registration order.
    pub fn view_names(&self) -> Vec<String> {
        self.inner.views.read_with(|views| views.keys().cloned().collect())
    }

    pub fn definition(&self, name: &str) -> ViewResult<ViewDefinition> {
        self.inner
            .find(name)
            .map(|view| view.definition().clone())
    }

    /// Discards the cached result of a view.
    pub fn invalidate(&self, name: &str) -> ViewResult<()> {
        self.inner.invalidate(name)
    }

    /// Discards the cached results of every view.
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all()
    }

    pub fn len(&self) -> usize {
        self.inner.views.read_with(|views| views.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct ViewRegistryInner {
    store: RecordStore,
    config: ViewConfig,
    views: Atomic<IndexMap<String, Arc<View>>>,
    lock_registry: LockRegistry,
}

impl ViewRegistryInner {
    fn find(&self, name: &str) -> ViewResult<Arc<View>> {
        self.views
            .read_with(|views| views.get(name).cloned())
            .ok_or_else(|| not_found(name))
    }

    // only registration creates a name lock, unknown names never allocate one
    fn name_lock(&self, name: &str) -> ViewResult<LockHandle> {
        self.lock_registry
            .existing_lock(name)
            .ok_or_else(|| not_found(name))
    }

    fn create_view(&self, definition: ViewDefinition) -> ViewResult<()> {
        let name = definition.name().to_string();
        let lock = self.lock_registry.get_lock(&name);
        let _guard = lock.write();

        if self.views.read_with(|views| views.contains_key(&name)) {
            log::error!("View {} already exists", name);
            return Err(ViewError::new(
                &format!("View {} already exists", name),
                ErrorKind::DuplicateName,
            ));
        }

        self.check_field_usage(&definition)?;

        let view = Arc::new(View::new(definition));
        self.views.write_with(|views| views.insert(name.clone(), view));
        log::info!("Created view {}", name);
        Ok(())
    }

    fn check_field_usage(&self, definition: &ViewDefinition) -> ViewResult<()> {
        let usages = definition.pipeline().removed_field_usages();
        if usages.is_empty() {
            return Ok(());
        }

        let details = usages.iter().join("; ");
        if self.config.strict_field_usage() {
            log::error!("View {} reads removed fields: {}", definition.name(), details);
            return Err(ViewError::new(
                &format!("View {} reads removed fields: {}", definition.name(), details),
                ErrorKind::InvalidSpec,
            ));
        }
        log::warn!(
            "View {} reads fields removed by an earlier projection, they evaluate as absent: {}",
            definition.name(),
            details
        );
        Ok(())
    }

    fn query(&self, name: &str) -> ViewResult<Vec<Document>> {
        let lock = self.name_lock(name)?;
        let _guard = lock.read();

        let view = self.find(name)?;
        view.materialize(&self.store, self.config.cache_mode())
            .map_err(|err| {
                log::error!("Failed to materialize view {}: {}", name, err);
                ViewError::new_with_cause(
                    &format!("Failed to materialize view {}", name),
                    err.kind().clone(),
                    err,
                )
            })
    }

    fn drop_view(&self, name: &str) -> ViewResult<()> {
        let lock = self.name_lock(name)?;
        let _guard = lock.write();

        match self.views.write_with(|views| views.shift_remove(name)) {
            Some(view) => {
                view.invalidate();
                log::info!("Dropped view {}", name);
                Ok(())
            }
            None => Err(not_found(name)),
        }
    }

    fn invalidate(&self, name: &str) -> ViewResult<()> {
        let lock = self.name_lock(name)?;
        let _guard = lock.write();

        let view = self.find(name)?;
        view.invalidate();
        log::debug!("Invalidated view {}", name);
        Ok(())
    }

    fn invalidate_all(&self) {
        // snapshot first, name locks are never taken while holding the map lock
        let views: Vec<Arc<View>> = self.views.read_with(|views| views.values().cloned().collect());
        for view in views {
            if let Some(lock) = self.lock_registry.existing_lock(view.name()) {
                let _guard = lock.write();
                view.invalidate();
            }
        }
    }
}

fn not_found(name: &str) -> ViewError {
    log::error!("View {} does not exist", name);
    ViewError::new(&format!("View {} does not exist", name), ErrorKind::NotFound)
}
