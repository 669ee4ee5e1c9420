use crate::errors::{ViewError, ViewResult};
use crate::store::RecordStore;
use crate::view::{ViewDefinition, ViewRegistry};
use crate::view_config::{CacheMode, ViewConfig};

/// Fluent builder of a [ViewRegistry].
///
/// The first failing step is remembered and returned by [ViewRegistryBuilder::build];
/// later steps are skipped.
///
/// # Examples
///
/// ```rust,ignore
/// let registry = ViewRegistry::builder(RecordStore::new(store))
///     .cache_mode(CacheMode::Cached)
///     .strict_field_usage(true)
///     .view_json(TOP_RATED_APARTMENTS)
///     .build()?;
/// ```
pub struct ViewRegistryBuilder {
    error: Option<ViewError>,
    store: RecordStore,
    config: ViewConfig,
    views: Vec<ViewDefinition>,
}

impl ViewRegistryBuilder {
    pub fn new(store: RecordStore) -> Self {
        ViewRegistryBuilder {
            error: None,
            store,
            config: ViewConfig::new(),
            views: Vec::new(),
        }
    }

    pub fn cache_mode(mut self, cache_mode: CacheMode) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_cache_mode(cache_mode) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn strict_field_usage(mut self, strict: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_strict_field_usage(strict) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Registers a view when the registry is built.
    pub fn view(mut self, definition: ViewDefinition) -> Self {
        if self.error.is_none() {
            self.views.push(definition);
        }
        self
    }

    /// Parses a JSON view definition and registers it when the registry is built.
    pub fn view_json(mut self, json: &str) -> Self {
        if self.error.is_none() {
            match ViewDefinition::from_json_str(json) {
                Ok(definition) => self.views.push(definition),
                Err(e) => self.error = Some(e),
            }
        }
        self
    }

    /// Builds the registry, freezing its configuration and registering the
    /// collected views in order.
    pub fn build(self) -> ViewResult<ViewRegistry> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let registry = ViewRegistry::with_config(self.store, self.config);
        for definition in self.views {
            registry.create_view_from_definition(definition)?;
        }
        Ok(registry)
    }
}
