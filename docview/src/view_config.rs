//! Configuration of a view registry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::{ErrorKind, ViewError, ViewResult};

/// How a registry materializes a view when it is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Re-evaluate the pipeline against the source collection on every query.
    #[default]
    Live,
    /// Keep the first materialized result until the view is invalidated or dropped.
    Cached,
}

/// Configuration shared by a [crate::view::ViewRegistry] and its builder.
///
/// Cloning is cheap; clones share the same settings. Settings can only be
/// changed until the registry is built.
///
/// # Settings
/// - `cache_mode`: [CacheMode::Live] by default
/// - `strict_field_usage`: when `true`, registering a pipeline whose match or
///   sort stage reads a field an earlier project stage removed fails with
///   [ErrorKind::InvalidSpec]; otherwise a warning is logged. `false` by default.
#[derive(Clone)]
pub struct ViewConfig {
    inner: Arc<ViewConfigInner>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        ViewConfig {
            inner: Arc::new(ViewConfigInner::new()),
        }
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.inner.cache_mode.read_with(|mode| *mode)
    }

    pub fn set_cache_mode(&self, cache_mode: CacheMode) -> ViewResult<()> {
        self.inner.ensure_not_configured("Cache mode")?;
        self.inner.cache_mode.write_with(|mode| *mode = cache_mode);
        Ok(())
    }

    pub fn strict_field_usage(&self) -> bool {
        self.inner.strict_field_usage.load(Ordering::Relaxed)
    }

    pub fn set_strict_field_usage(&self, strict: bool) -> ViewResult<()> {
        self.inner.ensure_not_configured("Strict field usage")?;
        self.inner.strict_field_usage.store(strict, Ordering::Relaxed);
        Ok(())
    }

    /// Returns `true` once a registry has been built with this configuration.
    pub fn is_configured(&self) -> bool {
        self.inner.configured.load(Ordering::Relaxed)
    }

    /// Freezes the configuration.
    pub(crate) fn initialize(&self) {
        self.inner.configured.store(true, Ordering::Relaxed);
    }
}

struct ViewConfigInner {
    configured: AtomicBool,
    cache_mode: Atomic<CacheMode>,
    strict_field_usage: AtomicBool,
}

impl ViewConfigInner {
    fn new() -> Self {
        ViewConfigInner {
            configured: AtomicBool::from(false),
            cache_mode: atomic(CacheMode::default()),
            strict_field_usage: AtomicBool::from(false),
        }
    }

    fn ensure_not_configured(&self, setting: &str) -> ViewResult<()> {
        if self.configured.load(Ordering::Relaxed) {
            log::error!("{} cannot be changed after initialization", setting);
            return Err(ViewError::new(
                &format!("{} cannot be changed after initialization", setting),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }
}
