use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A handle to the read-write lock guarding one view name.
pub struct LockHandle {
    lock: Arc<RwLock<()>>,
}

impl LockHandle {
    /// Acquires a shared lock. Queries hold it while they materialize.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    /// Acquires an exclusive lock. Registration, drop and invalidation hold it.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }
}

/// Registry of named read-write locks, one per view name.
///
/// Uses `parking_lot`'s poison-free locks. Locks are created lazily on first
/// use and live as long as the registry, so every caller contending for a name
/// always meets the same lock.
///
/// # Examples
///
/// ```
/// use docview::common::LockRegistry;
/// let lock_registry = LockRegistry::new();
/// let lock = lock_registry.get_lock("topRatedApartments");
/// {
///     let _read_guard = lock.read();
/// }
/// {
///     let _write_guard = lock.write();
/// }
/// ```
#[derive(Clone)]
pub struct LockRegistry {
    locks: Arc<RwLock<HashMap<String, Arc<RwLock<()>>>>>,
}

impl LockRegistry {
    /// Creates a new empty lock registry.
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Gets the lock for the given name, creating it if needed.
    ///
    /// Every handle returned for the same name shares one underlying lock.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        if let Some(lock) = self.locks.read().get(name).cloned() {
            return LockHandle { lock };
        }

        let lock = self
            .locks
            .write()
            .entry(name.to_string())
            .or_default()
            .clone();
        LockHandle { lock }
    }

    /// Gets the lock for the given name only if one was already created.
    pub fn existing_lock(&self, name: &str) -> Option<LockHandle> {
        self.locks
            .read()
            .get(name)
            .cloned()
            .map(|lock| LockHandle { lock })
    }

    /// Returns the number of locks currently registered.
    pub fn lock_count(&self) -> usize {
        let locks = self.locks.read();
        locks.len()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
