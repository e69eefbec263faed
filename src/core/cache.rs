//! # Instance cache.
//!
//! At most one live [`Controller`](crate::Controller) exists per
//! (application, canonical name) pair; this cache owns them, keyed by the
//! fully qualified name (`"{app}.{canonical}"`).
//!
//! ## Rules
//! - Instances are inserted only after a fully successful construction
//!   (imports resolved, init hook run). A failed construction leaves a hole;
//!   a later load reconstructs from scratch.
//! - Unbounded retention: instances are never evicted or destroyed.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::controllers::ControllerRef;

/// Cache of constructed controller instances.
#[derive(Default)]
pub(crate) struct InstanceCache {
    instances: RwLock<HashMap<String, ControllerRef>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached instance for the fully qualified name.
    pub fn get(&self, key: &str) -> Option<ControllerRef> {
        self.instances
            .read()
            .expect("instance cache lock poisoned")
            .get(key)
            .cloned()
    }

    /// Installs a fully constructed instance.
    pub fn insert(&self, key: String, instance: ControllerRef) {
        self.instances
            .write()
            .expect("instance cache lock poisoned")
            .insert(key, instance);
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.instances
            .read()
            .expect("instance cache lock poisoned")
            .len()
    }
}
