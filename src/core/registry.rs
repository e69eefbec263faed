//! # Controller registry: per-application definition buckets and aliases.
//!
//! The registry stores, per application, the mapping from canonical
//! controller name to its registered definition, plus a secondary alias
//! table mapping (application, short name) to the raw registered name.
//!
//! ## Rules
//! - Registering the same (application, canonical name) pair again silently
//!   replaces the prior definition; already-constructed instances are not
//!   affected (instance lookup is keyed separately).
//! - Short-name aliases collide the same way: last write wins.
//! - Entries are never removed; the registry lives as long as the manager.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::controllers::ControllerDefinition;
use crate::error::ControllerError;
use crate::names;

/// A registered controller type.
#[derive(Clone)]
pub(crate) struct RegistryEntry {
    /// The raw name the type was registered under (identity queries).
    pub raw_name: String,
    /// The immutable definition.
    pub definition: Arc<ControllerDefinition>,
}

/// Per-application controller definition store.
#[derive(Default)]
pub(crate) struct Registry {
    /// application id → canonical name → entry.
    buckets: RwLock<HashMap<String, HashMap<String, RegistryEntry>>>,
    /// (application id, lowercased short name) → raw registered name.
    aliases: RwLock<HashMap<(String, String), String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under its declared application.
    ///
    /// Derives the canonical and short names from `raw_name`, stores the
    /// definition in the application bucket, and updates the alias table.
    /// Both writes silently overwrite colliding entries. Returns the
    /// application id the definition declared.
    pub fn register(
        &self,
        raw_name: &str,
        definition: ControllerDefinition,
    ) -> Result<String, ControllerError> {
        let Some(application) = definition.application().map(str::to_string) else {
            return Err(ControllerError::MissingApplication {
                controller: raw_name.to_string(),
            });
        };

        let canonical = names::canonicalize(raw_name)?;
        let short = names::short_name(raw_name)?;

        let entry = RegistryEntry {
            raw_name: raw_name.to_string(),
            definition: Arc::new(definition),
        };

        self.buckets
            .write()
            .expect("registry lock poisoned")
            .entry(application.clone())
            .or_default()
            .insert(canonical, entry);

        self.aliases
            .write()
            .expect("alias table lock poisoned")
            .insert((application.clone(), short), raw_name.to_string());

        Ok(application)
    }

    /// Looks up the registered entry for (application, canonical name).
    pub fn entry(&self, application: &str, canonical: &str) -> Option<RegistryEntry> {
        self.buckets
            .read()
            .expect("registry lock poisoned")
            .get(application)
            .and_then(|bucket| bucket.get(canonical))
            .cloned()
    }

    /// Resolves a short-name alias to the raw registered name.
    ///
    /// The lookup uses `short` verbatim; stored keys are lowercased at
    /// registration time.
    pub fn resolve_alias(&self, application: &str, short: &str) -> Option<String> {
        self.aliases
            .read()
            .expect("alias table lock poisoned")
            .get(&(application.to_string(), short.to_string()))
            .cloned()
    }

    /// Raw names registered for an application, sorted.
    ///
    /// Fails with `ControllerNotFound` when the application has no bucket.
    pub fn list_by_application(&self, application: &str) -> Result<Vec<String>, ControllerError> {
        let buckets = self.buckets.read().expect("registry lock poisoned");
        match buckets.get(application) {
            Some(bucket) => {
                let mut names: Vec<String> =
                    bucket.values().map(|e| e.raw_name.clone()).collect();
                names.sort_unstable();
                Ok(names)
            }
            None => Err(ControllerError::ControllerNotFound {
                application: application.to_string(),
            }),
        }
    }

    /// Every application bucket and its raw names, sorted by application.
    pub fn all(&self) -> Vec<(String, Vec<String>)> {
        let buckets = self.buckets.read().expect("registry lock poisoned");
        let mut out: Vec<(String, Vec<String>)> = buckets
            .iter()
            .map(|(app, bucket)| {
                let mut names: Vec<String> =
                    bucket.values().map(|e| e.raw_name.clone()).collect();
                names.sort_unstable();
                (app.clone(), names)
            })
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(app: &str) -> ControllerDefinition {
        ControllerDefinition::builder().application(app).build()
    }

    #[test]
    fn test_register_derives_identity() {
        let registry = Registry::new();
        let application = registry.register("MainController", def("editor")).unwrap();
        assert_eq!(application, "editor");

        let entry = registry.entry("editor", "main.controller").unwrap();
        assert_eq!(entry.raw_name, "MainController");
        assert_eq!(registry.resolve_alias("editor", "main").unwrap(), "MainController");
    }

    #[test]
    fn test_register_requires_application() {
        let registry = Registry::new();
        let err = registry
            .register("MainController", ControllerDefinition::builder().build())
            .unwrap_err();
        assert_eq!(err.as_label(), "missing_application");
    }

    #[test]
    fn test_register_rejects_invalid_name() {
        let registry = Registry::new();
        let err = registry.register("main", def("editor")).unwrap_err();
        assert_eq!(err.as_label(), "invalid_controller_name");
    }

    #[test]
    fn test_reregistration_silently_overwrites() {
        let registry = Registry::new();
        registry.register("MainController", def("editor")).unwrap();

        let replacement = ControllerDefinition::builder()
            .application("editor")
            .action("home", |_, _| Ok(()))
            .build();
        registry.register("MainController", replacement).unwrap();

        let entry = registry.entry("editor", "main.controller").unwrap();
        assert!(entry.definition.has_action("home"));
        assert_eq!(registry.list_by_application("editor").unwrap().len(), 1);
    }

    #[test]
    fn test_alias_collision_last_write_wins() {
        let registry = Registry::new();
        // Different raw names, same lowercased short prefix.
        registry.register("MAINController", def("editor")).unwrap();
        registry.register("MainController", def("editor")).unwrap();

        assert_eq!(registry.resolve_alias("editor", "main").unwrap(), "MainController");
    }

    #[test]
    fn test_alias_lookup_is_verbatim() {
        let registry = Registry::new();
        registry.register("MainController", def("editor")).unwrap();

        // Stored lowercased; a mixed-case query misses.
        assert!(registry.resolve_alias("editor", "Main").is_none());
    }

    #[test]
    fn test_unknown_application_listing_fails() {
        let registry = Registry::new();
        let err = registry.list_by_application("editor").unwrap_err();
        assert_eq!(err.as_label(), "controller_not_found");
    }

    #[test]
    fn test_all_reports_every_bucket() {
        let registry = Registry::new();
        registry.register("MainController", def("editor")).unwrap();
        registry.register("IndexController", def("content")).unwrap();
        registry.register("PageController", def("content")).unwrap();

        let all = registry.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "content");
        assert_eq!(all[0].1, vec!["IndexController", "PageController"]);
        assert_eq!(all[1].1, vec!["MainController"]);
    }
}
