//! # Controller definitions: the data half of a controller type.
//!
//! A [`ControllerDefinition`] is registered once against an application and
//! never mutates afterwards. It carries:
//! - the declared application id (validated at registration time);
//! - a **closed** action handler map — action keys unknown to the map are
//!   rejected at invocation with `ActionNotFound`, and nothing can be added
//!   after `build()`;
//! - the list of module imports the instance requires before activation;
//! - an optional configuration value handed to actions and hooks;
//! - an optional [`Behavior`] override for enable/disable/init hooks.
//!
//! ## Example
//! ```
//! use ctrlvisor::ControllerDefinition;
//! use serde_json::json;
//!
//! let def = ControllerDefinition::builder()
//!     .application("editor")
//!     .import("tb.core.RouteManager")
//!     .config(json!({ "panel": "left" }))
//!     .action("home", |ctrl, _params| {
//!         ctrl.set_state(1);
//!         Ok(())
//!     })
//!     .build();
//!
//! assert_eq!(def.application(), Some("editor"));
//! assert!(def.has_action("home"));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::imports::Importer;

use super::controller::Controller;

/// Positional parameters handed to an action handler.
pub type ActionParams = [Value];

/// A registered action handler.
///
/// Handlers run synchronously on the invoking caller; any asynchronous work
/// an action starts is the action's own to manage.
pub type ActionFn = Arc<dyn Fn(&Controller, &ActionParams) -> anyhow::Result<()> + Send + Sync>;

/// Lifecycle hooks of a controller type.
///
/// The defaults flip the instance's `enabled` flag and do nothing on init.
/// A definition may install an override for custom activation side effects;
/// an override takes over flag management entirely (call
/// [`Controller::set_enabled`] yourself if you still want the flag to track
/// the transitions).
pub trait Behavior: Send + Sync + 'static {
    /// Runs when the activation slot enables the instance.
    fn on_enabled(&self, ctrl: &Controller) {
        ctrl.set_enabled(true);
    }

    /// Runs when the activation slot disables the instance.
    fn on_disabled(&self, ctrl: &Controller) {
        ctrl.set_enabled(false);
    }

    /// Runs once after the instance's imports resolved, before it is
    /// enabled and cached. `services` is the capability to fetch further
    /// dependencies by name.
    fn on_init(&self, ctrl: &Controller, services: &dyn Importer) {
        let _ = (ctrl, services);
    }
}

/// The built-in hook set used when a definition installs no override.
struct DefaultBehavior;

impl Behavior for DefaultBehavior {}

/// Immutable description of a controller type.
pub struct ControllerDefinition {
    application: Option<String>,
    imports: Vec<String>,
    config: Option<Value>,
    actions: HashMap<String, ActionFn>,
    behavior: Arc<dyn Behavior>,
}

impl ControllerDefinition {
    /// Starts building a definition.
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::new()
    }

    /// The declared application id, if any.
    ///
    /// Registration fails with `MissingApplication` when absent.
    pub fn application(&self) -> Option<&str> {
        self.application.as_deref()
    }

    /// Module names the instance requires before activation.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// The configuration value, if any.
    pub fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    /// True when an action handler is registered under `key`.
    pub fn has_action(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    /// Registered action keys, sorted.
    pub fn action_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub(crate) fn action(&self, key: &str) -> Option<&ActionFn> {
        self.actions.get(key)
    }

    pub(crate) fn behavior(&self) -> &Arc<dyn Behavior> {
        &self.behavior
    }
}

impl std::fmt::Debug for ControllerDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerDefinition")
            .field("application", &self.application)
            .field("imports", &self.imports)
            .field("actions", &self.action_keys())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ControllerDefinition`].
pub struct DefinitionBuilder {
    application: Option<String>,
    imports: Vec<String>,
    config: Option<Value>,
    actions: HashMap<String, ActionFn>,
    behavior: Option<Arc<dyn Behavior>>,
}

impl DefinitionBuilder {
    fn new() -> Self {
        Self {
            application: None,
            imports: Vec::new(),
            config: None,
            actions: HashMap::new(),
            behavior: None,
        }
    }

    /// Declares the owning application id.
    pub fn application(mut self, application: impl Into<String>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Adds one module import.
    pub fn import(mut self, name: impl Into<String>) -> Self {
        self.imports.push(name.into());
        self
    }

    /// Adds a list of module imports.
    pub fn imports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration value.
    pub fn config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Registers an action handler under an explicit key.
    ///
    /// The last handler registered under a key wins.
    pub fn action<F>(mut self, key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Controller, &ActionParams) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.actions.insert(key.into(), Arc::new(handler));
        self
    }

    /// Installs a lifecycle hook override.
    pub fn behavior(mut self, behavior: Arc<dyn Behavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Finalizes the definition. The action map is closed from here on.
    pub fn build(self) -> ControllerDefinition {
        ControllerDefinition {
            application: self.application,
            imports: self.imports,
            config: self.config,
            actions: self.actions,
            behavior: self.behavior.unwrap_or_else(|| Arc::new(DefaultBehavior)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_fields() {
        let def = ControllerDefinition::builder()
            .application("editor")
            .import("tb.core.RouteManager")
            .imports(["tb.core.RequestHandler", "tb.component.popin"])
            .config(json!({ "panel": "left" }))
            .action("home", |_, _| Ok(()))
            .action("edit", |_, _| Ok(()))
            .build();

        assert_eq!(def.application(), Some("editor"));
        assert_eq!(def.imports().len(), 3);
        assert_eq!(def.config().unwrap()["panel"], "left");
        assert_eq!(def.action_keys(), vec!["edit", "home"]);
        assert!(!def.has_action("delete"));
    }

    #[test]
    fn test_missing_application_is_representable() {
        let def = ControllerDefinition::builder().build();
        assert_eq!(def.application(), None);
    }

    #[test]
    fn test_last_action_registration_wins() {
        let def = ControllerDefinition::builder()
            .application("editor")
            .action("home", |_, _| Err(anyhow::anyhow!("first")))
            .action("home", |_, _| Ok(()))
            .build();

        assert_eq!(def.action_keys(), vec!["home"]);
    }
}
