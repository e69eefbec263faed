//! # Live controller instances.
//!
//! A [`Controller`] is constructed lazily by the manager from a registered
//! [`ControllerDefinition`](super::ControllerDefinition): at most one
//! instance ever exists per (application, canonical name) pair, and once
//! cached it lives for the manager's lifetime.
//!
//! Instances start with `state = 0` and `enabled = false`. The activation
//! slot drives the enable/disable hooks; action dispatch goes through
//! [`Controller::invoke`], which looks the handler up in the definition's
//! closed action map and isolates handler failures (errors and panics) as
//! `ActionExecutionFailed`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::apps::AppRef;
use crate::core::FaultLog;
use crate::error::{ControllerError, ImportPhase};
use crate::events::{Bus, Event, EventKind};
use crate::imports::Importer;

use super::definition::{ActionParams, ControllerDefinition};

/// Shared controller handle.
pub type ControllerRef = Arc<Controller>;

/// A constructed controller instance.
pub struct Controller {
    raw_name: String,
    canonical: String,
    application_id: String,
    def: Arc<ControllerDefinition>,
    app: AppRef,
    state: AtomicI64,
    enabled: AtomicBool,
    faults: Arc<FaultLog>,
    bus: Bus,
}

impl Controller {
    pub(crate) fn new(
        raw_name: String,
        canonical: String,
        application_id: String,
        def: Arc<ControllerDefinition>,
        app: AppRef,
        faults: Arc<FaultLog>,
        bus: Bus,
    ) -> ControllerRef {
        Arc::new(Self {
            raw_name,
            canonical,
            application_id,
            def,
            app,
            state: AtomicI64::new(0),
            enabled: AtomicBool::new(false),
            faults,
            bus,
        })
    }

    /// The raw name the controller type was registered under.
    pub fn name(&self) -> &str {
        &self.raw_name
    }

    /// The canonical registry key (e.g. `"main.controller"`).
    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// The id of the application this instance belongs to.
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Handle to the owning application instance.
    pub fn app(&self) -> &AppRef {
        &self.app
    }

    /// The definition's configuration value, if any.
    pub fn config(&self) -> Option<&serde_json::Value> {
        self.def.config()
    }

    /// Current numeric state.
    pub fn state(&self) -> i64 {
        self.state.load(Ordering::SeqCst)
    }

    /// Replaces the numeric state.
    pub fn set_state(&self, state: i64) {
        self.state.store(state, Ordering::SeqCst);
    }

    /// True while this instance is the enabled one.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Sets the enabled flag.
    ///
    /// The default [`Behavior`](super::Behavior) hooks call this; custom
    /// hooks that override them are expected to manage the flag themselves.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Resolves the definition's import list.
    ///
    /// Resolves immediately when the list is empty; otherwise requires every
    /// listed dependency through `importer`. A failure surfaces as
    /// `ImportFailed` with the `handle_import` phase and leaves the instance
    /// un-cached (the caller discards it).
    pub async fn handle_import(&self, importer: &dyn Importer) -> Result<(), ControllerError> {
        let imports = self.def.imports();
        if imports.is_empty() {
            return Ok(());
        }
        match importer.require(imports).await {
            Ok(()) => Ok(()),
            Err(reason) => Err(self.raise(ControllerError::ImportFailed {
                phase: ImportPhase::HandleImport,
                reason: reason.to_string(),
            })),
        }
    }

    /// Runs the definition's init hook with the service-lookup capability.
    pub(crate) fn run_init(&self, services: &dyn Importer) {
        self.def.behavior().on_init(self, services);
    }

    /// Fires the enable hook. Called by the activation slot only.
    pub(crate) fn fire_enabled(&self) {
        self.def.behavior().on_enabled(self);
    }

    /// Fires the disable hook. Called by the activation slot only.
    pub(crate) fn fire_disabled(&self) {
        self.def.behavior().on_disabled(self);
    }

    /// Invokes a named action with positional parameters.
    ///
    /// The handler is looked up in the definition's closed action map;
    /// an unknown key fails with `ActionNotFound`. A handler error or panic
    /// is re-raised as `ActionExecutionFailed` carrying the original cause.
    /// Dispatch is synchronous and never touches the activation slot.
    ///
    /// # Example
    /// ```no_run
    /// # fn demo(ctrl: &ctrlvisor::Controller) -> Result<(), ctrlvisor::ControllerError> {
    /// ctrl.invoke("home", &[serde_json::json!(42)])?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn invoke(&self, action: &str, params: &ActionParams) -> Result<(), ControllerError> {
        let Some(handler) = self.def.action(action) else {
            let err = self.raise(ControllerError::ActionNotFound {
                action: action.to_string(),
                controller: self.raw_name.clone(),
            });
            self.publish_action_failure(action, err.as_label());
            return Err(err);
        };

        match catch_unwind(AssertUnwindSafe(|| handler(self, params))) {
            Ok(Ok(())) => {
                self.bus.publish(
                    Event::new(EventKind::ActionInvoked)
                        .with_application(self.application_id.as_str())
                        .with_controller(self.raw_name.as_str())
                        .with_action(action),
                );
                Ok(())
            }
            Ok(Err(cause)) => {
                let err = self.raise(ControllerError::ActionExecutionFailed {
                    action: action.to_string(),
                    controller: self.raw_name.clone(),
                    cause: cause.to_string(),
                });
                self.publish_action_failure(action, cause.to_string());
                Err(err)
            }
            Err(panic) => {
                let cause = panic_message(panic);
                let err = self.raise(ControllerError::ActionExecutionFailed {
                    action: action.to_string(),
                    controller: self.raw_name.clone(),
                    cause: cause.clone(),
                });
                self.publish_action_failure(action, cause);
                Err(err)
            }
        }
    }

    /// Records the fault and announces it, then hands the error back.
    fn raise(&self, err: ControllerError) -> ControllerError {
        self.faults.record(&err);
        self.bus
            .publish(Event::new(EventKind::FaultRaised).with_reason(err.as_label()));
        err
    }

    fn publish_action_failure(&self, action: &str, reason: impl Into<Arc<str>>) {
        self.bus.publish(
            Event::new(EventKind::ActionFailed)
                .with_application(self.application_id.as_str())
                .with_controller(self.raw_name.as_str())
                .with_action(action)
                .with_reason(reason),
        );
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.raw_name)
            .field("application", &self.application_id)
            .field("state", &self.state())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
