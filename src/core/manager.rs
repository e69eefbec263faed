//! # Controller manager: registration, load orchestration, activation.
//!
//! [`ControllerManager`] is the context object every entry point goes
//! through. It owns the definition [`Registry`], the [`InstanceCache`], the
//! [`ActivationSlot`], the append-only [`FaultLog`], and the lifecycle event
//! [`Bus`]; the module system and the application container are injected as
//! trait objects at build time.
//!
//! ## Load resolution order
//! ```text
//! load(app, "MainController")
//!   ├─ cache hit            ──► promote ──► resolve with cached instance
//!   ├─ registry hit         ──► construct ──► handle_import ──► init ──► promote ──► cache
//!   └─ miss                 ──► Importer::require(["app.main.controller"])
//!            ├─ Ok          ──► retry registry (miss again ─► ControllerNotFound)
//!            └─ Err(reason) ──► ImportFailed { module_fetch } (nothing cached)
//! ```
//!
//! ## Rules
//! - A partially constructed instance is never cached: an import failure
//!   leaves a hole and a later load reconstructs from scratch.
//! - Overlapping loads for the same not-yet-cached key are collapsed into
//!   one construction (per-key in-flight map); followers receive the
//!   leader's result.
//! - Every raised fault is recorded in the [`FaultLog`] and published as a
//!   `FaultRaised` event before propagating.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, watch};

use crate::apps::ApplicationContainer;
use crate::config::ManagerConfig;
use crate::controllers::{Controller, ControllerDefinition, ControllerRef};
use crate::error::{ControllerError, ImportPhase};
use crate::events::{Bus, Event, EventKind};
use crate::imports::Importer;
use crate::names;
use crate::subscribers::SubscriberSet;

use super::activation::ActivationSlot;
use super::builder::ManagerBuilder;
use super::cache::InstanceCache;
use super::faults::FaultLog;
use super::registry::Registry;

/// Result signal shared between collapsed loads of one key.
type LoadSignal = Option<Result<ControllerRef, ControllerError>>;

/// Coordinates controller registration, lazy construction, and activation.
pub struct ControllerManager {
    cfg: ManagerConfig,
    bus: Bus,
    registry: Registry,
    cache: InstanceCache,
    activation: ActivationSlot,
    faults: Arc<FaultLog>,
    importer: Arc<dyn Importer>,
    apps: Arc<dyn ApplicationContainer>,
    pending: Mutex<HashMap<String, watch::Receiver<LoadSignal>>>,
    subs: Option<Arc<SubscriberSet>>,
}

impl ControllerManager {
    /// Starts building a manager.
    pub fn builder(cfg: ManagerConfig) -> ManagerBuilder {
        ManagerBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: ManagerConfig,
        bus: Bus,
        importer: Arc<dyn Importer>,
        apps: Arc<dyn ApplicationContainer>,
        subs: Option<Arc<SubscriberSet>>,
    ) -> Self {
        Self {
            activation: ActivationSlot::new(bus.clone()),
            registry: Registry::new(),
            cache: InstanceCache::new(),
            faults: Arc::new(FaultLog::new()),
            pending: Mutex::new(HashMap::new()),
            cfg,
            bus,
            importer,
            apps,
            subs,
        }
    }

    /// The manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.cfg
    }

    /// The append-only fault sink.
    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    /// Number of subscribers attached at build time.
    pub fn subscriber_count(&self) -> usize {
        self.subs.as_ref().map_or(0, |s| s.len())
    }

    /// Creates a receiver observing subsequent lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// The currently enabled controller, if any was ever activated.
    pub fn enabled_controller(&self) -> Option<ControllerRef> {
        self.activation.current()
    }

    /// Registers a controller type against its declared application.
    ///
    /// The definition must carry an application id (`MissingApplication`
    /// otherwise) and `raw_name` must follow the `{Name}Controller` style
    /// (`InvalidControllerName` otherwise). Re-registering the same pair
    /// silently replaces the stored definition; an already-constructed
    /// instance keeps the definition it was built from.
    pub fn register(
        &self,
        raw_name: &str,
        definition: ControllerDefinition,
    ) -> Result<(), ControllerError> {
        let application = self
            .registry
            .register(raw_name, definition)
            .map_err(|e| self.raise(e))?;

        self.bus.publish(
            Event::new(EventKind::ControllerRegistered)
                .with_application(application)
                .with_controller(raw_name),
        );
        Ok(())
    }

    /// Loads a controller by raw name, constructing it on first use.
    ///
    /// Resolving always promotes the instance to enabled. See the module
    /// docs for the resolution order.
    pub async fn load(
        &self,
        application: &str,
        raw_name: &str,
    ) -> Result<ControllerRef, ControllerError> {
        if application.is_empty() {
            return Err(self.raise(ControllerError::InvalidApplication));
        }
        let canonical = names::canonicalize(raw_name).map_err(|e| self.raise(e))?;
        let key = names::cache_key(application, &canonical);

        loop {
            if let Some(instance) = self.cache.get(&key) {
                self.activation.promote(&instance);
                self.publish_loaded(application, instance.name());
                return Ok(instance);
            }

            let role = {
                let mut pending = self.pending.lock().expect("in-flight map lock poisoned");
                // A leader may have installed the instance between the cache
                // check above and this lock; the next loop turn picks it up.
                match pending.get(&key) {
                    Some(rx) => Role::Follower(rx.clone()),
                    None => {
                        let (tx, rx) = watch::channel(None);
                        pending.insert(key.clone(), rx);
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => {
                    let _guard = InFlightGuard {
                        pending: &self.pending,
                        key: &key,
                    };
                    let result = self.build_instance(application, &canonical, &key).await;
                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
                Role::Follower(mut rx) => {
                    let outcome = loop {
                        let signal = rx.borrow_and_update().clone();
                        if let Some(result) = signal {
                            break Some(result);
                        }
                        if rx.changed().await.is_err() {
                            // Leader future dropped without a result; start over.
                            break None;
                        }
                    };
                    match outcome {
                        Some(Ok(instance)) => {
                            self.activation.promote(&instance);
                            self.publish_loaded(application, instance.name());
                            return Ok(instance);
                        }
                        Some(Err(err)) => return Err(err),
                        None => continue,
                    }
                }
            }
        }
    }

    /// Loads a controller by its lowercase short alias.
    ///
    /// Both arguments must be non-empty; the alias table lookup uses the
    /// given short name verbatim and fails with `AliasNotFound` when the
    /// pair was never registered. Delegates to [`ControllerManager::load`].
    pub async fn load_by_short_name(
        &self,
        application: &str,
        short: &str,
    ) -> Result<ControllerRef, ControllerError> {
        if application.is_empty() {
            return Err(self.raise(ControllerError::InvalidApplication));
        }
        if short.is_empty() {
            return Err(self.raise(ControllerError::InvalidShortName));
        }

        let raw_name = self
            .registry
            .resolve_alias(application, short)
            .ok_or_else(|| {
                self.raise(ControllerError::AliasNotFound {
                    application: application.to_string(),
                    short: short.to_string(),
                })
            })?;

        self.load(application, &raw_name).await
    }

    /// Raw names registered for an application.
    ///
    /// Fails with `ControllerNotFound` when the application has none.
    pub fn list_by_application(&self, application: &str) -> Result<Vec<String>, ControllerError> {
        self.registry
            .list_by_application(application)
            .map_err(|e| self.raise(e))
    }

    /// Every application and its registered raw names.
    pub fn all_controllers(&self) -> Vec<(String, Vec<String>)> {
        self.registry.all()
    }

    /// Constructs, initializes, promotes, and caches a fresh instance.
    async fn build_instance(
        &self,
        application: &str,
        canonical: &str,
        key: &str,
    ) -> Result<ControllerRef, ControllerError> {
        let entry = match self.registry.entry(application, canonical) {
            Some(entry) => entry,
            None => {
                let qualified = key.to_string();
                if let Err(reason) = self.importer.require(std::slice::from_ref(&qualified)).await
                {
                    return Err(self.raise(ControllerError::ImportFailed {
                        phase: ImportPhase::ModuleFetch,
                        reason: reason.to_string(),
                    }));
                }
                match self.registry.entry(application, canonical) {
                    Some(entry) => entry,
                    None => {
                        return Err(self.raise(ControllerError::ControllerNotFound {
                            application: application.to_string(),
                        }));
                    }
                }
            }
        };

        let app_name = entry
            .definition
            .application()
            .unwrap_or(application)
            .to_string();
        let Some(app_handle) = self.apps.by_name(&app_name) else {
            return Err(self.raise(ControllerError::ApplicationNotRegistered {
                application: app_name,
            }));
        };

        let instance = Controller::new(
            entry.raw_name.clone(),
            canonical.to_string(),
            application.to_string(),
            entry.definition,
            app_handle,
            self.faults.clone(),
            self.bus.clone(),
        );

        // Discarded on failure: a later retry reconstructs from scratch.
        instance.handle_import(self.importer.as_ref()).await?;
        instance.run_init(self.importer.as_ref());

        self.activation.promote(&instance);
        self.cache.insert(key.to_string(), instance.clone());
        self.publish_loaded(application, instance.name());
        Ok(instance)
    }

    /// Records the fault and announces it, then hands the error back.
    fn raise(&self, err: ControllerError) -> ControllerError {
        self.faults.record(&err);
        self.bus
            .publish(Event::new(EventKind::FaultRaised).with_reason(err.as_label()));
        err
    }

    fn publish_loaded(&self, application: &str, controller: &str) {
        self.bus.publish(
            Event::new(EventKind::ControllerLoaded)
                .with_application(application)
                .with_controller(controller),
        );
    }

    /// Number of constructed instances currently held by the cache.
    ///
    /// Diagnostic surface: the cache has unbounded retention, so this only
    /// ever grows.
    pub fn cached_instances(&self) -> usize {
        self.cache.len()
    }
}

/// Role a load call plays for a not-yet-cached key.
enum Role {
    Leader(watch::Sender<LoadSignal>),
    Follower(watch::Receiver<LoadSignal>),
}

/// Clears the in-flight entry even when the leader's future is dropped.
struct InFlightGuard<'a> {
    pending: &'a Mutex<HashMap<String, watch::Receiver<LoadSignal>>>,
    key: &'a str,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .expect("in-flight map lock poisoned")
            .remove(self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Weak;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::apps::{AppRef, Application};
    use crate::controllers::Behavior;

    struct TestApp {
        name: String,
    }

    impl Application for TestApp {
        fn name(&self) -> &str {
            &self.name
        }
    }

    /// Container with a fixed set of known applications.
    struct StaticApps {
        known: HashSet<String>,
    }

    impl StaticApps {
        fn of(names: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                known: names.iter().map(|s| s.to_string()).collect(),
            })
        }
    }

    impl ApplicationContainer for StaticApps {
        fn by_name(&self, app_name: &str) -> Option<AppRef> {
            self.known.get(app_name).map(|name| {
                Arc::new(TestApp { name: name.clone() }) as AppRef
            })
        }
    }

    /// Importer scripted per test: counts calls, optionally fails, and can
    /// register a stashed definition into the bound manager on module fetch.
    #[derive(Default)]
    struct ScriptedImporter {
        calls: AtomicUsize,
        failure: Mutex<Option<String>>,
        delay: Mutex<Option<Duration>>,
        on_fetch: Mutex<Option<(String, Box<dyn Fn() -> ControllerDefinition + Send>)>>,
        manager: Mutex<Option<Weak<ControllerManager>>>,
    }

    impl ScriptedImporter {
        fn bind(&self, manager: &Arc<ControllerManager>) {
            *self.manager.lock().unwrap() = Some(Arc::downgrade(manager));
        }

        fn fail_with(&self, reason: &str) {
            *self.failure.lock().unwrap() = Some(reason.to_string());
        }

        fn succeed(&self) {
            *self.failure.lock().unwrap() = None;
        }

        fn register_on_fetch<F>(&self, raw_name: &str, make: F)
        where
            F: Fn() -> ControllerDefinition + Send + 'static,
        {
            *self.on_fetch.lock().unwrap() = Some((raw_name.to_string(), Box::new(make)));
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Importer for ScriptedImporter {
        async fn require(&self, _names: &[String]) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(reason) = self.failure.lock().unwrap().clone() {
                return Err(anyhow::anyhow!(reason));
            }

            let fetch = self.on_fetch.lock().unwrap().take();
            if let Some((raw_name, make)) = fetch {
                let manager = self
                    .manager
                    .lock()
                    .unwrap()
                    .as_ref()
                    .and_then(Weak::upgrade);
                if let Some(manager) = manager {
                    manager.register(&raw_name, make())?;
                }
            }
            Ok(())
        }
    }

    struct Harness {
        manager: Arc<ControllerManager>,
        importer: Arc<ScriptedImporter>,
    }

    fn harness() -> Harness {
        let importer = Arc::new(ScriptedImporter::default());
        let manager = ControllerManager::builder(ManagerConfig::default())
            .importer(importer.clone())
            .applications(StaticApps::of(&["editor", "content"]))
            .build();
        importer.bind(&manager);
        Harness { manager, importer }
    }

    fn simple_def(app: &str) -> ControllerDefinition {
        ControllerDefinition::builder()
            .application(app)
            .action("home", |ctrl, _| {
                ctrl.set_state(1);
                Ok(())
            })
            .build()
    }

    #[tokio::test]
    async fn test_full_and_short_name_resolve_to_same_instance() {
        let h = harness();
        h.manager.register("MainController", simple_def("editor")).unwrap();

        let by_name = h.manager.load("editor", "MainController").await.unwrap();
        let by_short = h
            .manager
            .load_by_short_name("editor", "main")
            .await
            .unwrap();

        assert!(ControllerRef::ptr_eq(&by_name, &by_short));
        assert_eq!(h.manager.cached_instances(), 1);
    }

    #[tokio::test]
    async fn test_reregistration_does_not_touch_cached_instance() {
        let h = harness();
        h.manager.register("MainController", simple_def("editor")).unwrap();
        let first = h.manager.load("editor", "MainController").await.unwrap();

        let replacement = ControllerDefinition::builder()
            .application("editor")
            .action("edit", |_, _| Ok(()))
            .build();
        h.manager.register("MainController", replacement).unwrap();

        let second = h.manager.load("editor", "MainController").await.unwrap();
        assert!(ControllerRef::ptr_eq(&first, &second));

        // The cached instance still carries the original action set.
        assert!(second.invoke("home", &[]).is_ok());
        assert!(second.invoke("edit", &[]).is_err());
    }

    #[tokio::test]
    async fn test_sequential_loads_construct_once() {
        let h = harness();
        let def = ControllerDefinition::builder()
            .application("editor")
            .import("tb.core.RouteManager")
            .build();
        h.manager.register("MainController", def).unwrap();

        for _ in 0..3 {
            h.manager.load("editor", "MainController").await.unwrap();
        }

        assert_eq!(h.manager.cached_instances(), 1);
        // One handle_import resolution total: cached loads never re-import.
        assert_eq!(h.importer.calls(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_loads_are_collapsed() {
        let h = harness();
        let def = ControllerDefinition::builder()
            .application("editor")
            .import("tb.core.RouteManager")
            .build();
        h.manager.register("MainController", def).unwrap();
        *h.importer.delay.lock().unwrap() = Some(Duration::from_millis(20));

        let (a, b) = tokio::join!(
            h.manager.load("editor", "MainController"),
            h.manager.load("editor", "MainController"),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert!(ControllerRef::ptr_eq(&a, &b));
        assert_eq!(h.importer.calls(), 1);
        assert_eq!(h.manager.cached_instances(), 1);
    }

    #[tokio::test]
    async fn test_load_swaps_enablement_between_controllers() {
        let h = harness();
        h.manager.register("MainController", simple_def("editor")).unwrap();
        h.manager.register("PageController", simple_def("editor")).unwrap();

        let main = h.manager.load("editor", "MainController").await.unwrap();
        assert!(main.is_enabled());

        let page = h.manager.load("editor", "PageController").await.unwrap();
        assert!(page.is_enabled());
        assert!(!main.is_enabled());
        assert!(ControllerRef::ptr_eq(
            &h.manager.enabled_controller().unwrap(),
            &page
        ));

        // Loading the cached one transfers enablement back.
        let main_again = h.manager.load("editor", "MainController").await.unwrap();
        assert!(ControllerRef::ptr_eq(&main, &main_again));
        assert!(main.is_enabled());
        assert!(!page.is_enabled());
    }

    #[tokio::test]
    async fn test_unknown_module_fetch_failure_leaves_cache_empty() {
        let h = harness();
        h.importer.fail_with("script error on editor.main.controller");

        let err = h.manager.load("editor", "MainController").await.unwrap_err();
        match &err {
            ControllerError::ImportFailed { phase, reason } => {
                assert_eq!(*phase, ImportPhase::ModuleFetch);
                assert!(reason.contains("script error"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(h.manager.cached_instances(), 0);
        assert_eq!(
            h.manager.faults().last().unwrap().error.as_label(),
            "import_failed"
        );
    }

    #[tokio::test]
    async fn test_module_fetch_registers_and_constructs() {
        let h = harness();
        h.importer
            .register_on_fetch("MainController", || simple_def("editor"));

        let instance = h.manager.load("editor", "MainController").await.unwrap();
        assert_eq!(instance.name(), "MainController");
        assert!(instance.is_enabled());
        assert_eq!(h.importer.calls(), 1);
    }

    #[tokio::test]
    async fn test_module_fetch_without_registration_is_controller_not_found() {
        let h = harness();
        // Importer resolves but registers nothing.
        let err = h.manager.load("editor", "MainController").await.unwrap_err();
        assert_eq!(err.as_label(), "controller_not_found");
        assert_eq!(h.manager.cached_instances(), 0);
    }

    #[tokio::test]
    async fn test_import_failure_is_not_cached_and_retry_reconstructs() {
        let h = harness();
        let def = ControllerDefinition::builder()
            .application("editor")
            .import("tb.core.RouteManager")
            .build();
        h.manager.register("MainController", def).unwrap();
        h.importer.fail_with("network down");

        let err = h.manager.load("editor", "MainController").await.unwrap_err();
        match err {
            ControllerError::ImportFailed { phase, .. } => {
                assert_eq!(phase, ImportPhase::HandleImport);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(h.manager.cached_instances(), 0);

        // Caller-initiated retry rebuilds from scratch.
        h.importer.succeed();
        let instance = h.manager.load("editor", "MainController").await.unwrap();
        assert!(instance.is_enabled());
        assert_eq!(h.importer.calls(), 2);
        assert_eq!(h.manager.cached_instances(), 1);
    }

    #[tokio::test]
    async fn test_argument_validation() {
        let h = harness();

        let err = h.manager.load("", "MainController").await.unwrap_err();
        assert_eq!(err.as_label(), "invalid_application");

        let err = h.manager.load_by_short_name("", "main").await.unwrap_err();
        assert_eq!(err.as_label(), "invalid_application");

        let err = h
            .manager
            .load_by_short_name("editor", "")
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "invalid_short_name");

        let err = h
            .manager
            .load_by_short_name("editor", "main")
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "alias_not_found");

        assert_eq!(h.manager.faults().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_application_container_miss() {
        let h = harness();
        h.manager
            .register("MainController", simple_def("toolbar"))
            .unwrap();

        let err = h.manager.load("toolbar", "MainController").await.unwrap_err();
        assert_eq!(err.as_label(), "application_not_registered");
        assert_eq!(h.manager.cached_instances(), 0);
    }

    #[tokio::test]
    async fn test_listing_surfaces() {
        let h = harness();
        h.manager.register("MainController", simple_def("editor")).unwrap();
        h.manager.register("PageController", simple_def("editor")).unwrap();
        h.manager.register("IndexController", simple_def("content")).unwrap();

        assert_eq!(
            h.manager.list_by_application("editor").unwrap(),
            vec!["MainController", "PageController"]
        );
        assert_eq!(h.manager.list_by_application("toolbar").unwrap_err().as_label(), "controller_not_found");
        assert_eq!(h.manager.all_controllers().len(), 2);
    }

    #[tokio::test]
    async fn test_init_hook_receives_service_capability() {
        struct InitProbe {
            init_calls: AtomicUsize,
        }

        impl Behavior for Arc<InitProbe> {
            fn on_init(&self, ctrl: &Controller, services: &dyn Importer) {
                // The capability resolves nothing in this harness; the hook
                // still observes it before the instance is enabled.
                assert!(services.lookup("tb.core.RouteManager").is_none());
                assert!(!ctrl.is_enabled());
                self.init_calls.fetch_add(1, Ordering::SeqCst);
            }
        }

        let h = harness();
        let probe = Arc::new(InitProbe {
            init_calls: AtomicUsize::new(0),
        });
        let def = ControllerDefinition::builder()
            .application("editor")
            .behavior(Arc::new(probe.clone()))
            .build();
        h.manager.register("MainController", def).unwrap();

        h.manager.load("editor", "MainController").await.unwrap();
        h.manager.load("editor", "MainController").await.unwrap();

        // Init runs once per construction, not per load.
        assert_eq!(probe.init_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lifecycle_events_are_published() {
        let h = harness();
        let mut rx = h.manager.subscribe();

        h.manager.register("MainController", simple_def("editor")).unwrap();
        h.manager.load("editor", "MainController").await.unwrap();

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|ev| ev.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::ControllerRegistered,
                EventKind::ControllerEnabled,
                EventKind::ControllerLoaded,
            ]
        );
    }
}
