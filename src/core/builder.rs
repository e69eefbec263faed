//! Builder for wiring a [`ControllerManager`] with its collaborators.

use std::sync::Arc;

use async_trait::async_trait;

use crate::apps::{AppRef, ApplicationContainer};
use crate::config::ManagerConfig;
use crate::events::{Bus, EventKind};
use crate::imports::Importer;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::manager::ControllerManager;

/// Importer used when none is configured: every resolution fails.
struct NoImporter;

#[async_trait]
impl Importer for NoImporter {
    async fn require(&self, names: &[String]) -> anyhow::Result<()> {
        Err(anyhow::anyhow!(
            "no module importer configured; cannot resolve {names:?}"
        ))
    }
}

/// Container used when none is configured: every lookup misses.
struct NoApplications;

impl ApplicationContainer for NoApplications {
    fn by_name(&self, _app_name: &str) -> Option<AppRef> {
        None
    }
}

/// Builder for constructing a manager with optional collaborators.
///
/// # Example
/// ```no_run
/// use ctrlvisor::{ControllerManager, ManagerConfig};
///
/// # async fn demo() {
/// let manager = ControllerManager::builder(ManagerConfig::default()).build();
/// # let _ = manager;
/// # }
/// ```
pub struct ManagerBuilder {
    cfg: ManagerConfig,
    importer: Option<Arc<dyn Importer>>,
    apps: Option<Arc<dyn ApplicationContainer>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ManagerBuilder {
    pub(crate) fn new(cfg: ManagerConfig) -> Self {
        Self {
            cfg,
            importer: None,
            apps: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the module importer.
    ///
    /// Without one, every module fetch and import-list resolution fails,
    /// which is the correct behavior for a host with no module system.
    pub fn importer(mut self, importer: Arc<dyn Importer>) -> Self {
        self.importer = Some(importer);
        self
    }

    /// Sets the application container controllers resolve their owning
    /// application from.
    pub fn applications(mut self, apps: Arc<dyn ApplicationContainer>) -> Self {
        self.apps = Some(apps);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (registration, loads,
    /// enable/disable transitions, faults) through dedicated workers with
    /// bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single subscriber.
    pub fn subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds and returns the manager.
    ///
    /// Must be called within a Tokio runtime when subscribers are
    /// configured (their workers and the fan-out listener are spawned here).
    pub fn build(self) -> Arc<ControllerManager> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());

        let subs = if self.subscribers.is_empty() {
            None
        } else {
            let set = Arc::new(SubscriberSet::new(self.subscribers, bus.clone()));
            spawn_fanout(&bus, Arc::clone(&set));
            Some(set)
        };

        Arc::new(ControllerManager::new_internal(
            self.cfg,
            bus,
            self.importer.unwrap_or_else(|| Arc::new(NoImporter)),
            self.apps.unwrap_or_else(|| Arc::new(NoApplications)),
            subs,
        ))
    }
}

/// Subscribes to the bus and forwards events to the subscriber set
/// (fire-and-forget). Subscriber plumbing reports are not forwarded, so
/// overflow reporting cannot feed back into the set.
fn spawn_fanout(bus: &Bus, set: Arc<SubscriberSet>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    if matches!(
                        ev.kind,
                        EventKind::SubscriberPanicked | EventKind::SubscriberOverflow
                    ) {
                        continue;
                    }
                    set.emit(&ev);
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::controllers::ControllerDefinition;
    use crate::events::Event;

    #[tokio::test]
    async fn test_default_build_has_no_importer_or_apps() {
        let manager = ControllerManager::builder(ManagerConfig::default()).build();
        assert_eq!(manager.subscriber_count(), 0);

        // No importer: loading anything fails with an import fault.
        let err = manager.load("editor", "MainController").await.unwrap_err();
        assert_eq!(err.as_label(), "import_failed");
    }

    #[tokio::test]
    async fn test_subscribers_receive_manager_events() {
        struct Probe {
            seen: AtomicUsize,
        }

        #[async_trait]
        impl Subscribe for Arc<Probe> {
            async fn on_event(&self, _event: &Event) {
                self.seen.fetch_add(1, Ordering::SeqCst);
            }

            fn name(&self) -> &'static str {
                "probe"
            }
        }

        let probe = Arc::new(Probe {
            seen: AtomicUsize::new(0),
        });
        let manager = ControllerManager::builder(ManagerConfig::default())
            .subscriber(Arc::new(probe.clone()))
            .build();
        assert_eq!(manager.subscriber_count(), 1);

        manager
            .register(
                "MainController",
                ControllerDefinition::builder().application("editor").build(),
            )
            .unwrap();

        // Fan-out is asynchronous; give the listener a moment.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(probe.seen.load(Ordering::SeqCst) >= 1);
    }
}
