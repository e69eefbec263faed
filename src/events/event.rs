//! # Lifecycle events emitted by the controller runtime.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registration events**: definitions entering the registry
//! - **Load/activation events**: instance construction and the enable/disable
//!   transition pair
//! - **Dispatch events**: action invocation outcomes
//! - **Fault/subscriber events**: raised faults and subscriber plumbing
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! application and controller names, action keys, and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.
//!
//! ## Example
//! ```rust
//! use ctrlvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ControllerEnabled)
//!     .with_application("editor")
//!     .with_controller("MainController");
//!
//! assert_eq!(ev.kind, EventKind::ControllerEnabled);
//! assert_eq!(ev.controller.as_deref(), Some("MainController"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registration events ===
    /// A controller definition entered the registry (or overwrote a prior one).
    ///
    /// Sets:
    /// - `application`: application id
    /// - `controller`: raw registered name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ControllerRegistered,

    // === Load / activation events ===
    /// A load call resolved with an instance (cached or freshly built).
    ///
    /// Sets:
    /// - `application`: application id
    /// - `controller`: raw controller name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ControllerLoaded,

    /// The activation slot enabled an instance.
    ///
    /// Sets:
    /// - `application`: application id
    /// - `controller`: raw controller name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ControllerEnabled,

    /// The activation slot disabled the previously enabled instance.
    ///
    /// Sets:
    /// - `application`: application id
    /// - `controller`: raw controller name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ControllerDisabled,

    // === Dispatch events ===
    /// An action handler ran to completion.
    ///
    /// Sets:
    /// - `application`: application id
    /// - `controller`: raw controller name
    /// - `action`: action key
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ActionInvoked,

    /// An action handler was missing, returned an error, or panicked.
    ///
    /// Sets:
    /// - `application`: application id
    /// - `controller`: raw controller name
    /// - `action`: action key
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ActionFailed,

    // === Fault events ===
    /// A fault was appended to the fault log.
    ///
    /// Sets:
    /// - `reason`: stable fault label (see
    ///   [`ControllerError::as_label`](crate::ControllerError::as_label))
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    FaultRaised,

    // === Subscriber plumbing ===
    /// A subscriber panicked while processing an event.
    ///
    /// Sets:
    /// - `controller`: subscriber name
    /// - `reason`: panic message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberPanicked,

    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `controller`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SubscriberOverflow,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// Application id, if applicable.
    pub application: Option<Arc<str>>,
    /// Raw controller name (or subscriber name for plumbing events).
    pub controller: Option<Arc<str>>,
    /// Action key, for dispatch events.
    pub action: Option<Arc<str>>,
    /// Human-readable reason (fault labels, panic messages, drop causes).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            application: None,
            controller: None,
            action: None,
            reason: None,
        }
    }

    /// Attaches an application id.
    #[inline]
    pub fn with_application(mut self, application: impl Into<Arc<str>>) -> Self {
        self.application = Some(application.into());
        self
    }

    /// Attaches a controller (or subscriber) name.
    #[inline]
    pub fn with_controller(mut self, controller: impl Into<Arc<str>>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    /// Attaches an action key.
    #[inline]
    pub fn with_action(mut self, action: impl Into<Arc<str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::ControllerRegistered);
        let b = Event::new(EventKind::ControllerLoaded);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_attach_metadata() {
        let ev = Event::new(EventKind::ActionFailed)
            .with_application("editor")
            .with_controller("MainController")
            .with_action("home")
            .with_reason("boom");

        assert_eq!(ev.application.as_deref(), Some("editor"));
        assert_eq!(ev.controller.as_deref(), Some("MainController"));
        assert_eq!(ev.action.as_deref(), Some("home"));
        assert_eq!(ev.reason.as_deref(), Some("boom"));
    }
}
