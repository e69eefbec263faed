//! # Activation slot: the single globally-enabled controller.
//!
//! One slot per manager holds at most one reference to the currently
//! enabled controller instance. [`ActivationSlot::promote`] enforces the
//! transition protocol:
//!
//! - promoting the already-enabled instance is a no-op (zero hooks fire);
//! - otherwise the incumbent's disable hook fires, the slot swaps, and the
//!   candidate's enable hook fires — exactly one disable and one enable per
//!   effective promotion.
//!
//! The whole transition runs under one lock, so the hook pair executes in
//! strict alternation: never two consecutive enables without an intervening
//! disable of the prior controller.

use std::sync::Mutex;

use crate::controllers::ControllerRef;
use crate::events::{Bus, Event, EventKind};

/// Holder of the currently enabled controller.
pub(crate) struct ActivationSlot {
    enabled: Mutex<Option<ControllerRef>>,
    bus: Bus,
}

impl ActivationSlot {
    pub fn new(bus: Bus) -> Self {
        Self {
            enabled: Mutex::new(None),
            bus,
        }
    }

    /// Transfers enablement to `candidate`.
    ///
    /// No-op when `candidate` already occupies the slot (pointer equality).
    pub fn promote(&self, candidate: &ControllerRef) {
        let mut slot = self.enabled.lock().expect("activation slot lock poisoned");

        if let Some(current) = slot.as_ref() {
            if ControllerRef::ptr_eq(current, candidate) {
                return;
            }
            current.fire_disabled();
            self.bus.publish(
                Event::new(EventKind::ControllerDisabled)
                    .with_application(current.application_id())
                    .with_controller(current.name()),
            );
        }

        *slot = Some(candidate.clone());
        candidate.fire_enabled();
        self.bus.publish(
            Event::new(EventKind::ControllerEnabled)
                .with_application(candidate.application_id())
                .with_controller(candidate.name()),
        );
    }

    /// The currently enabled instance, if any controller was ever activated.
    pub fn current(&self) -> Option<ControllerRef> {
        self.enabled
            .lock()
            .expect("activation slot lock poisoned")
            .clone()
    }
}
