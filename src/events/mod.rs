//! Lifecycle events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the manager, the
//! activation slot, and controller instances.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ControllerManager` (registration, loads, faults),
//!   `ActivationSlot` (enable/disable transitions), `Controller` (action
//!   dispatch), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the manager's subscriber listener (fans out to
//!   `SubscriberSet`) and any receiver obtained from
//!   [`ControllerManager::subscribe`](crate::ControllerManager::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
