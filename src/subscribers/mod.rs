//! # Event subscribers for the controller runtime.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver lifecycle events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Manager / ActivationSlot ── publish(Event) ──► Bus
//!                                                   │
//!                                                   ├──► external receivers
//!                                                   │    (ControllerManager::subscribe)
//!                                                   │
//!                                                   └──► fan-out listener ──► SubscriberSet
//!                                                            │
//!                                                       ┌────┴─────┬─────────┐
//!                                                       ▼          ▼         ▼
//!                                                    LogWriter   Metrics   Custom
//! ```
//!
//! ## Implementing custom subscribers
//! ```rust
//! use async_trait::async_trait;
//! use ctrlvisor::{Event, EventKind, Subscribe};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Subscribe for Metrics {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::FaultRaised) {
//!             // increment a failure counter, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "metrics" }
//! }
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
