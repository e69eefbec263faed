//! Controller data model and lifecycle objects.
//!
//! A controller is described twice:
//! - [`ControllerDefinition`] — the immutable data registered against an
//!   application: action handler map, import list, configuration value, and
//!   an optional [`Behavior`] override for lifecycle hooks;
//! - [`Controller`] — the live instance the manager constructs lazily from a
//!   definition, carrying mutable `state`/`enabled` flags and the handle to
//!   its owning application.
//!
//! Definitions are composed into instances by the manager's load path; the
//! factory seam is [`Controller::new`] (crate-private).

mod controller;
mod definition;

pub use controller::{Controller, ControllerRef};
pub use definition::{ActionFn, ActionParams, Behavior, ControllerDefinition, DefinitionBuilder};
