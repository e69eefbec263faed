//! # ctrlvisor
//!
//! **ctrlvisor** is a controller lifecycle library for Rust.
//!
//! It governs in-process UI controllers: registration of per-application
//! controller types, lazy instantiation behind asynchronous dependency
//! import, and mutual exclusion of the single "enabled" controller with
//! deterministic enable/disable transitions.
//!
//! ## Architecture
//! ```text
//!     register("MainController", def)      load("editor", "MainController")
//!                │                                        │
//!                ▼                                        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ControllerManager (context object)                               │
//! │  - Registry (per-app definition buckets + short-name aliases)     │
//! │  - InstanceCache (one live instance per key, unbounded)           │
//! │  - ActivationSlot (the single enabled controller)                 │
//! │  - FaultLog (append-only record of every raised fault)            │
//! │  - Bus (broadcast lifecycle events)                               │
//! └──────┬───────────────────────┬─────────────────────────┬──────────┘
//!        │ fetch modules         │ resolve owning app      │ events
//!        ▼                       ▼                         ▼
//! ┌──────────────┐    ┌──────────────────────┐    ┌──────────────────┐
//! │   Importer   │    │ ApplicationContainer │    │  SubscriberSet   │
//! │ (injected)   │    │      (injected)      │    │ (worker per sub) │
//! └──────────────┘    └──────────────────────┘    └──────────────────┘
//! ```
//!
//! ### Load lifecycle
//! ```text
//! load(app, name)
//!   ├─ cache hit    ─► promote ─► done
//!   ├─ registry hit ─► construct ─► handle_import ─► on_init ─► promote ─► cache
//!   └─ miss         ─► Importer::require([fully qualified name])
//!          ├─ Ok    ─► retry registry
//!          └─ Err   ─► ImportFailed (nothing cached; caller may retry)
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                         |
//! |--------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Registration**   | Closed action maps, import lists, config values, hooks.       | [`ControllerDefinition`], [`Behavior`]     |
//! | **Loading**        | Lazy construction, single-flight collapse, alias resolution.  | [`ControllerManager`]                      |
//! | **Activation**     | One enabled controller; strict enable/disable alternation.    | [`ControllerManager::enabled_controller`]  |
//! | **Dispatch**       | Keyed action invocation with failure isolation.               | [`Controller::invoke`]                     |
//! | **Errors**         | Named, coded faults; append-only fault history.               | [`ControllerError`], [`FaultLog`]          |
//! | **Observability**  | Broadcast lifecycle events, subscriber fan-out.               | [`Event`], [`Subscribe`]                   |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use ctrlvisor::{
//!     AppRef, Application, ApplicationContainer, ControllerDefinition,
//!     ControllerManager, ManagerConfig,
//! };
//!
//! struct EditorApp;
//!
//! impl Application for EditorApp {
//!     fn name(&self) -> &str { "editor" }
//! }
//!
//! struct Apps;
//!
//! impl ApplicationContainer for Apps {
//!     fn by_name(&self, app_name: &str) -> Option<AppRef> {
//!         (app_name == "editor").then(|| Arc::new(EditorApp) as AppRef)
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = ControllerManager::builder(ManagerConfig::default())
//!         .applications(Arc::new(Apps))
//!         .build();
//!
//!     manager.register(
//!         "MainController",
//!         ControllerDefinition::builder()
//!             .application("editor")
//!             .action("home", |ctrl, _params| {
//!                 ctrl.set_state(1);
//!                 Ok(())
//!             })
//!             .build(),
//!     )?;
//!
//!     let main = manager.load("editor", "MainController").await?;
//!     main.invoke("home", &[])?;
//!
//!     assert!(main.is_enabled());
//!     assert_eq!(main.state(), 1);
//!     Ok(())
//! }
//! ```

mod apps;
mod config;
mod controllers;
mod core;
mod error;
mod events;
mod imports;
mod subscribers;

pub mod names;

// ---- Public re-exports ----

pub use apps::{AppRef, Application, ApplicationContainer};
pub use config::ManagerConfig;
pub use controllers::{
    ActionFn, ActionParams, Behavior, Controller, ControllerDefinition, ControllerRef,
    DefinitionBuilder,
};
pub use crate::core::{ControllerManager, Fault, FaultLog, ManagerBuilder};
pub use error::{ControllerError, ImportPhase};
pub use events::{Bus, Event, EventKind};
pub use imports::Importer;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
