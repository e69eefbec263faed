//! Application container contracts.
//!
//! Controllers are always attached to an owning application. The container
//! that knows which applications exist lives outside this crate; the manager
//! only needs two seams:
//!
//! - [`Application`] — the handle a controller keeps to its owning
//!   application instance;
//! - [`ApplicationContainer`] — lookup of that handle by declared name.
//!
//! Construction of a controller fails with
//! [`ControllerError::ApplicationNotRegistered`](crate::ControllerError::ApplicationNotRegistered)
//! when the container misses, so a controller never exists detached from a
//! live application.

use std::sync::Arc;

/// Handle to a running application instance.
///
/// Implementations typically wrap whatever object represents the started
/// application in the host program; the runtime only ever asks for its name.
pub trait Application: Send + Sync + 'static {
    /// Stable application name, matching the id controllers register under.
    fn name(&self) -> &str;
}

/// Shared application handle.
pub type AppRef = Arc<dyn Application>;

/// Resolves application handles by name.
pub trait ApplicationContainer: Send + Sync + 'static {
    /// Returns the application registered under `app_name`, if any.
    fn by_name(&self, app_name: &str) -> Option<AppRef>;
}
