//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [registered] app="editor" controller="MainController"
//! [loaded] app="editor" controller="MainController"
//! [enabled] app="editor" controller="MainController"
//! [disabled] app="editor" controller="PageController"
//! [action] app="editor" controller="MainController" action="home"
//! [action-failed] controller="MainController" action="home" reason="boom"
//! [fault] reason="import_failed"
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use — implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Constructs a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ControllerRegistered => {
                println!(
                    "[registered] app={:?} controller={:?}",
                    e.application, e.controller
                );
            }
            EventKind::ControllerLoaded => {
                println!(
                    "[loaded] app={:?} controller={:?}",
                    e.application, e.controller
                );
            }
            EventKind::ControllerEnabled => {
                println!(
                    "[enabled] app={:?} controller={:?}",
                    e.application, e.controller
                );
            }
            EventKind::ControllerDisabled => {
                println!(
                    "[disabled] app={:?} controller={:?}",
                    e.application, e.controller
                );
            }
            EventKind::ActionInvoked => {
                println!(
                    "[action] app={:?} controller={:?} action={:?}",
                    e.application, e.controller, e.action
                );
            }
            EventKind::ActionFailed => {
                println!(
                    "[action-failed] controller={:?} action={:?} reason={:?}",
                    e.controller, e.action, e.reason
                );
            }
            EventKind::FaultRaised => {
                println!("[fault] reason={:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panic] subscriber={:?}", e.controller);
            }
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.controller, e.reason
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
