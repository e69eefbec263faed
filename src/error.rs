//! Error types raised by the controller lifecycle runtime.
//!
//! The whole taxonomy lives in one enum, [`ControllerError`]. Every variant
//! corresponds to a named fault condition of the manager: registration and
//! name-resolution failures raise before the first suspension point, while
//! import-phase failures surface through the future returned by a load call.
//!
//! All variants are `Clone` (fields are plain strings) so a single failure
//! can be fanned out to every caller collapsed into one in-flight load and
//! recorded in the [`FaultLog`](crate::FaultLog) at the same time.
//!
//! The helper methods (`as_label`, `as_message`) provide stable snake_case
//! labels and human-readable messages for logs/metrics.

use thiserror::Error;

/// Phase of dependency resolution in which an import failed.
///
/// A load request may import in two distinct places: fetching the controller
/// module itself when it was never registered ([`ImportPhase::ModuleFetch`]),
/// and resolving the import list a constructed instance declares
/// ([`ImportPhase::HandleImport`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// The controller module itself was being fetched by fully qualified name.
    ModuleFetch,
    /// A constructed instance was resolving its declared import list.
    HandleImport,
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportPhase::ModuleFetch => write!(f, "module_fetch"),
            ImportPhase::HandleImport => write!(f, "handle_import"),
        }
    }
}

/// # Errors produced by the controller lifecycle runtime.
///
/// Each variant is a named, coded fault; none is ever downgraded to a
/// warning and none triggers an automatic retry. Retrying is always
/// caller-initiated by repeating the same call.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ControllerError {
    /// No handler registered under the requested action key.
    #[error("action '{action}' does not exist in '{controller}' controller")]
    ActionNotFound {
        /// The action key that was looked up.
        action: String,
        /// Raw name of the controller that was asked to run it.
        controller: String,
    },

    /// A registered action handler returned an error or panicked.
    #[error("error while executing [{action}] in '{controller}' controller: {cause}")]
    ActionExecutionFailed {
        /// The action key that was running.
        action: String,
        /// Raw name of the controller.
        controller: String,
        /// Message of the original failure.
        cause: String,
    },

    /// A raw controller name did not contain the `"Controller"` marker.
    #[error("controller name '{name}' does not respect {{name}}Controller style declaration")]
    InvalidControllerName {
        /// The offending raw name.
        name: String,
    },

    /// A definition was registered without an application id.
    #[error("controller '{controller}' should be attached to an application")]
    MissingApplication {
        /// Raw name the definition was registered under.
        controller: String,
    },

    /// A load call received an empty application id.
    #[error("application id has to be a non-empty string")]
    InvalidApplication,

    /// A short-name load call received an empty short name.
    #[error("short controller name has to be a non-empty string")]
    InvalidShortName,

    /// No controller is registered for the application.
    #[error("no controller found for application '{application}'")]
    ControllerNotFound {
        /// The application id that was queried.
        application: String,
    },

    /// The short-name alias table has no entry for the pair.
    #[error("no controller registered under short name '{short}' for application '{application}'")]
    AliasNotFound {
        /// The application id.
        application: String,
        /// The short name that missed.
        short: String,
    },

    /// The dependency importer rejected a resolution request.
    #[error("import failed during {phase}: {reason}")]
    ImportFailed {
        /// Which resolution phase failed.
        phase: ImportPhase,
        /// Reason reported by the importer.
        reason: String,
    },

    /// The application container has no instance under the declared name.
    #[error("application '{application}' is not registered in the container")]
    ApplicationNotRegistered {
        /// The application name the definition declared.
        application: String,
    },
}

impl ControllerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use ctrlvisor::ControllerError;
    ///
    /// let err = ControllerError::InvalidApplication;
    /// assert_eq!(err.as_label(), "invalid_application");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::ActionNotFound { .. } => "action_not_found",
            ControllerError::ActionExecutionFailed { .. } => "action_execution_failed",
            ControllerError::InvalidControllerName { .. } => "invalid_controller_name",
            ControllerError::MissingApplication { .. } => "missing_application",
            ControllerError::InvalidApplication => "invalid_application",
            ControllerError::InvalidShortName => "invalid_short_name",
            ControllerError::ControllerNotFound { .. } => "controller_not_found",
            ControllerError::AliasNotFound { .. } => "alias_not_found",
            ControllerError::ImportFailed { .. } => "import_failed",
            ControllerError::ApplicationNotRegistered { .. } => "application_not_registered",
        }
    }

    /// Returns a human-readable message with details about the fault.
    pub fn as_message(&self) -> String {
        self.to_string()
    }

    /// Indicates whether repeating the same call can succeed.
    ///
    /// Import failures are the only faults with a transient cause; a later
    /// retry reconstructs the instance from scratch (nothing was cached).
    ///
    /// # Example
    /// ```
    /// use ctrlvisor::{ControllerError, ImportPhase};
    ///
    /// let err = ControllerError::ImportFailed {
    ///     phase: ImportPhase::ModuleFetch,
    ///     reason: "network".into(),
    /// };
    /// assert!(err.is_retryable());
    /// assert!(!ControllerError::InvalidApplication.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, ControllerError::ImportFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = ControllerError::ActionNotFound {
            action: "home".into(),
            controller: "MainController".into(),
        };
        assert_eq!(err.as_label(), "action_not_found");

        let err = ControllerError::ImportFailed {
            phase: ImportPhase::HandleImport,
            reason: "missing module".into(),
        };
        assert_eq!(err.as_label(), "import_failed");
        assert!(err.as_message().contains("handle_import"));
    }

    #[test]
    fn test_only_imports_are_retryable() {
        let retryable = ControllerError::ImportFailed {
            phase: ImportPhase::ModuleFetch,
            reason: "boom".into(),
        };
        assert!(retryable.is_retryable());

        let fatal = ControllerError::AliasNotFound {
            application: "editor".into(),
            short: "main".into(),
        };
        assert!(!fatal.is_retryable());
    }
}
