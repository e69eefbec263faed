//! Controller name resolution.
//!
//! Raw controller names follow the `{Name}Controller` declaration style.
//! Two pure functions derive the identifiers the rest of the runtime keys on:
//!
//! - [`canonicalize`] maps `"MainController"` to the canonical registry key
//!   `"main.controller"`;
//! - [`short_name`] maps `"MainController"` to the terse alias `"main"`.
//!
//! Both fail with [`ControllerError::InvalidControllerName`] when the raw
//! name does not carry the `"Controller"` marker.

use crate::error::ControllerError;

/// Suffix appended to every canonical controller key.
const CANONICAL_SUFFIX: &str = ".controller";

/// Marker substring every raw controller name must contain.
const NAME_MARKER: &str = "Controller";

/// Computes the canonical key for a raw controller name.
///
/// The prefix before the first `"Controller"` occurrence is lowercased and
/// `".controller"` is appended. An empty prefix is accepted: `"Controller"`
/// alone canonicalizes to `".controller"`.
///
/// # Example
/// ```
/// use ctrlvisor::names::canonicalize;
///
/// assert_eq!(canonicalize("MainController").unwrap(), "main.controller");
/// assert!(canonicalize("main").is_err());
/// ```
pub fn canonicalize(raw: &str) -> Result<String, ControllerError> {
    match raw.find(NAME_MARKER) {
        Some(pos) => Ok(format!("{}{}", raw[..pos].to_lowercase(), CANONICAL_SUFFIX)),
        None => Err(ControllerError::InvalidControllerName { name: raw.to_string() }),
    }
}

/// Computes the lowercase short alias for a raw controller name.
///
/// Derived by splitting the canonical form on `'.'` and taking the prefix.
///
/// # Example
/// ```
/// use ctrlvisor::names::short_name;
///
/// assert_eq!(short_name("MainController").unwrap(), "main");
/// ```
pub fn short_name(raw: &str) -> Result<String, ControllerError> {
    let canonical = canonicalize(raw)?;
    let prefix = canonical.split('.').next().unwrap_or_default();
    Ok(prefix.to_string())
}

/// Builds the fully qualified name used for instance-cache lookups and
/// module import requests: `"{application}.{canonical}"`.
pub(crate) fn cache_key(application: &str, canonical: &str) -> String {
    format!("{application}.{canonical}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_main_controller() {
        assert_eq!(canonicalize("MainController").unwrap(), "main.controller");
    }

    #[test]
    fn test_canonicalize_strips_from_first_marker() {
        assert_eq!(
            canonicalize("PageControllerController").unwrap(),
            "page.controller"
        );
    }

    #[test]
    fn test_canonicalize_empty_prefix_is_accepted() {
        assert_eq!(canonicalize("Controller").unwrap(), ".controller");
    }

    #[test]
    fn test_canonicalize_rejects_missing_marker() {
        let err = canonicalize("main").unwrap_err();
        assert_eq!(err.as_label(), "invalid_controller_name");

        // Case matters: the marker is the literal "Controller".
        assert!(canonicalize("maincontroller").is_err());
    }

    #[test]
    fn test_short_name_main_controller() {
        assert_eq!(short_name("MainController").unwrap(), "main");
        assert_eq!(short_name("BreadcrumbController").unwrap(), "breadcrumb");
    }

    #[test]
    fn test_cache_key_layout() {
        let canonical = canonicalize("MainController").unwrap();
        assert_eq!(cache_key("editor", &canonical), "editor.main.controller");
    }
}
