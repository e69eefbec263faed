//! Dependency importer contract.
//!
//! Module resolution is external to this crate. The manager talks to it
//! through [`Importer`], which covers the two facets the lifecycle needs:
//!
//! - [`Importer::require`] — asynchronous resolution of a list of module
//!   names; resolves with no payload, fails with an implementation-defined
//!   reason. Used both to fetch an unregistered controller module by its
//!   fully qualified name and to resolve the import list a constructed
//!   instance declares.
//! - [`Importer::lookup`] — synchronous fetch of an already-resolved
//!   dependency by name. This is the capability handed to init hooks.
//!
//! There is no cancellation or timeout primitive here: a `require` call that
//! never completes leaves the instance un-cached and un-enabled.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

/// Resolves named module dependencies.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use ctrlvisor::Importer;
///
/// struct Bundled;
///
/// #[async_trait]
/// impl Importer for Bundled {
///     async fn require(&self, names: &[String]) -> anyhow::Result<()> {
///         match names.iter().find(|n| !n.starts_with("tb.")) {
///             Some(missing) => Err(anyhow::anyhow!("unknown module '{missing}'")),
///             None => Ok(()),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Importer: Send + Sync + 'static {
    /// Resolves every listed dependency.
    ///
    /// Resolution carries no payload; side effects (registering the fetched
    /// controller definition, wiring services) happen inside the importer.
    async fn require(&self, names: &[String]) -> anyhow::Result<()>;

    /// Fetches an already-resolved dependency by name.
    ///
    /// Handed to controller init hooks so freshly constructed instances can
    /// pull further collaborators. The default resolves nothing.
    fn lookup(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        let _ = name;
        None
    }
}
