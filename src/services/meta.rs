//! # Immutable service descriptor.
//!
//! [`ServiceMeta`] is the validated, runtime-facing shape of a service entry.
//! It is created once during validation and never mutated afterwards; groups
//! hand out clones freely (all string fields are `Arc`-interned).

use std::path::PathBuf;
use std::sync::Arc;

use crate::services::config::ServiceConfig;
use crate::services::key::ServiceKey;

/// Immutable static descriptor of one validated service.
///
/// Carries everything the process primitive needs to start the service.
/// Dependency information lives in
/// [`ValidatedService`](crate::ValidatedService), not here.
#[derive(Clone, Debug)]
pub struct ServiceMeta {
    /// Service name.
    pub name: Arc<str>,
    /// Service version.
    pub version: Arc<str>,
    /// Program image path.
    pub program: PathBuf,
    /// Optional human-readable description.
    pub description: Option<Arc<str>>,
    /// Optional working directory.
    pub workspace: Option<PathBuf>,
    /// Command-line arguments.
    pub args: Vec<Arc<str>>,
}

impl ServiceMeta {
    /// The identity of this service.
    pub fn key(&self) -> ServiceKey {
        ServiceKey::new(Arc::clone(&self.name), Arc::clone(&self.version))
    }
}

impl From<&ServiceConfig> for ServiceMeta {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            name: config.name.as_str().into(),
            version: config.version.as_str().into(),
            program: config.program.clone(),
            description: config.description.as_deref().map(Into::into),
            workspace: config.workspace.clone(),
            args: config.args.iter().map(|a| a.as_str().into()).collect(),
        }
    }
}
