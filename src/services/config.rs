//! # Raw service entry from the configuration source.
//!
//! [`ServiceConfig`] is the unvalidated shape handed to
//! [`Orchestrator::reload`](crate::Orchestrator::reload) by whatever owns
//! persistent configuration (a store, a UI, a file loader — all outside this
//! crate). Validation turns it into a
//! [`ValidatedService`](crate::ValidatedService) or a
//! [`DeadLetterQueueItem`](crate::DeadLetterQueueItem).

use std::path::PathBuf;

use crate::services::key::ServiceKey;

/// Raw, unvalidated description of one service.
///
/// Dependencies are referenced by `(name, version)` pairs; they are resolved
/// into [`ServiceKey`]s during validation.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Service name.
    pub name: String,
    /// Service version.
    pub version: String,
    /// Path to the program image the process primitive should run.
    pub program: PathBuf,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Optional working directory for the process.
    pub workspace: Option<PathBuf>,
    /// Command-line arguments.
    pub args: Vec<String>,
    /// Declared dependencies as `(name, version)` pairs.
    pub dependencies: Vec<(String, String)>,
}

impl ServiceConfig {
    /// Creates a minimal config with no description, workspace, args, or deps.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        program: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            program: program.into(),
            description: None,
            workspace: None,
            args: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Adds a dependency on `(name, version)`.
    pub fn with_dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies.push((name.into(), version.into()));
        self
    }

    /// Replaces the argument list.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the working directory.
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The identity this entry claims.
    pub fn key(&self) -> ServiceKey {
        ServiceKey::new(self.name.as_str(), self.version.as_str())
    }
}
