//! Entry-point discovery.
//!
//! Distributions advertise plugins as named entry points inside a group.
//! An [`EntryPointSource`] enumerates them; the manager loads the ones it
//! wants through [`PluginManager::load_entrypoints`](crate::manager::PluginManager::load_entrypoints).

use core::fmt;
use std::sync::Arc;

use hookline_hooks::error::BoxError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::plugin::Plugin;

/// Metadata of the distribution that provided a plugin.
///
/// ```
/// use hookline_manager::entrypoints::DistInfo;
///
/// let dist: DistInfo = serde_json::from_str(
///     r#"{"project_name": "storage-extras", "version": "1.4.0", "metadata": {"license": "MIT"}}"#,
/// ).unwrap();
/// assert_eq!(dist.get("license"), Some("MIT"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistInfo {
    /// Distribution name.
    pub project_name: String,
    /// Distribution version.
    pub version: String,
    /// Any further metadata fields.
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl DistInfo {
    /// Creates distribution info without extra metadata.
    #[must_use]
    pub fn new(project_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            version: version.into(),
            metadata: IndexMap::new(),
        }
    }

    /// Adds a metadata field.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Looks up a metadata field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Constructs the plugin behind an entry point.
pub type PluginLoader = Arc<dyn Fn() -> Result<Arc<dyn Plugin>, BoxError> + Send + Sync>;

/// A named plugin advertised by a distribution.
#[derive(Clone)]
pub struct EntryPoint {
    /// Providing distribution.
    pub dist: DistInfo,
    /// Group the entry point belongs to.
    pub group: String,
    /// Entry-point name, used as the plugin's registration name.
    pub name: String,
    loader: PluginLoader,
}

impl EntryPoint {
    /// Creates an entry point whose plugin is built by `loader`.
    pub fn new<F>(dist: DistInfo, group: impl Into<String>, name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Plugin>, BoxError> + Send + Sync + 'static,
    {
        Self {
            dist,
            group: group.into(),
            name: name.into(),
            loader: Arc::new(loader),
        }
    }

    /// Builds the plugin.
    ///
    /// # Errors
    ///
    /// Returns whatever the loader fails with.
    pub fn load(&self) -> Result<Arc<dyn Plugin>, BoxError> {
        (self.loader)()
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("dist", &self.dist)
            .field("group", &self.group)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Enumerates available entry points.
pub trait EntryPointSource {
    /// All entry points, across groups and distributions.
    fn entry_points(&self) -> Vec<EntryPoint>;
}

/// An in-memory [`EntryPointSource`].
#[derive(Debug, Clone, Default)]
pub struct StaticEntryPoints {
    entries: Vec<EntryPoint>,
}

impl StaticEntryPoints {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry point.
    #[must_use]
    pub fn with(mut self, entry: EntryPoint) -> Self {
        self.entries.push(entry);
        self
    }

    /// Adds an entry point in place.
    pub fn push(&mut self, entry: EntryPoint) {
        self.entries.push(entry);
    }
}

impl EntryPointSource for StaticEntryPoints {
    fn entry_points(&self) -> Vec<EntryPoint> {
        self.entries.clone()
    }
}
