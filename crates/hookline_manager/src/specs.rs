//! Specification namespaces.
//!
//! A host declares its hooks by building a [`SpecNamespace`] and handing it
//! to [`PluginManager::add_hookspecs`](crate::manager::PluginManager::add_hookspecs).

use hookline_hooks::args::ArgNames;
use hookline_hooks::opts::HookspecOpts;
use indexmap::IndexMap;

/// One declared hook inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDef {
    /// Hook name.
    pub name: String,
    /// Declared parameter names.
    pub argnames: ArgNames,
    /// Declared options.
    pub opts: HookspecOpts,
    /// Project tag. `None` belongs to every project.
    pub project: Option<String>,
}

/// A named group of hook specifications.
///
/// Declaring the same hook name twice keeps the last declaration.
///
/// ```
/// use hookline_hooks::prelude::*;
/// use hookline_manager::specs::SpecNamespace;
///
/// let specs = SpecNamespace::new("StorageSpecs")
///     .hook("on_save", ArgNames::new(["path"]), HookspecOpts::new())
///     .hook("resolve_path", ArgNames::new(["name"]), HookspecOpts::new().firstresult());
/// assert_eq!(specs.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecNamespace {
    name: String,
    defs: IndexMap<String, SpecDef>,
}

impl SpecNamespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defs: IndexMap::new(),
        }
    }

    /// Declares a hook for every project.
    #[must_use]
    pub fn hook(self, name: impl Into<String>, argnames: ArgNames, opts: HookspecOpts) -> Self {
        self.push(SpecDef {
            name: name.into(),
            argnames,
            opts,
            project: None,
        })
    }

    /// Declares a hook for `project` only.
    #[must_use]
    pub fn hook_for(
        self,
        project: impl Into<String>,
        name: impl Into<String>,
        argnames: ArgNames,
        opts: HookspecOpts,
    ) -> Self {
        self.push(SpecDef {
            name: name.into(),
            argnames,
            opts,
            project: Some(project.into()),
        })
    }

    /// Adds a prepared declaration.
    #[must_use]
    pub fn push(mut self, def: SpecDef) -> Self {
        self.defs.insert(def.name.clone(), def);
        self
    }

    /// Namespace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declarations in order.
    pub fn defs(&self) -> impl Iterator<Item = &SpecDef> {
        self.defs.values()
    }

    /// Declarations visible to `project`, in order.
    pub fn defs_for<'a>(&'a self, project: &'a str) -> impl Iterator<Item = &'a SpecDef> {
        self.defs
            .values()
            .filter(move |def| def.project.as_deref().is_none_or(|tag| tag == project))
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// True if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defs_for_filters_foreign_projects() {
        let specs = SpecNamespace::new("Specs")
            .hook("shared", ArgNames::none(), HookspecOpts::new())
            .hook_for("app", "ours", ArgNames::none(), HookspecOpts::new())
            .hook_for("other", "theirs", ArgNames::none(), HookspecOpts::new());

        let names: Vec<&str> = specs.defs_for("app").map(|def| def.name.as_str()).collect();
        assert_eq!(names, vec!["shared", "ours"]);
        assert_eq!(specs.defs().count(), 3);
    }

    #[test]
    fn redeclaring_replaces() {
        let specs = SpecNamespace::new("Specs")
            .hook("h", ArgNames::new(["a"]), HookspecOpts::new())
            .hook("h", ArgNames::new(["b"]), HookspecOpts::new());
        assert_eq!(specs.len(), 1);
        assert_eq!(specs.defs().next().map(|def| def.argnames.clone()), Some(ArgNames::new(["b"])));
    }
}
