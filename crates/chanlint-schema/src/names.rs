//! # Name Registry
//!
//! Package, dependency and previous names share one case-insensitive
//! namespace across a repository and all of its includes. The registry
//! remembers where each name was first seen so a collision can cite both
//! locations.

use std::collections::HashMap;
use std::fmt;

use chanlint_core::Location;

/// Where a name was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// The name as written.
    pub name: String,
    /// Identity of the declaring document.
    pub document: String,
    /// Pointer to the declaring entry.
    pub location: Location,
}

impl Occurrence {
    /// Build an occurrence.
    pub fn new(name: impl Into<String>, document: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
            location,
        }
    }
}

impl fmt::Display for Occurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.document, self.location)
    }
}

#[derive(Debug, Clone)]
struct PreviousName {
    at: Occurrence,
    owner: String,
}

/// Case-insensitive registry of every name declared in a repository set.
#[derive(Debug, Default)]
pub struct NameRegistry {
    packages: HashMap<String, Occurrence>,
    dependencies: HashMap<String, Occurrence>,
    previous: HashMap<String, PreviousName>,
}

impl NameRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered package names.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Register a package name. On collision, returns the issue message and
    /// leaves the first declaration in place.
    pub fn register_package(&mut self, at: Occurrence) -> Result<(), String> {
        let key = at.name.to_lowercase();
        if let Some(first) = self.packages.get(&key) {
            return Err(format!(
                "duplicate package name \"{}\", first defined as \"{}\" at {}",
                at.name, first.name, first
            ));
        }
        // Renames are case-sensitive: "foo" may be renamed to "Foo".
        if let Some(prev) = self.previous.get(&key).filter(|p| p.at.name == at.name) {
            return Err(format!(
                "package name \"{}\" is also a previous name of \"{}\" at {}",
                at.name, prev.owner, prev.at
            ));
        }
        if let Some(dep) = self.dependencies.get(&key) {
            return Err(format!(
                "package name \"{}\" collides with dependency \"{}\" at {}",
                at.name, dep.name, dep
            ));
        }
        self.packages.insert(key, at);
        Ok(())
    }

    /// Register a dependency name.
    pub fn register_dependency(&mut self, at: Occurrence) -> Result<(), String> {
        let key = at.name.to_lowercase();
        if let Some(first) = self.dependencies.get(&key) {
            return Err(format!(
                "duplicate dependency name \"{}\", first defined as \"{}\" at {}",
                at.name, first.name, first
            ));
        }
        if let Some(pkg) = self.packages.get(&key) {
            return Err(format!(
                "dependency name \"{}\" collides with package \"{}\" at {}",
                at.name, pkg.name, pkg
            ));
        }
        self.dependencies.insert(key, at);
        Ok(())
    }

    /// Register one entry of a package's `previous_names`.
    pub fn register_previous_name(&mut self, at: Occurrence, owner: &str) -> Result<(), String> {
        let key = at.name.to_lowercase();
        if let Some(first) = self.previous.get(&key) {
            return Err(format!(
                "duplicate previous name \"{}\", already listed for \"{}\" at {}",
                at.name, first.owner, first.at
            ));
        }
        if let Some(pkg) = self.packages.get(&key) {
            return Err(format!(
                "previous name \"{}\" is the name of package \"{}\" at {}",
                at.name, pkg.name, pkg
            ));
        }
        self.previous.insert(
            key,
            PreviousName {
                at,
                owner: owner.to_string(),
            },
        );
        Ok(())
    }
}
