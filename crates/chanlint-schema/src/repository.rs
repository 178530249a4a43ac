//! # Repository Rules
//!
//! Entry-level rules for repository documents. The envelope schema has
//! already checked the top-level shape; this module tolerates a broken shape
//! and simply skips what it cannot walk.
//!
//! Names are registered in a [`RepositoryScope`] shared by a repository and
//! its includes, so a duplicate in `b.json` is reported against the first
//! declaration in `a.json`.

use serde_json::{Map, Value};

use chanlint_core::{Location, SCHEMA_VERSION};

use crate::checker::Checker;
use crate::keys::{check_string_items, check_table, KeyTable, ValueType};
use crate::names::{NameRegistry, Occurrence};
use crate::patterns::{self, Scheme};
use crate::release::{check_release, ReleaseRules};

const TOP_LEVEL_KEYS: &[&str] = &[
    "$schema",
    "schema_version",
    "packages",
    "dependencies",
    "libraries",
    "includes",
];

const PACKAGE_KEYS: KeyTable = &[
    ("name", &[ValueType::Str]),
    ("details", &[ValueType::Str]),
    ("description", &[ValueType::Str]),
    ("releases", &[ValueType::Array]),
    ("homepage", &[ValueType::Str]),
    ("author", &[ValueType::Str, ValueType::Array]),
    ("readme", &[ValueType::Str]),
    ("issues", &[ValueType::Str]),
    ("donate", &[ValueType::Str, ValueType::Null]),
    ("buy", &[ValueType::Str]),
    ("previous_names", &[ValueType::Array]),
    ("labels", &[ValueType::Array]),
];

const DEPENDENCY_KEYS: KeyTable = &[
    ("name", &[ValueType::Str]),
    ("description", &[ValueType::Str]),
    ("releases", &[ValueType::Array]),
    ("issues", &[ValueType::Str]),
    ("load_order", &[ValueType::Str]),
    ("author", &[ValueType::Str]),
];

const PACKAGE_URL_KEYS: &[&str] = &["homepage", "readme", "issues", "donate", "buy"];
const PACKAGE_REQUIRED_WITHOUT_DETAILS: &[&str] = &["name", "homepage", "author", "releases"];
const DEPENDENCY_REQUIRED: &[&str] = &[
    "name",
    "author",
    "releases",
    "issues",
    "description",
    "load_order",
];

/// Where a repository document comes from, which decides the release rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The locally checked-out main repository and its includes.
    Main,
    /// A third-party repository referenced from the channel.
    Remote,
}

/// Validation state shared by a repository and all of its includes.
#[derive(Debug)]
pub struct RepositoryScope {
    origin: Origin,
    names: NameRegistry,
}

impl RepositoryScope {
    /// Fresh scope with an empty name registry.
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            names: NameRegistry::new(),
        }
    }

    /// Origin of the repository set.
    pub fn origin(&self) -> Origin {
        self.origin
    }

    /// Names registered so far.
    pub fn names(&self) -> &NameRegistry {
        &self.names
    }
}

pub(crate) fn check_repository(
    ck: &mut Checker<'_>,
    scope: &mut RepositoryScope,
    base: &Location,
    value: &Value,
    is_include: bool,
) {
    let Some(obj) = value.as_object() else {
        return;
    };

    for key in obj.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            ck.warning(&base.key(key), format!("unexpected key \"{key}\""));
        }
    }

    if let Some(Value::String(version)) = obj.get("schema_version") {
        if version != SCHEMA_VERSION {
            ck.error(
                &base.key("schema_version"),
                format!("unrecognized schema version \"{version}\", expected \"{SCHEMA_VERSION}\""),
            );
        }
    }

    let has_content = ["packages", "dependencies", "libraries", "includes"]
        .iter()
        .any(|k| obj.contains_key(*k));
    if !has_content {
        ck.error(
            base,
            "repository must contain at least one of \"packages\", \"dependencies\" or \"includes\"",
        );
    }

    let packages = entries(obj, "packages");
    let dependencies: Vec<(&str, usize, &Map<String, Value>)> = ["dependencies", "libraries"]
        .into_iter()
        .flat_map(|key| entries(obj, key))
        .collect();

    // Names first, so uniqueness findings do not depend on which entries
    // happen to have other problems.
    for (key, i, pkg) in &packages {
        register_package(ck, scope, &base.key(key).index(*i), pkg);
    }
    for (key, i, dep) in &dependencies {
        register_dependency(ck, scope, &base.key(key).index(*i), dep);
    }

    let main = scope.origin == Origin::Main;
    for (key, i, pkg) in &packages {
        check_package(ck, &base.key(key).index(*i), pkg, main);
    }
    for (key, i, dep) in &dependencies {
        check_dependency(ck, &base.key(key).index(*i), dep, main);
    }

    if is_include && main {
        check_include_layout(ck, base, &packages, &dependencies);
    }
}

fn entries<'v>(obj: &'v Map<String, Value>, key: &'static str) -> Vec<(&'static str, usize, &'v Map<String, Value>)> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| v.as_object().map(|o| (key, i, o)))
                .collect()
        })
        .unwrap_or_default()
}

/// The name a package installs under: `name`, or the last path segment of
/// its `details` URL (`https://github.com/o/Repo/tree/st3` gives `st3`).
pub fn package_name(pkg: &Map<String, Value>) -> Option<String> {
    if let Some(name) = pkg.get("name").and_then(Value::as_str) {
        return Some(name.to_string());
    }
    let details = pkg.get("details").and_then(Value::as_str)?;
    let url = url::Url::parse(details).ok()?;
    let last = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    Some(last.to_string())
}

fn register_package(ck: &mut Checker<'_>, scope: &mut RepositoryScope, loc: &Location, pkg: &Map<String, Value>) {
    let Some(name) = package_name(pkg) else {
        return;
    };
    let document = ck.document();
    if let Err(message) = scope
        .names
        .register_package(Occurrence::new(name.as_str(), document, loc.clone()))
    {
        ck.error(loc, message);
    }

    let Some(Value::Array(previous)) = pkg.get("previous_names") else {
        return;
    };
    for (j, old) in previous.iter().enumerate() {
        let Some(old) = old.as_str() else {
            continue;
        };
        let at = loc.key("previous_names").index(j);
        if let Err(message) = scope
            .names
            .register_previous_name(Occurrence::new(old, document, at.clone()), &name)
        {
            ck.error(&at, message);
        }
    }
}

fn register_dependency(ck: &mut Checker<'_>, scope: &mut RepositoryScope, loc: &Location, dep: &Map<String, Value>) {
    let Some(name) = dep.get("name").and_then(Value::as_str) else {
        return;
    };
    if let Err(message) = scope
        .names
        .register_dependency(Occurrence::new(name, ck.document(), loc.clone()))
    {
        ck.error(loc, message);
    }
}

fn check_package(ck: &mut Checker<'_>, loc: &Location, pkg: &Map<String, Value>, main: bool) {
    let name = package_name(pkg);
    match &name {
        Some(name) => check_name(ck, loc, name, true),
        None if !pkg.contains_key("details") => {
            ck.error(loc, "package has neither \"name\" nor \"details\"");
        }
        None => {}
    }

    if !pkg.contains_key("details") {
        for key in PACKAGE_REQUIRED_WITHOUT_DETAILS {
            if !pkg.contains_key(*key) && !(*key == "name" && name.is_none()) {
                ck.error(loc, format!("\"{key}\" is required when \"details\" is absent"));
            }
        }
    }

    let rules = ReleaseRules {
        dependency: false,
        main_repository: main,
    };
    for (key, value) in check_table(ck, loc, pkg, PACKAGE_KEYS) {
        let here = loc.key(key);
        match (key, value) {
            ("details", Value::String(details)) => {
                if !patterns::is_details_url(details) {
                    ck.error(
                        &here,
                        format!(
                            "\"{details}\" is not a GitHub, GitLab or Bitbucket repository URL \
                             (or ends in .git)"
                        ),
                    );
                }
            }
            ("labels", Value::Array(items)) => check_labels(ck, &here, items),
            ("previous_names", Value::Array(items)) => {
                check_string_items(ck, &here, key, items);
            }
            ("author", Value::Array(items)) if items.is_empty() => {
                ck.error(&here, "\"author\" must not be an empty list");
            }
            ("releases", Value::Array(releases)) => check_releases(ck, &here, releases, rules),
            (key, Value::String(url)) if PACKAGE_URL_KEYS.contains(&key) => {
                if let Err(problem) = patterns::check_url(url, Scheme::Web) {
                    ck.error(&here, problem);
                }
            }
            _ => {}
        }
    }
}

fn check_dependency(ck: &mut Checker<'_>, loc: &Location, dep: &Map<String, Value>, main: bool) {
    if let Some(name) = dep.get("name").and_then(Value::as_str) {
        check_name(ck, loc, name, false);
    }
    for key in DEPENDENCY_REQUIRED {
        if !dep.contains_key(*key) {
            ck.error(loc, format!("dependency is missing required key \"{key}\""));
        }
    }

    let rules = ReleaseRules {
        dependency: true,
        main_repository: main,
    };
    for (key, value) in check_table(ck, loc, dep, DEPENDENCY_KEYS) {
        let here = loc.key(key);
        match (key, value) {
            ("issues", Value::String(url)) => {
                if let Err(problem) = patterns::check_url(url, Scheme::Web) {
                    ck.error(&here, problem);
                }
            }
            ("load_order", Value::String(order)) => {
                if !patterns::is_load_order(order) {
                    ck.error(&here, format!("\"load_order\" must be two digits, found \"{order}\""));
                }
            }
            ("releases", Value::Array(releases)) => check_releases(ck, &here, releases, rules),
            _ => {}
        }
    }
}

fn check_releases(ck: &mut Checker<'_>, here: &Location, releases: &[Value], rules: ReleaseRules) {
    if releases.is_empty() {
        ck.error(here, "\"releases\" must not be empty");
    }
    for (j, release) in releases.iter().enumerate() {
        check_release(ck, &here.index(j), release, rules);
    }
}

/// Folder-name rules. Default package names are reserved for packages only.
fn check_name(ck: &mut Checker<'_>, loc: &Location, name: &str, package: bool) {
    if name.is_empty() {
        ck.error(loc, "name must not be empty");
        return;
    }
    if patterns::has_invalid_name_chars(name) {
        ck.error(
            loc,
            format!("name \"{name}\" contains characters that are not allowed in folder names"),
        );
    }
    if name.starts_with('.') {
        ck.error(loc, format!("name \"{name}\" must not start with a dot"));
    }
    if package && patterns::is_default_package(name) {
        ck.error(loc, format!("name \"{name}\" is reserved by a Sublime Text default package"));
    }
}

fn check_labels(ck: &mut Checker<'_>, here: &Location, items: &[Value]) {
    let labels = check_string_items(ck, here, "labels", items);
    let mut seen: Vec<&str> = Vec::with_capacity(labels.len());
    for (i, label) in labels {
        if label.contains(',') {
            ck.error(&here.index(i), format!("label \"{label}\" contains a comma"));
        }
        if seen.contains(&label) {
            ck.error(&here.index(i), format!("label \"{label}\" is listed more than once"));
        } else {
            seen.push(label);
        }
    }
}

type Entry<'v> = (&'static str, usize, &'v Map<String, Value>);

fn check_include_layout(ck: &mut Checker<'_>, base: &Location, packages: &[Entry<'_>], dependencies: &[Entry<'_>]) {
    let Some(bucket) = patterns::include_bucket(ck.document()) else {
        ck.error(
            base,
            "include file name must be 0-9.json, a single lowercase letter, or dependencies.json",
        );
        return;
    };

    let mut package_names = Vec::with_capacity(packages.len());
    for (key, i, pkg) in packages {
        let Some(name) = package_name(pkg) else {
            continue;
        };
        let loc = base.key(key).index(*i);
        let first = name.chars().next().map(|c| c.to_ascii_lowercase());
        let placed = match bucket {
            "0-9" => first.is_some_and(|c| c.is_ascii_digit()),
            "dependencies" => false,
            letter => first.is_some_and(|c| letter.starts_with(c)),
        };
        if !placed {
            ck.error(&loc, format!("package \"{name}\" does not belong in {bucket}.json"));
        }
        package_names.push((loc, name));
    }
    check_sorted(ck, "packages", &package_names);

    let dependency_names: Vec<(Location, String)> = dependencies
        .iter()
        .filter_map(|(key, i, dep)| {
            let name = dep.get("name").and_then(Value::as_str)?;
            Some((base.key(key).index(*i), name.to_string()))
        })
        .collect();
    check_sorted(ck, "dependencies", &dependency_names);
}

fn check_sorted(ck: &mut Checker<'_>, what: &str, names: &[(Location, String)]) {
    let out_of_order = names
        .windows(2)
        .find(|pair| pair[0].1.to_lowercase() > pair[1].1.to_lowercase());
    if let Some(pair) = out_of_order {
        ck.error(
            &pair[1].0,
            format!("{what} must be sorted alphabetically (case-insensitive)"),
        );
    }
}
