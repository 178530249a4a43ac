//! # Release Descriptors
//!
//! A release pins a package to something downloadable: either a hosted
//! repository (`base` plus `tags` or `branch`, resolved by the client) or an
//! explicit artifact (`url` plus `version`, and `date` for packages).
//!
//! The main repository only accepts the first form for packages.
//! Third-party repositories may use either.

use serde_json::{Map, Value};

use chanlint_core::Location;

use crate::checker::Checker;
use crate::keys::{check_table, KeyTable, ValueType};
use crate::patterns::{self, Scheme, PLATFORM_ARCHES, PLATFORM_OSES};

const PACKAGE_RELEASE_KEYS: KeyTable = &[
    ("base", &[ValueType::Str]),
    ("tags", &[ValueType::Bool, ValueType::Str]),
    ("branch", &[ValueType::Str]),
    ("sublime_text", &[ValueType::Str]),
    ("platforms", &[ValueType::Array, ValueType::Str]),
    ("dependencies", &[ValueType::Array, ValueType::Str]),
    ("version", &[ValueType::Str]),
    ("date", &[ValueType::Str]),
    ("url", &[ValueType::Str]),
];

const DEPENDENCY_RELEASE_KEYS: KeyTable = &[
    ("base", &[ValueType::Str]),
    ("tags", &[ValueType::Bool, ValueType::Str]),
    ("branch", &[ValueType::Str]),
    ("sublime_text", &[ValueType::Str]),
    ("platforms", &[ValueType::Array, ValueType::Str]),
    ("version", &[ValueType::Str]),
    ("sha256", &[ValueType::Str]),
    ("url", &[ValueType::Str]),
];

/// Which rule set applies to a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseRules {
    /// The release belongs to a dependency (library) rather than a package.
    pub dependency: bool,
    /// The release is declared in the main repository.
    pub main_repository: bool,
}

pub(crate) fn check_release(ck: &mut Checker<'_>, loc: &Location, release: &Value, rules: ReleaseRules) {
    let Some(obj) = release.as_object() else {
        ck.error(loc, "release must be an object");
        return;
    };
    let has = |k: &str| obj.contains_key(k);
    let tagged = has("tags") || has("branch");

    if rules.main_repository {
        if rules.dependency {
            let url_ok = match obj.get("url") {
                None => true,
                Some(u) => u.as_str().is_some_and(|u| u.starts_with("http://")),
            };
            if !((has("base") && tagged) || (has("sha256") && url_ok)) {
                ck.error(
                    loc,
                    "a dependency release in the main repository needs \"base\" with \"tags\" or \
                     \"branch\"; only bootstrap dependencies that cannot be served over HTTPS may \
                     use \"sha256\" with an http:// \"url\"",
                );
            }
        } else {
            if !tagged {
                ck.error(
                    loc,
                    "a release in the main repository needs a \"tags\" or \"branch\" key; custom \
                     releases belong in a separately hosted repository.json",
                );
            }
            for key in ["url", "version", "date"] {
                if has(key) {
                    ck.error(
                        &loc.key(key),
                        format!(
                            "\"{key}\" must not be used in the main repository since every \
                             release would need a pull request"
                        ),
                    );
                }
            }
        }
    } else if !tagged {
        let required: &[&str] = if rules.dependency {
            &["url", "version"]
        } else {
            &["url", "version", "date"]
        };
        for key in required {
            if !has(key) {
                ck.error(
                    loc,
                    format!("a release without \"tags\" or \"branch\" must provide \"{key}\""),
                );
            }
        }
    } else {
        for key in ["url", "version", "date"] {
            if has(key) {
                ck.error(
                    &loc.key(key),
                    format!("\"{key}\" is redundant when \"tags\" or \"branch\" is specified"),
                );
            }
        }
    }

    if !has("sublime_text") {
        ck.error(loc, "a \"sublime_text\" version selector is required");
    }
    if rules.dependency && !has("platforms") {
        ck.error(loc, "a \"platforms\" selector is required for dependencies");
    }
    if has("tags") && has("branch") {
        ck.error(loc, "a release must have only one of the \"tags\" or \"branch\" keys");
    }

    let table = if rules.dependency {
        DEPENDENCY_RELEASE_KEYS
    } else {
        PACKAGE_RELEASE_KEYS
    };
    for (key, value) in check_table(ck, loc, obj, table) {
        check_value(ck, &loc.key(key), key, value, obj, rules);
    }
}

fn check_value(
    ck: &mut Checker<'_>,
    here: &Location,
    key: &str,
    value: &Value,
    release: &Map<String, Value>,
    rules: ReleaseRules,
) {
    match (key, value) {
        ("url", Value::String(url)) => {
            let scheme = match (rules.dependency, release.contains_key("sha256")) {
                (true, true) => Scheme::Http,
                (true, false) => Scheme::Https,
                (false, _) => Scheme::Web,
            };
            if let Err(problem) = patterns::check_url(url, scheme) {
                ck.error(here, problem);
            }
        }
        ("base", Value::String(base)) => {
            if !patterns::is_release_base(base) {
                ck.error(here, format!("the base URL \"{base}\" is badly formatted or invalid"));
            }
        }
        ("sublime_text", Value::String(selector)) => {
            if !patterns::is_sublime_text_selector(selector) {
                ck.error(
                    here,
                    format!(
                        "\"{selector}\" is not a valid sublime_text selector; use `*`, \
                         `<relation><build>` with <relation> one of <, <=, >, >= and a 4 digit \
                         build, or `<build> - <build>`"
                    ),
                );
            }
        }
        ("platforms", _) => check_platforms(ck, here, value),
        ("dependencies", _) => check_dependency_refs(ck, here, value),
        ("date", Value::String(date)) => {
            if !patterns::is_release_date(date) {
                ck.error(here, format!("\"{date}\" is not a date of the form YYYY-MM-DD HH:MM:SS"));
            }
        }
        ("version", Value::String(version)) => {
            if !patterns::is_version(version) {
                ck.error(here, format!("\"{version}\" is not a resolvable version"));
            }
        }
        ("tags", Value::Bool(false)) => {
            ck.error(here, "\"tags\" must be `true` or a non-empty prefix string");
        }
        ("tags", Value::String(prefix)) => {
            if prefix.is_empty() {
                ck.error(here, "\"tags\" must be `true` or a non-empty prefix string");
            } else if prefix == "true" {
                ck.error(
                    here,
                    "\"tags\" is the string \"true\"; a tag prefix of \"true\" is unlikely, use the boolean `true`",
                );
            }
        }
        ("branch", Value::String(branch)) => {
            if branch.is_empty() {
                ck.error(here, "\"branch\" must be non-empty");
            }
        }
        ("sha256", Value::String(digest)) => {
            if !patterns::is_sha256(digest) {
                ck.error(here, "\"sha256\" must be 64 hexadecimal digits");
            }
        }
        _ => {}
    }
}

fn string_or_list(value: &Value) -> Vec<(Option<usize>, &str)> {
    match value {
        Value::String(s) => vec![(None, s.as_str())],
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_str().map(|s| (Some(i), s)))
            .collect(),
        _ => Vec::new(),
    }
}

fn check_platforms(ck: &mut Checker<'_>, here: &Location, value: &Value) {
    let platforms = string_or_list(value);
    let mut seen: Vec<&str> = Vec::with_capacity(platforms.len());

    for (index, platform) in &platforms {
        let at = index.map_or_else(|| here.clone(), |i| here.index(i));
        if !patterns::is_platform(platform) {
            ck.error(&at, format!("\"{platform}\" is not a known platform"));
        }
        if seen.contains(platform) {
            ck.error(&at, format!("platform \"{platform}\" is listed more than once"));
        } else {
            seen.push(platform);
        }
    }

    for os in PLATFORM_OSES {
        let all_arches = PLATFORM_ARCHES
            .iter()
            .all(|arch| seen.contains(&format!("{os}-{arch}").as_str()));
        if all_arches {
            ck.error(
                here,
                format!("specifying all of x32, x64 and arm64 for \"{os}\" is redundant; use \"{os}\""),
            );
        }
    }

    let mut plain: Vec<&str> = seen.clone();
    plain.sort_unstable();
    if plain == ["linux", "osx", "windows"] {
        ck.error(here, "\"osx\", \"windows\", \"linux\" together should be replaced by \"*\"");
    }
}

fn check_dependency_refs(ck: &mut Checker<'_>, here: &Location, value: &Value) {
    for (index, name) in string_or_list(value) {
        if name.trim().is_empty() {
            let at = index.map_or_else(|| here.clone(), |i| here.index(i));
            ck.error(&at, "dependency names must be non-empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAIN_PACKAGE: ReleaseRules = ReleaseRules {
        dependency: false,
        main_repository: true,
    };
    const REMOTE_PACKAGE: ReleaseRules = ReleaseRules {
        dependency: false,
        main_repository: false,
    };
    const MAIN_DEPENDENCY: ReleaseRules = ReleaseRules {
        dependency: true,
        main_repository: true,
    };
    const REMOTE_DEPENDENCY: ReleaseRules = ReleaseRules {
        dependency: true,
        main_repository: false,
    };

    fn run(release: Value, rules: ReleaseRules) -> Vec<(String, String)> {
        let mut ck = Checker::new("r.json");
        check_release(&mut ck, &Location::root().key("releases").index(0), &release, rules);
        ck.into_issues()
            .into_iter()
            .map(|i| (i.location.as_str().to_string(), i.message))
            .collect()
    }

    #[test]
    fn tagged_main_release_passes() {
        let issues = run(json!({"sublime_text": ">=4000", "tags": true}), MAIN_PACKAGE);
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn main_release_needs_tags_or_branch() {
        let issues = run(json!({"sublime_text": "*"}), MAIN_PACKAGE);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].1.contains("\"tags\" or \"branch\""));
    }

    #[test]
    fn main_release_rejects_explicit_artifact_keys() {
        let issues = run(
            json!({"sublime_text": "*", "branch": "main", "url": "https://x.example/a.zip"}),
            MAIN_PACKAGE,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].0, "/releases/0/url");
    }

    #[test]
    fn remote_explicit_release_requires_url_version_date() {
        let issues = run(json!({"sublime_text": "*", "url": "https://x.example/a.zip"}), REMOTE_PACKAGE);
        let msgs: Vec<&str> = issues.iter().map(|(_, m)| m.as_str()).collect();
        assert_eq!(msgs.len(), 2);
        assert!(msgs[0].contains("\"version\""));
        assert!(msgs[1].contains("\"date\""));
    }

    #[test]
    fn remote_explicit_release_passes() {
        let issues = run(
            json!({
                "sublime_text": "3000 - 3999",
                "platforms": ["osx", "linux-x64"],
                "url": "https://x.example/a.zip",
                "version": "1.2.0",
                "date": "2020-01-02 03:04:05"
            }),
            REMOTE_PACKAGE,
        );
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn remote_tagged_release_with_version_is_redundant() {
        let issues = run(json!({"sublime_text": "*", "tags": "v", "version": "1.0"}), REMOTE_PACKAGE);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].1.contains("redundant"));
    }

    #[test]
    fn tags_and_branch_are_exclusive() {
        let issues = run(json!({"sublime_text": "*", "tags": true, "branch": "x"}), MAIN_PACKAGE);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].1.contains("only one"));
    }

    #[test]
    fn dependency_release_rules() {
        let ok = run(
            json!({"sublime_text": "*", "platforms": "*", "base": "https://github.com/a/b", "tags": true}),
            MAIN_DEPENDENCY,
        );
        assert!(ok.is_empty(), "{ok:?}");

        let bootstrap = run(
            json!({
                "sublime_text": "*",
                "platforms": ["windows"],
                "sha256": "0".repeat(64),
                "url": "http://x.example/ssl.zip",
                "version": "1.0.0"
            }),
            MAIN_DEPENDENCY,
        );
        assert!(bootstrap.is_empty(), "{bootstrap:?}");

        let missing_platforms = run(
            json!({"sublime_text": "*", "url": "https://x.example/d.zip", "version": "1.0"}),
            REMOTE_DEPENDENCY,
        );
        assert_eq!(missing_platforms.len(), 1);
        assert!(missing_platforms[0].1.contains("platforms"));
    }

    #[test]
    fn dependency_url_scheme_depends_on_sha256() {
        let issues = run(
            json!({"sublime_text": "*", "platforms": "*", "url": "http://x.example/d.zip", "version": "1.0"}),
            REMOTE_DEPENDENCY,
        );
        assert_eq!(issues.len(), 1);
        assert!(issues[0].1.contains("https://"));
    }

    #[test]
    fn platform_redundancy_rules() {
        let all_arches = run(
            json!({"sublime_text": "*", "tags": true, "platforms": ["osx-x32", "osx-x64", "osx-arm64"]}),
            MAIN_PACKAGE,
        );
        assert_eq!(all_arches.len(), 1);

        let all_oses = run(
            json!({"sublime_text": "*", "tags": true, "platforms": ["windows", "osx", "linux"]}),
            MAIN_PACKAGE,
        );
        assert_eq!(all_oses.len(), 1);
        assert!(all_oses[0].1.contains("\"*\""));

        let dupes = run(
            json!({"sublime_text": "*", "tags": true, "platforms": ["osx", "osx", "beos"]}),
            MAIN_PACKAGE,
        );
        let locs: Vec<&str> = dupes.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(locs, vec!["/releases/0/platforms/1", "/releases/0/platforms/2"]);
    }

    #[test]
    fn value_format_rules() {
        let issues = run(
            json!({"sublime_text": ">=300", "tags": "true", "base": "https://github.com/a/b/"}),
            MAIN_PACKAGE,
        );
        let locs: Vec<&str> = issues.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(
            locs,
            vec!["/releases/0/sublime_text", "/releases/0/tags", "/releases/0/base"]
        );
    }

    #[test]
    fn non_object_release() {
        let issues = run(json!("1.0"), MAIN_PACKAGE);
        assert_eq!(issues, vec![("/releases/0".to_string(), "release must be an object".to_string())]);
    }
}
