//! Channel rules: repository references and inline repositories.

use serde_json::Value;

use chanlint_core::{DocumentKind, Location, SCHEMA_VERSION};

use crate::checker::Checker;
use crate::envelope::Envelope;
use crate::patterns::{self, Scheme};
use crate::repository::{check_repository, Origin, RepositoryScope};

const TOP_LEVEL_KEYS: &[&str] = &["$schema", "schema_version", "repositories"];

pub(crate) fn check_channel(ck: &mut Checker<'_>, envelope: &Envelope, value: &Value) {
    let Some(obj) = value.as_object() else {
        return;
    };
    let root = Location::root();

    for key in obj.keys() {
        if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
            ck.warning(&root.key(key), format!("unexpected key \"{key}\""));
        }
    }

    if let Some(Value::String(version)) = obj.get("schema_version") {
        if version != SCHEMA_VERSION {
            ck.error(
                &root.key("schema_version"),
                format!("unrecognized schema version \"{version}\", expected \"{SCHEMA_VERSION}\""),
            );
        }
    }

    let Some(Value::Array(repositories)) = obj.get("repositories") else {
        return;
    };
    let here = root.key("repositories");

    let mut references: Vec<(usize, &str)> = Vec::with_capacity(repositories.len());
    for (i, entry) in repositories.iter().enumerate() {
        let at = here.index(i);
        match entry {
            Value::String(reference) => {
                check_reference(ck, &at, reference);
                if let Some((first, _)) = references
                    .iter()
                    .find(|(_, seen)| seen.eq_ignore_ascii_case(reference))
                {
                    ck.warning(
                        &at,
                        format!("repository \"{reference}\" is already listed at {}", here.index(*first)),
                    );
                }
                references.push((i, reference));
            }
            Value::Object(_) => {
                let document = ck.document();
                ck.extend(envelope.check_at(DocumentKind::Repository, document, &at, entry));
                let mut scope = RepositoryScope::new(Origin::Remote);
                check_repository(ck, &mut scope, &at, entry, false);
            }
            // Reported by the envelope.
            _ => {}
        }
    }

    let out_of_order = references
        .windows(2)
        .find(|pair| pair[0].1.to_lowercase() > pair[1].1.to_lowercase());
    if let Some(pair) = out_of_order {
        ck.error(
            &here.index(pair[1].0),
            "repositories must be sorted alphabetically (case-insensitive)",
        );
    }
}

fn check_reference(ck: &mut Checker<'_>, at: &Location, reference: &str) {
    if reference.is_empty() {
        ck.error(at, "repository reference must not be empty");
    } else if reference.starts_with("https://") {
        if let Err(problem) = patterns::check_url(reference, Scheme::Https) {
            ck.error(at, problem);
        }
    } else if !reference.starts_with('.') {
        ck.error(
            at,
            format!("repository \"{reference}\" must be a relative path starting with \".\" or an https:// URL"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanlint_core::ValidationIssue;
    use serde_json::json;

    fn run(value: Value) -> Vec<ValidationIssue> {
        let envelope = Envelope::new().unwrap();
        let mut ck = Checker::new("channel.json");
        check_channel(&mut ck, &envelope, &value);
        ck.into_issues()
    }

    #[test]
    fn sorted_channel_is_clean() {
        let issues = run(json!({
            "$schema": "sublime://packagecontrol.io/schemas/channel",
            "schema_version": "3.0.0",
            "repositories": [
                "./repository.json",
                "https://example.com/a/packages.json",
                "https://Example.org/b.json"
            ]
        }));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn unknown_key_warns() {
        let issues = run(json!({"schema_version": "3.0.0", "repositories": [], "mirror": true}));
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn bad_references() {
        let issues = run(json!({
            "schema_version": "3.0.0",
            "repositories": ["", "http://insecure.example/r.json", "https://"]
        }));
        let locs: Vec<&str> = issues.iter().map(|i| i.location.as_str()).collect();
        assert_eq!(locs, vec!["/repositories/0", "/repositories/1", "/repositories/2"]);
    }

    #[test]
    fn duplicate_reference_is_a_warning() {
        let issues = run(json!({
            "schema_version": "3.0.0",
            "repositories": ["https://a.example/r.json", "https://A.example/r.json"]
        }));
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert!(issues[0].message.contains("/repositories/0"));
    }

    #[test]
    fn unsorted_reports_first_out_of_order_index() {
        let issues = run(json!({
            "schema_version": "3.0.0",
            "repositories": ["https://b.example/r.json", "https://a.example/r.json", "https://0.example/r.json"]
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location.as_str(), "/repositories/1");
    }

    #[test]
    fn inline_repository_is_validated_in_place() {
        let issues = run(json!({
            "schema_version": "3.0.0",
            "repositories": [{
                "schema_version": "3.0.0",
                "packages": [{
                    "name": "Inline",
                    "details": "https://github.com/owner/Inline",
                    "releases": [{"tags": true}]
                }]
            }]
        }));
        assert_eq!(issues.len(), 1, "{issues:?}");
        assert_eq!(issues[0].location.as_str(), "/repositories/0/packages/0/releases/0");
        assert!(issues[0].message.contains("sublime_text"));
    }

    #[test]
    fn inline_repository_envelope_uses_nested_pointers() {
        let issues = run(json!({
            "schema_version": "3.0.0",
            "repositories": [{"schema_version": "3.0.0", "packages": "nope"}]
        }));
        assert!(issues
            .iter()
            .any(|i| i.location.as_str() == "/repositories/0/packages"));
    }
}
