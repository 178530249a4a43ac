//! # Value Patterns
//!
//! Formats of the string values found in channel and repository documents,
//! plus the URL well-formedness check (scheme and host, never reachability).

use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;
use url::Url;

/// Packages shipped with Sublime Text. A third-party package may not reuse
/// one of these names.
pub const DEFAULT_PACKAGES: &[&str] = &[
    "ActionScript",
    "AppleScript",
    "ASP",
    "Batch File",
    "Binary",
    "C#",
    "C++",
    "Clojure",
    "Color Scheme - Default",
    "CSS",
    "D",
    "Default",
    "Diff",
    "Erlang",
    "Git Formats",
    "Go",
    "Graphviz",
    "Groovy",
    "Haskell",
    "HTML",
    "Java",
    "JavaScript",
    "Language - English",
    "LaTeX",
    "Lisp",
    "Lua",
    "Makefile",
    "Markdown",
    "Matlab",
    "Objective-C",
    "OCaml",
    "Pascal",
    "Perl",
    "PHP",
    "Python",
    "R",
    "Rails",
    "Regular Expressions",
    "RestructuredText",
    "Ruby",
    "Rust",
    "Scala",
    "ShellScript",
    "SQL",
    "TCL",
    "Text",
    "Textile",
    "Theme - Default",
    "Vintage",
    "XML",
    "YAML",
];

/// Operating systems accepted in platform selectors.
pub const PLATFORM_OSES: &[&str] = &["osx", "linux", "windows"];

/// Architectures accepted in platform selectors.
pub const PLATFORM_ARCHES: &[&str] = &["x32", "x64", "arm64"];

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        fn $name() -> &'static Regex {
            static CELL: OnceLock<Regex> = OnceLock::new();
            CELL.get_or_init(|| Regex::new($re).expect("static pattern compiles"))
        }
    };
}

pattern!(
    details_re,
    r"^(?:https://bitbucket\.org/[^/#?]+/[^/#?]+(?:/src/[^#?]*[^/#?]|#tags|/)?|https://github\.com/[^/#?]+/(?P<gh>[^/#?]+)(?:/tree/[^#?]*[^/#?]|/)?|https://gitlab\.com/[^/#?]+/(?P<gl>[^/#?]+)(?:/-/tree/[^#?]*[^/#?]|/)?)$"
);
pattern!(
    release_base_re,
    r"^https://(?:bitbucket\.org|github\.com|gitlab\.com)/[^/#?]+/[^/#?]+$"
);
pattern!(
    sublime_text_re,
    r"^(?:\*|<=?\d{4}|>=?\d{4}|\d{4} - \d{4})$"
);
pattern!(
    platform_re,
    r"^(?:\*|(?:osx|linux|windows)(?:-(?:x32|x64|arm64))?)$"
);
pattern!(sha256_re, r"^(?i)[0-9a-f]{64}$");
pattern!(load_order_re, r"^\d\d$");
pattern!(version_re, r"^\d+(?:\.\d+)*(?:[-+][0-9A-Za-z][0-9A-Za-z.+-]*)?$");
pattern!(invalid_name_re, r#"[/?<>\\:*|"\x00-\x19]"#);
pattern!(include_file_re, r"(?:^|/)(0-9|[a-z]|dependencies)\.json$");

/// A `details` URL pointing at a GitHub, GitLab or Bitbucket repository,
/// optionally at a branch/tag path. GitHub and GitLab URLs may not end in
/// `.git`.
pub fn is_details_url(value: &str) -> bool {
    match details_re().captures(value) {
        Some(caps) => {
            let repo = caps.name("gh").or_else(|| caps.name("gl"));
            !repo.is_some_and(|m| m.as_str().ends_with(".git"))
        }
        None => false,
    }
}

/// A release `base`: the root of a hosted repository.
pub fn is_release_base(value: &str) -> bool {
    release_base_re().is_match(value)
}

/// A `sublime_text` build selector: `*`, `<N`, `<=N`, `>N`, `>=N` or
/// `N - N` with four-digit build numbers.
pub fn is_sublime_text_selector(value: &str) -> bool {
    sublime_text_re().is_match(value)
}

/// A platform selector: `*`, an OS, or an OS with an architecture suffix.
pub fn is_platform(value: &str) -> bool {
    platform_re().is_match(value)
}

/// A hex-encoded SHA-256 digest.
pub fn is_sha256(value: &str) -> bool {
    sha256_re().is_match(value)
}

/// A two-digit `load_order`.
pub fn is_load_order(value: &str) -> bool {
    load_order_re().is_match(value)
}

/// A version that sorts: dotted numbers with an optional suffix.
pub fn is_version(value: &str) -> bool {
    version_re().is_match(value)
}

/// A release date of the form `YYYY-MM-DD HH:MM:SS` that names a real
/// instant.
pub fn is_release_date(value: &str) -> bool {
    value.len() == 19 && NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
}

/// True if a package name is usable as a folder name on every OS.
pub fn has_invalid_name_chars(name: &str) -> bool {
    invalid_name_re().is_match(name)
}

/// True for the names of packages bundled with Sublime Text.
pub fn is_default_package(name: &str) -> bool {
    DEFAULT_PACKAGES.contains(&name)
}

/// The layout bucket of an include file: `0-9`, a single lowercase letter,
/// or `dependencies`.
pub fn include_bucket(reference: &str) -> Option<&str> {
    include_file_re()
        .captures(reference)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// URL schemes accepted by [`check_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// `http` or `https`.
    Web,
    /// `https` only.
    Https,
    /// `http` only (unencrypted bootstrap downloads).
    Http,
}

/// Check that `value` is a well-formed URL with an accepted scheme and a
/// host. Returns a description of the problem otherwise.
pub fn check_url(value: &str, scheme: Scheme) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("\"{value}\" is not a valid URL: {e}"))?;
    let ok = match scheme {
        Scheme::Web => matches!(url.scheme(), "http" | "https"),
        Scheme::Https => url.scheme() == "https",
        Scheme::Http => url.scheme() == "http",
    };
    if !ok {
        let expected = match scheme {
            Scheme::Web => "http:// or https://",
            Scheme::Https => "https://",
            Scheme::Http => "http://",
        };
        return Err(format!("\"{value}\" must use {expected}"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("\"{value}\" has no host"));
    }
    Ok(url)
}
