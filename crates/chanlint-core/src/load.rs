//! # Local Document Loading
//!
//! Channel and repository files are optional inputs: a configured path that
//! names no file means the check is skipped, not that the run failed. Once a
//! file has been located, any read, decode or parse failure is a
//! [`LoadError`].
//!
//! Includes of the main repository are different: they are required, and a
//! relative include missing next to the repository is also looked up one
//! directory above (CI checkouts sometimes run from a subdirectory).

use std::path::{Path, PathBuf};

use crate::document::{DocumentKind, DocumentSource, LoadedDocument};
use crate::error::LoadError;

/// Locate an input file: `Some(path)` if it names a file, `None` otherwise.
pub fn locate(path: &Path) -> Option<PathBuf> {
    path.is_file().then(|| path.to_path_buf())
}

/// Resolve an include of the local repository file `repository`.
///
/// The include is joined onto the repository's directory. If no file exists
/// there and the joined path is relative, the same path one directory above
/// is used when it names a file. Otherwise the joined path is returned and
/// loading it reports [`LoadError::NotFound`].
pub fn resolve_include(repository: &Path, reference: &str) -> PathBuf {
    let base = repository.parent().unwrap_or_else(|| Path::new(""));
    let joined = base.join(reference);
    if joined.is_file() || !joined.is_relative() {
        return joined;
    }
    let parent = Path::new("..").join(&joined);
    if parent.is_file() {
        tracing::debug!(include = reference, found = %parent.display(), "using parent-directory fallback");
        return parent;
    }
    joined
}

/// Read and parse a local document.
///
/// # Errors
///
/// [`LoadError::NotFound`] if the file does not exist, [`LoadError::Io`] if
/// it cannot be read, and the decode/parse errors of
/// [`LoadedDocument::from_bytes`].
pub fn load_file(path: &Path, kind: DocumentKind) -> Result<LoadedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.display().to_string(),
        });
    }
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), kind = %kind, bytes = bytes.len(), "loaded document");
    LoadedDocument::from_bytes(DocumentSource::File(path.to_path_buf()), kind, bytes)
}
