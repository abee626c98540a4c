use std::path::{Path, PathBuf};

use crate::errors::DocError;
use crate::utils::decode_path;

/// Map a request path onto a filesystem path confined to `root`.
///
/// The request path is percent-decoded first, then lexically normalized
/// (separators unified, `.` and empty segments dropped, `..` collapsed),
/// then treated as root-relative and joined onto `root`. A path whose
/// normalized form still reaches above the root is rejected before any
/// filesystem access happens, whatever the traversal was spelled as
/// (`%2e%2e%2f`, backslashes, mixed case).
///
/// Symlinks are not resolved: a symlink inside the root that points outside
/// it can still escape. Accepted limitation for a local preview server.
pub fn resolve(root: &Path, request_path: &str) -> Result<PathBuf, DocError> {
    let decoded = decode_path(request_path).ok_or(DocError::PathEscape)?;
    let segments = normalize(&decoded);
    if segments.first().map(String::as_str) == Some("..") {
        return Err(DocError::PathEscape);
    }

    let mut joined = root.to_path_buf();
    for segment in &segments {
        joined.push(segment);
    }
    // Drive-prefixed segments can re-root the joined path on Windows.
    if !joined.starts_with(root) {
        return Err(DocError::PathEscape);
    }
    Ok(joined)
}

/// Lexical normalization. `..` pops the previous segment and is preserved
/// when there is nothing left to pop, so a leading `..` survives for the
/// escape check instead of being silently swallowed.
fn normalize(decoded: &str) -> Vec<String> {
    let unified = decoded.replace('\\', "/");
    let mut segments: Vec<String> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last().map(String::as_str) {
                None | Some("..") => segments.push("..".to_string()),
                Some(_) => {
                    segments.pop();
                }
            },
            other => segments.push(other.to_string()),
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/docs")
    }

    #[test]
    fn plain_paths_join_onto_the_root() {
        assert_eq!(resolve(&root(), "/guide/intro.md").unwrap(), root().join("guide/intro.md"));
        assert_eq!(resolve(&root(), "/").unwrap(), root());
        assert_eq!(resolve(&root(), "").unwrap(), root());
    }

    #[test]
    fn dot_segments_collapse_inside_the_root() {
        assert_eq!(resolve(&root(), "/a/./b").unwrap(), root().join("a/b"));
        assert_eq!(resolve(&root(), "/a/../b").unwrap(), root().join("b"));
        assert_eq!(resolve(&root(), "/a//b/").unwrap(), root().join("a/b"));
    }

    #[test]
    fn plain_traversal_is_rejected() {
        assert!(matches!(resolve(&root(), "/.."), Err(DocError::PathEscape)));
        assert!(matches!(resolve(&root(), "/../../etc/passwd"), Err(DocError::PathEscape)));
        assert!(matches!(resolve(&root(), "/a/../../x"), Err(DocError::PathEscape)));
    }

    #[test]
    fn encoded_traversal_is_rejected() {
        assert!(matches!(resolve(&root(), "/%2e%2e%2fsecret"), Err(DocError::PathEscape)));
        assert!(matches!(resolve(&root(), "/%2E%2E/secret"), Err(DocError::PathEscape)));
        assert!(matches!(
            resolve(&root(), "/%2e%2e%2f%2e%2e%2fetc%2fpasswd"),
            Err(DocError::PathEscape)
        ));
    }

    #[test]
    fn backslash_traversal_is_rejected() {
        assert!(matches!(resolve(&root(), "/..\\..\\secret"), Err(DocError::PathEscape)));
        assert!(matches!(resolve(&root(), "/..%5c..%5csecret"), Err(DocError::PathEscape)));
    }

    #[test]
    fn invalid_percent_utf8_is_rejected() {
        assert!(matches!(resolve(&root(), "/%ff%fe"), Err(DocError::PathEscape)));
    }

    #[test]
    fn resolution_is_idempotent_for_in_root_paths() {
        let first = resolve(&root(), "/guide/./intro.md").unwrap();
        let relative = first.strip_prefix(root()).unwrap().to_string_lossy().into_owned();
        let second = resolve(&root(), &relative).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn decoded_spaces_reach_the_filesystem_path() {
        assert_eq!(resolve(&root(), "/a%20b.md").unwrap(), root().join("a b.md"));
    }
}
