//! Path-containment guard.
//!
//! A key is accepted only if `root.join(key)`, normalized, sits directly in
//! `root`. An existing symlink at that spot must also resolve directly into
//! `root`. `root` must already be canonical.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Resolve `key` to a path directly inside `root`, or `None` if it escapes.
pub(crate) fn resolve_in_root(root: &Path, key: &str) -> Option<PathBuf> {
    let candidate = normalize_lexically(&root.join(key));

    if candidate.parent() != Some(root) {
        return None;
    }

    if let Ok(meta) = fs::symlink_metadata(&candidate) {
        if meta.file_type().is_symlink() {
            // Dangling links fail canonicalization and are rejected too.
            let target = fs::canonicalize(&candidate).ok()?;
            if target.parent() != Some(root) {
                return None;
            }
        }
    }

    Some(candidate)
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/reelvault/videos")
    }

    #[test]
    fn test_plain_key_accepted() {
        let resolved = resolve_in_root(&root(), "clip_1700000000000_0a1b2c3d.mp4").unwrap();
        assert_eq!(
            resolved,
            PathBuf::from("/srv/reelvault/videos/clip_1700000000000_0a1b2c3d.mp4")
        );
    }

    #[test]
    fn test_dotted_but_flat_key_accepted() {
        assert!(resolve_in_root(&root(), ".._.._etc_passwd_1_0a1b2c3d.mp4").is_some());
        assert!(resolve_in_root(&root(), "./clip.mp4").is_some());
    }

    #[test]
    fn test_traversal_rejected() {
        assert!(resolve_in_root(&root(), "../../../etc/passwd").is_none());
        assert!(resolve_in_root(&root(), "../videos2/clip.mp4").is_none());
        assert!(resolve_in_root(&root(), "..").is_none());
        assert!(resolve_in_root(&root(), ".").is_none());
        assert!(resolve_in_root(&root(), "nested/../../clip.mp4").is_none());
    }

    #[test]
    fn test_absolute_key_rejected() {
        assert!(resolve_in_root(&root(), "/etc/passwd").is_none());
    }

    #[test]
    fn test_subdirectory_rejected() {
        assert!(resolve_in_root(&root(), "nested/clip.mp4").is_none());
    }

    #[test]
    fn test_traversal_back_into_root_accepted() {
        // Normalizes to a direct child of the root.
        assert!(resolve_in_root(&root(), "nested/../clip.mp4").is_some());
    }
}
