//! Module-style path resolution.
//!
//! Requests are resolved relative to the directory of the file that makes
//! them, the way a module loader resolves an import: the request is tried as
//! written, then with each known extension appended.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize `path`, resolving `.` and `..` without touching the
/// file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute against `root` and normalize it.
pub fn absolutize(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(&root.join(path))
    }
}

/// Resolve `request` from the directory `from_dir`.
///
/// Surrounding quotes are ignored. Returns the first existing file among the
/// request itself and the request with each of `extensions` appended.
pub fn resolve_module(from_dir: &Path, request: &str, extensions: &[&str]) -> Option<PathBuf> {
    let request = request.trim().trim_matches(|c| c == '"' || c == '\'');
    if request.is_empty() {
        return None;
    }

    let base = absolutize(from_dir, Path::new(request));
    if base.is_file() {
        return Some(base);
    }

    extensions.iter().find_map(|ext| {
        let mut candidate = base.clone().into_os_string();
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    })
}

/// The definition name for a file: its base name up to the first `.`.
pub fn definition_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.split_once('.') {
        Some((name, _)) => name.to_string(),
        None => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn normalize_dot_segments() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn resolve_tries_extensions() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("parts")).unwrap();
        fs::write(dir.path().join("parts/card.style.css"), "").unwrap();

        let found = resolve_module(dir.path(), "./parts/card", &[".style.css", ".css"]);
        assert_eq!(found, Some(normalize(&dir.path().join("parts/card.style.css"))));

        let quoted = resolve_module(dir.path(), "'./parts/card.style.css'", &[]);
        assert_eq!(quoted, found);
    }

    #[test]
    fn resolve_missing() {
        let dir = tempdir().unwrap();
        assert_eq!(resolve_module(dir.path(), "nothing", &[".css"]), None);
        assert_eq!(resolve_module(dir.path(), "", &[".css"]), None);
    }

    #[test]
    fn name_strips_every_extension() {
        assert_eq!(definition_name(Path::new("/x/box.style.css")), "box");
        assert_eq!(definition_name(Path::new("grid.mixin.json")), "grid");
        assert_eq!(definition_name(Path::new("plain")), "plain");
    }
}
