use std::path::{Path, PathBuf};

/// Finds the installed copy of a dependency.
pub trait PackageLocator {
    fn find_package_dir(&self, name: &str, start_dir: &Path) -> Option<PathBuf>;
}

/// Node-style lookup: `node_modules/<name>` in `start_dir` and every ancestor.
/// Symlinked packages resolve to their real location.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesLocator;

impl PackageLocator for NodeModulesLocator {
    fn find_package_dir(&self, name: &str, start_dir: &Path) -> Option<PathBuf> {
        let rel = safe_package_path(name)?;
        for dir in start_dir.ancestors() {
            let candidate = dir.join("node_modules").join(&rel);
            if candidate.join("package.json").is_file() {
                return Some(candidate.canonicalize().unwrap_or(candidate));
            }
        }
        None
    }
}

/// `name` as a relative path, rejecting anything that could escape `node_modules`.
pub fn safe_package_path(name: &str) -> Option<PathBuf> {
    if name.is_empty() || name.contains("..") || name.starts_with('/') || name.contains('\\') {
        return None;
    }
    Some(name.split('/').collect())
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join("package.json")
}
