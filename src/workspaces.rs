use crate::fsutil::manifest_path;
use crate::manifest::{self, PackageManifest};
use anyhow::{Context, Result};
use glob::glob;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WorkspaceMember {
    pub name: String,
    pub dir: PathBuf,
    pub manifest_path: PathBuf,
    pub relative_path: String,
}

/// Member packages matched by the root manifest's `workspaces` globs,
/// ordered by package name. The root itself is not included.
pub fn discover_workspaces(root: &Path, manifest: &PackageManifest) -> Result<Vec<WorkspaceMember>> {
    let patterns = manifest.workspaces();
    if patterns.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
    let mut by_name: BTreeMap<String, WorkspaceMember> = BTreeMap::new();

    for pattern in &patterns {
        if pattern.trim().is_empty() {
            continue;
        }
        let abs_pattern = root.join(pattern);
        let pat_str = abs_pattern.to_string_lossy().replace('\\', "/");
        for entry in glob(&pat_str).with_context(|| format!("expand workspace pattern {pat_str}"))? {
            let path = entry?;
            let pkg_dir = if path.file_name().map(|n| n == "package.json").unwrap_or(false) {
                path.parent().map(Path::to_path_buf).unwrap_or_else(|| path.clone())
            } else {
                path
            };
            if pkg_dir == root {
                continue;
            }
            let member_manifest = manifest_path(&pkg_dir);
            if !member_manifest.is_file() {
                continue;
            }
            let canon = member_manifest.canonicalize().unwrap_or_else(|_| member_manifest.clone());
            if !seen_dirs.insert(canon) {
                continue;
            }
            let pkg = manifest::load(&member_manifest)
                .with_context(|| format!("load workspace manifest at {}", member_manifest.display()))?;
            let name = match pkg.name() {
                "" => rel_path_str(root, &pkg_dir),
                name => name.to_string(),
            };
            let member = WorkspaceMember {
                name: name.clone(),
                relative_path: rel_path_str(root, &pkg_dir),
                dir: pkg_dir,
                manifest_path: member_manifest,
            };
            if let Some(prev) = by_name.insert(name, member) {
                anyhow::bail!(
                    "duplicate workspace package name '{}' at {}",
                    prev.name,
                    prev.dir.display()
                );
            }
        }
    }

    Ok(by_name.into_values().collect())
}

/// Every manifest an invocation in `root` should process: the root manifest
/// followed by its workspace members.
pub fn manifests_in(root: &Path) -> Result<Vec<PathBuf>> {
    let root_manifest = manifest_path(root);
    let manifest = manifest::load(&root_manifest)?;
    let mut paths = vec![root_manifest];
    paths.extend(discover_workspaces(root, &manifest)?.into_iter().map(|m| m.manifest_path));
    Ok(paths)
}

pub fn rel_path_str(root: &Path, dir: &Path) -> String {
    if let Ok(rel) = dir.strip_prefix(root) {
        let s = rel.to_string_lossy();
        let normalized = s.trim_start_matches('.').trim_start_matches(std::path::MAIN_SEPARATOR);
        let clean = if normalized.is_empty() { "." } else { normalized };
        clean.replace('\\', "/")
    } else {
        dir.to_string_lossy().replace('\\', "/")
    }
}
