use crate::capabilities::CapabilityResolver;
use crate::manifest::{DependencySection, PackageManifest};
use crate::preset::{Capability, Profile};
use crate::range::is_subset;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added { dependency: String, target: String },
    Changed { dependency: String, target: String, current: String },
    Removed { dependency: String },
}

impl Change {
    pub fn dependency(&self) -> &str {
        match self {
            Change::Added { dependency, .. }
            | Change::Changed { dependency, .. }
            | Change::Removed { dependency } => dependency,
        }
    }
}

/// A dependency that some undeclared capability could manage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unmanaged {
    pub dependency: String,
    pub capability: Capability,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub dependencies: Vec<Change>,
    pub peer_dependencies: Vec<Change>,
    pub dev_dependencies: Vec<Change>,
    pub unmanaged: Vec<Unmanaged>,
}

impl Changes {
    pub fn section(&self, section: DependencySection) -> &[Change] {
        match section {
            DependencySection::Dependencies => &self.dependencies,
            DependencySection::PeerDependencies => &self.peer_dependencies,
            DependencySection::DevDependencies => &self.dev_dependencies,
        }
    }

    fn section_mut(&mut self, section: DependencySection) -> &mut Vec<Change> {
        match section {
            DependencySection::Dependencies => &mut self.dependencies,
            DependencySection::PeerDependencies => &mut self.peer_dependencies,
            DependencySection::DevDependencies => &mut self.dev_dependencies,
        }
    }

    /// Number of dependency changes. Unmanaged hints are not counted.
    pub fn len(&self) -> usize {
        self.dependencies.len() + self.peer_dependencies.len() + self.dev_dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DiffMode {
    /// Ranges must match exactly.
    #[default]
    Strict,
    /// A range narrower than the target is accepted.
    AllowSubset,
}

impl DiffMode {
    fn satisfies(&self, current: &str, target: &str) -> bool {
        match self {
            DiffMode::Strict => current == target,
            DiffMode::AllowSubset => is_subset(current, target),
        }
    }
}

/// Changes needed to turn `current` into `updated`. Neither manifest is touched.
pub fn diff(current: &PackageManifest, updated: &PackageManifest, mode: DiffMode) -> Changes {
    let mut all = Changes::default();
    for section in DependencySection::ALL {
        let current_deps = current.section(section).unwrap_or_default();
        let updated_deps = updated.section(section).unwrap_or_default();
        let changes = all.section_mut(section);

        for (dependency, target) in &updated_deps {
            match current_deps.get(dependency) {
                None => changes.push(Change::Added {
                    dependency: dependency.clone(),
                    target: target.clone(),
                }),
                Some(found) if !mode.satisfies(found, target) => changes.push(Change::Changed {
                    dependency: dependency.clone(),
                    target: target.clone(),
                    current: found.clone(),
                }),
                Some(_) => {}
            }
        }
        for dependency in current.dependency_names(section) {
            if !updated_deps.contains_key(&dependency) {
                changes.push(Change::Removed { dependency });
            }
        }
    }
    all
}

/// Dependencies of `manifest` that a capability missing from `capabilities`
/// would manage.
pub fn find_unmanaged(
    manifest: &PackageManifest,
    capabilities: &[Capability],
    profiles: &[&Profile],
) -> Vec<Unmanaged> {
    let mut managed = BTreeSet::new();
    for profile in profiles {
        let mut resolver = CapabilityResolver::new(profile);
        resolver.resolve_all(capabilities);
        managed.extend(resolver.packages().keys().cloned());
    }

    let mut found = Vec::new();
    for dependency in manifest.all_dependency_names() {
        if managed.contains(&dependency) {
            continue;
        }
        let capability = profiles.iter().find_map(|profile| {
            profile.iter().find_map(|(capability, entry)| {
                let pkg = entry.as_package()?;
                (pkg.name == dependency && !capabilities.contains(capability)).then(|| capability.clone())
            })
        });
        if let Some(capability) = capability {
            found.push(Unmanaged { dependency, capability });
        }
    }
    found
}

/// One tree line per change, closed by a hint to re-run with `--write`.
pub fn stringify(changes: &Changes, include_unmanaged: bool) -> String {
    let mut output = Vec::new();
    for section in DependencySection::ALL {
        for change in changes.section(section) {
            let prefix = format!("      ├── {}[\"{}\"]:", section, change.dependency());
            output.push(match change {
                Change::Added { target, .. } => {
                    format!("{prefix} dependency is missing, expected \"{target}\"")
                }
                Change::Changed { target, current, .. } => {
                    format!("{prefix} found \"{current}\", expected \"{target}\"")
                }
                Change::Removed { .. } => format!("{prefix} should be removed"),
            });
        }
    }
    if include_unmanaged {
        for hint in &changes.unmanaged {
            output.push(format!(
                "      ├── capabilities[\"{}\"]: can be managed by '{}'",
                hint.dependency, hint.capability
            ));
        }
    }
    if !output.is_empty() {
        output.push("      └── Re-run with '--write' to fix them".into());
    }
    output.join("\n")
}

/// `manifest` with `changes` applied. Entries that already satisfied their
/// target are left as they are.
pub fn apply(manifest: &PackageManifest, changes: &Changes) -> PackageManifest {
    let mut patched = manifest.clone();
    for section in DependencySection::ALL {
        let section_changes = changes.section(section);
        if section_changes.is_empty() {
            continue;
        }
        let mut deps = manifest.section(section).unwrap_or_default();
        for change in section_changes {
            match change {
                Change::Added { dependency, target } | Change::Changed { dependency, target, .. } => {
                    deps.insert(dependency.clone(), target.clone());
                }
                Change::Removed { dependency } => {
                    deps.remove(dependency);
                }
            }
        }
        patched.set_section(section, Some(deps));
    }
    patched
}
