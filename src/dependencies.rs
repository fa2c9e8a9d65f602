//! Walking the installed dependency graph to collect inherited requirements.

use crate::config::inherited_config;
use crate::error::{AlignError, AlignResult};
use crate::fsutil::{manifest_path, PackageLocator};
use crate::manifest::{self, DependencySection, PackageManifest};
use crate::preset::{filter_preset, Capability, Preset};
use crate::reporter::Reporter;
use indexmap::IndexSet;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// One narrowing of the viable profiles while walking the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub module: String,
    pub requirements: Vec<String>,
    pub profiles: Vec<String>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] satisfies '{}' because it requires {}",
            self.profiles.join(", "),
            self.module,
            self.requirements.join(", ")
        )
    }
}

/// Full explanation of why no profile is left.
pub fn format_trace(trace: &[TraceEntry]) -> String {
    let mut message = String::from("No profiles could satisfy all requirements");
    for entry in trace {
        message.push_str("\n\t");
        message.push_str(&entry.to_string());
    }
    message
}

/// Pre-order walk over `dependencies`, visiting every package name once.
pub struct DependencyWalker<'a> {
    locator: &'a dyn PackageLocator,
    reporter: &'a dyn Reporter,
    visited: HashSet<String>,
}

impl<'a> DependencyWalker<'a> {
    pub fn new(locator: &'a dyn PackageLocator, reporter: &'a dyn Reporter) -> Self {
        Self { locator, reporter, visited: HashSet::new() }
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn walk<F>(&mut self, manifest: &PackageManifest, project_root: &Path, visitor: &mut F)
    where
        F: FnMut(&str, &Path, &PackageManifest),
    {
        for dependency in manifest.dependency_names(DependencySection::Dependencies) {
            if !self.visited.insert(dependency.clone()) {
                continue;
            }
            let Some(package_dir) = self.locator.find_package_dir(&dependency, project_root) else {
                self.reporter.warn(&format!(
                    "Unable to resolve module '{}' from '{}'",
                    dependency,
                    project_root.display()
                ));
                continue;
            };
            let dep_manifest = match manifest::load(&manifest_path(&package_dir)) {
                Ok(m) => m,
                Err(e) => {
                    self.reporter.warn(&format!("Skipping '{dependency}': {e:#}"));
                    continue;
                }
            };
            visitor(&dependency, &package_dir, &dep_manifest);
            self.walk(&dep_manifest, &package_dir, visitor);
        }
    }
}

/// Result of [`gather_requirements`].
#[derive(Debug, Clone)]
pub struct Gathered {
    pub preset: Preset,
    pub capabilities: Vec<Capability>,
    pub trace: Vec<TraceEntry>,
}

/// Narrow `preset` by the requirements of every configured package in the
/// dependency graph and collect the capabilities they need from the app.
///
/// When nothing is left, strict mode fails with the full trace. Loose mode
/// warns and carries on with the last profiles that satisfied everyone.
#[allow(clippy::too_many_arguments)]
pub fn gather_requirements(
    project_root: &Path,
    manifest: &PackageManifest,
    preset: Preset,
    requirements: &[String],
    app_capabilities: &[Capability],
    loose: bool,
    locator: &dyn PackageLocator,
    reporter: &dyn Reporter,
) -> AlignResult<Gathered> {
    let mut preset = preset;
    let mut inherited: IndexSet<Capability> = IndexSet::new();
    let mut trace = vec![TraceEntry {
        module: manifest.name().to_string(),
        requirements: requirements.to_vec(),
        profiles: preset.keys().cloned().collect(),
    }];
    let mut exhausted = false;
    let mut failure: Option<AlignError> = None;

    let mut walker = DependencyWalker::new(locator, reporter);
    walker.walk(manifest, project_root, &mut |module: &str, _dir: &Path, dep_manifest: &PackageManifest| {
        if failure.is_some() {
            return;
        }
        let Some(config) = dep_manifest.kit_config().and_then(inherited_config) else {
            return;
        };
        inherited.extend(config.capabilities.iter().cloned());

        let filtered = match filter_preset(&preset, &config.requirements) {
            Ok(filtered) => filtered,
            Err(e) => {
                failure = Some(e);
                return;
            }
        };
        if filtered.len() != preset.len() {
            trace.push(TraceEntry {
                module: module.to_string(),
                requirements: config.requirements.clone(),
                profiles: filtered.keys().cloned().collect(),
            });
        }
        // Keep walking so the trace names every module that cannot be satisfied.
        if filtered.is_empty() {
            exhausted = true;
        } else {
            preset = filtered;
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    if exhausted {
        let message = format_trace(&trace);
        if loose {
            reporter.warn(&message);
        } else {
            reporter.error(&message);
            return Err(AlignError::NoProfilesSatisfyAll { trace });
        }
    }

    inherited.retain(|capability| {
        !is_core_capability(capability) && !is_dev_only_capability(capability, &preset)
    });
    inherited.extend(app_capabilities.iter().cloned());

    Ok(Gathered { preset, capabilities: inherited.into_iter().collect(), trace })
}

/// Platform-specific core capabilities, which only the app itself can declare.
pub fn is_core_capability(capability: &str) -> bool {
    capability.starts_with("core-")
}

/// Dev-only in every profile that defines it.
pub fn is_dev_only_capability(capability: &str, preset: &Preset) -> bool {
    let mut defined = preset.values().filter_map(|profile| profile.get(capability)).peekable();
    defined.peek().is_some() && defined.all(|entry| entry.dev_only())
}
