//! Capability resolution: turning capability names into concrete packages.

use crate::error::{AlignError, AlignResult};
use crate::manifest::PackageManifest;
use crate::preset::{Capability, Package, Preset, Profile, ProfileEntry};
use crate::range::min_version;
use crate::reporter::Reporter;
use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Package name to every distinct version resolved for it, lowest first.
pub type ResolvedPackages = BTreeMap<String, Vec<Package>>;

/// Resolves capabilities against a single profile.
///
/// The visited set is shared by every capability resolved through one
/// resolver, so a capability is expanded at most once and alias cycles
/// terminate.
pub struct CapabilityResolver<'a> {
    profile: &'a Profile,
    visited: HashSet<Capability>,
    packages: ResolvedPackages,
    unresolved: IndexSet<Capability>,
}

impl<'a> CapabilityResolver<'a> {
    pub fn new(profile: &'a Profile) -> Self {
        Self::seeded(profile, ResolvedPackages::new(), HashSet::new())
    }

    /// Continue from an earlier resolution's packages and visited set.
    pub fn seeded(
        profile: &'a Profile,
        packages: ResolvedPackages,
        visited: HashSet<Capability>,
    ) -> Self {
        Self { profile, visited, packages, unresolved: IndexSet::new() }
    }

    pub fn resolve(&mut self, capability: &str) {
        if !self.visited.insert(capability.to_string()) {
            return;
        }
        let profile = self.profile;
        let Some(entry) = profile.get(capability) else {
            self.unresolved.insert(capability.to_string());
            return;
        };
        for dependency in entry.capabilities() {
            self.resolve(dependency);
        }
        if let ProfileEntry::Package(pkg) = entry {
            add_package(&mut self.packages, pkg);
        }
    }

    pub fn resolve_all<S: AsRef<str>>(&mut self, capabilities: &[S]) {
        for capability in capabilities {
            self.resolve(capability.as_ref());
        }
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.unresolved.iter().map(String::as_str)
    }

    pub fn packages(&self) -> &ResolvedPackages {
        &self.packages
    }

    pub fn into_parts(self) -> (ResolvedPackages, HashSet<Capability>, Vec<Capability>) {
        (self.packages, self.visited, self.unresolved.into_iter().collect())
    }
}

fn add_package(packages: &mut ResolvedPackages, pkg: &Package) {
    let versions = packages.entry(pkg.name.clone()).or_default();
    if !versions.iter().any(|existing| existing.version == pkg.version) {
        versions.push(pkg.clone());
    }
}

/// Resolve `capabilities` in every profile, merging the packages.
///
/// Capabilities missing from some profile are reported as one warning.
pub fn resolve_capabilities<S: AsRef<str>>(
    capabilities: &[S],
    profiles: &[&Profile],
    reporter: &dyn Reporter,
) -> ResolvedPackages {
    let (packages, unresolved) = resolve_in_profiles(capabilities, profiles);
    if !unresolved.is_empty() {
        reporter.warn(&unresolved_message(&unresolved));
    }
    packages
}

/// Like [`resolve_capabilities`], but any unresolved capability is an error.
pub fn resolve_capabilities_strict<S: AsRef<str>>(
    capabilities: &[S],
    profiles: &[&Profile],
) -> AlignResult<ResolvedPackages> {
    let (packages, unresolved) = resolve_in_profiles(capabilities, profiles);
    if !unresolved.is_empty() {
        return Err(AlignError::UnresolvedCapabilities(unresolved));
    }
    Ok(packages)
}

fn resolve_in_profiles<S: AsRef<str>>(
    capabilities: &[S],
    profiles: &[&Profile],
) -> (ResolvedPackages, Vec<Capability>) {
    let mut packages = ResolvedPackages::new();
    let mut unresolved: IndexSet<Capability> = IndexSet::new();
    for profile in profiles {
        let mut resolver = CapabilityResolver::seeded(profile, packages, HashSet::new());
        resolver.resolve_all(capabilities);
        let (resolved, _, missing) = resolver.into_parts();
        packages = resolved;
        unresolved.extend(missing);
    }
    sort_versions(&mut packages);
    (packages, unresolved.into_iter().collect())
}

fn unresolved_message(unresolved: &[Capability]) -> String {
    let mut message =
        String::from("The following capabilities could not be resolved for one or more profiles:");
    for capability in unresolved {
        message.push_str("\n\t");
        message.push_str(capability);
    }
    message
}

/// Order each package's versions by the lowest version their range admits.
/// Lists with a range that has no lower bound we can compute stay as they are.
pub fn sort_versions(packages: &mut ResolvedPackages) {
    for versions in packages.values_mut() {
        let keys: Option<Vec<_>> = versions.iter().map(|p| min_version(&p.version)).collect();
        let Some(keys) = keys else { continue };
        let mut keyed: Vec<_> = keys.into_iter().zip(versions.drain(..)).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        versions.extend(keyed.into_iter().map(|(_, pkg)| pkg));
    }
}

/// Capabilities whose package appears in any dependency section of `manifest`.
pub fn capabilities_for(manifest: &PackageManifest, preset: &Preset) -> Vec<Capability> {
    let dependencies = manifest.all_dependency_names();
    if dependencies.is_empty() {
        return Vec::new();
    }
    let mut found = BTreeSet::new();
    for profile in preset.values() {
        for (capability, entry) in profile {
            if dependencies.contains(entry.name()) {
                found.insert(capability.clone());
            }
        }
    }
    found.into_iter().collect()
}
