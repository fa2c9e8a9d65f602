use crate::capabilities::{resolve_capabilities, ResolvedPackages};
use crate::config::KitType;
use crate::manifest::{Dependencies, DependencySection, PackageManifest};
use crate::preset::{Capability, Package, Profile};
use crate::reporter::Reporter;

/// How the resolved versions of a package collapse into one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyType {
    /// Highest version: what an app ships with.
    Direct,
    /// Lowest version: what a library develops against.
    Development,
    /// Every version: what a library accepts from its consumer.
    Peer,
}

impl DependencyType {
    pub fn version_range(&self, versions: &[Package]) -> Option<String> {
        match self {
            DependencyType::Direct => versions.last().map(|p| p.version.clone()),
            DependencyType::Development => versions.first().map(|p| p.version.clone()),
            DependencyType::Peer if versions.is_empty() => None,
            DependencyType::Peer => {
                Some(versions.iter().map(|p| p.version.as_str()).collect::<Vec<_>>().join(" || "))
            }
        }
    }

    fn accepts(&self, pkg: &Package) -> bool {
        !pkg.dev_only || *self == DependencyType::Development
    }
}

/// Set every resolved package in `dependencies`, leaving other entries alone.
pub fn update_dependencies(
    dependencies: Option<Dependencies>,
    packages: &ResolvedPackages,
    dependency_type: DependencyType,
) -> Dependencies {
    let mut dependencies = dependencies.unwrap_or_default();
    for (name, versions) in packages {
        let Some(first) = versions.first() else { continue };
        if !dependency_type.accepts(first) {
            continue;
        }
        if let Some(range) = dependency_type.version_range(versions) {
            dependencies.insert(name.clone(), range);
        }
    }
    dependencies
}

pub fn remove_keys(dependencies: Option<Dependencies>, names: &[&str]) -> Option<Dependencies> {
    dependencies.map(|mut deps| {
        for name in names {
            deps.remove(*name);
        }
        deps
    })
}

pub fn dev_only_packages(packages: &ResolvedPackages) -> ResolvedPackages {
    packages
        .iter()
        .filter(|(_, versions)| versions.iter().any(|p| p.dev_only))
        .map(|(name, versions)| (name.clone(), versions.clone()))
        .collect()
}

/// The manifest as it should look for `capabilities`.
///
/// Apps get the packages as direct dependencies and dev-only packages in
/// `devDependencies`. Libraries get them as peer dependencies, with the
/// development profiles' versions in `devDependencies`. Sections left empty
/// are dropped.
pub fn update_package_manifest(
    manifest: &PackageManifest,
    capabilities: &[Capability],
    prod_profiles: &[&Profile],
    dev_profiles: &[&Profile],
    kit_type: KitType,
    reporter: &dyn Reporter,
) -> PackageManifest {
    let packages = resolve_capabilities(capabilities, prod_profiles, reporter);
    let names: Vec<&str> = packages.keys().map(String::as_str).collect();
    let mut updated = manifest.clone();

    match kit_type {
        KitType::App => {
            let deps = update_dependencies(
                manifest.section(DependencySection::Dependencies),
                &packages,
                DependencyType::Direct,
            );
            let peers = remove_keys(manifest.section(DependencySection::PeerDependencies), &names);
            let dev = update_dependencies(
                remove_keys(manifest.section(DependencySection::DevDependencies), &names),
                &dev_only_packages(&packages),
                DependencyType::Development,
            );
            updated.set_section(DependencySection::Dependencies, Some(deps));
            updated.set_section(DependencySection::PeerDependencies, peers);
            updated.set_section(DependencySection::DevDependencies, Some(dev));
        }
        KitType::Library => {
            let dev_packages = resolve_capabilities(capabilities, dev_profiles, reporter);
            let deps = remove_keys(manifest.section(DependencySection::Dependencies), &names);
            let peers = update_dependencies(
                manifest.section(DependencySection::PeerDependencies),
                &packages,
                DependencyType::Peer,
            );
            let dev = update_dependencies(
                manifest.section(DependencySection::DevDependencies),
                &dev_packages,
                DependencyType::Development,
            );
            updated.set_section(DependencySection::Dependencies, deps);
            updated.set_section(DependencySection::PeerDependencies, Some(peers));
            updated.set_section(DependencySection::DevDependencies, Some(dev));
        }
    }
    updated
}
