//! Checking packages that have no configuration of their own.
//!
//! Without configuration there is no telling whether a dependency should be
//! direct or peer, so only the versions of dependencies already present are
//! compared against every capability of the selected profiles.

use crate::capabilities::resolve_capabilities;
use crate::check::{check_config, AlignContext, CheckOptions};
use crate::config::{self, AlignConfig, AlignDepsConfig, KitType, Requirements};
use crate::error::{AlignError, AlignResult};
use crate::manifest::{self, Dependencies, DependencySection, PackageManifest};
use crate::manifest_updates::{update_dependencies, DependencyType};
use crate::preset::{all_capabilities, ensure_profiles, filter_preset, profiles_of, Preset};
use crate::range::is_subset;
use std::fmt;
use std::path::Path;

/// The versions an unconfigured package is held to, per section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestProfile {
    pub dependencies: Dependencies,
    pub peer_dependencies: Dependencies,
    pub dev_dependencies: Dependencies,
}

impl ManifestProfile {
    pub fn section(&self, section: DependencySection) -> &Dependencies {
        match section {
            DependencySection::Dependencies => &self.dependencies,
            DependencySection::PeerDependencies => &self.peer_dependencies,
            DependencySection::DevDependencies => &self.dev_dependencies,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub name: String,
    pub from: String,
    pub to: String,
    pub section: DependencySection,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\" -> \"{}\" ({})", self.name, self.from, self.to, self.section)
    }
}

/// Target versions for every capability not already declared by `config`.
pub fn build_manifest_profile(config: &AlignConfig, ctx: &AlignContext<'_>) -> AlignResult<ManifestProfile> {
    let align_deps = &config.align_deps;
    let merged = ctx.registry.merged(&align_deps.presets, config.project_root())?;
    let select = |requirements: &[String]| -> AlignResult<Preset> {
        ensure_profiles(filter_preset(&merged, requirements)?, requirements)
    };

    let (target, support) = match (&align_deps.requirements, config.kit_type) {
        (Requirements::Uniform(requirements), _) => {
            let preset = select(requirements.as_slice())?;
            (preset.clone(), preset)
        }
        (Requirements::Split { production, .. }, KitType::App) => {
            let preset = select(production.as_slice())?;
            (preset.clone(), preset)
        }
        (Requirements::Split { development, production }, KitType::Library) => {
            (select(development.as_slice())?, select(production.as_slice())?)
        }
    };

    let unmanaged: Vec<String> = all_capabilities(&target)
        .into_iter()
        .filter(|capability| !align_deps.capabilities.contains(capability))
        .collect();

    // Development picks so that dev-only packages are checked wherever they appear.
    let direct = update_dependencies(
        None,
        &resolve_capabilities(&unmanaged, &profiles_of(&target), ctx.reporter),
        DependencyType::Development,
    );
    let peer = update_dependencies(
        None,
        &resolve_capabilities(&unmanaged, &profiles_of(&support), ctx.reporter),
        DependencyType::Peer,
    );

    Ok(ManifestProfile { dependencies: direct.clone(), peer_dependencies: peer, dev_dependencies: direct })
}

/// Compare present dependencies with `profile`. Direct sections must match
/// exactly; a peer range passes when it contains the target. With `write`,
/// misaligned entries in `manifest` are replaced by their target.
pub fn inspect(manifest: &mut PackageManifest, profile: &ManifestProfile, write: bool) -> Vec<Violation> {
    let mut violations = Vec::new();
    for section in DependencySection::ALL {
        let Some(mut dependencies) = manifest.section(section) else {
            continue;
        };
        let desired = profile.section(section);
        let mut touched = false;
        for (name, from) in dependencies.iter_mut() {
            let Some(to) = desired.get(name) else { continue };
            let misaligned = match section {
                DependencySection::PeerDependencies => *from != *to && !is_subset(to, from),
                _ => *from != *to,
            };
            if !misaligned {
                continue;
            }
            violations.push(Violation { name: name.clone(), from: from.clone(), to: to.clone(), section });
            if write {
                *from = to.clone();
                touched = true;
            }
        }
        if touched {
            manifest.set_section(section, Some(dependencies));
        }
    }
    violations
}

/// Vigilant check of one package against `config`.
pub fn check_unconfigured(config: &AlignConfig, options: &CheckOptions, ctx: &AlignContext<'_>) -> AlignResult<()> {
    let name = config.manifest.name();
    if options.exclude_packages.iter().any(|p| p == name) {
        return Ok(());
    }

    let profile = build_manifest_profile(config, ctx)?;
    let mut manifest = config.manifest.clone();
    let violations = inspect(&mut manifest, &profile, options.write);
    if violations.is_empty() {
        return Ok(());
    }
    if options.write {
        manifest::write(&manifest, &config.manifest_path)
            .map_err(|e| AlignError::write_failed(&config.manifest_path, e))?;
        return Ok(());
    }

    let lines: Vec<String> = violations.iter().map(|v| format!("\t{v}")).collect();
    ctx.reporter.error(&format!(
        "Found {} violation(s) in {}:\n{}",
        violations.len(),
        name,
        lines.join("\n")
    ));
    Err(AlignError::Unsatisfied(violations.len()))
}

/// The check run when requirements are given on the command line. Configured
/// packages get a regular check first; unconfigured ones are held to the
/// command line requirements.
pub fn check_vigilant(
    manifest_path: &Path,
    requirements: &[String],
    options: &CheckOptions,
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    let loaded = config::load_config(manifest_path, &options.exclude_packages, ctx.reporter)
        .and_then(|loaded| config::migrate_config(loaded, options.migrate_config, ctx.reporter));

    match loaded {
        Ok(mut config) => {
            check_config(&config, options, ctx)?;
            if options.write {
                config.manifest = config::load_manifest(manifest_path)?;
            }
            check_unconfigured(&config, options, ctx)
        }
        Err(AlignError::NotConfigured(_)) => {
            let config = AlignConfig {
                kit_type: KitType::Library,
                align_deps: AlignDepsConfig {
                    presets: options.presets_or_default(),
                    requirements: Requirements::Uniform(requirements.to_vec()),
                    capabilities: Vec::new(),
                },
                manifest: config::load_manifest(manifest_path)?,
                manifest_path: manifest_path.to_path_buf(),
            };
            check_unconfigured(&config, options, ctx)
        }
        Err(e) => Err(e),
    }
}
