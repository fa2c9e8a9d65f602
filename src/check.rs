//! Aligning a configured package with its presets.

use crate::config::{self, AlignConfig, KitType};
use crate::dependencies::gather_requirements;
use crate::diff::{self, find_unmanaged, stringify, DiffMode};
use crate::error::{AlignError, AlignResult};
use crate::fsutil::PackageLocator;
use crate::manifest;
use crate::manifest_updates::update_package_manifest;
use crate::preset::{ensure_profiles, filter_preset, profiles_of, Capability, Preset, PresetRegistry};
use crate::reporter::Reporter;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Keep going with the last viable profiles when dependencies disagree.
    pub loose: bool,
    pub write: bool,
    pub diff_mode: DiffMode,
    pub no_unmanaged: bool,
    pub migrate_config: bool,
    pub exclude_packages: Vec<String>,
    /// Presets for packages configured from the command line.
    pub presets: Vec<String>,
    /// Requirements given on the command line; turns on vigilant checks.
    pub requirements: Option<Vec<String>>,
}

impl CheckOptions {
    pub fn presets_or_default(&self) -> Vec<String> {
        if self.presets.is_empty() {
            config::default_presets()
        } else {
            self.presets.clone()
        }
    }
}

/// Collaborators shared by every manifest in a run.
#[derive(Clone, Copy)]
pub struct AlignContext<'a> {
    pub registry: &'a PresetRegistry,
    pub locator: &'a dyn PackageLocator,
    pub reporter: &'a dyn Reporter,
}

/// Profiles and capabilities a package is aligned against.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub dev_preset: Preset,
    pub prod_preset: Preset,
    pub capabilities: Vec<Capability>,
}

/// Select development and production profiles for `config`. Apps also pick
/// up the requirements and capabilities of their dependencies.
pub fn resolve(config: &AlignConfig, loose: bool, ctx: &AlignContext<'_>) -> AlignResult<Resolved> {
    let align_deps = &config.align_deps;
    let project_root = config.project_root();
    let merged = ctx.registry.merged(&align_deps.presets, project_root)?;

    let prod_requirements = align_deps.requirements.production();
    let prod_preset = ensure_profiles(filter_preset(&merged, prod_requirements)?, prod_requirements)?;

    // Apps have no development profiles.
    if config.kit_type == KitType::App {
        let gathered = gather_requirements(
            project_root,
            &config.manifest,
            prod_preset,
            prod_requirements,
            &align_deps.capabilities,
            loose,
            ctx.locator,
            ctx.reporter,
        )?;
        return Ok(Resolved {
            dev_preset: Preset::new(),
            prod_preset: gathered.preset,
            capabilities: gathered.capabilities,
        });
    }

    let dev_requirements = align_deps.requirements.development();
    let dev_preset = ensure_profiles(filter_preset(&merged, dev_requirements)?, dev_requirements)?;
    Ok(Resolved { dev_preset, prod_preset, capabilities: align_deps.capabilities.clone() })
}

/// Load, migrate and check the manifest at `manifest_path`.
pub fn check_package_manifest(
    manifest_path: &Path,
    options: &CheckOptions,
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    let loaded = config::load_config(manifest_path, &options.exclude_packages, ctx.reporter)?;
    let config = config::migrate_config(loaded, options.migrate_config, ctx.reporter)?;
    check_config(&config, options, ctx)
}

/// Compare the manifest in `config` with what its capabilities call for.
///
/// With `write`, the manifest on disk is fixed and the check succeeds.
pub fn check_config(config: &AlignConfig, options: &CheckOptions, ctx: &AlignContext<'_>) -> AlignResult<()> {
    let resolved = resolve(config, options.loose, ctx)?;
    if resolved.capabilities.is_empty() {
        return Ok(());
    }

    let prod_names: Vec<String> = resolved.prod_preset.keys().cloned().collect();
    let dev_names: Vec<String> = resolved.dev_preset.keys().cloned().collect();
    match config.kit_type {
        KitType::App => {
            if prod_names.len() > 1 {
                ctx.reporter.error(&format!(
                    "{}: apps must target exactly one profile, but the requirements are satisfied by: {}",
                    config.manifest_path.display(),
                    prod_names.join(", ")
                ));
                return Err(AlignError::InvalidAppRequirements(prod_names));
            }
            ctx.reporter.info(&format!(
                "Aligning your app's dependencies according to the following profiles: {}",
                prod_names.join(", ")
            ));
        }
        KitType::Library => {
            ctx.reporter.info("Aligning your library's dependencies according to the following profiles:");
            ctx.reporter.info(&format!("\t- Development: {}", dev_names.join(", ")));
            ctx.reporter.info(&format!("\t- Production: {}", prod_names.join(", ")));
        }
    }

    let prod_profiles = profiles_of(&resolved.prod_preset);
    let dev_profiles = profiles_of(&resolved.dev_preset);
    let updated = update_package_manifest(
        &config.manifest,
        &resolved.capabilities,
        &prod_profiles,
        &dev_profiles,
        config.kit_type,
        ctx.reporter,
    );

    let mut changes = diff::diff(&config.manifest, &updated, options.diff_mode);
    if !options.no_unmanaged {
        changes.unmanaged = find_unmanaged(&config.manifest, &resolved.capabilities, &prod_profiles);
    }

    let name = config.manifest.name();
    if changes.is_empty() {
        if !changes.unmanaged.is_empty() {
            ctx.reporter.info(&format!("{name}\n{}", stringify(&changes, true)));
        }
        return Ok(());
    }

    if options.write {
        let patched = diff::apply(&config.manifest, &changes);
        manifest::write(&patched, &config.manifest_path)
            .map_err(|e| AlignError::write_failed(&config.manifest_path, e))?;
        return Ok(());
    }

    ctx.reporter.error(&format!("{name}\n{}", stringify(&changes, !options.no_unmanaged)));
    Err(AlignError::Unsatisfied(changes.len()))
}
