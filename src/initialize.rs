use crate::capabilities::capabilities_for;
use crate::check::AlignContext;
use crate::config::{self, KitType, Requirements};
use crate::error::{AlignError, AlignResult};
use crate::manifest::{self, DependencySection, PackageManifest};
use crate::preset::{filter_preset, Preset};
use crate::range::{drop_patch, min_version};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Capability whose package every aligned package must depend on.
pub const CORE_CAPABILITY: &str = "core";

/// Name of the package providing `core` in the first profile that has one.
pub fn core_package_name(preset: &Preset) -> Option<String> {
    preset
        .values()
        .find_map(|profile| profile.get(CORE_CAPABILITY)?.as_package().map(|p| p.name.clone()))
}

/// `manifest` with a fresh `alignDeps` block, derived from the range it
/// declares for the core package. `None` if it is already configured.
pub fn initialize_config(
    manifest: &PackageManifest,
    project_root: &Path,
    kit_type: KitType,
    presets: &[String],
    ctx: &AlignContext<'_>,
) -> AlignResult<Option<PackageManifest>> {
    let existing = manifest.kit_config().cloned();
    if existing.as_ref().and_then(|c| c.get("alignDeps")).is_some() {
        return Ok(None);
    }

    let merged = ctx.registry.merged(presets, project_root)?;
    let core = core_package_name(&merged).ok_or_else(|| {
        AlignError::InvalidConfiguration(format!(
            "none of the presets provide the '{CORE_CAPABILITY}' capability"
        ))
    })?;

    let lookup = |section| manifest.section(section).and_then(|deps| deps.get(&core).cloned());
    let Some(target) = lookup(DependencySection::PeerDependencies)
        .or_else(|| lookup(DependencySection::Dependencies))
        .or_else(|| lookup(DependencySection::DevDependencies))
    else {
        return Err(AlignError::MissingRequiredDependency {
            package: manifest.name().to_string(),
            dependency: core.clone(),
        });
    };

    let production = vec![format!("{core}@{}", drop_patch(&target))];
    let preset = filter_preset(&merged, &production)?;
    let requirements = match kit_type {
        KitType::App => Requirements::Uniform(production),
        KitType::Library => {
            let dev_range = match lookup(DependencySection::DevDependencies) {
                Some(range) => range,
                None => min_version(&target)
                    .ok_or_else(|| {
                        AlignError::InvalidVersionRange(format!(
                            "Could not determine the lowest version that satisfies range: {target}"
                        ))
                    })?
                    .to_string(),
            };
            Requirements::Split {
                development: vec![format!("{core}@{}", drop_patch(&dev_range))],
                production,
            }
        }
    };

    let mut align_deps = Map::new();
    if presets != config::default_presets().as_slice() {
        align_deps.insert("presets".into(), json!(presets));
    }
    align_deps.insert("requirements".into(), config::to_value(&requirements)?);
    align_deps.insert("capabilities".into(), json!(capabilities_for(manifest, &preset)));

    let mut kit_config = match existing {
        Some(Value::Object(fields)) => fields,
        _ => Map::new(),
    };
    kit_config.insert("kitType".into(), config::to_value(&kit_type)?);
    kit_config.insert("alignDeps".into(), Value::Object(align_deps));

    let mut updated = manifest.clone();
    updated.set_kit_config(Value::Object(kit_config));
    Ok(Some(updated))
}

/// Write an initial configuration into the manifest at `manifest_path`.
pub fn init_package_manifest(
    manifest_path: &Path,
    kit_type: KitType,
    presets: &[String],
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    let manifest = config::load_manifest(manifest_path)?;
    let project_root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    match initialize_config(&manifest, project_root, kit_type, presets, ctx)? {
        Some(updated) => {
            manifest::write(&updated, manifest_path)
                .map_err(|e| AlignError::write_failed(manifest_path, e))?;
            ctx.reporter.info(&format!("{}: initialized as {kit_type}", manifest.name()));
            Ok(())
        }
        None => Ok(()),
    }
}
