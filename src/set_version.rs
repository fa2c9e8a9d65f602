use crate::check::{check_config, check_package_manifest, AlignContext, CheckOptions};
use crate::config::{self, AlignDepsConfig, KitType, Requirements};
use crate::error::{AlignError, AlignResult};
use crate::initialize::core_package_name;
use crate::manifest;
use crate::preset::{Preset, DEFAULT_PRESET};
use crate::range::coerce;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Versions parsed from `--set-version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTarget {
    /// Version to develop against; the first one given.
    pub target: String,
    /// Every supported version, ascending.
    pub supported: Vec<String>,
}

/// Parse `0.80,0.79` into `major.minor` versions. When `known` is given,
/// every version must name one of its profiles.
pub fn parse_versions(input: &str, known: Option<&Preset>) -> AlignResult<VersionTarget> {
    let mut parsed = Vec::new();
    for raw in input.split(',') {
        let raw = raw.trim();
        let version = coerce(raw).ok_or_else(|| {
            AlignError::InvalidConfiguration(format!("'{raw}' is not a valid version number"))
        })?;
        let short = format!("{}.{}", version.major, version.minor);
        if let Some(preset) = known {
            if !preset.contains_key(&short) {
                return Err(AlignError::InvalidConfiguration(format!(
                    "'{short}' is not a supported version"
                )));
            }
        }
        parsed.push((version, short));
    }
    let target = parsed
        .first()
        .map(|(_, short)| short.clone())
        .ok_or_else(|| AlignError::InvalidConfiguration("no versions were given".into()))?;
    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    parsed.dedup_by(|a, b| a.1 == b.1);
    Ok(VersionTarget { target, supported: parsed.into_iter().map(|(_, short)| short).collect() })
}

/// Versions accepted for the built-in preset of `ctx`, if it has one.
pub fn parse_versions_for(input: &str, ctx: &AlignContext<'_>) -> AlignResult<VersionTarget> {
    parse_versions(input, ctx.registry.get(DEFAULT_PRESET))
}

fn set_requirement(requirements: &mut [String], package: &str, range: &str) {
    let prefix = format!("{package}@");
    if let Some(entry) = requirements.iter_mut().find(|r| r.starts_with(&prefix)) {
        *entry = format!("{prefix}{range}");
    }
}

/// Point the core package requirements of `align_deps` at new versions.
pub fn update_requirements(
    align_deps: &mut AlignDepsConfig,
    package: &str,
    prod_range: &str,
    dev_range: &str,
) {
    match &mut align_deps.requirements {
        Requirements::Uniform(list) => set_requirement(list, package, prod_range),
        Requirements::Split { development, production } => {
            set_requirement(production, package, prod_range);
            set_requirement(development, package, dev_range);
        }
    }
}

/// Move an aligned package to new versions and re-align it.
///
/// The package must be configured and currently aligned.
pub fn set_version(
    manifest_path: &Path,
    versions: &VersionTarget,
    options: &CheckOptions,
    ctx: &AlignContext<'_>,
) -> AlignResult<()> {
    let loaded = config::load_config(manifest_path, &options.exclude_packages, ctx.reporter)?;
    let mut config = loaded.into_current();

    let check_only = CheckOptions { loose: false, write: false, ..options.clone() };
    check_config(&config, &check_only, ctx)?;

    let merged = ctx.registry.merged(&config.align_deps.presets, config.project_root())?;
    let core = core_package_name(&merged).unwrap_or_else(|| "react-native".to_string());
    match config.kit_type {
        KitType::App => {
            update_requirements(&mut config.align_deps, &core, &versions.target, &versions.target)
        }
        KitType::Library => update_requirements(
            &mut config.align_deps,
            &core,
            &versions.supported.join(" || "),
            &versions.target,
        ),
    }

    let mut align_deps = Map::new();
    if config.align_deps.presets != config::default_presets() {
        align_deps.insert("presets".into(), json!(config.align_deps.presets));
    }
    align_deps.insert("requirements".into(), config::to_value(&config.align_deps.requirements)?);
    align_deps.insert("capabilities".into(), json!(config.align_deps.capabilities));

    let mut kit_config = match config.manifest.kit_config() {
        Some(Value::Object(fields)) => fields.clone(),
        _ => Map::new(),
    };
    for key in config::LEGACY_KEYS {
        kit_config.shift_remove(key);
    }
    kit_config.insert("kitType".into(), config::to_value(&config.kit_type)?);
    kit_config.insert("alignDeps".into(), Value::Object(align_deps));
    config.manifest.set_kit_config(Value::Object(kit_config));
    manifest::write(&config.manifest, manifest_path)
        .map_err(|e| AlignError::write_failed(manifest_path, e))?;

    let write = CheckOptions { loose: false, write: true, ..options.clone() };
    check_package_manifest(manifest_path, &write, ctx)
}
