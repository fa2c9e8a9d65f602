//! The `rnx-kit` configuration block of a package manifest.

use crate::error::{AlignError, AlignResult};
use crate::manifest::{self, PackageManifest, KIT_CONFIG_KEY};
use crate::preset::DEFAULT_PRESET;
use crate::range::drop_patch;
use crate::reporter::Reporter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Keys of the configuration schema that `alignDeps` replaced.
pub const LEGACY_KEYS: [&str; 4] =
    ["capabilities", "customProfiles", "reactNativeDevVersion", "reactNativeVersion"];

pub fn default_presets() -> Vec<String> {
    vec![DEFAULT_PRESET.to_string()]
}

/// Whether a package provides dependencies (`app`) or expects its consumer
/// to provide them (`library`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KitType {
    App,
    #[default]
    Library,
}

impl KitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KitType::App => "app",
            KitType::Library => "library",
        }
    }
}

impl fmt::Display for KitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirements {
    Uniform(Vec<String>),
    Split {
        #[serde(default)]
        development: Vec<String>,
        #[serde(default)]
        production: Vec<String>,
    },
}

impl Default for Requirements {
    fn default() -> Self {
        Requirements::Uniform(Vec::new())
    }
}

impl Requirements {
    pub fn production(&self) -> &[String] {
        match self {
            Requirements::Uniform(list) => list,
            Requirements::Split { production, .. } => production,
        }
    }

    pub fn development(&self) -> &[String] {
        match self {
            Requirements::Uniform(list) => list,
            Requirements::Split { development, .. } => development,
        }
    }

    /// Path of the first empty list, relative to `requirements`.
    fn first_empty(&self) -> Option<&'static str> {
        match self {
            Requirements::Uniform(list) if list.is_empty() => Some("requirements"),
            Requirements::Uniform(_) => None,
            Requirements::Split { development, .. } if development.is_empty() => {
                Some("requirements.development")
            }
            Requirements::Split { production, .. } if production.is_empty() => {
                Some("requirements.production")
            }
            Requirements::Split { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignDepsConfig {
    pub presets: Vec<String>,
    pub requirements: Requirements,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

impl Default for AlignDepsConfig {
    fn default() -> Self {
        Self { presets: default_presets(), requirements: Requirements::default(), capabilities: Vec::new() }
    }
}

/// `alignDeps` as written by the user, before defaults are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAlignDeps {
    presets: Option<Vec<String>>,
    requirements: Option<Requirements>,
    capabilities: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KitConfig {
    kit_type: Option<KitType>,
    align_deps: Option<RawAlignDeps>,
    react_native_version: Option<String>,
    react_native_dev_version: Option<String>,
    capabilities: Option<Vec<String>>,
    custom_profiles: Option<String>,
}

/// A validated configuration together with the manifest it came from.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    pub kit_type: KitType,
    pub align_deps: AlignDepsConfig,
    pub manifest: PackageManifest,
    pub manifest_path: PathBuf,
}

impl AlignConfig {
    pub fn project_root(&self) -> &Path {
        self.manifest_path.parent().unwrap_or_else(|| Path::new("."))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyConfig {
    pub kit_type: KitType,
    pub react_native_version: String,
    pub react_native_dev_version: Option<String>,
    pub capabilities: Vec<String>,
    pub custom_profiles: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LoadedConfig {
    Current {
        config: AlignConfig,
        legacy_keys: Vec<&'static str>,
    },
    Legacy {
        legacy: LegacyConfig,
        manifest: PackageManifest,
        manifest_path: PathBuf,
    },
}

impl LoadedConfig {
    pub fn manifest(&self) -> &PackageManifest {
        match self {
            LoadedConfig::Current { config, .. } => &config.manifest,
            LoadedConfig::Legacy { manifest, .. } => manifest,
        }
    }

    /// The configuration in the current schema, without touching the manifest.
    pub fn into_current(self) -> AlignConfig {
        match self {
            LoadedConfig::Current { config, .. } => config,
            LoadedConfig::Legacy { legacy, manifest, manifest_path } => AlignConfig {
                kit_type: legacy.kit_type,
                align_deps: transform_config(&legacy),
                manifest,
                manifest_path,
            },
        }
    }
}

/// Requirements and capabilities a dependency passes on to its consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InheritedConfig {
    pub requirements: Vec<String>,
    pub capabilities: Vec<String>,
}

pub fn load_manifest(path: &Path) -> AlignResult<PackageManifest> {
    let manifest = manifest::load(path).map_err(|e| AlignError::InvalidManifest {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })?;
    if manifest.name().is_empty() || manifest.version().is_none() {
        return Err(AlignError::InvalidManifest {
            path: path.to_path_buf(),
            reason: "please make sure it's not missing 'name' or 'version'".into(),
        });
    }
    Ok(manifest)
}

/// Read and validate the configuration of the manifest at `manifest_path`.
pub fn load_config(
    manifest_path: &Path,
    exclude_packages: &[String],
    reporter: &dyn Reporter,
) -> AlignResult<LoadedConfig> {
    let manifest = load_manifest(manifest_path)?;
    if exclude_packages.iter().any(|p| p == manifest.name()) {
        return Err(AlignError::Excluded(manifest.name().to_string()));
    }

    let Some(raw) = manifest.kit_config() else {
        return Err(AlignError::NotConfigured(manifest_path.to_path_buf()));
    };
    let kit: KitConfig = serde_json::from_value(raw.clone()).map_err(|e| {
        let message = format!("{}: '{KIT_CONFIG_KEY}' is malformed: {e}", manifest_path.display());
        reporter.error(&message);
        AlignError::InvalidConfiguration(message)
    })?;
    let kit_type = kit.kit_type.unwrap_or_default();

    if let Some(align_deps) = kit.align_deps {
        let mut errors = Vec::new();
        if matches!(&align_deps.presets, Some(presets) if presets.is_empty()) {
            errors.push(format!("{}: 'alignDeps.presets' cannot be empty", manifest_path.display()));
        }
        let requirements = align_deps.requirements.unwrap_or_default();
        if let Some(key) = requirements.first_empty() {
            errors.push(format!("{}: 'alignDeps.{key}' cannot be empty", manifest_path.display()));
        }
        if !errors.is_empty() {
            for e in &errors {
                reporter.error(e);
            }
            return Err(AlignError::InvalidConfiguration(errors.join("\n")));
        }

        let legacy_keys = present_legacy_keys(raw);
        let config = AlignConfig {
            kit_type,
            align_deps: AlignDepsConfig {
                presets: align_deps.presets.unwrap_or_else(default_presets),
                requirements,
                capabilities: align_deps.capabilities.unwrap_or_default(),
            },
            manifest,
            manifest_path: manifest_path.to_path_buf(),
        };
        return Ok(LoadedConfig::Current { config, legacy_keys });
    }

    match kit.react_native_version {
        Some(react_native_version) => Ok(LoadedConfig::Legacy {
            legacy: LegacyConfig {
                kit_type,
                react_native_version,
                react_native_dev_version: kit.react_native_dev_version,
                capabilities: kit.capabilities.unwrap_or_default(),
                custom_profiles: kit.custom_profiles,
            },
            manifest,
            manifest_path: manifest_path.to_path_buf(),
        }),
        // An `rnx-kit` block used only by other tools.
        None => Err(AlignError::NotConfigured(manifest_path.to_path_buf())),
    }
}

fn present_legacy_keys(kit_config: &Value) -> Vec<&'static str> {
    LEGACY_KEYS.iter().copied().filter(|key| kit_config.get(key).is_some()).collect()
}

/// Express a legacy configuration in the current schema.
pub fn transform_config(legacy: &LegacyConfig) -> AlignDepsConfig {
    let prod_version = drop_patch(&legacy.react_native_version);
    let dev_version = drop_patch(
        legacy.react_native_dev_version.as_deref().unwrap_or(&legacy.react_native_version),
    );
    let mut presets = default_presets();
    if let Some(custom) = &legacy.custom_profiles {
        presets.push(custom.clone());
    }
    let requirements = match legacy.kit_type {
        KitType::App => Requirements::Uniform(vec![format!("react-native@{prod_version}")]),
        KitType::Library => Requirements::Split {
            development: vec![format!("react-native@{dev_version}")],
            production: vec![format!("react-native@{prod_version}")],
        },
    };
    AlignDepsConfig { presets, requirements, capabilities: legacy.capabilities.clone() }
}

/// Bring a loaded configuration onto the current schema.
///
/// With `write`, a legacy configuration is rewritten in the manifest on disk.
/// Otherwise the user is shown what the new configuration looks like.
pub fn migrate_config(
    loaded: LoadedConfig,
    write: bool,
    reporter: &dyn Reporter,
) -> AlignResult<AlignConfig> {
    match loaded {
        LoadedConfig::Current { config, legacy_keys } => {
            if !legacy_keys.is_empty() {
                let keys = legacy_keys
                    .iter()
                    .map(|key| format!("'{KIT_CONFIG_KEY}.{key}'"))
                    .collect::<Vec<_>>()
                    .join(", ");
                reporter.warn(&format!(
                    "{}: The following keys are no longer supported: {keys}",
                    config.manifest_path.display()
                ));
            }
            Ok(config)
        }
        LoadedConfig::Legacy { legacy, mut manifest, manifest_path } => {
            let align_deps = transform_config(&legacy);
            let rendered = render_config(legacy.kit_type, &align_deps)?;
            if write {
                let mut kit_config = manifest
                    .kit_config()
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Default::default()));
                if let Value::Object(fields) = &mut kit_config {
                    for key in LEGACY_KEYS {
                        fields.shift_remove(key);
                    }
                    fields.insert("alignDeps".into(), to_value(&align_deps)?);
                }
                manifest.set_kit_config(kit_config);
                manifest::write(&manifest, &manifest_path)
                    .map_err(|e| AlignError::write_failed(&manifest_path, e))?;
            } else {
                reporter.warn(&format!(
                    "{}: The config schema has changed. Please update your config to the following:\n\n{}\n\nOr run this command again with '--migrate-config' to update your config automatically.\n\nSupport for the old schema will be removed in a future release.",
                    manifest_path.display(),
                    rendered
                ));
            }
            Ok(AlignConfig { kit_type: legacy.kit_type, align_deps, manifest, manifest_path })
        }
    }
}

fn render_config(kit_type: KitType, align_deps: &AlignDepsConfig) -> AlignResult<String> {
    let value = serde_json::json!({ "kitType": kit_type, "alignDeps": align_deps });
    serde_json::to_string_pretty(&value).map_err(|e| AlignError::Io(e.into()))
}

pub fn to_value<T: Serialize>(value: &T) -> AlignResult<Value> {
    serde_json::to_value(value).map_err(|e| AlignError::Io(e.into()))
}

/// What a dependency's configuration asks of whoever consumes it.
///
/// Only production requirements are inherited. Malformed blocks are ignored.
pub fn inherited_config(kit_config: &Value) -> Option<InheritedConfig> {
    let kit: KitConfig = serde_json::from_value(kit_config.clone()).ok()?;
    let requirements = match kit.align_deps.as_ref().and_then(|a| a.requirements.as_ref()) {
        Some(requirements) => requirements.production().to_vec(),
        None => vec![format!("react-native@{}", kit.react_native_version?)],
    };
    let capabilities = kit
        .align_deps
        .and_then(|a| a.capabilities)
        .or(kit.capabilities)
        .unwrap_or_default();
    Some(InheritedConfig { requirements, capabilities })
}
