use super::{merge_presets, Preset};
use crate::error::{AlignError, AlignResult};
use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_PRESET: &str = "microsoft/react-native";

static REACT_NATIVE: Lazy<std::result::Result<Preset, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("react-native.json")).map_err(|e| e.to_string())
});

/// Named presets available to a run. Names that are not registered are
/// looked up on disk relative to the package being aligned.
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, Preset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the presets shipped with align-deps.
    pub fn builtin() -> Result<Self> {
        let react_native = REACT_NATIVE
            .as_ref()
            .map_err(|e| anyhow!("built-in preset '{DEFAULT_PRESET}' is corrupt: {e}"))?;
        let mut registry = Self::new();
        registry.register(DEFAULT_PRESET, react_native.clone());
        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, preset: Preset) {
        self.presets.insert(name.into(), preset);
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    pub fn resolve(&self, name: &str, project_root: &Path) -> AlignResult<Preset> {
        if let Some(preset) = self.presets.get(name) {
            return Ok(preset.clone());
        }
        let path = project_root.join(name);
        if path.is_file() {
            return load_preset_file(&path)
                .map_err(|e| AlignError::InvalidConfiguration(format!("{e:#}")));
        }
        Err(AlignError::UnknownPreset(name.to_string()))
    }

    /// Resolve every name and overlay them in order.
    pub fn merged<S: AsRef<str>>(&self, names: &[S], project_root: &Path) -> AlignResult<Preset> {
        let presets = names
            .iter()
            .map(|name| self.resolve(name.as_ref(), project_root))
            .collect::<AlignResult<Vec<_>>>()?;
        Ok(merge_presets(&presets))
    }
}

pub fn load_preset_file(path: &Path) -> Result<Preset> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read preset {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    let preset = match ext {
        "yaml" | "yml" => serde_yaml::from_str(&data)
            .with_context(|| format!("parse preset {}", path.display()))?,
        _ => serde_json::from_str(&data)
            .with_context(|| format!("parse preset {}", path.display()))?,
    };
    Ok(preset)
}
