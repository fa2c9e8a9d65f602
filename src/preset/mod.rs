//! Capability tables.
//!
//! A [`Profile`] maps capability names to the package that provides them for
//! one target (typically one react-native minor release). A [`Preset`] is an
//! ordered collection of profiles keyed by profile name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

mod filter;
mod merge;
mod registry;

pub use filter::{
    ensure_profiles, filter_preset, parse_requirement, parse_requirements, profile_satisfies,
    Requirement,
};
pub use merge::merge_presets;
pub use registry::{load_preset_file, PresetRegistry, DEFAULT_PRESET};

/// Package name reserved for capability aliases.
pub const META_PACKAGE_NAME: &str = "#meta";

pub type Capability = String;

pub type Profile = IndexMap<Capability, ProfileEntry>;

pub type Preset = IndexMap<String, Profile>;

/// A concrete, versioned dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dev_only: bool,
}

impl Package {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self { name: name.into(), version: version.into(), capabilities: Vec::new(), dev_only: false }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn dev_only(mut self) -> Self {
        self.dev_only = true;
        self
    }
}

/// A capability alias: contributes only the capabilities it lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaPackage {
    pub capabilities: Vec<Capability>,
    pub dev_only: bool,
}

impl MetaPackage {
    pub fn new<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { capabilities: capabilities.into_iter().map(Into::into).collect(), dev_only: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry", into = "RawEntry")]
pub enum ProfileEntry {
    Package(Package),
    Meta(MetaPackage),
}

impl ProfileEntry {
    pub fn name(&self) -> &str {
        match self {
            ProfileEntry::Package(pkg) => &pkg.name,
            ProfileEntry::Meta(_) => META_PACKAGE_NAME,
        }
    }

    pub fn capabilities(&self) -> &[Capability] {
        match self {
            ProfileEntry::Package(pkg) => &pkg.capabilities,
            ProfileEntry::Meta(meta) => &meta.capabilities,
        }
    }

    pub fn dev_only(&self) -> bool {
        match self {
            ProfileEntry::Package(pkg) => pkg.dev_only,
            ProfileEntry::Meta(meta) => meta.dev_only,
        }
    }

    pub fn as_package(&self) -> Option<&Package> {
        match self {
            ProfileEntry::Package(pkg) => Some(pkg),
            ProfileEntry::Meta(_) => None,
        }
    }
}

impl From<Package> for ProfileEntry {
    fn from(pkg: Package) -> Self {
        ProfileEntry::Package(pkg)
    }
}

impl From<MetaPackage> for ProfileEntry {
    fn from(meta: MetaPackage) -> Self {
        ProfileEntry::Meta(meta)
    }
}

/// Wire shape shared by packages and meta packages.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    capabilities: Vec<Capability>,
    #[serde(default, skip_serializing_if = "is_false")]
    dev_only: bool,
}

impl TryFrom<RawEntry> for ProfileEntry {
    type Error = String;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        if raw.name == META_PACKAGE_NAME {
            return Ok(ProfileEntry::Meta(MetaPackage {
                capabilities: raw.capabilities,
                dev_only: raw.dev_only,
            }));
        }
        if raw.name.is_empty() {
            return Err("package entry has an empty name".into());
        }
        let version = raw.version.ok_or_else(|| format!("package '{}' is missing a version", raw.name))?;
        Ok(ProfileEntry::Package(Package {
            name: raw.name,
            version,
            capabilities: raw.capabilities,
            dev_only: raw.dev_only,
        }))
    }
}

impl From<ProfileEntry> for RawEntry {
    fn from(entry: ProfileEntry) -> Self {
        match entry {
            ProfileEntry::Package(pkg) => RawEntry {
                name: pkg.name,
                version: Some(pkg.version),
                capabilities: pkg.capabilities,
                dev_only: pkg.dev_only,
            },
            ProfileEntry::Meta(meta) => RawEntry {
                name: META_PACKAGE_NAME.to_string(),
                version: None,
                capabilities: meta.capabilities,
                dev_only: meta.dev_only,
            },
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Profiles of `preset` in order, for APIs that take a slice of profiles.
pub fn profiles_of(preset: &Preset) -> Vec<&Profile> {
    preset.values().collect()
}

/// Every capability defined by any profile in `preset`, first occurrence order.
pub fn all_capabilities(preset: &Preset) -> Vec<Capability> {
    let mut seen = indexmap::IndexSet::new();
    for profile in preset.values() {
        for capability in profile.keys() {
            seen.insert(capability.clone());
        }
    }
    seen.into_iter().collect()
}
