use anyhow::{bail, Context, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

/// Key holding the alignment configuration in `package.json`.
pub const KIT_CONFIG_KEY: &str = "rnx-kit";

pub type Dependencies = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DependencySection {
    Dependencies,
    PeerDependencies,
    DevDependencies,
}

impl DependencySection {
    pub const ALL: [DependencySection; 3] = [
        DependencySection::Dependencies,
        DependencySection::PeerDependencies,
        DependencySection::DevDependencies,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::PeerDependencies => "peerDependencies",
            DependencySection::DevDependencies => "devDependencies",
        }
    }
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A `package.json` document. Every key is kept in file order, including the
/// ones align-deps never looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageManifest {
    fields: Map<String, Value>,
    indent: String,
    trailing_newline: bool,
}

impl Default for PackageManifest {
    fn default() -> Self {
        Self { fields: Map::new(), indent: "  ".into(), trailing_newline: true }
    }
}

impl PackageManifest {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields, ..Self::default() }),
            other => bail!("expected a JSON object, found {}", json_kind(&other)),
        }
    }

    pub fn parse(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data)?;
        let mut manifest = Self::from_value(value)?;
        manifest.indent = detect_indent(data);
        manifest.trailing_newline = data.ends_with('\n');
        Ok(manifest)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn name(&self) -> &str {
        self.fields.get("name").and_then(Value::as_str).unwrap_or_default()
    }

    pub fn version(&self) -> Option<&str> {
        self.fields.get("version").and_then(Value::as_str)
    }

    pub fn section(&self, section: DependencySection) -> Option<Dependencies> {
        let object = self.fields.get(section.key())?.as_object()?;
        Some(
            object
                .iter()
                .filter_map(|(name, range)| Some((name.clone(), range.as_str()?.to_string())))
                .collect(),
        )
    }

    /// Replace a section. `None` or an empty map removes it.
    pub fn set_section(&mut self, section: DependencySection, dependencies: Option<Dependencies>) {
        match dependencies {
            Some(deps) if !deps.is_empty() => {
                let object: Map<String, Value> =
                    deps.into_iter().map(|(name, range)| (name, Value::String(range))).collect();
                self.fields.insert(section.key().to_string(), Value::Object(object));
            }
            _ => {
                self.fields.shift_remove(section.key());
            }
        }
    }

    /// Dependency names of one section, in file order.
    pub fn dependency_names(&self, section: DependencySection) -> Vec<String> {
        self.fields
            .get(section.key())
            .and_then(Value::as_object)
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn all_dependency_names(&self) -> BTreeSet<String> {
        DependencySection::ALL.iter().flat_map(|s| self.dependency_names(*s)).collect()
    }

    pub fn kit_config(&self) -> Option<&Value> {
        self.fields.get(KIT_CONFIG_KEY)
    }

    pub fn set_kit_config(&mut self, config: Value) {
        self.fields.insert(KIT_CONFIG_KEY.to_string(), config);
    }

    /// Workspace globs from either `"workspaces": [..]` or `"workspaces": { "packages": [..] }`.
    pub fn workspaces(&self) -> Vec<String> {
        let list = match self.fields.get("workspaces") {
            Some(Value::Array(list)) => list,
            Some(Value::Object(object)) => match object.get("packages") {
                Some(Value::Array(list)) => list,
                _ => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        list.iter().filter_map(Value::as_str).map(str::to_string).collect()
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.fields.serialize(&mut ser)?;
        let mut text = String::from_utf8(buf)?;
        if self.trailing_newline {
            text.push('\n');
        }
        Ok(text)
    }
}

impl Serialize for PackageManifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

pub fn load(path: &Path) -> Result<PackageManifest> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    PackageManifest::parse(&data).with_context(|| format!("parse {}", path.display()))
}

pub fn write(manifest: &PackageManifest, path: &Path) -> Result<()> {
    let data = manifest.to_json_string()?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

// Indentation of the first indented line; two spaces when nothing is indented.
fn detect_indent(data: &str) -> String {
    data.lines()
        .map(|line| {
            let trimmed = line.trim_start_matches([' ', '\t']);
            &line[..line.len() - trimmed.len()]
        })
        .find(|indent| !indent.is_empty())
        .unwrap_or("  ")
        .to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
