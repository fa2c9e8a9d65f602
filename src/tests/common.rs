use crate::check::AlignContext;
use crate::fsutil::NodeModulesLocator;
use crate::manifest::PackageManifest;
use crate::preset::{MetaPackage, Package, Preset, PresetRegistry, Profile, ProfileEntry};
use crate::reporter::MemoryReporter;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub fn pkg(name: &str, version: &str) -> Package {
    Package::new(name, version)
}

pub fn profile(entries: Vec<(&'static str, ProfileEntry)>) -> Profile {
    entries.into_iter().map(|(cap, entry)| (cap.to_string(), entry)).collect()
}

pub fn meta(capabilities: &[&str]) -> ProfileEntry {
    MetaPackage::new(capabilities.iter().copied()).into()
}

/// Two small profiles: `0.77` and `0.78`, each with core, svg, a dev-only
/// test app and a meta package.
pub fn small_preset() -> Preset {
    let make = |rn: &str, react: &str, svg: &str| {
        profile(vec![
            ("react", pkg("react", react).into()),
            ("core", pkg("react-native", rn).with_capabilities(["react"]).into()),
            ("core-android", pkg("react-native", rn).with_capabilities(["core"]).into()),
            ("svg", pkg("react-native-svg", svg).into()),
            (
                "test-app",
                pkg("react-native-test-app", "^4.0.0").with_capabilities(["core"]).dev_only().into(),
            ),
            ("bundle", meta(&["core", "svg"])),
        ])
    };
    let mut preset = Preset::new();
    preset.insert("0.77".into(), make("^0.77.0", "18.3.1", "^15.0.0"));
    preset.insert("0.78".into(), make("^0.78.0", "19.0.0", "^15.1.0"));
    preset
}

pub fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create manifest parent");
    }
    let data = serde_json::to_string_pretty(value).expect("serialize manifest");
    fs::write(path, data + "\n").expect("write manifest");
}

/// Write `node_modules/<name>/package.json` under `dir`.
pub fn install(dir: &Path, name: &str, manifest: Value) -> PathBuf {
    let pkg_dir = dir.join("node_modules").join(name);
    write_json(&pkg_dir.join("package.json"), &manifest);
    pkg_dir
}

pub fn read_json(path: &Path) -> Value {
    let data = fs::read_to_string(path).expect("read manifest");
    serde_json::from_str(&data).expect("parse manifest")
}

pub fn manifest(value: Value) -> PackageManifest {
    PackageManifest::from_value(value).expect("manifest fixture must be an object")
}

/// Owns the collaborators an [`AlignContext`] borrows.
pub struct TestEnv {
    pub registry: PresetRegistry,
    pub reporter: MemoryReporter,
    pub locator: NodeModulesLocator,
}

impl TestEnv {
    pub fn builtin() -> Self {
        Self {
            registry: PresetRegistry::builtin().expect("built-in presets"),
            reporter: MemoryReporter::new(),
            locator: NodeModulesLocator,
        }
    }

    pub fn ctx(&self) -> AlignContext<'_> {
        AlignContext { registry: &self.registry, locator: &self.locator, reporter: &self.reporter }
    }
}
