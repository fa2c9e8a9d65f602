use crate::error::AlignError;
use crate::preset::{
    ensure_profiles, filter_preset, load_preset_file, merge_presets, parse_requirement, Preset,
    PresetRegistry, ProfileEntry, DEFAULT_PRESET,
};
use crate::tests::common::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn later_presets_override_capabilities() {
    let base = small_preset();
    let mut overlay = Preset::new();
    overlay.insert(
        "0.78".into(),
        profile(vec![
            ("svg", pkg("react-native-svg", "^15.2.0").into()),
            ("extra", pkg("extra", "^1.0.0").into()),
        ]),
    );
    overlay.insert("custom".into(), profile(vec![("react", pkg("react", "20.0.0").into())]));

    let merged = merge_presets([&base, &overlay]);
    let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
    assert_eq!(keys, ["0.77", "0.78", "custom"]);
    assert_eq!(merged["0.77"]["svg"].as_package().unwrap().version, "^15.0.0");
    assert_eq!(merged["0.78"]["svg"].as_package().unwrap().version, "^15.2.0");
    assert!(merged["0.78"].contains_key("extra"));
    assert!(merged["0.78"].contains_key("core"));
}

#[test]
fn requirements_split_at_last_at() {
    let req = parse_requirement("@react-native/metro-config@^0.78").unwrap();
    assert_eq!(req.name, "@react-native/metro-config");
    assert_eq!(req.range.as_str(), "^0.78");

    let req = parse_requirement("react-native@0.77 || 0.78").unwrap();
    assert_eq!(req.name, "react-native");
}

#[test]
fn malformed_requirements_are_rejected() {
    assert!(matches!(parse_requirement("react-native"), Err(AlignError::InvalidRequirement(_))));
    assert!(matches!(parse_requirement("@0.78"), Err(AlignError::InvalidRequirement(_))));
    assert!(matches!(
        parse_requirement("react-native@latest"),
        Err(AlignError::InvalidVersionRange(_))
    ));
}

#[test]
fn filter_keeps_satisfying_profiles_in_order() {
    let preset = small_preset();

    let both = filter_preset(&preset, &["react-native@0.77 || 0.78"]).unwrap();
    assert_eq!(both.keys().collect::<Vec<_>>(), ["0.77", "0.78"]);

    let one = filter_preset(&preset, &["react-native@^0.78.0", "react@19"]).unwrap();
    assert_eq!(one.keys().collect::<Vec<_>>(), ["0.78"]);

    let none = filter_preset(&preset, &["react-native@0.77", "react@19"]).unwrap();
    assert!(none.is_empty());

    let unknown = filter_preset(&preset, &["left-pad@1"]).unwrap();
    assert!(unknown.is_empty());
}

#[test]
fn filtering_never_grows_a_preset() {
    let preset = small_preset();
    let once = filter_preset(&preset, &["react-native@>=0.77"]).unwrap();
    let twice = filter_preset(&once, &["react-native@0.78"]).unwrap();
    assert!(twice.len() <= once.len());
    assert!(twice.keys().all(|k| once.contains_key(k)));
}

#[test]
fn meta_entries_never_satisfy_requirements() {
    let mut preset = Preset::new();
    preset.insert("only-meta".into(), profile(vec![("bundle", meta(&["core"]))]));
    assert!(filter_preset(&preset, &["#meta@*"]).unwrap().is_empty());
}

#[test]
fn ensure_profiles_names_the_requirements() {
    let err = ensure_profiles(Preset::new(), &["react-native@0.60"]).unwrap_err();
    assert_eq!(err.to_string(), "No profiles could satisfy requirements: react-native@0.60");
    assert!(ensure_profiles(small_preset(), &["react-native@0.77"]).is_ok());
}

#[test]
fn builtin_registry_has_react_native_profiles() {
    let registry = PresetRegistry::builtin().unwrap();
    assert!(registry.get("missing").is_none());

    let preset = registry.get(DEFAULT_PRESET).unwrap();
    assert_eq!(preset.keys().collect::<Vec<_>>(), ["0.77", "0.78", "0.79", "0.80"]);
    assert_eq!(preset["0.78"]["react"].as_package().unwrap().version, "19.0.0");
    assert_eq!(preset["0.80"]["core"].as_package().unwrap().name, "react-native");
    assert!(preset["0.80"]["hermes"].as_package().is_none());
    assert!(preset["0.79"]["jest"].dev_only());
}

#[test]
fn presets_load_from_json_and_yaml_files() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("preset.json");
    fs::write(
        &json,
        r##"{"1.0": {"lib": {"name": "lib", "version": "^1.0.0"}, "alias": {"name": "#meta", "capabilities": ["lib"]}}}"##,
    )
    .unwrap();
    let yaml = dir.path().join("preset.yaml");
    fs::write(&yaml, "\"1.0\":\n  lib:\n    name: lib\n    version: ^1.1.0\n    devOnly: true\n")
        .unwrap();

    let from_json = load_preset_file(&json).unwrap();
    assert_eq!(from_json["1.0"]["lib"].as_package().unwrap().version, "^1.0.0");
    assert_eq!(from_json["1.0"]["alias"].capabilities(), ["lib"]);

    let from_yaml = load_preset_file(&yaml).unwrap();
    assert!(from_yaml["1.0"]["lib"].dev_only());
}

#[test]
fn registry_resolves_relative_preset_paths() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("custom.json"),
        r#"{"1.0": {"lib": {"name": "lib", "version": "^1.0.0"}}}"#,
    )
    .unwrap();

    let registry = PresetRegistry::builtin().unwrap();
    let merged = registry.merged(&[DEFAULT_PRESET, "custom.json"], dir.path()).unwrap();
    assert!(merged.contains_key("0.80"));
    assert!(merged.contains_key("1.0"));

    let err = registry.resolve("missing.json", dir.path()).unwrap_err();
    assert!(matches!(err, AlignError::UnknownPreset(name) if name == "missing.json"));
}

#[test]
fn package_entries_require_a_version() {
    let err = serde_json::from_str::<ProfileEntry>(r#"{"name": "lib"}"#).unwrap_err();
    assert!(err.to_string().contains("package 'lib' is missing a version"));

    let meta: ProfileEntry =
        serde_json::from_str(r##"{"name": "#meta", "capabilities": ["a"], "devOnly": true}"##)
            .unwrap();
    assert!(meta.as_package().is_none());
    assert!(meta.dev_only());
}
