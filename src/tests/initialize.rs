use crate::config::{default_presets, KitType};
use crate::error::AlignError;
use crate::initialize::{core_package_name, init_package_manifest, initialize_config};
use crate::tests::common::*;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn core_package_comes_from_the_presets() {
    assert_eq!(core_package_name(&small_preset()).as_deref(), Some("react-native"));
    assert_eq!(core_package_name(&Default::default()), None);
}

#[test]
fn library_requirements_follow_declared_ranges() {
    let env = TestEnv::builtin();
    let lib = manifest(json!({
        "name": "lib",
        "version": "1.0.0",
        "dependencies": { "react-native-svg": "^15.12.0" },
        "peerDependencies": { "react-native": "^0.79.0 || ^0.80.0" },
        "devDependencies": { "react-native": "^0.80.1" },
        "rnx-kit": { "bundle": true }
    }));

    let updated =
        initialize_config(&lib, Path::new("."), KitType::Library, &default_presets(), &env.ctx())
            .unwrap()
            .unwrap();
    assert_eq!(
        updated.kit_config(),
        Some(&json!({
            "bundle": true,
            "kitType": "library",
            "alignDeps": {
                "requirements": {
                    "development": ["react-native@0.80"],
                    "production": ["react-native@0.79 || 0.80"]
                },
                "capabilities": ["core", "core-android", "core-ios", "svg"]
            }
        }))
    );
}

#[test]
fn library_without_dev_range_develops_against_the_lowest_version() {
    let env = TestEnv::builtin();
    let lib = manifest(json!({
        "name": "lib",
        "version": "1.0.0",
        "peerDependencies": { "react-native": "^0.79.0 || ^0.80.0" }
    }));

    let updated =
        initialize_config(&lib, Path::new("."), KitType::Library, &default_presets(), &env.ctx())
            .unwrap()
            .unwrap();
    let requirements = &updated.kit_config().unwrap()["alignDeps"]["requirements"];
    assert_eq!(requirements["development"], json!(["react-native@0.79"]));
}

#[test]
fn app_requirements_use_the_dependency_range() {
    let env = TestEnv::builtin();
    let app = manifest(json!({
        "name": "app",
        "version": "0.0.1",
        "dependencies": { "react": "19.1.0", "react-native": "^0.80.2" }
    }));
    let presets = vec!["microsoft/react-native".to_string()];

    let updated = initialize_config(&app, Path::new("."), KitType::App, &presets, &env.ctx())
        .unwrap()
        .unwrap();
    let kit = updated.kit_config().unwrap();
    assert_eq!(kit["kitType"], "app");
    assert_eq!(kit["alignDeps"]["requirements"], json!(["react-native@0.80"]));
    assert_eq!(kit["alignDeps"]["capabilities"], json!(["core", "core-android", "core-ios", "react"]));
    assert!(kit["alignDeps"].get("presets").is_none());
}

#[test]
fn packages_without_core_cannot_be_initialized() {
    let env = TestEnv::builtin();
    let lib = manifest(json!({
        "name": "lib",
        "version": "1.0.0",
        "dependencies": { "lodash": "^4.17.21" }
    }));

    let err = initialize_config(&lib, Path::new("."), KitType::Library, &default_presets(), &env.ctx())
        .unwrap_err();
    assert!(matches!(
        err,
        AlignError::MissingRequiredDependency { ref package, ref dependency }
            if package == "lib" && dependency == "react-native"
    ));
}

#[test]
fn configured_packages_are_left_alone() {
    let env = TestEnv::builtin();
    let dir = tempdir().unwrap();
    let path = dir.path().join("package.json");
    let original = json!({
        "name": "lib",
        "version": "1.0.0",
        "peerDependencies": { "react-native": "^0.80.0" },
        "rnx-kit": { "alignDeps": { "requirements": ["react-native@0.80"] } }
    });
    write_json(&path, &original);

    init_package_manifest(&path, KitType::Library, &default_presets(), &env.ctx()).unwrap();
    assert_eq!(read_json(&path), original);
    assert!(env.reporter.infos().is_empty());
}

#[test]
fn init_writes_the_manifest() {
    let env = TestEnv::builtin();
    let dir = tempdir().unwrap();
    let path = dir.path().join("package.json");
    write_json(
        &path,
        &json!({
            "name": "app",
            "version": "0.0.1",
            "dependencies": { "react-native": "^0.79.0" }
        }),
    );

    init_package_manifest(&path, KitType::App, &default_presets(), &env.ctx()).unwrap();
    let written = read_json(&path);
    assert_eq!(written["rnx-kit"]["alignDeps"]["requirements"], json!(["react-native@0.79"]));
    assert_eq!(env.reporter.infos(), ["app: initialized as app"]);
}
