use crate::check::CheckOptions;
use crate::config::{AlignDepsConfig, Requirements};
use crate::error::{AlignError, ErrorCode};
use crate::set_version::{parse_versions, parse_versions_for, set_version, update_requirements};
use crate::tests::common::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

fn package(value: Value) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("package.json");
    write_json(&path, &value);
    (dir, path)
}

#[test]
fn first_version_is_the_target() {
    let env = TestEnv::builtin();
    let versions = parse_versions_for("0.80, 0.79", &env.ctx()).unwrap();
    assert_eq!(versions.target, "0.80");
    assert_eq!(versions.supported, ["0.79", "0.80"]);

    let single = parse_versions_for("^0.78.2", &env.ctx()).unwrap();
    assert_eq!(single.target, "0.78");
    assert_eq!(single.supported, ["0.78"]);
}

#[test]
fn versions_are_validated() {
    let env = TestEnv::builtin();
    let err = parse_versions_for("0.80,0.60", &env.ctx()).unwrap_err();
    assert_eq!(err.to_string(), "'0.60' is not a supported version");
    assert_eq!(err.code(), ErrorCode::InvalidConfiguration);

    let err = parse_versions("next", None).unwrap_err();
    assert_eq!(err.to_string(), "'next' is not a valid version number");

    let unchecked = parse_versions("1.2.3,1.2", None).unwrap();
    assert_eq!(unchecked.target, "1.2");
    assert_eq!(unchecked.supported, ["1.2"]);
}

#[test]
fn only_core_requirements_are_rewritten() {
    let mut align_deps = AlignDepsConfig {
        requirements: Requirements::Split {
            development: vec!["react-native@0.79".into(), "react@19".into()],
            production: vec!["react-native@0.79".into()],
        },
        ..Default::default()
    };
    update_requirements(&mut align_deps, "react-native", "0.79 || 0.80", "0.80");
    assert_eq!(
        align_deps.requirements,
        Requirements::Split {
            development: vec!["react-native@0.80".into(), "react@19".into()],
            production: vec!["react-native@0.79 || 0.80".into()],
        }
    );
}

fn aligned_library() -> Value {
    json!({
        "name": "lib",
        "version": "1.0.0",
        "peerDependencies": { "react-native-svg": "^15.11.2" },
        "devDependencies": { "react-native-svg": "^15.11.2" },
        "rnx-kit": {
            "kitType": "library",
            "alignDeps": {
                "requirements": {
                    "development": ["react-native@0.79"],
                    "production": ["react-native@0.79"]
                },
                "capabilities": ["svg"]
            }
        }
    })
}

#[test]
fn library_is_moved_to_new_versions() {
    let env = TestEnv::builtin();
    let (_dir, path) = package(aligned_library());
    let versions = parse_versions_for("0.80,0.79", &env.ctx()).unwrap();

    set_version(&path, &versions, &CheckOptions::default(), &env.ctx()).unwrap();

    let written = read_json(&path);
    assert_eq!(
        written["rnx-kit"],
        json!({
            "kitType": "library",
            "alignDeps": {
                "requirements": {
                    "development": ["react-native@0.80"],
                    "production": ["react-native@0.79 || 0.80"]
                },
                "capabilities": ["svg"]
            }
        })
    );
    assert_eq!(written["peerDependencies"], json!({ "react-native-svg": "^15.11.2 || ^15.12.0" }));
    assert_eq!(written["devDependencies"], json!({ "react-native-svg": "^15.12.0" }));
}

#[test]
fn app_is_moved_to_the_target() {
    let env = TestEnv::builtin();
    let (_dir, path) = package(json!({
        "name": "app",
        "version": "0.0.1",
        "dependencies": { "react-native-svg": "^15.11.2" },
        "rnx-kit": {
            "kitType": "app",
            "alignDeps": { "requirements": ["react-native@0.79"], "capabilities": ["svg"] }
        }
    }));
    let versions = parse_versions_for("0.80", &env.ctx()).unwrap();

    set_version(&path, &versions, &CheckOptions::default(), &env.ctx()).unwrap();

    let written = read_json(&path);
    assert_eq!(written["rnx-kit"]["alignDeps"]["requirements"], json!(["react-native@0.80"]));
    assert_eq!(written["dependencies"], json!({ "react-native-svg": "^15.12.0" }));
}

#[test]
fn misaligned_packages_are_not_moved() {
    let env = TestEnv::builtin();
    let mut value = aligned_library();
    value["devDependencies"] = json!({ "react-native-svg": "^15.0.0" });
    let (_dir, path) = package(value.clone());
    let versions = parse_versions_for("0.80", &env.ctx()).unwrap();

    let err = set_version(&path, &versions, &CheckOptions::default(), &env.ctx()).unwrap_err();
    assert!(matches!(err, AlignError::Unsatisfied(1)));
    assert_eq!(read_json(&path), value);
}
