use crate::capabilities::ResolvedPackages;
use crate::config::KitType;
use crate::manifest::{Dependencies, DependencySection};
use crate::manifest_updates::{
    dev_only_packages, remove_keys, update_dependencies, update_package_manifest, DependencyType,
};
use crate::preset::profiles_of;
use crate::reporter::MemoryReporter;
use crate::tests::common::*;
use serde_json::json;

fn two_versions() -> Vec<crate::preset::Package> {
    vec![pkg("lib", "1.2.0"), pkg("lib", "1.3.0")]
}

fn deps(entries: &[(&str, &str)]) -> Dependencies {
    entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn merge_strategies_pick_versions() {
    let versions = two_versions();
    assert_eq!(DependencyType::Direct.version_range(&versions).as_deref(), Some("1.3.0"));
    assert_eq!(DependencyType::Development.version_range(&versions).as_deref(), Some("1.2.0"));
    assert_eq!(DependencyType::Peer.version_range(&versions).as_deref(), Some("1.2.0 || 1.3.0"));
    assert_eq!(DependencyType::Peer.version_range(&[]), None);
}

#[test]
fn dev_only_packages_only_land_in_development() {
    let mut packages = ResolvedPackages::new();
    packages.insert("jest".into(), vec![pkg("jest", "^29.0.0").dev_only()]);
    packages.insert("lib".into(), two_versions());

    let direct = update_dependencies(None, &packages, DependencyType::Direct);
    assert_eq!(direct, deps(&[("lib", "1.3.0")]));

    let peer = update_dependencies(None, &packages, DependencyType::Peer);
    assert_eq!(peer, deps(&[("lib", "1.2.0 || 1.3.0")]));

    let dev = update_dependencies(
        Some(deps(&[("typescript", "^5.0.0")])),
        &packages,
        DependencyType::Development,
    );
    assert_eq!(dev, deps(&[("jest", "^29.0.0"), ("lib", "1.2.0"), ("typescript", "^5.0.0")]));

    assert_eq!(dev_only_packages(&packages).keys().collect::<Vec<_>>(), ["jest"]);
}

#[test]
fn remove_keys_keeps_absent_sections_absent() {
    assert_eq!(remove_keys(None, &["lib"]), None);
    let left = remove_keys(Some(deps(&[("lib", "1"), ("other", "2")])), &["lib"]);
    assert_eq!(left, Some(deps(&[("other", "2")])));
}

#[test]
fn apps_get_direct_dependencies() {
    let preset = small_preset();
    let reporter = MemoryReporter::new();
    let app = manifest(json!({
        "name": "app",
        "version": "1.0.0",
        "dependencies": { "react-native": "^0.77.0", "lodash": "^4.17.0" },
        "peerDependencies": { "react": "*" },
        "devDependencies": { "react-native": "^0.77.0" }
    }));

    let updated = update_package_manifest(
        &app,
        &["core-android".into(), "svg".into(), "test-app".into()],
        &[&preset["0.78"]],
        &[&preset["0.78"]],
        KitType::App,
        &reporter,
    );

    assert_eq!(
        updated.section(DependencySection::Dependencies),
        Some(deps(&[
            ("lodash", "^4.17.0"),
            ("react", "19.0.0"),
            ("react-native", "^0.78.0"),
            ("react-native-svg", "^15.1.0"),
        ]))
    );
    assert_eq!(updated.section(DependencySection::PeerDependencies), None);
    assert!(!updated.fields().contains_key("peerDependencies"));
    assert_eq!(
        updated.section(DependencySection::DevDependencies),
        Some(deps(&[("react-native-test-app", "^4.0.0")]))
    );
}

#[test]
fn libraries_get_peer_and_dev_dependencies() {
    let preset = small_preset();
    let reporter = MemoryReporter::new();
    let lib = manifest(json!({
        "name": "lib",
        "version": "1.0.0",
        "dependencies": { "react-native-svg": "^15.0.0", "lodash": "^4.17.0" }
    }));

    let updated = update_package_manifest(
        &lib,
        &["core".into(), "svg".into()],
        &profiles_of(&preset),
        &[&preset["0.78"]],
        KitType::Library,
        &reporter,
    );

    assert_eq!(
        updated.section(DependencySection::Dependencies),
        Some(deps(&[("lodash", "^4.17.0")]))
    );
    assert_eq!(
        updated.section(DependencySection::PeerDependencies),
        Some(deps(&[
            ("react", "18.3.1 || 19.0.0"),
            ("react-native", "^0.77.0 || ^0.78.0"),
            ("react-native-svg", "^15.0.0 || ^15.1.0"),
        ]))
    );
    assert_eq!(
        updated.section(DependencySection::DevDependencies),
        Some(deps(&[
            ("react", "19.0.0"),
            ("react-native", "^0.78.0"),
            ("react-native-svg", "^15.1.0"),
        ]))
    );
    assert!(reporter.warnings().is_empty());
}

#[test]
fn updating_twice_changes_nothing() {
    let preset = small_preset();
    let reporter = MemoryReporter::new();
    let lib = manifest(json!({ "name": "lib", "version": "1.0.0" }));
    let capabilities = vec!["core-android".to_string(), "test-app".to_string()];
    let prod = profiles_of(&preset);
    let dev = [&preset["0.77"]];

    let once = update_package_manifest(&lib, &capabilities, &prod, &dev, KitType::Library, &reporter);
    let twice =
        update_package_manifest(&once, &capabilities, &prod, &dev, KitType::Library, &reporter);
    assert_eq!(once, twice);
    assert!(!once.fields().contains_key("dependencies"));
}
