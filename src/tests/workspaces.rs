use crate::tests::common::*;
use crate::workspaces::{discover_workspaces, manifests_in, rel_path_str};
use anyhow::Result;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn members_are_discovered_in_name_order() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    write_json(
        &root.join("package.json"),
        &json!({ "name": "root", "version": "0.0.0", "workspaces": ["packages/*", "apps/*"] }),
    );
    write_json(
        &root.join("packages").join("zeta").join("package.json"),
        &json!({ "name": "@scope/zeta", "version": "1.0.0" }),
    );
    write_json(
        &root.join("apps").join("example").join("package.json"),
        &json!({ "name": "example-app", "version": "0.0.1" }),
    );
    std::fs::create_dir_all(root.join("packages").join("not-a-package"))?;

    let manifest = crate::manifest::load(&root.join("package.json"))?;
    let members = discover_workspaces(root, &manifest)?;
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["@scope/zeta", "example-app"]);
    assert_eq!(members[0].relative_path, "packages/zeta");

    let paths = manifests_in(root)?;
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0], root.join("package.json"));
    Ok(())
}

#[test]
fn object_form_workspaces_are_supported() -> Result<()> {
    let temp = tempdir()?;
    let root = temp.path();
    let manifest = manifest(json!({
        "name": "root",
        "workspaces": { "packages": ["libs/*"], "nohoist": ["**/react-native"] }
    }));
    write_json(
        &root.join("libs").join("a").join("package.json"),
        &json!({ "name": "a", "version": "1.0.0" }),
    );

    let members = discover_workspaces(root, &manifest)?;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name, "a");
    Ok(())
}

#[test]
fn duplicate_member_names_are_rejected() {
    let temp = tempdir().unwrap();
    let root = temp.path();
    let manifest = manifest(json!({ "name": "root", "workspaces": ["one/*", "two/*"] }));
    for group in ["one", "two"] {
        write_json(
            &root.join(group).join("dup").join("package.json"),
            &json!({ "name": "dup", "version": "1.0.0" }),
        );
    }

    let err = discover_workspaces(root, &manifest).unwrap_err();
    assert!(err.to_string().contains("duplicate workspace package name 'dup'"));
}

#[test]
fn packages_without_workspaces_have_no_members() -> Result<()> {
    let temp = tempdir()?;
    let manifest = manifest(json!({ "name": "solo", "version": "1.0.0" }));
    assert!(discover_workspaces(temp.path(), &manifest)?.is_empty());
    assert_eq!(rel_path_str(Path::new("/repo"), Path::new("/repo")), ".");
    assert_eq!(rel_path_str(Path::new("/repo"), Path::new("/repo/packages/a")), "packages/a");
    Ok(())
}
