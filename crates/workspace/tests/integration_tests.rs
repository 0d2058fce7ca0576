//! End-to-end tests from workspace resolution through package discovery to
//! the dependency graph.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use repokit_workspace::{read_workspace_graph, Error, WorkspaceType};
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

#[test]
fn test_pnpm_monorepo_end_to_end() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    write(
        &repo.join("pnpm-workspace.yaml"),
        "packages:\n  - \"packages/*\"\n  - \"apps/*\"\n",
    );
    write(
        &repo.join("package.json"),
        r#"{"name": "root", "private": true}"#,
    );
    write(
        &repo.join("packages/lib-core/package.json"),
        r#"{"name": "@acme/lib-core", "version": "1.0.0"}"#,
    );
    write(
        &repo.join("packages/lib-utils/package.json"),
        r#"{
            "name": "@acme/lib-utils",
            "dependencies": {"@acme/lib-core": "workspace:*"}
        }"#,
    );
    write(
        &repo.join("apps/web/package.json"),
        r#"{
            "name": "web",
            "dependencies": {"@acme/lib-utils": "workspace:^"},
            "devDependencies": {"@acme/lib-core": "workspace:*"}
        }"#,
    );
    std::fs::create_dir_all(repo.join("apps/web/src")).unwrap();

    let graph = read_workspace_graph(repo.join("apps/web/src")).unwrap();

    assert_eq!(graph.root.workspace_type, WorkspaceType::Pnpm);
    assert_eq!(graph.root.root_dir, repo);
    assert_eq!(graph.root.config_path, repo.join("pnpm-workspace.yaml"));
    assert_eq!(graph.root.member_patterns, ["packages/*", "apps/*"]);

    // The root manifest matches no member pattern and stays out.
    assert_eq!(
        graph.nodes.keys().collect::<Vec<_>>(),
        ["@acme/lib-core", "@acme/lib-utils", "web"]
    );
    assert_eq!(graph.sorted, ["@acme/lib-core", "@acme/lib-utils", "web"]);

    let web = graph.node("web").unwrap();
    assert_eq!(
        web.direct_dependencies,
        BTreeSet::from(["@acme/lib-utils".to_string()])
    );
    assert_eq!(
        web.direct_dev_dependencies,
        BTreeSet::from(["@acme/lib-core".to_string()])
    );
    assert_eq!(
        web.transitive_dependencies,
        BTreeSet::from(["@acme/lib-core".to_string(), "@acme/lib-utils".to_string()])
    );

    let utils = graph.node("@acme/lib-utils").unwrap();
    assert_eq!(utils.package.relative_dir, PathBuf::from("packages/lib-utils"));
    assert_eq!(utils.package.dir, repo.join("packages/lib-utils"));
}

#[test]
fn test_manifest_workspaces_refine_to_yarn_via_lockfile() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    write(
        &repo.join("package.json"),
        r#"{"name": "root", "private": true, "workspaces": ["packages/*"]}"#,
    );
    write(&repo.join("yarn.lock"), "");
    write(&repo.join("packages/a/package.json"), r#"{"name": "a"}"#);

    let graph = read_workspace_graph(repo).unwrap();

    assert_eq!(graph.root.workspace_type, WorkspaceType::Yarn);
    assert_eq!(graph.root.config_path, repo.join("package.json"));
    assert_eq!(graph.sorted, ["a"]);
}

#[test]
fn test_rush_projects_link_by_plain_name() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    // Rush configs are JSONC in the wild; the trailing comma is deliberate.
    write(
        &repo.join("rush.json"),
        r#"{
            "projects": [
                {"packageName": "app", "projectFolder": "apps/app"},
                {"packageName": "lib", "projectFolder": "libraries/lib"},
            ]
        }"#,
    );
    write(
        &repo.join("apps/app/package.json"),
        r#"{"name": "app", "dependencies": {"lib": "1.0.0"}}"#,
    );
    write(
        &repo.join("libraries/lib/package.json"),
        r#"{"name": "lib", "version": "1.0.0"}"#,
    );

    let graph = read_workspace_graph(repo).unwrap();

    assert_eq!(graph.root.workspace_type, WorkspaceType::Rush);
    assert_eq!(graph.sorted, ["lib", "app"]);
    assert_eq!(
        graph.node("app").unwrap().direct_dependencies,
        BTreeSet::from(["lib".to_string()])
    );
}

#[test]
fn test_deno_workspace_members() {
    let temp = TempDir::new().unwrap();
    let repo = temp.path();
    write(
        &repo.join("deno.jsonc"),
        r#"{
            // Hybrid workspace with npm-style member manifests.
            "workspace": {"members": ["tools/cli"]}
        }"#,
    );
    write(&repo.join("tools/cli/package.json"), r#"{"name": "cli"}"#);

    let graph = read_workspace_graph(repo).unwrap();

    assert_eq!(graph.root.workspace_type, WorkspaceType::Deno);
    assert_eq!(graph.root.config_path, repo.join("deno.jsonc"));
    assert_eq!(graph.sorted, ["cli"]);
}

#[test]
fn test_missing_workspace_is_a_typed_error() {
    let temp = TempDir::new().unwrap();
    let start = temp.path().join("plain/dir");
    std::fs::create_dir_all(&start).unwrap();

    let err = read_workspace_graph(&start).unwrap_err();
    assert!(matches!(err, Error::WorkspaceNotFound { .. }));
    assert!(err.to_string().contains("no workspace configuration found"));
}
