//! Integration tests for `navtree.toml` handling.
//!
//! These tests verify that configuration files load from disk, reject
//! unknown keys, and shape how include trees are built.

use std::io::Write;

use navtree::prelude::*;
use navtree::query::ErrorCode;
use pretty_assertions::assert_eq;

struct Person;

impl Model for Person {
    const MODEL_NAME: &'static str = "Person";
}

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

/// Test full configuration with all sections
#[test]
fn test_config_from_file() {
    let file = write_config(
        r#"
        [tree]
        separator = "/"
        root_name = "Person"
        max_depth = 4

        [capabilities]
        filter = true
        order = false
        skip = true
        take = true

        [debug]
        log_declarations = true
    "#,
    );

    let config = NavtreeConfig::from_file(file.path()).expect("valid config");
    assert_eq!(config.tree.separator, "/");
    assert_eq!(config.tree.root_name.as_deref(), Some("Person"));
    assert_eq!(config.tree.max_depth, Some(4));
    assert!(!config.capabilities.order);
    assert!(config.debug.log_declarations);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = NavtreeConfig::from_file(dir.path().join("navtree.toml")).unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigIo);
    assert!(err.source.is_some());
}

#[test]
fn test_unknown_section_is_rejected() {
    let file = write_config("[database]\nurl = \"postgres://localhost\"\n");
    let err = NavtreeConfig::from_file(file.path()).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    assert!(err.context.path.is_some());
}

#[test]
fn test_config_shapes_tree_building() {
    let config = NavtreeConfig::from_str(
        r#"
        [tree]
        separator = "/"
        root_name = "Person"
        max_depth = 2
    "#,
    )
    .expect("valid config");

    let tree = IncludeTree::query_for::<Person>()
        .with_config(&config)
        .include_str("Company/Owner")
        .into_include_tree()
        .expect("within depth");
    assert_eq!(tree.name(), Some("Person"));
    assert_eq!(tree.paths(), vec!["Company.Owner"]);
    assert_eq!(tree.paths_with_separator("/"), vec!["Company/Owner"]);

    let err = IncludeTree::query_for::<Person>()
        .with_config(&config)
        .include_str("Company/Owner/Company")
        .into_include_tree()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidIncludePath);
}

#[test]
fn test_environment_override_applies_to_capabilities() {
    let config = NavtreeConfig::from_str(
        r#"
        [environments.test.capabilities]
        take = false
    "#,
    )
    .expect("valid config")
    .with_environment("test")
    .expect("valid override");

    let err = IncludeTree::query_for::<Person>()
        .with_config(&config)
        .include_expr(navtree::query::PathExpr::members(["CasesAssigned"]).take(3))
        .into_include_tree()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnsupportedDeclaration);
}

#[test]
fn test_invalid_environment_override_is_rejected() {
    let file = write_config("[environments.test.tree]\nmax_depth = 0\n");
    let config = NavtreeConfig::from_file(file.path()).expect("base config is valid");
    let err = config.with_environment("test").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
}
