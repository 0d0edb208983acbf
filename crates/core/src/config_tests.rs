// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Config;
use crate::capability::Capability;
use std::path::Path;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("config.yaml")).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.max_depth, 3);
    assert_eq!(config.max_sessions_per_run, 0);
}

#[test]
fn partial_yaml_overlays_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "maxDepth: 2\nstaggerDelayMs: 0\nmodels:\n  builder: opus\n  scout: haiku\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.max_depth, 2);
    assert_eq!(config.stagger_delay_ms, 0);
    assert_eq!(config.max_concurrent, 8); // default preserved
    assert_eq!(config.model_for(Capability::Builder), Some("opus"));
    assert_eq!(config.model_for(Capability::Lead), None);
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "maxDepth: [not a number").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("config.yaml"));
}

#[test]
fn project_name_falls_back_to_directory() {
    let config = Config::default();
    assert_eq!(config.project_name(Path::new("/work/petunia")), "petunia");

    let named = Config {
        project_name: Some("garden".into()),
        ..Config::default()
    };
    assert_eq!(named.project_name(Path::new("/work/petunia")), "garden");
}
