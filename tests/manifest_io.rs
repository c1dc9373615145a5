// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Manifest file round-trips and directory discovery

use anyhow::Result;
use scadforge::manifest::{Manifest, ParamValue};
use std::path::PathBuf;

#[test]
fn test_manifest_save_and_reload() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("scadforge.toml");

    let mut manifest = Manifest::default();
    manifest.components[0].module = Some("inner_shell".to_string());
    manifest.components[0]
        .params
        .insert("wall".to_string(), ParamValue::Number(2.4));
    manifest.components[0]
        .params
        .insert("vented".to_string(), ParamValue::Bool(true));
    manifest.save(&path)?;

    let reloaded = Manifest::from_file(&path)?;
    assert_eq!(reloaded.components.len(), 2);
    assert_eq!(reloaded.components[0].module.as_deref(), Some("inner_shell"));
    assert_eq!(
        reloaded.components[0].params.get("vented"),
        Some(&ParamValue::Bool(true))
    );
    assert_eq!(reloaded.output_dir, PathBuf::from("stl"));
    Ok(())
}

#[test]
fn test_from_file_rejects_duplicate_outputs() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("scadforge.toml");
    std::fs::write(
        &path,
        r#"
[[components]]
file = "a.scad"
output = "shell.stl"

[[components]]
file = "b.scad"
output = "shell.stl"
"#,
    )?;

    assert!(Manifest::from_file(&path).is_err());
    Ok(())
}

#[test]
fn test_discover_walks_subdirectories() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let nested = dir.path().join("shells");
    std::fs::create_dir_all(&nested)?;
    std::fs::write(dir.path().join("base.scad"), "cube(1);")?;
    std::fs::write(nested.join("inner.scad"), "sphere(1);")?;

    let manifest = Manifest::discover(dir.path())?;
    assert_eq!(manifest.components.len(), 2);

    let outputs: Vec<_> = manifest
        .components
        .iter()
        .map(|component| component.output.clone())
        .collect();
    assert!(outputs.contains(&PathBuf::from("base.stl")));
    assert!(outputs.contains(&PathBuf::from("inner.stl")));
    Ok(())
}

#[test]
fn test_discover_rejects_files() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("lone.scad");
    std::fs::write(&file, "cube(1);")?;

    assert!(Manifest::discover(&file).is_err());
    Ok(())
}
