// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Component manifest and configuration

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manifest file looked up in the working directory
pub const MANIFEST_FILE: &str = "scadforge.toml";

/// A named parameter handed to the design, either as a `-D` define or
/// through a generated wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Render the value as OpenSCAD source
    pub fn to_scad(&self) -> String {
        match self {
            ParamValue::Bool(value) => value.to_string(),
            ParamValue::Number(value) => value.to_string(),
            ParamValue::Text(value) => format!(
                "\"{}\"",
                value.replace('\\', "\\\\").replace('"', "\\\"")
            ),
        }
    }
}

/// One design file to turn into a mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    /// Design file, relative to `components_dir` unless absolute
    pub file: PathBuf,
    /// Mesh output, relative to `output_dir` unless absolute
    pub output: PathBuf,
    /// Module to instantiate through a generated wrapper. When absent the
    /// design file is rendered directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, ParamValue>,
}

impl Component {
    pub fn new(file: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            output: output.into(),
            module: None,
            params: BTreeMap::new(),
        }
    }

    /// Display name used in reports and progress output
    pub fn name(&self) -> String {
        self.file
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file.display().to_string())
    }
}

/// Manifest describing where designs live and what to generate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default = "default_components_dir")]
    pub components_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Explicit OpenSCAD executable, overriding discovery
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openscad_path: Option<PathBuf>,
    #[serde(default)]
    pub components: Vec<Component>,
}

fn default_components_dir() -> PathBuf {
    PathBuf::from("components")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("stl")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            components_dir: default_components_dir(),
            output_dir: default_output_dir(),
            report_dir: default_report_dir(),
            openscad_path: None,
            components: vec![
                Component::new("inner-shell.scad", "inner-shell.stl"),
                Component::new("outer-shell.scad", "outer-shell.stl"),
            ],
        }
    }
}

impl Manifest {
    /// Load manifest from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read manifest: {:?}", path.as_ref()))?;
        let manifest: Manifest = toml::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {:?}", path.as_ref()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load `scadforge.toml` if present, else the built-in component list,
    /// then apply environment variable overrides
    pub fn load() -> Result<Self> {
        let mut manifest = if PathBuf::from(MANIFEST_FILE).exists() {
            Self::from_file(MANIFEST_FILE)?
        } else {
            Self::default()
        };

        if let Ok(path) = std::env::var("OPENSCAD_PATH") {
            if !path.is_empty() {
                manifest.openscad_path = Some(PathBuf::from(path));
            }
        }

        if let Ok(dir) = std::env::var("SCADFORGE_OUTPUT_DIR") {
            manifest.output_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = std::env::var("SCADFORGE_COMPONENTS_DIR") {
            manifest.components_dir = PathBuf::from(dir);
        }

        Ok(manifest)
    }

    /// Save manifest to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize manifest")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write manifest: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Build a manifest by walking a directory for `.scad` files.
    ///
    /// Output names are the design file stem with an `.stl` extension.
    /// Entries are sorted so repeated runs generate in the same order.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            bail!("Not a directory: {}", dir.display());
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .map(|ext| ext == "scad")
                    .unwrap_or(false)
            })
            .map(|entry| entry.path().to_path_buf())
            .collect();
        files.sort();

        let components = files
            .into_iter()
            .map(|path| {
                let output = path
                    .file_stem()
                    .map(|stem| PathBuf::from(stem).with_extension("stl"))
                    .unwrap_or_else(|| PathBuf::from("out.stl"));
                Component::new(path, output)
            })
            .collect();

        let manifest = Self {
            components_dir: dir.to_path_buf(),
            components,
            ..Self::default()
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Absolute or manifest-relative path of a component's design file
    pub fn design_path(&self, component: &Component) -> PathBuf {
        if component.file.is_absolute() {
            component.file.clone()
        } else {
            self.components_dir.join(&component.file)
        }
    }

    /// Absolute or manifest-relative path of a component's mesh output
    pub fn output_path(&self, component: &Component) -> PathBuf {
        if component.output.is_absolute() {
            component.output.clone()
        } else {
            self.output_dir.join(&component.output)
        }
    }

    /// Reject manifests where two components would write the same file
    fn validate(&self) -> Result<()> {
        let mut outputs = Vec::new();
        for component in &self.components {
            let output = self.output_path(component);
            if outputs.contains(&output) {
                bail!(
                    "Duplicate output in manifest: {} is produced by more \
                     than one component",
                    output.display()
                );
            }
            outputs.push(output);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_component_list() {
        let manifest = Manifest::default();
        assert_eq!(manifest.components.len(), 2);
        assert_eq!(manifest.components[0].file, PathBuf::from("inner-shell.scad"));
        assert_eq!(manifest.components[0].output, PathBuf::from("inner-shell.stl"));
        assert_eq!(manifest.components[1].name(), "outer-shell");
    }

    #[test]
    fn test_param_value_to_scad() {
        assert_eq!(ParamValue::Bool(true).to_scad(), "true");
        assert_eq!(ParamValue::Number(2.0).to_scad(), "2");
        assert_eq!(ParamValue::Number(2.4).to_scad(), "2.4");
        assert_eq!(
            ParamValue::Text("vented \"A\"".to_string()).to_scad(),
            "\"vented \\\"A\\\"\""
        );
    }

    #[test]
    fn test_manifest_toml_roundtrip() -> Result<()> {
        let mut manifest = Manifest::default();
        manifest.components[0].module = Some("inner_shell".to_string());
        manifest.components[0]
            .params
            .insert("wall".to_string(), ParamValue::Number(2.4));

        let toml_text = toml::to_string_pretty(&manifest)?;
        let parsed: Manifest = toml::from_str(&toml_text)?;

        assert_eq!(parsed.components.len(), 2);
        assert_eq!(parsed.components[0].module.as_deref(), Some("inner_shell"));
        assert_eq!(
            parsed.components[0].params.get("wall"),
            Some(&ParamValue::Number(2.4))
        );
        Ok(())
    }

    #[test]
    fn test_duplicate_outputs_rejected() {
        let manifest = Manifest {
            components: vec![
                Component::new("a.scad", "shell.stl"),
                Component::new("b.scad", "shell.stl"),
            ],
            ..Manifest::default()
        };
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_paths_resolve_against_dirs() {
        let manifest = Manifest::default();
        let component = &manifest.components[0];
        assert_eq!(
            manifest.design_path(component),
            PathBuf::from("components/inner-shell.scad")
        );
        assert_eq!(
            manifest.output_path(component),
            PathBuf::from("stl/inner-shell.stl")
        );
    }

    #[test]
    fn test_discover_scad_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("bracket.scad"), "cube(1);")?;
        std::fs::write(dir.path().join("lid.scad"), "cube(2);")?;
        std::fs::write(dir.path().join("notes.txt"), "not a design")?;

        let manifest = Manifest::discover(dir.path())?;
        assert_eq!(manifest.components.len(), 2);
        assert_eq!(manifest.components[0].output, PathBuf::from("bracket.stl"));
        assert_eq!(manifest.components[1].output, PathBuf::from("lid.stl"));
        Ok(())
    }
}
