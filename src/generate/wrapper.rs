// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Generated glue source for module components

use crate::manifest::{Component, ParamValue};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Build the glue source that pulls in a design file and instantiates one
/// of its modules with named parameters.
///
/// OpenSCAD accepts forward slashes in `use <>` paths on every platform,
/// so backslashes are normalized away.
pub fn wrapper_source(
    design_file: &Path,
    module: &str,
    params: &BTreeMap<String, ParamValue>,
) -> String {
    let args = params
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value.to_scad()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "use <{}>\n{}({});\n",
        scad_path(design_file),
        module,
        args
    )
}

/// Write the wrapper for a module component into a scratch directory and
/// return its path
pub fn write_wrapper(dir: &Path, component: &Component, design_file: &Path) -> Result<PathBuf> {
    let module = component
        .module
        .as_deref()
        .context("Component has no module to wrap")?;

    // use <> resolves relative to the wrapper, which lives in a scratch
    // directory, so the design path has to be absolute
    let design = std::fs::canonicalize(design_file)
        .with_context(|| format!("Design file not found: {}", design_file.display()))?;

    let source = wrapper_source(&design, module, &component.params);
    let path = dir.join(format!("{}__harness.scad", component.name()));
    std::fs::write(&path, &source)
        .with_context(|| format!("Failed to write wrapper: {}", path.display()))?;
    Ok(path)
}

fn scad_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapper_source_no_params() {
        let source = wrapper_source(
            Path::new("/work/components/inner-shell.scad"),
            "inner_shell",
            &BTreeMap::new(),
        );
        assert_eq!(
            source,
            "use </work/components/inner-shell.scad>\ninner_shell();\n"
        );
    }

    #[test]
    fn test_wrapper_source_params_in_sorted_order() {
        let mut params = BTreeMap::new();
        params.insert("wall".to_string(), ParamValue::Number(2.4));
        params.insert("vented".to_string(), ParamValue::Bool(true));
        params.insert("label".to_string(), ParamValue::Text("A".to_string()));

        let source = wrapper_source(
            Path::new("/work/components/outer-shell.scad"),
            "outer_shell",
            &params,
        );
        assert_eq!(
            source,
            "use </work/components/outer-shell.scad>\n\
             outer_shell(label = \"A\", vented = true, wall = 2.4);\n"
        );
    }

    #[test]
    fn test_wrapper_source_normalizes_backslashes() {
        let source = wrapper_source(
            Path::new(r"C:\designs\lid.scad"),
            "lid",
            &BTreeMap::new(),
        );
        assert!(source.starts_with("use <C:/designs/lid.scad>"));
    }

    #[test]
    fn test_write_wrapper_requires_existing_design() -> Result<()> {
        let scratch = tempfile::tempdir()?;
        let mut component = Component::new("missing.scad", "missing.stl");
        component.module = Some("missing".to_string());

        let result = write_wrapper(
            scratch.path(),
            &component,
            Path::new("does/not/exist.scad"),
        );
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_write_wrapper_creates_file() -> Result<()> {
        let scratch = tempfile::tempdir()?;
        let design = scratch.path().join("bracket.scad");
        std::fs::write(&design, "module bracket() { cube(1); }\n")?;

        let mut component = Component::new("bracket.scad", "bracket.stl");
        component.module = Some("bracket".to_string());

        let wrapper = write_wrapper(scratch.path(), &component, &design)?;
        let source = std::fs::read_to_string(&wrapper)?;

        assert!(wrapper.file_name().unwrap().to_str().unwrap().ends_with("__harness.scad"));
        assert!(source.contains("bracket();"));
        assert!(source.starts_with("use <"));
        Ok(())
    }
}
