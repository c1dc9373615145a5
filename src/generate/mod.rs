// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Mesh generation orchestration

pub mod reporter;
pub mod runner;
pub mod wrapper;

pub use reporter::{ComponentRecord, GenerationError, GenerationReport, Reporter};
pub use runner::{render_args, RunError, RunOutcome, Runner};
pub use wrapper::{wrapper_source, write_wrapper};

use crate::locate::Locator;
use crate::manifest::{Component, Manifest};
use crate::stl;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

/// Options for a generation run
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Parse outputs back and record facet counts
    pub inspect: bool,
    /// Let the tool write its usual console output instead of `--quiet`
    pub loud: bool,
}

/// Build the runner for a manifest: resolve the toolchain and wire up the
/// fallback executable
pub fn runner_for(manifest: &Manifest, options: GenerateOptions) -> Result<(Runner, Option<String>)> {
    let locator = match &manifest.openscad_path {
        Some(path) => Locator::with_override(path.clone()),
        None => Locator::new(),
    };
    let (toolchain, fallback) = locator.resolve_with_fallback()?;
    let runner = Runner::new(toolchain.path)
        .with_fallback(fallback)
        .quiet(!options.loud);
    Ok((runner, toolchain.version))
}

/// Generate one component's mesh output.
///
/// Module components render through a generated wrapper in `scratch`;
/// plain file components take their parameters as `-D` defines.
pub fn generate_component(
    runner: &Runner,
    manifest: &Manifest,
    component: &Component,
    scratch: &Path,
    inspect: bool,
) -> Result<ComponentRecord> {
    let design = manifest.design_path(component);
    if !design.exists() {
        bail!("Design file not found: {}", design.display());
    }

    let output = manifest.output_path(component);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let (input, defines) = if component.module.is_some() {
        // the wrapper already carries the parameters
        (
            write_wrapper(scratch, component, &design)?,
            BTreeMap::new(),
        )
    } else {
        (design.clone(), component.params.clone())
    };

    let outcome = runner.render(&input, &output, &defines)?;

    let bytes = std::fs::metadata(&output)
        .with_context(|| format!("Failed to stat output: {}", output.display()))?
        .len();
    let checksum = stl::checksum(&output)?;
    let facets = if inspect {
        stl::inspect(&output).ok().map(|summary| summary.facets)
    } else {
        None
    };

    Ok(ComponentRecord {
        name: component.name(),
        source: design.display().to_string(),
        output: output.display().to_string(),
        time_ms: outcome.duration.as_millis(),
        used_fallback: outcome.used_fallback,
        bytes,
        checksum,
        facets,
    })
}

/// Generate every component in the manifest.
///
/// Individual failures do not stop the run; they are collected in the
/// report. JSON and Markdown reports are written to the manifest's
/// report directory.
pub fn generate_all(manifest: &Manifest, options: GenerateOptions) -> Result<GenerationReport> {
    let (runner, version) = runner_for(manifest, options)?;
    let mut report = GenerationReport::new(runner.exe().display().to_string(), version);

    let scratch = TempDir::new().context("Failed to create scratch directory")?;

    for component in &manifest.components {
        match generate_component(&runner, manifest, component, scratch.path(), options.inspect) {
            Ok(record) => report.add_result(record),
            Err(error) => report.add_error(component.name(), format!("{:#}", error)),
        }
    }

    std::fs::create_dir_all(&manifest.report_dir).with_context(|| {
        format!(
            "Failed to create report directory: {}",
            manifest.report_dir.display()
        )
    })?;
    Reporter::write_json(&report, &manifest.report_dir.join("latest.json"))?;
    Reporter::write_markdown(&report, &manifest.report_dir.join("report.md"))?;

    Ok(report)
}
