// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Scadforge
//!
//! A batch driver that locates an installed OpenSCAD, generates small glue
//! input files for parametric design components, and invokes the tool as a
//! subprocess to produce STL meshes. All 3D computation happens inside
//! OpenSCAD itself.

pub mod cli;
pub mod generate;
pub mod locate;
pub mod manifest;
pub mod stl;

pub use generate::{
    generate_all, generate_component, GenerateOptions, GenerationReport, RunError, Runner,
};
pub use locate::{probe, Locator, Toolchain};
pub use manifest::{Component, Manifest, ParamValue};

use anyhow::Result;

/// Generate every component described by the working directory's manifest
pub fn run() -> Result<GenerationReport> {
    let manifest = Manifest::load()?;
    generate_all(&manifest, GenerateOptions::default())
}
