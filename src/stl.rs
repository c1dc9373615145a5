// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Mesh output inspection
//!
//! Reads back the files the external tool produced, for reporting only.
//! No geometry is processed here.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

/// Summary of one mesh output file
#[derive(Debug, Clone, Copy)]
pub struct StlSummary {
    pub bytes: u64,
    pub facets: usize,
}

/// Parse an STL file and count its facets
pub fn inspect(path: &Path) -> Result<StlSummary> {
    let bytes = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat output: {}", path.display()))?
        .len();

    let mut file =
        File::open(path).with_context(|| format!("Failed to open output: {}", path.display()))?;
    let stl = stl_io::read_stl(&mut file)
        .with_context(|| format!("Output is not a readable STL: {}", path.display()))?;

    Ok(StlSummary {
        bytes,
        facets: stl.faces.len(),
    })
}

/// SHA-256 of a file, lowercase hex
pub fn checksum(path: &Path) -> Result<String> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read output: {}", path.display()))?;
    Ok(format!("{:x}", Sha256::digest(&data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT_TRIANGLE: &str = "solid test\n\
        facet normal 0 0 1\n\
        outer loop\n\
        vertex 0 0 0\n\
        vertex 1 0 0\n\
        vertex 0 1 0\n\
        endloop\n\
        endfacet\n\
        endsolid test\n";

    #[test]
    fn test_inspect_counts_facets() -> Result<()> {
        let file = tempfile::NamedTempFile::with_suffix(".stl")?;
        std::fs::write(file.path(), UNIT_TRIANGLE)?;

        let summary = inspect(file.path())?;
        assert_eq!(summary.facets, 1);
        assert_eq!(summary.bytes, UNIT_TRIANGLE.len() as u64);
        Ok(())
    }

    #[test]
    fn test_inspect_rejects_garbage() -> Result<()> {
        let file = tempfile::NamedTempFile::with_suffix(".stl")?;
        std::fs::write(file.path(), "not a mesh at all")?;
        assert!(inspect(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_checksum_is_stable_hex() -> Result<()> {
        let file = tempfile::NamedTempFile::new()?;
        std::fs::write(file.path(), b"")?;

        // SHA-256 of the empty input
        assert_eq!(
            checksum(file.path())?,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        Ok(())
    }
}
