// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Cross-platform discovery of the OpenSCAD executable

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// A probed, working OpenSCAD installation
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub path: PathBuf,
    pub version: Option<String>,
}

impl Toolchain {
    /// Short display name for reports and log lines
    pub fn describe(&self) -> String {
        match &self.version {
            Some(version) => format!("{} ({})", self.path.display(), version),
            None => self.path.display().to_string(),
        }
    }
}

/// Executable discovery: explicit override, then `PATH`, then fixed
/// per-platform install locations
#[derive(Debug, Clone, Default)]
pub struct Locator {
    override_path: Option<PathBuf>,
}

impl Locator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer an explicitly configured executable over discovery
    pub fn with_override(path: impl Into<PathBuf>) -> Self {
        Self {
            override_path: Some(path.into()),
        }
    }

    /// Ordered, deduplicated candidate list.
    ///
    /// Order: configured override, `OPENSCAD_PATH`, `openscad` on PATH,
    /// `openscad-nightly` on PATH, then well-known install locations for
    /// the current platform. Fixed locations are only listed if the file
    /// actually exists.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(path) = &self.override_path {
            candidates.push(path.clone());
        }

        if let Ok(path) = std::env::var("OPENSCAD_PATH") {
            if !path.is_empty() {
                candidates.push(PathBuf::from(path));
            }
        }

        for name in ["openscad", "openscad-nightly"] {
            if let Ok(path) = which::which(name) {
                candidates.push(path);
            }
        }

        for path in fixed_candidates() {
            if path.exists() {
                candidates.push(path);
            }
        }

        let mut seen = Vec::new();
        candidates.retain(|c| {
            if seen.contains(c) {
                false
            } else {
                seen.push(c.clone());
                true
            }
        });
        candidates
    }

    /// Resolve the first working candidate.
    ///
    /// A configured override that fails to probe is a hard error; discovery
    /// is not attempted in that case.
    pub fn resolve(&self) -> Result<Toolchain> {
        Ok(self.resolve_with_fallback()?.0)
    }

    /// Resolve the primary toolchain plus the next distinct candidate.
    ///
    /// The runner uses the second path for its single fallback retry.
    pub fn resolve_with_fallback(&self) -> Result<(Toolchain, Option<PathBuf>)> {
        if let Some(path) = &self.override_path {
            let version = probe(path).with_context(|| {
                format!("Configured OpenSCAD executable failed: {}", path.display())
            })?;
            let fallback = self
                .candidates()
                .into_iter()
                .find(|candidate| candidate != path);
            return Ok((
                Toolchain {
                    path: path.clone(),
                    version: Some(version),
                },
                fallback,
            ));
        }

        let candidates = self.candidates();
        if candidates.is_empty() {
            bail!(
                "OpenSCAD not found. Install OpenSCAD or point OPENSCAD_PATH \
                 at the executable."
            );
        }

        for (index, candidate) in candidates.iter().enumerate() {
            if let Ok(version) = probe(candidate) {
                let fallback = candidates.get(index + 1).cloned();
                return Ok((
                    Toolchain {
                        path: candidate.clone(),
                        version: Some(version),
                    },
                    fallback,
                ));
            }
        }

        bail!(
            "OpenSCAD not found ({} candidate(s) failed to run). Install \
             OpenSCAD or point OPENSCAD_PATH at the executable.",
            candidates.len()
        );
    }
}

/// Run `<path> --version` and return the reported version line.
///
/// OpenSCAD prints its version banner on stderr.
pub fn probe(path: &Path) -> Result<String> {
    let output = Command::new(path)
        .arg("--version")
        .output()
        .with_context(|| format!("Failed to launch {}", path.display()))?;

    if !output.status.success() {
        bail!(
            "{} --version exited with status: {}",
            path.display(),
            output.status
        );
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();

    Ok(line.to_string())
}

#[cfg(target_os = "windows")]
fn fixed_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from(r"C:\Program Files\OpenSCAD\openscad.exe"),
        PathBuf::from(r"C:\Program Files (x86)\OpenSCAD\openscad.exe"),
    ]
}

#[cfg(target_os = "macos")]
fn fixed_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Applications/OpenSCAD.app/Contents/MacOS/OpenSCAD"),
        PathBuf::from("/opt/homebrew/bin/openscad"),
    ]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn fixed_candidates() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/openscad"),
        PathBuf::from("/usr/local/bin/openscad"),
        PathBuf::from("/snap/bin/openscad"),
    ]
}
