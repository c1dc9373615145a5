// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Subprocess invocation with a single fallback retry

use crate::manifest::ParamValue;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Failure modes of one external tool invocation
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to launch {}: {source}", exe.display())]
    Launch {
        exe: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} exited with {status}: {}", exe.display(), stderr.trim())]
    Failed {
        exe: PathBuf,
        status: ExitStatus,
        stderr: String,
    },
    #[error("Tool reported success but wrote no output: {}", .0.display())]
    MissingOutput(PathBuf),
}

impl RunError {
    /// Launch and exit failures are worth one retry through an alternate
    /// executable. A run that "succeeded" without producing output is not.
    fn retryable(&self) -> bool {
        matches!(self, RunError::Launch { .. } | RunError::Failed { .. })
    }
}

/// Result of a successful render
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub duration: Duration,
    pub used_fallback: bool,
}

/// Build the argument list for one render invocation:
/// `-o <output> [-D name=value ...] <input> [--quiet]`
pub fn render_args(
    output: &Path,
    input: &Path,
    params: &BTreeMap<String, ParamValue>,
    quiet: bool,
) -> Vec<OsString> {
    let mut args = vec![OsString::from("-o"), output.into()];

    for (name, value) in params {
        args.push(OsString::from("-D"));
        args.push(OsString::from(format!("{}={}", name, value.to_scad())));
    }

    args.push(input.into());
    if quiet {
        args.push(OsString::from("--quiet"));
    }
    args
}

/// Executes render invocations against a resolved executable, retrying
/// once through an alternate executable on failure
#[derive(Debug, Clone)]
pub struct Runner {
    exe: PathBuf,
    fallback_exe: Option<PathBuf>,
    quiet: bool,
}

impl Runner {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            fallback_exe: None,
            quiet: true,
        }
    }

    /// Alternate executable for the single retry
    pub fn with_fallback(mut self, fallback: Option<PathBuf>) -> Self {
        self.fallback_exe = fallback;
        self
    }

    /// Whether `--quiet` is passed to the tool (on by default)
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Render `input` to `output`.
    ///
    /// On a retryable failure the same argument list is replayed exactly
    /// once against the fallback executable. If that also fails, the
    /// primary attempt's error is reported.
    pub fn render(
        &self,
        input: &Path,
        output: &Path,
        params: &BTreeMap<String, ParamValue>,
    ) -> Result<RunOutcome, RunError> {
        let args = render_args(output, input, params, self.quiet);
        let start = Instant::now();

        match invoke(&self.exe, &args, output) {
            Ok(()) => Ok(RunOutcome {
                duration: start.elapsed(),
                used_fallback: false,
            }),
            Err(primary) => match &self.fallback_exe {
                Some(fallback) if primary.retryable() => {
                    match invoke(fallback, &args, output) {
                        Ok(()) => Ok(RunOutcome {
                            duration: start.elapsed(),
                            used_fallback: true,
                        }),
                        Err(_) => Err(primary),
                    }
                }
                _ => Err(primary),
            },
        }
    }
}

fn invoke(exe: &Path, args: &[OsString], output: &Path) -> Result<(), RunError> {
    let out = Command::new(exe)
        .args(args)
        .output()
        .map_err(|source| RunError::Launch {
            exe: exe.to_path_buf(),
            source,
        })?;

    if !out.status.success() {
        return Err(RunError::Failed {
            exe: exe.to_path_buf(),
            status: out.status,
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        });
    }

    if !output.exists() {
        return Err(RunError::MissingOutput(output.to_path_buf()));
    }

    Ok(())
}
