// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Report generation (JSON and Markdown)

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Metadata for one generated mesh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub name: String,
    pub source: String,
    pub output: String,
    pub time_ms: u128,
    pub used_fallback: bool,
    pub bytes: u64,
    pub checksum: String,
    /// Facet count from output inspection; `None` when inspection was
    /// skipped or the file could not be read back
    pub facets: Option<usize>,
}

/// Error information for failed components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationError {
    pub name: String,
    pub error: String,
}

/// Complete generation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub timestamp: String,
    pub tool: String,
    pub tool_version: Option<String>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub fallback_used: usize,
    pub results: Vec<ComponentRecord>,
    pub error_details: Vec<GenerationError>,
}

impl GenerationReport {
    pub fn new(tool: String, tool_version: Option<String>) -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            tool,
            tool_version,
            total: 0,
            succeeded: 0,
            failed: 0,
            fallback_used: 0,
            results: Vec::new(),
            error_details: Vec::new(),
        }
    }

    pub fn add_result(&mut self, record: ComponentRecord) {
        self.total += 1;
        self.succeeded += 1;
        if record.used_fallback {
            self.fallback_used += 1;
        }
        self.results.push(record);
    }

    pub fn add_error(&mut self, name: String, error: String) {
        self.total += 1;
        self.failed += 1;
        self.error_details.push(GenerationError { name, error });
    }

    pub fn success_rate(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f32 / self.total as f32) * 100.0
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Report writer
pub struct Reporter;

impl Reporter {
    /// Write JSON report
    pub fn write_json(report: &GenerationReport, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Write Markdown report
    pub fn write_markdown(report: &GenerationReport, path: &Path) -> Result<()> {
        let mut md = String::new();

        md.push_str(&format!(
            "# Scadforge Generation Report ({})\n\n",
            Utc::now().format("%Y-%m-%d")
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Tool**: {}\n", report.tool));
        if let Some(version) = &report.tool_version {
            md.push_str(&format!("- **Version**: {}\n", version));
        }
        md.push_str(&format!("- **Components**: {}\n", report.total));
        md.push_str(&format!(
            "- **Succeeded**: {} ({:.1}%)\n",
            report.succeeded,
            report.success_rate()
        ));
        md.push_str(&format!("- **Failed**: {}\n", report.failed));
        if report.fallback_used > 0 {
            md.push_str(&format!(
                "- **Fallback retries used**: {}\n",
                report.fallback_used
            ));
        }
        md.push('\n');

        if !report.results.is_empty() {
            md.push_str("## Generated\n\n");
            md.push_str("| Component | Output | Time | Size | Facets |\n");
            md.push_str("|-----------|--------|------|------|--------|\n");
            for record in &report.results {
                let facets = record
                    .facets
                    .map(|count| count.to_string())
                    .unwrap_or_else(|| "-".to_string());
                md.push_str(&format!(
                    "| {} | {} | {}ms | {} B | {} |\n",
                    record.name, record.output, record.time_ms, record.bytes, facets
                ));
            }
            md.push('\n');
        }

        if !report.error_details.is_empty() {
            md.push_str("## Failures\n\n");
            for error in &report.error_details {
                md.push_str(&format!("- **{}**: {}\n", error.name, error.error));
            }
            md.push('\n');
        }

        fs::write(path, md)?;
        Ok(())
    }
}
