// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! CLI output reporter with colored formatting

use crate::generate::ComponentRecord;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// One line per generated component
    pub fn report_component(record: &ComponentRecord) {
        let fallback = if record.used_fallback {
            " (fallback)".yellow().to_string()
        } else {
            String::new()
        };

        let facets = match record.facets {
            Some(count) => format!(", {} facets", count),
            None => String::new(),
        };

        println!(
            "{} {} {} {} {}{}",
            "✅".green(),
            record.name.cyan(),
            "→".bright_black(),
            record.output,
            format!("[{}ms, {} B{}]", record.time_ms, record.bytes, facets).bright_black(),
            fallback
        );
    }

    /// One line per failed component
    pub fn report_failure(name: &str, error: &str) {
        eprintln!("{} {} {}", "❌".red(), name.cyan(), error.red());
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
