// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Scadforge Team

//! Scadforge CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use scadforge::cli::Reporter;
use scadforge::generate::{self, GenerateOptions, GenerationReport};
use scadforge::locate::{probe, Locator};
use scadforge::manifest::Manifest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scadforge")]
#[command(about = "Batch STL generation driver for OpenSCAD component libraries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input SCAD file (one-off render shorthand)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Output STL file
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate STL outputs for every component
    Generate {
        /// Manifest file (default: scadforge.toml, else the built-in list)
        #[arg(short, long)]
        manifest: Option<String>,

        /// Discover .scad files in a directory instead of the manifest list
        #[arg(short, long)]
        dir: Option<String>,

        /// Output directory override
        #[arg(short, long)]
        out: Option<String>,

        /// Parse outputs back and report facet counts
        #[arg(long)]
        inspect: bool,

        /// Let the tool print its usual console output
        #[arg(long)]
        loud: bool,
    },

    /// List the components the manifest would generate
    List {
        /// Manifest file
        #[arg(short, long)]
        manifest: Option<String>,
    },

    /// Check the environment: executable candidates, versions, design files
    Doctor,

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Generate {
            manifest,
            dir,
            out,
            inspect,
            loud,
        }) => {
            generate_command(
                manifest.as_deref(),
                dir.as_deref(),
                out.as_deref(),
                GenerateOptions {
                    inspect: *inspect,
                    loud: *loud,
                },
                cli.verbose,
            )?;
        }
        Some(Commands::List { manifest }) => {
            list_command(manifest.as_deref())?;
        }
        Some(Commands::Doctor) => {
            doctor_command()?;
        }
        Some(Commands::Version) => {
            println!("scadforge v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            // Default behavior: render one file to one output
            if let (Some(input), Some(output)) = (&cli.input, &cli.output) {
                render_command(input, output, cli.verbose)?;
            } else {
                eprintln!("Error: Input and output files required");
                eprintln!("Usage: scadforge <INPUT> --output <OUTPUT>");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Load the manifest a subcommand should operate on
fn load_manifest(manifest: Option<&str>, dir: Option<&str>) -> Result<Manifest> {
    match (manifest, dir) {
        (_, Some(dir)) => Manifest::discover(dir),
        (Some(path), None) => Manifest::from_file(path),
        (None, None) => Manifest::load(),
    }
}

fn generate_command(
    manifest_path: Option<&str>,
    dir: Option<&str>,
    out: Option<&str>,
    options: GenerateOptions,
    verbose: bool,
) -> Result<()> {
    let mut manifest = load_manifest(manifest_path, dir)?;
    if let Some(out) = out {
        manifest.output_dir = PathBuf::from(out);
    }

    if manifest.components.is_empty() {
        Reporter::report_error("No components to generate");
        std::process::exit(1);
    }

    let (runner, version) = match generate::runner_for(&manifest, options) {
        Ok(resolved) => resolved,
        Err(error) => {
            Reporter::report_error(&format!("{:#}", error));
            std::process::exit(1);
        }
    };

    if verbose {
        if let Some(version) = &version {
            Reporter::report_info(&format!("Using {} ({})", runner.exe().display(), version));
        }
    }

    // with --loud the tool owns the console, no progress bar
    let progress = if options.loud {
        None
    } else {
        let bar = ProgressBar::new(manifest.components.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    };

    let scratch = tempfile::TempDir::new()?;
    let mut report = GenerationReport::new(runner.exe().display().to_string(), version);

    for component in &manifest.components {
        if let Some(bar) = &progress {
            bar.set_message(format!("Generating {}", component.name()));
        }

        match generate::generate_component(
            &runner,
            &manifest,
            component,
            scratch.path(),
            options.inspect,
        ) {
            Ok(record) => {
                if let Some(bar) = &progress {
                    bar.suspend(|| Reporter::report_component(&record));
                } else {
                    Reporter::report_component(&record);
                }
                if options.inspect && record.facets.is_none() {
                    Reporter::report_warning(&format!(
                        "{}: output could not be parsed back as STL",
                        record.name
                    ));
                }
                report.add_result(record);
            }
            Err(error) => {
                let message = format!("{:#}", error);
                if let Some(bar) = &progress {
                    bar.suspend(|| Reporter::report_failure(&component.name(), &message));
                } else {
                    Reporter::report_failure(&component.name(), &message);
                }
                report.add_error(component.name(), message);
            }
        }

        if let Some(bar) = &progress {
            bar.inc(1);
        }
    }

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    std::fs::create_dir_all(&manifest.report_dir)?;
    generate::Reporter::write_json(&report, &manifest.report_dir.join("latest.json"))?;
    generate::Reporter::write_markdown(&report, &manifest.report_dir.join("report.md"))?;

    print_summary(&report, &manifest);

    if !report.all_succeeded() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(report: &GenerationReport, manifest: &Manifest) {
    println!("\n{}", "═".repeat(80).bright_black());
    println!("{}", "Generation Summary".bold());
    println!("{}", "═".repeat(80).bright_black());
    println!(
        "  {} {}",
        "Components:".bright_black(),
        report.total.to_string().cyan()
    );
    println!(
        "  {} {} ({:.1}%)",
        "Succeeded:".bright_black(),
        report.succeeded.to_string().green(),
        report.success_rate()
    );
    println!(
        "  {} {}",
        "Failed:".bright_black(),
        if report.failed > 0 {
            report.failed.to_string().red()
        } else {
            report.failed.to_string().green()
        }
    );
    if report.fallback_used > 0 {
        println!(
            "  {} {}",
            "Fallback retries:".bright_black(),
            report.fallback_used.to_string().yellow()
        );
    }
    println!(
        "  {} {}",
        "Output Directory:".bright_black(),
        manifest.output_dir.display().to_string().cyan()
    );
    println!(
        "  {} {}",
        "JSON Report:".bright_black(),
        manifest
            .report_dir
            .join("latest.json")
            .display()
            .to_string()
            .cyan()
    );
    println!("{}", "═".repeat(80).bright_black());
}

fn render_command(input: &str, output: &str, verbose: bool) -> Result<()> {
    if !Path::new(input).exists() {
        eprintln!("Error: Input file not found: {}", input);
        std::process::exit(1);
    }

    let manifest = Manifest::load()?;
    let (runner, version) = generate::runner_for(&manifest, GenerateOptions::default())?;

    if verbose {
        if let Some(version) = &version {
            println!("Using {} ({})", runner.exe().display(), version);
        }
    }

    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let outcome = match runner.render(Path::new(input), Path::new(output), &BTreeMap::new()) {
        Ok(outcome) => outcome,
        Err(error) => {
            Reporter::report_error(&error.to_string());
            std::process::exit(1);
        }
    };

    if verbose {
        println!(
            "Rendered in {}",
            Reporter::format_duration(outcome.duration)
        );
        if outcome.used_fallback {
            Reporter::report_warning("Primary executable failed, fallback succeeded");
        }
    }
    println!("Successfully generated {} -> {}", input, output);

    Ok(())
}

fn list_command(manifest_path: Option<&str>) -> Result<()> {
    let manifest = load_manifest(manifest_path, None)?;

    println!(
        "{} ({} component(s))",
        "Manifest".bold(),
        manifest.components.len()
    );
    println!(
        "  {} {}",
        "Components Dir:".bright_black(),
        manifest.components_dir.display()
    );
    println!(
        "  {} {}",
        "Output Dir:".bright_black(),
        manifest.output_dir.display()
    );
    println!();

    for component in &manifest.components {
        let module = match &component.module {
            Some(module) => format!(" module {}()", module).yellow().to_string(),
            None => String::new(),
        };
        let params = if component.params.is_empty() {
            String::new()
        } else {
            format!(" [{} param(s)]", component.params.len())
                .bright_black()
                .to_string()
        };
        println!(
            "  {} {} {}{}{}",
            component.file.display().to_string().cyan(),
            "→".bright_black(),
            component.output.display(),
            module,
            params
        );
    }

    Ok(())
}

fn doctor_command() -> Result<()> {
    let manifest = Manifest::load()?;

    println!("{}", "→ Checking OpenSCAD candidates...".bright_blue());
    let locator = match &manifest.openscad_path {
        Some(path) => Locator::with_override(path.clone()),
        None => Locator::new(),
    };

    let candidates = locator.candidates();
    if candidates.is_empty() {
        println!("  {} no candidates found", "✗".red());
    }

    let mut any_working = false;
    for candidate in &candidates {
        match probe(candidate) {
            Ok(version) => {
                any_working = true;
                println!("  {} {} - {}", "✓".green(), candidate.display(), version);
            }
            Err(_) => {
                println!("  {} {} - not runnable", "✗".red(), candidate.display());
            }
        }
    }

    println!("{}", "→ Checking design files...".bright_blue());
    let mut all_present = true;
    for component in &manifest.components {
        let design = manifest.design_path(component);
        if design.exists() {
            println!("  {} {}", "✓".green(), design.display());
        } else {
            all_present = false;
            println!("  {} {} - missing", "✗".red(), design.display());
        }
    }

    if !any_working {
        Reporter::report_error(
            "OpenSCAD not found. Install OpenSCAD or point OPENSCAD_PATH at the executable.",
        );
        std::process::exit(1);
    }
    if !all_present {
        Reporter::report_error("Some design files are missing");
        std::process::exit(1);
    }

    Reporter::success("Environment looks good");
    Ok(())
}
