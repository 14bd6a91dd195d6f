mod render;

use std::fs;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use callgrind_toolchain_core::{Severity, parse_str, to_pretty_json};
use callgrind_toolchain_diagnostics::{self as diag, Diagnostic};
use callgrind_toolchain_loader::load_path;

use crate::render::{Format, print_summary, render_diagnostics};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cg",
    version,
    about = "Callgrind toolchain — parse, check, and inspect Callgrind profile data"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse a Callgrind file and print the profile.
    Parse { file: String },

    /// Check that a Callgrind file produces a valid profile.
    Check { file: String },

    /// List the functions in a Callgrind file with their defining objects.
    Functions { file: String },

    /// Explain a diagnostic ID (e.g. CGP1001).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    match cli.cmd {
        Cmd::Parse { file } => cmd_parse(&file, format)?,
        Cmd::Check { file } => cmd_check(&file, format)?,
        Cmd::Functions { file } => cmd_functions(&file, format)?,
        Cmd::Explain { id } => cmd_explain(&id, format),
    }

    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(file: &str, format: Format) -> Result<()> {
    let input = fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    let res = parse_str(&input);

    match format {
        Format::Json => {
            // Single valid JSON object to stdout.
            let out = serde_json::json!({
                "profile": res.profile,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Profile to stdout, diagnostics to stderr.
            if let Some(profile) = &res.profile {
                println!("{}", to_pretty_json(profile));
            }
            if !res.diagnostics.is_empty() {
                render_diagnostics(&input, file, &res.diagnostics, format);
                print_summary(&res.diagnostics);
            }
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_check(file: &str, format: Format) -> Result<()> {
    let input = fs::read_to_string(file).with_context(|| format!("failed to read {file}"))?;
    let res = parse_str(&input);
    let ok = res.is_ok();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": ok,
                "diagnostics": res.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            render_diagnostics(&input, file, &res.diagnostics, format);
            print_summary(&res.diagnostics);
            if ok {
                eprintln!("profile ok");
            }
        }
    }

    exit_on_errors(&res.diagnostics);
    Ok(())
}

fn cmd_functions(file: &str, format: Format) -> Result<()> {
    let profile = load_path(file).with_context(|| format!("failed to load {file}"))?;

    match format {
        Format::Json => {
            let functions: Vec<serde_json::Value> = profile
                .functions()
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "name": f.name(),
                        "object": f.object(),
                    })
                })
                .collect();
            let out = serde_json::json!({
                "command": profile.command(),
                "functions": functions,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            eprintln!("command: {}", profile.command());
            for f in profile.functions() {
                if f.object().is_empty() {
                    println!("{}", f.name());
                } else {
                    println!("{}  [{}]", f.name(), f.object());
                }
            }
        }
    }

    Ok(())
}

fn cmd_explain(id: &str, format: Format) {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&out).expect("explain JSON cannot fail")
            );
        }
        Format::Pretty => {
            // The explanation is the expected output — stdout, not stderr.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Exit with code 1 if any diagnostic is an error.
/// Warnings and info do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}
