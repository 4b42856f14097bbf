//! deadsnip CLI - dead code eliminator driven by a reference graph manifest.
//!
//! Features:
//! - Strict (verified references) or fuzzy (plus textual matches) reachability
//! - deadsnip.toml configuration, overridden by flags
//! - Plain or JSON reports, Graphviz DOT visualization
//! - In-place fixing with dry-run and line-number preserving modes
//!
//! Exit codes: 0 no dead code, 1 dead code found, 2 error.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use deadsnip_core::{
    generate_dot, init_structured_logging, load_config, load_manifest, print_fix_summary,
    print_plain, to_json, AnalysisResult, Checkpoint, Deadsnip, FixResult, Progress, RunLog,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Compact,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Mark-and-sweep dead code eliminator")]
pub struct Cli {
    /// Path to the root of the analyzed project
    #[arg(default_value = ".")]
    path: String,

    /// Reference graph manifest (default: deadsnip-graph.json in PATH)
    #[arg(long, value_name = "FILE")]
    manifest: Option<String>,

    /// Globs for files to treat as entrypoints
    #[arg(long, num_args = 1..)]
    entrypoint: Vec<String>,

    /// Globs for files that may be edited or deleted
    #[arg(long, num_args = 1..)]
    sources: Vec<String>,

    /// Declaration or file name patterns to keep and not report
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Treat textual (grep) references as real references
    #[arg(long)]
    follow_grep: bool,

    /// Blank out removed code instead of deleting lines
    #[arg(long)]
    preserve_lines: bool,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Generate Graphviz DOT output for the declaration graph
    /// (embedded under "dot" in --json output)
    #[arg(long)]
    dot: bool,

    /// Write DOT output to a specified file instead of stdout
    #[arg(long)]
    dot_file: Option<String>,

    /// Remove dead declarations and files in place
    #[arg(long)]
    fix: bool,

    /// Show what would be removed without changing anything
    #[arg(long)]
    fix_dry_run: bool,

    /// Log output format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects:
/// - Absolute paths (must be relative to current directory)
/// - Paths containing `..` (parent directory traversal)
/// - Paths with null bytes (injection attacks)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    for component in p.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(anyhow!(
                "Path traversal (..) not allowed in output paths: {}",
                path
            ));
        }
    }

    // Backslash separators are not components on unix
    let normalized = path.replace('\\', "/");
    if normalized.contains("/../") || normalized.starts_with("../") {
        return Err(anyhow!("Path traversal attempt detected: {}", path));
    }

    Ok(p)
}

/// Merge deadsnip.toml with command-line flags. Flags win.
fn configure(cli: &Cli, root: &Path) -> Result<(Deadsnip, bool)> {
    let cfg = load_config(root)
        .with_context(|| format!("Failed to load config in {}", root.display()))?
        .unwrap_or_default();
    let json = cli.json || cfg.output.as_ref().is_some_and(|o| o.is_json());

    let mut builder = Deadsnip::from_config(root, &cfg)
        .entrypoints(cli.entrypoint.iter().cloned())
        .sources(cli.sources.iter().cloned())
        .ignore_patterns(cli.ignore.iter().cloned())
        .dry_run(cli.fix_dry_run);
    if let Some(manifest) = &cli.manifest {
        builder = builder.manifest(manifest);
    }
    if cli.follow_grep {
        builder = builder.follow_grep_references(true);
    }
    if cli.preserve_lines {
        builder = builder.preserve_line_numbers(true);
    }
    Ok((builder, json))
}

/// The JSON document: report, fix outcome, and DOT when it has no file to go to.
fn json_document(
    result: &AnalysisResult,
    fixed: Option<&FixResult>,
    dot: Option<&str>,
) -> Result<serde_json::Value> {
    let mut doc = to_json(result);
    if let Some(fixed) = fixed {
        doc["fix"] = serde_json::to_value(fixed)?;
    }
    if let Some(dot) = dot {
        doc["dot"] = serde_json::Value::String(dot.to_string());
    }
    Ok(doc)
}

fn print_report(
    result: &AnalysisResult,
    fixed: Option<&FixResult>,
    stdout_dot: Option<&str>,
    json: bool,
) -> Result<()> {
    if json {
        let doc = json_document(result, fixed, stdout_dot)?;
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_plain(result);
        if let Some(fixed) = fixed {
            print_fix_summary(fixed);
        }
        if let Some(dot) = stdout_dot {
            println!("{}", dot);
        }
    }
    Ok(())
}

/// Run the command; returns the process exit code.
fn run(cli: &Cli) -> Result<i32> {
    let root = PathBuf::from(&cli.path);
    if !root.is_dir() {
        bail!("Not a directory: {}", root.display());
    }

    // Validate before doing any work
    let dot_path = match cli.dot_file.as_deref().map(validate_output_path).transpose() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[ERROR] Invalid output path: {}", e);
            return Ok(2);
        }
    };

    let (builder, json) = configure(cli, &root)?;
    let log = RunLog::new(&root);

    let manifest_path = builder.manifest_path();
    let manifest = load_manifest(&manifest_path)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

    let result = {
        let mut checkpoint = Checkpoint::new(|p: &Progress| {
            log.info(&format!(
                "[{}] files={} declarations={} usages={} marked={}",
                p.phase, p.files, p.declarations, p.analyzed_usages, p.marked_nodes
            ));
        });
        builder.analyze_manifest(&manifest, &log, &mut checkpoint)?
    };

    let fixed = (cli.fix || cli.fix_dry_run).then(|| builder.fix(&result, &log));

    let dot = (cli.dot || dot_path.is_some())
        .then(|| generate_dot(&result.project, builder.sweep_flag()));
    if let (Some(dot), Some(path)) = (&dot, &dot_path) {
        if let Err(e) = fs::write(path, dot) {
            eprintln!("[WARN] DOT write failed to {}: {}", path.display(), e);
        }
    }
    let stdout_dot = if dot_path.is_none() { dot.as_deref() } else { None };
    print_report(&result, fixed.as_ref(), stdout_dot, json)?;

    if fixed.as_ref().is_some_and(|f| f.has_errors()) {
        return Ok(2);
    }
    Ok(if result.has_dead_code() { 1 } else { 0 })
}

fn main() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadsnip internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
    }));

    let cli = Cli::parse();

    // Structured logging on stderr, respects RUST_LOG
    init_structured_logging(cli.log_format == LogFormat::Json);

    let code = match std::panic::catch_unwind(|| run(&cli)) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            eprintln!("[ERROR] {:#}", e);
            2
        }
        Err(_) => 2,
    };
    std::process::exit(code);
}
