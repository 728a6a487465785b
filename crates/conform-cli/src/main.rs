use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;

use conform_core::{
    classify, Capability, ClassifiedMember, MemberDescriptor, Module, ModuleReport, Outcome,
    VerificationCache, VerifyOptions,
};

/// Conform - structural contract checks
///
/// Load declaration files and verify that types satisfy the contracts
/// they attach with `@implements(...)`.
#[derive(Parser)]
#[command(name = "conform", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress human-readable output; only the exit code reports the result
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every @implements attachment in a file
    Check {
        /// Path to .conform file
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Ignore parameter and return annotations
        #[arg(long)]
        no_annotations: bool,
        /// Options file (default: conform.json next to the input)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Verify one candidate against one contract
    Verify {
        /// Path to .conform file
        file: PathBuf,
        /// Contract name
        #[arg(long)]
        contract: String,
        /// Candidate type name
        #[arg(long)]
        candidate: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Ignore parameter and return annotations
        #[arg(long)]
        no_annotations: bool,
    },

    /// List the classified members visible on a type
    Members {
        /// Path to .conform file
        file: PathBuf,
        /// Type name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the ancestor chain of a type
    Mro {
        /// Path to .conform file
        file: PathBuf,
        /// Type name
        name: String,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let outcome = match cli.command {
        Commands::Check {
            file,
            json,
            no_annotations,
            config,
        } => cmd_check(&file, json, cli.quiet, no_annotations, config.as_deref()),
        Commands::Verify {
            file,
            contract,
            candidate,
            json,
            no_annotations,
        } => cmd_verify(&file, &contract, &candidate, json, cli.quiet, no_annotations),
        Commands::Members { file, name, json } => cmd_members(&file, &name, json),
        Commands::Mro { file, name } => cmd_mro(&file, &name),
        Commands::Version => {
            println!(
                "conform {} (conform-core {})",
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_VERSION")
            );
            Ok(0)
        }
    };

    let exit_code = match outcome {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            2
        }
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

// ── Helpers ───────────────────────────────────────────────

fn load_module(file: &Path) -> Result<Module> {
    let source = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let module =
        Module::load(&source).with_context(|| format!("cannot load {}", file.display()))?;
    debug!(file = %file.display(), types = module.registry().len(), "loaded");
    Ok(module)
}

/// `--config` wins; otherwise `conform.json` beside the input file
fn resolve_options(file: &Path, config_path: Option<&Path>, no_annotations: bool) -> VerifyOptions {
    let options = match config_path {
        Some(path) => config::load_file(path),
        None => config::load(file.parent().unwrap_or_else(|| Path::new("."))),
    };
    if no_annotations {
        options.without_annotations()
    } else {
        options
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── Commands ──────────────────────────────────────────────

fn cmd_check(
    file: &Path,
    json: bool,
    quiet: bool,
    no_annotations: bool,
    config: Option<&Path>,
) -> Result<i32> {
    let module = load_module(file)?;
    let options = resolve_options(file, config, no_annotations);
    let report = module.check(&options, &VerificationCache::new());

    if json {
        print_json(&report)?;
    } else if !quiet {
        print_report(file, &report);
    }
    Ok(if report.is_clean() { 0 } else { 1 })
}

fn print_report(file: &Path, report: &ModuleReport) {
    if report.outcomes.is_empty() {
        println!(
            "{} {}: {} type(s), no attachments",
            "✓".green(),
            file.display(),
            report.types
        );
        return;
    }

    for outcome in &report.outcomes {
        match &outcome.outcome {
            Outcome::Satisfied => println!(
                "{} {} implements {}",
                "✓".green(),
                outcome.candidate.bold(),
                outcome.contract.bold()
            ),
            Outcome::Unsatisfied(result) => {
                println!(
                    "{} {} does not implement {} ({} violation(s))",
                    "✗".red(),
                    outcome.candidate.bold(),
                    outcome.contract.bold(),
                    result.count()
                );
                for violation in &result.violations {
                    println!("    {} {}", format!("[{}]", violation.kind).yellow(), violation.message);
                }
            }
            Outcome::Misconfigured(message) => {
                println!("{} {}", "✗".red(), message);
            }
        }
    }

    let failures = report.failures().count();
    if failures == 0 {
        println!("{} {} attachment(s) satisfied", "✓".green(), report.outcomes.len());
    } else {
        println!(
            "{} {} of {} attachment(s) failed, {} violation(s)",
            "✗".red(),
            failures,
            report.outcomes.len(),
            report.violation_count()
        );
    }
}

fn cmd_verify(
    file: &Path,
    contract: &str,
    candidate: &str,
    json: bool,
    quiet: bool,
    no_annotations: bool,
) -> Result<i32> {
    let module = load_module(file)?;
    let options = resolve_options(file, None, no_annotations);
    let result = conform_core::verify(module.registry(), contract, candidate, &options)?;

    if json {
        print_json(&result)?;
    } else if !quiet {
        let mark = if result.is_valid() { "✓".green() } else { "✗".red() };
        println!("{} {}", mark, result);
    }
    Ok(if result.is_valid() { 0 } else { 1 })
}

fn cmd_members(file: &Path, name: &str, json: bool) -> Result<i32> {
    let module = load_module(file)?;
    let members = classify::members(module.registry(), name)?;

    if json {
        let list: Vec<&ClassifiedMember> = members.values().collect();
        print_json(&list)?;
        return Ok(0);
    }

    for member in members.values() {
        println!(
            "{:<24} {:<28} {}",
            member.name.bold(),
            render_descriptor(&member.descriptor),
            format!("({})", member.owner).dimmed()
        );
    }
    Ok(0)
}

fn render_descriptor(descriptor: &MemberDescriptor) -> String {
    match descriptor {
        MemberDescriptor::Callable { kind, signature } => format!("{} {}", kind, signature),
        MemberDescriptor::Accessor { .. } => {
            let parts: Vec<String> = Capability::ALL
                .iter()
                .filter_map(|cap| {
                    descriptor
                        .part(*cap)
                        .map(|part| format!("{}{}", cap, part.signature))
                })
                .collect();
            format!("accessor [{}]", parts.join(", "))
        }
        MemberDescriptor::Attribute { .. } => "attribute".to_string(),
    }
}

fn cmd_mro(file: &Path, name: &str) -> Result<i32> {
    let module = load_module(file)?;
    let chain = module.registry().ancestors(name)?;
    println!("{}", chain.join(" → "));
    Ok(0)
}
