//! Family Tree CLI
//!
//! Inspects a member record snapshot (a JSON array as exported from the
//! store) without a renderer:
//!
//! ```text
//! family_tree layout   --records members.json [--expand-all] [--orientation radial]
//! family_tree branches --records members.json [--query yamada]
//! family_tree audit    --records members.json
//! ```
//!
//! Reads stdin when `--records` is omitted. Logging goes to stderr and is
//! controlled by `RUST_LOG` (default `warn`).

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use family_forest::error::parse_records;
use family_forest::hierarchy::{audit_with, married_with_parent, Severity};
use family_forest::layout::{ExpansionState, Orientation};
use family_forest::roster::members_by_branch;
use family_forest::{FamilyTreeSession, ForestConfig, Member, RecordIndex, TreeStatus};

#[derive(Parser)]
#[command(name = "family_tree")]
#[command(version = "0.1.0")]
#[command(about = "Resolve member records into a family tree and inspect its layout")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Member records as a JSON array (reads stdin if not provided)
    #[arg(long, short = 'r', global = true)]
    records: Option<PathBuf>,

    /// YAML configuration file
    #[arg(long, short = 'c', global = true, env = "FAMILY_TREE_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', global = true, default_value = "pretty", value_enum)]
    format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the positioned nodes and edges
    Layout {
        /// Run the cascading reveal to the end before printing
        #[arg(long)]
        expand_all: bool,

        /// Override the configured orientation: vertical, horizontal or radial
        #[arg(long)]
        orientation: Option<Orientation>,
    },

    /// Print every branch in depth-first family order
    Branches {
        /// Only members whose full name contains this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Report data-quality findings
    Audit,
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "ERROR:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ForestConfig::load_from_file(path)?,
        None => ForestConfig::default(),
    };
    let records = read_records(cli.records.as_ref())?;

    match &cli.command {
        Commands::Layout {
            expand_all,
            orientation,
        } => cmd_layout(config, records, *expand_all, *orientation, cli.format),
        Commands::Branches { query } => cmd_branches(&config, records, query.as_deref(), cli.format),
        Commands::Audit => cmd_audit(&config, records, cli.format),
    }
}

fn read_records(path: Option<&PathBuf>) -> anyhow::Result<Vec<Member>> {
    let source = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };
    Ok(parse_records(&source)?)
}

// =============================================================================
// COMMANDS
// =============================================================================

fn cmd_layout(
    mut config: ForestConfig,
    records: Vec<Member>,
    expand_all: bool,
    orientation: Option<Orientation>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if let Some(orientation) = orientation {
        config.layout.orientation = orientation;
    }
    let step = config.cascade.level_delay();
    let mut session = FamilyTreeSession::new(config);

    if session.rebuild(records) == TreeStatus::NoFounder {
        anyhow::bail!("no generation-1 founder in the records");
    }

    if expand_all {
        session.request_cascade_expand()?;
        while session.is_animating() {
            session.advance(step.max(Duration::from_millis(1)));
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(session.snapshot())?);
        return Ok(());
    }

    let viewport = session.viewport();
    println!(
        "{} {} nodes, {} edges, scale {:.2}",
        "Layout:".bold(),
        session.visible_nodes().len(),
        session.edges().len(),
        viewport.scale
    );
    for node in session.visible_nodes() {
        let indent = "  ".repeat(node.depth as usize);
        let marker = match node.expansion_state {
            ExpansionState::Expanded => "-",
            ExpansionState::Collapsed => "+",
            ExpansionState::Leaf => " ",
        };
        let label = if node.is_deceased {
            node.label.dimmed().to_string()
        } else {
            node.label.clone()
        };
        let spouse = node
            .spouse
            .as_ref()
            .map(|s| format!(" = {}", s.label).cyan().to_string())
            .unwrap_or_default();
        println!(
            "{}{} {}{} ({:.1}, {:.1})",
            indent, marker, label, spouse, node.x, node.y
        );
    }
    Ok(())
}

fn cmd_branches(
    config: &ForestConfig,
    records: Vec<Member>,
    query: Option<&str>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let index = RecordIndex::build(records);
    let groups = members_by_branch(&index, query, &config.branches);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    for group in &groups {
        println!(
            "{} {} ({})",
            format!("[{}]", group.branch_id).bold(),
            group.label.bold(),
            group.members.len()
        );
        for member in &group.members {
            println!(
                "  gen {:>2}  {}{}",
                member.generation,
                member.display_name(),
                if member.is_deceased() { " (deceased)" } else { "" }
            );
        }
    }
    Ok(())
}

fn cmd_audit(config: &ForestConfig, records: Vec<Member>, format: OutputFormat) -> anyhow::Result<()> {
    let index = RecordIndex::build(records);
    let warnings = audit_with(&index, &config.hierarchy);
    let review = married_with_parent(&index);

    if format == OutputFormat::Json {
        let report = serde_json::json!({
            "warnings": warnings,
            "marriedWithParent": review,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if warnings.is_empty() {
        println!("{} no data-quality findings", "OK".green().bold());
    }
    for warning in &warnings {
        let tag = match warning.severity() {
            Severity::Error => "error".red().bold(),
            Severity::Warn => "warn".yellow().bold(),
            Severity::Info => "info".blue(),
        };
        println!("{:>5} {}", tag, warning);
    }

    if !review.is_empty() {
        println!();
        println!("{}", "Married members with a recorded parent:".bold());
        for row in &review {
            println!(
                "  {} {} (gen {}) parent: {} spouse: {}",
                row.id,
                row.name,
                row.generation,
                row.parent.as_deref().unwrap_or("unknown"),
                row.spouse.as_deref().unwrap_or("unknown")
            );
        }
    }
    Ok(())
}
