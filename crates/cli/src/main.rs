mod config;
mod kinds;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use ocpi_contract::{CountryCode, IdentityFragment, PartyId};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use kinds::EntityKind;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// OCPI entity toolkit.
#[derive(Parser)]
#[command(name = "ocpi", version, about = "Parse, render and patch OCPI 2.2.1 entities")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log filter (trace, debug, info, warn, error); overrides [log] level
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Settings file (default: ./ocpi.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Out-of-band identity, as a receiver would take it from the request path.
#[derive(clap::Args, Debug, Default)]
struct PathIdentity {
    /// Country code of the owning party
    #[arg(long)]
    country_code: Option<CountryCode>,
    /// Party id of the owning party
    #[arg(long)]
    party_id: Option<PartyId>,
    /// Local id (uid for tokens)
    #[arg(long)]
    id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an entity and print its canonical form
    Parse {
        #[arg(value_enum)]
        kind: EntityKind,
        /// Path to the entity JSON file
        file: PathBuf,
        #[command(flatten)]
        identity: PathIdentity,
    },

    /// Apply a JSON merge patch to an entity
    Patch {
        #[arg(value_enum)]
        kind: EntityKind,
        /// Path to the current entity JSON file
        entity: PathBuf,
        /// Path to the merge patch JSON file
        patch: PathBuf,
        #[command(flatten)]
        identity: PathIdentity,
    },

    /// Check that an entity renders to text that parses back unchanged
    Roundtrip {
        #[arg(value_enum)]
        kind: EntityKind,
        /// Path to the entity JSON file
        file: PathBuf,
        #[command(flatten)]
        identity: PathIdentity,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    let level = cli
        .log_level
        .clone()
        .or_else(|| config.log.level.clone())
        .unwrap_or_else(|| "warn".to_string());
    init_logging(&level);

    let party = match config.party.fragment() {
        Ok(fragment) => fragment,
        Err(e) => {
            report_error(&e, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Parse {
            kind,
            file,
            identity,
        } => {
            let path = out_of_band(identity, &party);
            cmd_parse(kind, &file, &path, cli.output, cli.quiet);
        }
        Commands::Patch {
            kind,
            entity,
            patch,
            identity,
        } => {
            let path = out_of_band(identity, &party);
            cmd_patch(kind, &entity, &patch, &path, cli.output, cli.quiet);
        }
        Commands::Roundtrip {
            kind,
            file,
            identity,
        } => {
            let path = out_of_band(identity, &party);
            cmd_roundtrip(kind, &file, &path, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Flags first, then the configured party.
fn out_of_band(identity: PathIdentity, party: &IdentityFragment) -> IdentityFragment {
    IdentityFragment {
        country_code: identity.country_code.or_else(|| party.country_code.clone()),
        party_id: identity.party_id.or_else(|| party.party_id.clone()),
        id: identity.id,
    }
}

fn read_file(path: &Path, output: OutputFormat, quiet: bool) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = format!("error reading file '{}': {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_parse(
    kind: EntityKind,
    file: &Path,
    path: &IdentityFragment,
    output: OutputFormat,
    quiet: bool,
) {
    let text = read_file(file, output, quiet);
    match kind.parse(&text, path) {
        Ok(parsed) => {
            tracing::info!(kind = parsed.kind, file = %file.display(), "entity is valid");
            match output {
                OutputFormat::Text => {
                    let pretty = serde_json::to_string_pretty(&parsed.canonical)
                        .unwrap_or_else(|e| format!("serialization error: {}", e));
                    println!("{}", pretty);
                }
                OutputFormat::Json => {
                    println!("{}", parsed.canonical);
                }
            }
        }
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_patch(
    kind: EntityKind,
    entity_path: &Path,
    patch_path: &Path,
    path: &IdentityFragment,
    output: OutputFormat,
    quiet: bool,
) {
    let entity = read_file(entity_path, output, quiet);
    let patch_text = read_file(patch_path, output, quiet);
    let patch: serde_json::Value = match serde_json::from_str(&patch_text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error parsing JSON in '{}': {}", patch_path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let report = match kind.patch(&entity, &patch, path) {
        Ok(report) => report,
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "success": report.error.is_none(),
                "error": report.error.as_ref().map(ToString::to_string),
                "field": report.error.as_ref().and_then(|e| e.field()),
                "entity": report.entity,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            if let Some(error) = &report.error {
                if !quiet {
                    eprintln!("{}", error);
                }
            }
            let pretty = serde_json::to_string_pretty(&report.entity)
                .unwrap_or_else(|e| format!("serialization error: {}", e));
            println!("{}", pretty);
        }
    }

    if report.error.is_some() {
        tracing::info!(kind = report.kind, "patch rejected, original entity kept");
        process::exit(1);
    }
}

fn cmd_roundtrip(
    kind: EntityKind,
    file: &Path,
    path: &IdentityFragment,
    output: OutputFormat,
    quiet: bool,
) {
    let text = read_file(file, output, quiet);
    let first = match kind.parse(&text, path) {
        Ok(parsed) => parsed,
        Err(e) => {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
    };

    let rendered = first.canonical.to_string();
    let second = match kind.parse(&rendered, path) {
        Ok(parsed) => parsed,
        Err(e) => {
            let msg = format!("canonical form of {} no longer parses: {}", first.kind, e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let stable = second == first;
    if !quiet {
        match output {
            OutputFormat::Text => {
                if stable {
                    println!("stable: {} (last_updated {})", first.kind, first.last_updated);
                } else {
                    println!("unstable: {}", first.kind);
                }
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "kind": first.kind,
                    "stable": stable,
                    "last_updated": first.last_updated.to_string(),
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json).unwrap_or_default()
                );
            }
        }
    }
    if !stable {
        process::exit(1);
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
