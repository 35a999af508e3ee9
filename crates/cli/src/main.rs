//! `utility` command-line tool.
//!
//! Thin wrapper over `utility-uuid`: every subcommand maps onto one identifier operation.
//! Command output goes to stdout; logs go to stderr.
//!
//! # Environment Variables
//! - `UTILITY_LOG`: tracing filter directive (default: "utility=info")
//! - `UTILITY_DEFAULT_COUNT`: how many identifiers `generate` prints without `--count`
//!   (default: 1)

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utility_uuid::{from_json_text, to_json_text, Identifier};

use config::{validate_count, CliConfig, DEFAULT_COUNT_ENV, LOG_ENV};

#[derive(Parser)]
#[command(name = "utility")]
#[command(about = "Generate, parse and validate version-4 UUIDs")]
struct Cli {
    /// Tracing filter directive (overrides UTILITY_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new random identifiers
    Generate {
        /// Number of identifiers to print
        #[arg(short, long)]
        count: Option<usize>,
        /// Print each identifier as a JSON string
        #[arg(long)]
        json: bool,
    },
    /// Check whether text is a canonical UUID
    Validate {
        /// Candidate UUID text
        text: String,
    },
    /// Parse a UUID and describe it
    Parse {
        /// Canonical UUID text (hex digits in either case)
        text: String,
    },
    /// Print the nil identifier
    Nil,
    /// Compare two UUIDs
    Equal {
        /// First UUID
        a: String,
        /// Second UUID
        b: String,
    },
    /// Encode a UUID as a JSON string
    ToJson {
        /// Canonical UUID text
        text: String,
    },
    /// Decode a UUID from a JSON string
    FromJson {
        /// JSON text, for example "\"550e8400-e29b-41d4-a716-446655440000\""
        json: String,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = resolve_config(
        cli.log,
        std::env::var(LOG_ENV).ok(),
        std::env::var(DEFAULT_COUNT_ENV).ok(),
    )?;

    tracing_subscriber::registry()
        .with(log_filter(&config)?)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init()
        .context("failed to initialise logging")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = match cli.command {
        Some(command) => run(command, &config, &mut out)?,
        None => {
            run_demo(&mut out)?;
            Outcome::Success
        }
    };

    Ok(outcome.into())
}

/// Whether a command did what was asked, independent of I/O errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Resolves the startup config from environment values, then applies the `--log` override.
fn resolve_config(
    cli_log: Option<String>,
    env_log: Option<String>,
    env_count: Option<String>,
) -> anyhow::Result<CliConfig> {
    Ok(CliConfig::from_env_values(env_log, env_count)?.with_log_filter(cli_log))
}

fn log_filter(config: &CliConfig) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_new(config.log_filter())
        .with_context(|| format!("invalid log filter '{}'", config.log_filter()))
}

/// Runs one subcommand.
fn run(command: Commands, config: &CliConfig, out: &mut impl Write) -> anyhow::Result<Outcome> {
    match command {
        Commands::Generate { count, json } => {
            let count = validate_count(count.unwrap_or(config.default_count()))?;
            tracing::debug!(count, "generating identifiers");
            for _ in 0..count {
                let id = Identifier::generate();
                if json {
                    writeln!(out, "{}", to_json_text(&id))?;
                } else {
                    writeln!(out, "{id}")?;
                }
            }
        }
        Commands::Validate { text } => {
            if Identifier::validate(&text) {
                writeln!(out, "valid")?;
            } else {
                writeln!(out, "invalid")?;
                return Ok(Outcome::Failure);
            }
        }
        Commands::Parse { text } => {
            let id = parse_arg(&text)?;
            writeln!(out, "canonical: {id}")?;
            writeln!(out, "version: {}", id.version())?;
            writeln!(
                out,
                "variant: {}",
                if id.is_rfc4122_variant() {
                    "RFC 4122"
                } else {
                    "other"
                }
            )?;
            writeln!(out, "nil: {}", id.is_nil())?;
        }
        Commands::Nil => {
            writeln!(out, "{}", Identifier::nil())?;
        }
        Commands::Equal { a, b } => {
            let a = parse_arg(&a)?;
            let b = parse_arg(&b)?;
            writeln!(out, "{}", a.equal(&b))?;
        }
        Commands::ToJson { text } => {
            let id = parse_arg(&text)?;
            writeln!(out, "{}", to_json_text(&id))?;
        }
        Commands::FromJson { json } => {
            let id = from_json_text(&json).with_context(|| format!("cannot decode '{json}'"))?;
            writeln!(out, "{id}")?;
        }
    }

    Ok(Outcome::Success)
}

fn parse_arg(text: &str) -> anyhow::Result<Identifier> {
    Identifier::parse(text).with_context(|| format!("cannot parse '{text}'"))
}

/// Walks through every operation once, printing each step.
fn run_demo(out: &mut impl Write) -> anyhow::Result<()> {
    let id = Identifier::generate();
    writeln!(out, "Generated UUID: {id}")?;
    writeln!(out, "Is valid? {}", Identifier::validate(&id.render()))?;

    let parsed = parse_arg(&id.render())?;
    writeln!(out, "Parsed UUID: {parsed}")?;
    writeln!(out, "Equal? {}", id.equal(&parsed))?;

    writeln!(out, "Nil UUID: {}", Identifier::nil())?;

    let json = to_json_text(&id);
    writeln!(out, "UUID as JSON: {json}")?;

    let decoded = from_json_text(&json).context("cannot decode demo JSON")?;
    writeln!(out, "Unmarshaled UUID: {decoded}")?;
    writeln!(out, "Equal after unmarshal? {}", id.equal(&decoded))?;

    Ok(())
}
