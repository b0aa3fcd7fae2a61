//! inischema CLI - validate and inspect INI configuration files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use inischema::presets::Preset;
use inischema::schema::{self, Schema};
use inischema::{Record, decode};

#[derive(Parser)]
#[command(name = "inischema")]
#[command(about = "Schema-driven INI configuration loader", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file against a schema
    Check {
        #[command(flatten)]
        target: Target,
    },

    /// Decode a configuration file and print its values
    Show {
        #[command(flatten)]
        target: Target,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the built-in schemas
    Presets,
}

#[derive(Args)]
struct Target {
    /// Configuration file path
    #[arg(short, long, default_value = "config.ini")]
    config: PathBuf,

    #[command(flatten)]
    schema: SchemaSource,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SchemaSource {
    /// TOML schema definition file
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Built-in schema name (see `inischema presets`)
    #[arg(short, long)]
    preset: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { target } => check_config(&target),
        Commands::Show { target, format } => show_config(&target, &format),
        Commands::Presets => list_presets(),
    }
}

fn resolve_schema(source: &SchemaSource) -> Result<(Schema, Option<Preset>)> {
    if let Some(path) = &source.schema {
        let schema = schema::load_schema(path)?;
        debug!("Loaded schema from {}", path.display());
        return Ok((schema, None));
    }

    let name = source.preset.as_deref().unwrap_or_default();
    let preset: Preset = name.parse()?;
    let schema = preset
        .schema()
        .with_context(|| format!("Built-in schema '{}' is invalid", preset))?;
    debug!("Using built-in schema '{}'", preset);
    Ok((schema, Some(preset)))
}

fn load_record(target: &Target) -> Result<(Schema, Record)> {
    let (schema, preset) = resolve_schema(&target.schema)?;
    let record = decode(&schema, &target.config)?;

    if let Some(preset) = preset {
        preset.check(&record)?;
    }

    info!("Loaded configuration from {}", target.config.display());
    Ok((schema, record))
}

fn check_config(target: &Target) -> Result<()> {
    match load_record(target) {
        Ok((schema, record)) => {
            println!("Configuration is valid!");
            println!();
            println!("Sections:");
            for spec in schema.sections() {
                if record.is_set(spec.name()) {
                    println!("  [{}] {} keys", spec.source(), spec.fields().len());
                } else {
                    println!("  {} (set at runtime)", spec.name());
                }
            }
            Ok(())
        }
        Err(e) => config_error(&target.config, e),
    }
}

fn show_config(target: &Target, format: &str) -> Result<()> {
    let (_, record) = match load_record(target) {
        Ok(loaded) => loaded,
        Err(e) => return config_error(&target.config, e),
    };

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&record)?;
            println!("{}", json);
        }
        _ => {
            for (section, values) in record.sections() {
                match values {
                    Some(values) => {
                        for (key, value) in values.iter() {
                            println!("{}.{} = {}", section, key, value);
                        }
                    }
                    None => println!("{} (set at runtime)", section),
                }
            }
        }
    }

    Ok(())
}

fn list_presets() -> Result<()> {
    for preset in Preset::ALL {
        println!("{:<12} {}", preset.name(), preset.description());
    }
    Ok(())
}

fn config_error(path: &Path, error: anyhow::Error) -> Result<()> {
    debug!("Decoding {} failed: {:?}", path.display(), error);
    eprintln!("Configuration error: {}", error);
    std::process::exit(1);
}
