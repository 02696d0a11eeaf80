//! CLI module for Cyberlex.
//!
//! Subcommands:
//! - `search`: Search entities and filter them by type policy
//! - `types`: Resolve the type closure of an entity
//! - `classify`: Classify a known entity against a type policy
//! - `is-type`: Check whether an entity is used as a class
//! - `glossary`: Dump concept glossaries to a directory
//! - `instances`: List instances of a concept in several languages
//! - `mcp`: Run the MCP server (stdio transport)
//!
//! Results are written to stdout (or `--out`); logs go to stderr.

mod glossary;
mod mcp;
mod search;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use serde::Serialize;

use crate::config::{Config, PolicyConfig, PolicyPreset};
use crate::context::Context;
use crate::error::AppError;
use crate::mcp::protocol::OutputFormat;
use crate::models::{TypeIdSet, TypePolicy};

pub use glossary::GlossaryCommand;
pub use search::SearchCommand;

/// Cyberlex - knowledge-graph entity search for cybersecurity glossaries
#[derive(Parser)]
#[command(name = "cyberlex")]
#[command(about = "Search and classify knowledge-graph entities by type policy")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra config file, layered above user and project config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search entities by text and keep those accepted by the type policy
    Search(SearchCommand),

    /// Resolve the transitive type closure of an entity
    Types {
        /// Entity id or URI
        id: String,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Classify a known entity against the type policy
    Classify {
        /// Entity id or URI
        id: String,
        #[command(flatten)]
        policy: PolicyArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check whether an entity has instances, subclasses or superclasses
    IsType {
        /// Entity id or URI
        id: String,
    },

    /// Write one glossary file per concept
    Glossary(GlossaryCommand),

    /// List instances of a concept with names in en, ru and zh
    Instances {
        /// Concept type id, e.g. Q1248784
        concept: String,
        /// Maximum number of instances
        #[arg(long, default_value = "100")]
        limit: usize,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the MCP server (stdio transport for local use)
    Mcp,
}

/// Type policy overrides layered on the configured policy.
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// Base policy, replacing the configured one
    #[arg(long, value_enum)]
    pub preset: Option<PolicyPreset>,

    /// Comma-separated type ids of which at least one must be present
    #[arg(long = "require", value_parser = parse_id_list, default_value = "")]
    pub required: TypeIdSet,

    /// Comma-separated type ids to report on accepted entities
    #[arg(long, value_parser = parse_id_list, default_value = "")]
    pub allow: TypeIdSet,

    /// Comma-separated type ids that reject an entity
    #[arg(long, value_parser = parse_id_list, default_value = "")]
    pub deny: TypeIdSet,
}

impl PolicyArgs {
    /// Builds the effective policy from configuration and flags.
    pub fn to_policy(&self, config: &PolicyConfig) -> Result<TypePolicy, AppError> {
        let base = match self.preset {
            Some(preset) => preset.policy(),
            None => config.to_policy()?,
        };
        base.extended(
            self.required.clone(),
            self.allow.clone(),
            self.deny.clone(),
        )
    }
}

fn parse_id_list(list: &str) -> std::result::Result<TypeIdSet, String> {
    TypeIdSet::parse_list(list).map_err(|e| e.to_string())
}

/// Where and how results are written.
#[derive(Args, Debug, Default)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl OutputArgs {
    /// Renders `value` and writes it to the chosen destination.
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = self.format.render(value)?;
        match &self.out {
            Some(path) => write_file(path, &text)?,
            None => println!("{}", text),
        }
        Ok(())
    }
}

fn write_file(path: &Path, text: &str) -> std::result::Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    tracing::info!(path = %path.display(), "Wrote output");
    Ok(())
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        let config = Config::load_with(self.config.as_deref())?;
        tracing::debug!(?config, "Loaded configuration");
        let ctx = Context::from_config(config)?;

        match self.command {
            Command::Search(cmd) => cmd.run(&ctx).await,
            Command::Types { id, output } => search::run_types(&ctx, &id, &output).await,
            Command::Classify { id, policy, output } => {
                search::run_classify(&ctx, &id, &policy, &output).await
            }
            Command::IsType { id } => search::run_is_type(&ctx, &id).await,
            Command::Glossary(cmd) => cmd.run(&ctx).await,
            Command::Instances {
                concept,
                limit,
                output,
            } => glossary::run_instances(&ctx, &concept, limit, &output).await,
            Command::Mcp => mcp::run_mcp(ctx).await,
        }
    }
}
