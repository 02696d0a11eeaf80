//! Search and classification command handlers.

use clap::Args;
use color_eyre::Result;
use serde::Serialize;

use crate::context::Context;
use crate::di::FromRef;
use crate::models::{EntityId, TypeSet};
use crate::repositories::TypeRepository;
use crate::services::{Classification, ResolutionMode, SearchOptions, SearchService};

use super::{OutputArgs, PolicyArgs};

/// Arguments for `cyberlex search`.
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Free-text query matched against labels and aliases
    pub query: String,

    /// Candidates requested from the upstream search
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// What to do when a candidate's types cannot be resolved
    #[arg(long, value_enum)]
    pub on_error: Option<ResolutionMode>,

    /// Concurrent type resolutions
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Keep hits that match no required or allowed type
    #[arg(long)]
    pub keep_unmatched: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl SearchCommand {
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        let policy = self.policy.to_policy(&ctx.config.policy)?;

        let mut options = SearchOptions::from_config(&ctx.config.search);
        if let Some(limit) = self.limit {
            options = options.with_limit(limit);
        }
        if let Some(mode) = self.on_error {
            options = options.with_resolution(mode);
        }
        if let Some(concurrency) = self.concurrency {
            options = options.with_concurrency(concurrency);
        }
        if self.keep_unmatched {
            options = options.with_keep_unmatched(true);
        }

        let hits = SearchService::from_ref(ctx)
            .search(&self.query, &policy, &options)
            .await?;

        self.output.emit(&hits)
    }
}

#[derive(Serialize)]
struct TypesOutput<'a> {
    id: &'a EntityId,
    types: TypeSet,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    id: &'a EntityId,
    #[serde(flatten)]
    classification: Classification,
}

pub async fn run_types(ctx: &Context, id: &str, output: &OutputArgs) -> Result<()> {
    let id = EntityId::parse(id)?;
    let types = TypeRepository::from_ref(ctx).resolve_types(&id).await?;
    tracing::info!(id = %id, count = types.len(), "Resolved types");
    output.emit(&TypesOutput { id: &id, types })
}

pub async fn run_classify(
    ctx: &Context,
    id: &str,
    policy: &PolicyArgs,
    output: &OutputArgs,
) -> Result<()> {
    let id = EntityId::parse(id)?;
    let policy = policy.to_policy(&ctx.config.policy)?;
    let classification = SearchService::from_ref(ctx)
        .classify_entity(&id, &policy)
        .await?;
    output.emit(&ClassifyOutput {
        id: &id,
        classification,
    })
}

pub async fn run_is_type(ctx: &Context, id: &str) -> Result<()> {
    let id = EntityId::parse(id)?;
    let is_type = TypeRepository::from_ref(ctx).is_type(&id).await?;
    println!("{}", is_type);
    Ok(())
}
