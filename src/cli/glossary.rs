//! Glossary command handlers.

use std::path::PathBuf;

use clap::Args;
use color_eyre::Result;

use crate::context::Context;
use crate::di::FromRef;
use crate::models::EntityId;
use crate::repositories::ConceptRepository;
use crate::services::{cyber_concepts, GlossaryService};

use super::OutputArgs;

/// Arguments for `cyberlex glossary`.
#[derive(Args, Debug)]
pub struct GlossaryCommand {
    /// Concepts as `ID` or `ID=label`; defaults to the cybersecurity list
    #[arg(long = "concept", value_parser = parse_concept)]
    pub concepts: Vec<(EntityId, Option<String>)>,

    /// Directory receiving one JSON file per concept
    #[arg(long, default_value = "glossary")]
    pub out_dir: PathBuf,

    /// Fetch the introduction of each linked article
    #[arg(long)]
    pub with_text: bool,
}

fn parse_concept(value: &str) -> std::result::Result<(EntityId, Option<String>), String> {
    let (id, label) = match value.split_once('=') {
        Some((id, label)) => (id, Some(label.trim().to_string())),
        None => (value, None),
    };
    let id = EntityId::parse(id).map_err(|e| e.to_string())?;
    Ok((id, label.filter(|l| !l.is_empty())))
}

impl GlossaryCommand {
    pub async fn run(&self, ctx: &Context) -> Result<()> {
        let service = GlossaryService::from_ref(ctx);
        let repo = ConceptRepository::from_ref(ctx);

        let concepts = if self.concepts.is_empty() {
            cyber_concepts()
        } else {
            let mut named = Vec::with_capacity(self.concepts.len());
            for (id, label) in &self.concepts {
                let label = match label {
                    Some(label) => label.clone(),
                    None => repo
                        .describe(id)
                        .await?
                        .map(|info| info.name)
                        .unwrap_or_else(|| id.to_string()),
                };
                named.push((id.clone(), label));
            }
            named
        };

        let paths = service
            .dump(&concepts, &self.out_dir, self.with_text)
            .await?;

        tracing::info!(files = paths.len(), dir = %self.out_dir.display(), "Glossary complete");
        Ok(())
    }
}

pub async fn run_instances(
    ctx: &Context,
    concept: &str,
    limit: usize,
    output: &OutputArgs,
) -> Result<()> {
    let concept = EntityId::parse(concept)?;
    let instances = GlossaryService::from_ref(ctx)
        .instances(&concept, limit)
        .await?;
    tracing::info!(concept = %concept, count = instances.instances.len(), "Listed instances");
    output.emit(&instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_concept() {
        let (id, label) = parse_concept("Q14001=malware").unwrap();
        assert_eq!(id.as_str(), "Q14001");
        assert_eq!(label.as_deref(), Some("malware"));

        let (id, label) = parse_concept("http://www.wikidata.org/entity/Q317671").unwrap();
        assert_eq!(id.as_str(), "Q317671");
        assert_eq!(label, None);

        assert!(parse_concept("malware").is_err());
    }
}
