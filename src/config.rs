//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/cyberlex/config.toml` (XDG) or platform config dir
//! 2. Project config: `.cyberlex.toml`
//! 3. Explicit file passed with `--config`
//! 4. Environment variables: `CYBERLEX_*`, with `__` separating nested keys
//!    (e.g. `CYBERLEX_SEARCH__LIMIT=20`, `CYBERLEX_ENDPOINT__USER_AGENT=...`)
//!
//! Every key has a default, so running with no config at all targets the
//! public Wikidata endpoints with the built-in cybersecurity policy.
//!
//! # Example
//!
//! ```toml
//! [endpoint]
//! user_agent = "glossary-bot/1.0 (ops@example.org)"
//! timeout_secs = 60
//!
//! [search]
//! limit = 20
//! concurrency = 8
//! on_error = "skip"
//! keep_unmatched = false
//!
//! [policy]
//! preset = "cyber"
//! required = ["Q7397"]
//! deny = { Q11410 = "game" }
//! ```

use std::ops::Deref;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{TypeIdSet, TypePolicy};
use crate::services::ResolutionMode;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Upstream service locations and HTTP settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// SPARQL query service.
    pub sparql_url: String,
    /// Wikidata action API used for label search.
    pub api_url: String,
    /// Wikipedia action API used for article extracts.
    pub wikipedia_url: String,
    /// Sent with every request; the query service requires one.
    pub user_agent: String,
    /// Language for labels, descriptions and search matching.
    pub language: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            sparql_url: "https://query.wikidata.org/sparql".to_string(),
            api_url: "https://www.wikidata.org/w/api.php".to_string(),
            wikipedia_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: format!(
                "cyberlex/{} (knowledge-graph glossary search)",
                env!("CARGO_PKG_VERSION")
            ),
            language: "en".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Search orchestration defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of candidates requested from the upstream search.
    pub limit: usize,
    /// Concurrent type-resolution requests per search.
    pub concurrency: usize,
    /// What to do when one candidate's types cannot be resolved.
    pub on_error: ResolutionMode,
    /// Keep candidates that match no required or allowed type.
    pub keep_unmatched: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            concurrency: 4,
            on_error: ResolutionMode::Abort,
            keep_unmatched: false,
        }
    }
}

/// Base policy the configured ids are merged into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PolicyPreset {
    /// Cybersecurity allow/deny lists.
    #[default]
    Cyber,
    /// No constraints.
    None,
}

impl PolicyPreset {
    pub fn policy(&self) -> TypePolicy {
        match self {
            PolicyPreset::Cyber => TypePolicy::cybersecurity(),
            PolicyPreset::None => TypePolicy::permissive(),
        }
    }
}

/// Type policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub preset: PolicyPreset,
    pub required: TypeIdSet,
    pub allow: TypeIdSet,
    pub deny: TypeIdSet,
}

impl PolicyConfig {
    /// Builds the effective policy, validating allow/deny overlap.
    pub fn to_policy(&self) -> Result<TypePolicy, AppError> {
        self.preset.policy().extended(
            self.required.clone(),
            self.allow.clone(),
            self.deny.clone(),
        )
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Load config, layering an explicit file above the project config.
    pub fn load_with(extra: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(extra).extract().map_err(ConfigError::from)
    }

    /// The layered figment, exposed for inspection and tests.
    pub fn figment(extra: Option<&Path>) -> Figment {
        let mut figment = Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(Self::user_config_path()))
            // Layer 2: Project config
            .merge(Toml::file(".cyberlex.toml"));

        // Layer 3: Explicit config file
        if let Some(path) = extra {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("CYBERLEX_").split("__"))
    }

    /// User config path: ~/.config/cyberlex/config.toml (XDG) or platform config dir.
    fn user_config_path() -> PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("cyberlex").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("cyberlex").join("config.toml"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityId;

    fn from_toml(toml: &str) -> Config {
        Figment::from(Toml::string(toml)).extract().unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = from_toml("");
        assert_eq!(config.endpoint.sparql_url, "https://query.wikidata.org/sparql");
        assert_eq!(config.endpoint.language, "en");
        assert_eq!(config.search.limit, 10);
        assert_eq!(config.search.on_error, ResolutionMode::Abort);
        assert!(!config.search.keep_unmatched);
        assert_eq!(config.policy.preset, PolicyPreset::Cyber);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = from_toml(
            r#"
            [endpoint]
            timeout_secs = 5

            [search]
            on_error = "skip"
            "#,
        );
        assert_eq!(config.endpoint.timeout_secs, 5);
        assert!(config.endpoint.user_agent.starts_with("cyberlex/"));
        assert_eq!(config.search.on_error, ResolutionMode::Skip);
        assert_eq!(config.search.concurrency, 4);
    }

    #[test]
    fn test_policy_section_merges_into_preset() {
        let config = from_toml(
            r#"
            [policy]
            preset = "none"
            required = ["Q7397"]
            deny = { Q11410 = "game" }
            "#,
        );
        let policy = config.policy.to_policy().unwrap();
        assert!(policy.allow().is_empty());
        assert!(policy.required().contains(&EntityId::from("Q7397")));
        assert_eq!(policy.deny().label(&EntityId::from("Q11410")), Some("game"));
    }

    #[test]
    fn test_policy_overlap_with_preset_fails() {
        let config = from_toml(
            r#"
            [policy]
            deny = ["Q14001"]
            "#,
        );
        assert!(matches!(
            config.policy.to_policy(),
            Err(AppError::Policy(_))
        ));
    }

    #[test]
    fn test_malformed_policy_id_fails_to_load() {
        let result: Result<Config, _> = Figment::from(Toml::string(
            r#"
            [policy]
            deny = ["game"]
            "#,
        ))
        .extract();
        assert!(result.is_err());
    }
}
