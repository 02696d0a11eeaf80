//! Wikidata backend over HTTP.
//!
//! Talks to three public endpoints:
//!
//! - the SPARQL query service, for SELECT and ASK queries
//! - the Wikidata action API (`wbsearchentities`), for ranked label search
//! - the Wikipedia action API (`prop=extracts`), for article introductions
//!
//! # Example
//!
//! ```ignore
//! use cyberlex::config::EndpointConfig;
//! use cyberlex::graph::backends::wikidata::WikidataClient;
//! use cyberlex::graph::QueryExt;
//!
//! let client = WikidataClient::new(&EndpointConfig::default())?;
//! let rows = client
//!     .query("SELECT ?type WHERE { $item wdt:P31 ?type }")
//!     .entity("item", &"Q29908721".into())
//!     .fetch_all()
//!     .await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::EndpointConfig;
use crate::error::AppError;
use crate::graph::query::{render, Params};
use crate::graph::row::{Binding, Row, RowStream};
use crate::graph::traits::{ContentFetcher, EntitySearcher, SparqlExecutor};
use crate::models::{Candidate, EntityId, MatchContext};

/// Largest page the `wbsearchentities` API will return.
pub const MAX_SEARCH_LIMIT: usize = 50;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

// ----------------------------------------------------------------------------
// Response shapes
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    #[serde(default)]
    results: Option<SparqlBindings>,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SparqlBindings {
    bindings: Vec<HashMap<String, Binding>>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Option<Vec<SearchItem>>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "match")]
    match_context: Option<MatchContext>,
}

impl From<SearchItem> for Candidate {
    fn from(item: SearchItem) -> Self {
        // Items without a label in the requested language still match on
        // an alias; fall back to the matched text, then the id.
        let label = item
            .label
            .or_else(|| item.match_context.as_ref().map(|m| m.text.clone()))
            .unwrap_or_else(|| item.id.clone());

        Candidate {
            id: EntityId::from_ref(&item.id),
            label,
            description: item.description.filter(|d| !d.is_empty()),
            match_context: item.match_context,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    query: Option<ExtractQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

// ----------------------------------------------------------------------------
// Client
// ----------------------------------------------------------------------------

/// HTTP client for Wikidata and Wikipedia.
///
/// This type is cheap to clone - the underlying connection pool is shared.
#[derive(Clone)]
pub struct WikidataClient {
    http: HttpClient,
    endpoints: Arc<EndpointConfig>,
}

impl std::fmt::Debug for WikidataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikidataClient")
            .field("sparql_url", &self.endpoints.sparql_url)
            .field("api_url", &self.endpoints.api_url)
            .field("language", &self.endpoints.language)
            .finish()
    }
}

impl WikidataClient {
    /// Creates a client for the configured endpoints.
    ///
    /// The query service rejects requests without a descriptive
    /// `User-Agent`, so one is always set.
    pub fn new(config: &EndpointConfig) -> Result<Self, AppError> {
        let http = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoints: Arc::new(config.clone()),
        })
    }

    /// Returns the endpoint configuration.
    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, accept)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::transport(url, e))?
            .error_for_status()
            .map_err(|e| AppError::transport(url, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::transport(url, e))?;

        serde_json::from_str(&body).map_err(|e| AppError::parse(url, e))
    }

    async fn run_sparql(&self, sparql: &str, params: &Params) -> Result<SparqlResponse, AppError> {
        let rendered = render(sparql, params)?;
        tracing::debug!(endpoint = %self.endpoints.sparql_url, query = %rendered, "Running SPARQL query");

        self.get_json(
            &self.endpoints.sparql_url,
            SPARQL_RESULTS_JSON,
            &[("query", rendered.as_str()), ("format", "json")],
        )
        .await
    }
}

#[async_trait]
impl SparqlExecutor for WikidataClient {
    async fn execute_sparql(
        &self,
        sparql: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        let response = self.run_sparql(sparql, &params).await?;
        let bindings = response
            .results
            .ok_or_else(|| {
                AppError::parse(&self.endpoints.sparql_url, "SELECT response has no results")
            })?
            .bindings;

        tracing::debug!(rows = bindings.len(), "SPARQL query returned");

        Ok(Box::pin(futures::stream::iter(
            bindings.into_iter().map(|b| Ok::<Row, AppError>(Row::new(b))),
        )))
    }

    async fn ask_sparql(&self, sparql: &str, params: Params) -> Result<bool, AppError> {
        self.run_sparql(sparql, &params)
            .await?
            .boolean
            .ok_or_else(|| AppError::parse(&self.endpoints.sparql_url, "ASK response has no boolean"))
    }
}

#[async_trait]
impl EntitySearcher for WikidataClient {
    async fn search_entities(&self, text: &str, limit: usize) -> Result<Vec<Candidate>, AppError> {
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();
        let language = self.endpoints.language.as_str();
        let url = self.endpoints.api_url.as_str();

        tracing::debug!(endpoint = %url, text = %text, limit = %limit, "Searching entities");

        let response: SearchResponse = self
            .get_json(
                url,
                "application/json",
                &[
                    ("action", "wbsearchentities"),
                    ("search", text),
                    ("language", language),
                    ("uselang", language),
                    ("type", "item"),
                    ("limit", limit.as_str()),
                    ("format", "json"),
                ],
            )
            .await?;

        if let Some(err) = response.error {
            return Err(AppError::transport(url, format!("{}: {}", err.code, err.info)));
        }

        let items = response
            .search
            .ok_or_else(|| AppError::parse(url, "search response has no results"))?;

        Ok(items.into_iter().map(Candidate::from).collect())
    }
}

#[async_trait]
impl ContentFetcher for WikidataClient {
    async fn fetch_extract(&self, title_or_url: &str) -> Result<Option<String>, AppError> {
        let title = article_title(title_or_url);
        let url = self.endpoints.wikipedia_url.as_str();

        tracing::debug!(endpoint = %url, title = %title, "Fetching article extract");

        let response: ExtractResponse = self
            .get_json(
                url,
                "application/json",
                &[
                    ("action", "query"),
                    ("prop", "extracts"),
                    ("exintro", "1"),
                    ("explaintext", "1"),
                    ("redirects", "1"),
                    ("titles", title.as_str()),
                    ("format", "json"),
                ],
            )
            .await?;

        if let Some(err) = response.error {
            return Err(AppError::transport(url, format!("{}: {}", err.code, err.info)));
        }

        Ok(response
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|page| page.extract)
            .filter(|text| !text.is_empty()))
    }
}

/// Extracts a decoded article title from a title or an article URL.
pub fn article_title(title_or_url: &str) -> String {
    let segment = title_or_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(title_or_url);

    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
        .replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_title_from_url() {
        assert_eq!(
            article_title("https://en.wikipedia.org/wiki/Petya_(malware)"),
            "Petya (malware)"
        );
        assert_eq!(
            article_title("https://en.wikipedia.org/wiki/Caf%C3%A9_Wall"),
            "Café Wall"
        );
        assert_eq!(article_title("WannaCry"), "WannaCry");
    }

    #[test]
    fn test_search_item_becomes_candidate() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"search":[
                {"id":"Q29957041","concepturi":"http://www.wikidata.org/entity/Q29957041",
                 "label":"WannaCry ransomware attack","description":"ransomware cyberattack",
                 "match":{"type":"label","language":"en","text":"WannaCry ransomware attack"}},
                {"id":"Q1","match":{"type":"alias","language":"en","text":"the universe"}}
            ],"success":1}"#,
        )
        .unwrap();

        let candidates: Vec<Candidate> = response
            .search
            .unwrap()
            .into_iter()
            .map(Candidate::from)
            .collect();

        assert_eq!(candidates[0].id.as_str(), "Q29957041");
        assert_eq!(candidates[0].label, "WannaCry ransomware attack");
        assert_eq!(
            candidates[0].match_context.as_ref().unwrap().field,
            "label"
        );
        assert_eq!(candidates[1].label, "the universe");
        assert_eq!(candidates[1].description, None);
    }

    #[test]
    fn test_sparql_select_shape() {
        let response: SparqlResponse = serde_json::from_str(
            r#"{"head":{"vars":["type","typeLabel"]},"results":{"bindings":[
                {"type":{"type":"uri","value":"http://www.wikidata.org/entity/Q14001"},
                 "typeLabel":{"xml:lang":"en","type":"literal","value":"malware"}}
            ]}}"#,
        )
        .unwrap();

        let bindings = response.results.unwrap().bindings;
        let row = Row::new(bindings.into_iter().next().unwrap());
        assert_eq!(row.get_entity("type").unwrap().as_str(), "Q14001");
        assert_eq!(row.get("typeLabel").unwrap(), "malware");
    }

    #[test]
    fn test_sparql_ask_shape() {
        let response: SparqlResponse =
            serde_json::from_str(r#"{"head":{},"boolean":true}"#).unwrap();
        assert_eq!(response.boolean, Some(true));
        assert!(response.results.is_none());
    }

    #[test]
    fn test_client_builds_from_default_endpoints() {
        let client = WikidataClient::new(&EndpointConfig::default()).unwrap();
        assert_eq!(client.endpoints().language, "en");
    }
}
