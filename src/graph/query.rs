//! Query builder for fluent SPARQL query construction.

use std::collections::HashMap;
use std::fmt::Write as _;

use futures::{StreamExt, TryStreamExt};

use crate::error::AppError;
use crate::graph::row::{Row, RowStream};
use crate::graph::traits::SparqlExecutor;
use crate::models::EntityId;

/// Prefix used when rendering entity terms (`wd:Q42`).
const ENTITY_PREFIX: &str = "wd:";

/// A value bound to a `$name` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// An entity, rendered as a prefixed name. Must be a well-formed id.
    Entity(EntityId),
    /// A string literal with an optional language tag.
    Literal { value: String, lang: Option<String> },
    /// An absolute IRI, rendered in angle brackets.
    Iri(String),
    /// An integer literal.
    Integer(i64),
}

impl Term {
    /// Renders the term as SPARQL syntax.
    ///
    /// Entity ids are validated and literals escaped, so bound values can
    /// never change the structure of the query.
    pub fn to_sparql(&self) -> Result<String, AppError> {
        match self {
            Term::Entity(id) if id.is_well_formed() => Ok(format!("{}{}", ENTITY_PREFIX, id)),
            Term::Entity(id) => Err(AppError::InvalidEntityId(id.to_string())),
            Term::Literal { value, lang } => {
                let mut out = String::with_capacity(value.len() + 2);
                out.push('"');
                for c in value.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\t' => out.push_str("\\t"),
                        c => out.push(c),
                    }
                }
                out.push('"');
                if let Some(lang) = lang {
                    if !is_language_tag(lang) {
                        return Err(AppError::Query {
                            message: format!("invalid language tag: {}", lang),
                            query: String::new(),
                        });
                    }
                    let _ = write!(out, "@{}", lang);
                }
                Ok(out)
            }
            Term::Iri(iri) if is_safe_iri(iri) => Ok(format!("<{}>", iri)),
            Term::Iri(iri) => Err(AppError::Query {
                message: format!("invalid IRI: {}", iri),
                query: String::new(),
            }),
            Term::Integer(n) => Ok(n.to_string()),
        }
    }
}

impl From<EntityId> for Term {
    fn from(id: EntityId) -> Self {
        Term::Entity(id)
    }
}

impl From<&EntityId> for Term {
    fn from(id: &EntityId) -> Self {
        Term::Entity(id.clone())
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::Literal {
            value: value.to_string(),
            lang: None,
        }
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Term::Integer(n)
    }
}

impl From<usize> for Term {
    fn from(n: usize) -> Self {
        Term::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// Parameters for SPARQL queries, keyed by placeholder name.
pub type Params = HashMap<String, Term>;

fn is_language_tag(tag: &str) -> bool {
    let mut parts = tag.split('-');
    let primary_ok = parts
        .next()
        .is_some_and(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphabetic()));
    primary_ok && parts.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

fn is_safe_iri(iri: &str) -> bool {
    iri.contains(':')
        && !iri
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'))
}

/// Substitutes every `$name` placeholder in `sparql` with its bound term.
///
/// A `$` not followed by an identifier is left untouched. A placeholder
/// with no bound parameter is an error.
pub fn render(sparql: &str, params: &Params) -> Result<String, AppError> {
    let mut out = String::with_capacity(sparql.len());
    let mut chars = sparql.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        let start = i + 1;
        let mut end = start;
        while let Some(&(j, n)) = chars.peek() {
            let valid = if j == start {
                n.is_ascii_alphabetic() || n == '_'
            } else {
                n.is_ascii_alphanumeric() || n == '_'
            };
            if !valid {
                break;
            }
            end = j + n.len_utf8();
            chars.next();
        }

        if end == start {
            out.push('$');
            continue;
        }

        let name = &sparql[start..end];
        let term = params.get(name).ok_or_else(|| AppError::Query {
            message: format!("unbound parameter: ${}", name),
            query: sparql.to_string(),
        })?;
        out.push_str(&term.to_sparql()?);
    }

    Ok(out)
}

/// A builder for constructing and executing SPARQL queries.
///
/// # Example
///
/// ```ignore
/// let rows = Query::new(&client, "SELECT ?type WHERE { $item wdt:P31 ?type }")
///     .entity("item", &id)
///     .fetch_all()
///     .await?;
/// ```
pub struct Query<'a, E: SparqlExecutor + ?Sized> {
    executor: &'a E,
    sparql: String,
    params: Params,
}

impl<'a, E: SparqlExecutor + ?Sized> Query<'a, E> {
    /// Creates a new query builder.
    pub fn new(executor: &'a E, sparql: &str) -> Self {
        Self {
            executor,
            sparql: sparql.to_string(),
            params: Params::new(),
        }
    }

    /// Binds a term to the `$name` placeholder.
    pub fn param(mut self, name: &str, value: impl Into<Term>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Binds an entity id.
    pub fn entity(self, name: &str, id: &EntityId) -> Self {
        self.param(name, id)
    }

    /// Binds a language-tagged string literal.
    pub fn literal(self, name: &str, value: &str, lang: Option<&str>) -> Self {
        self.param(
            name,
            Term::Literal {
                value: value.to_string(),
                lang: lang.map(str::to_string),
            },
        )
    }

    /// Binds an absolute IRI.
    pub fn iri(self, name: &str, iri: &str) -> Self {
        self.param(name, Term::Iri(iri.to_string()))
    }

    /// Binds an integer, typically a `LIMIT`.
    pub fn integer(self, name: &str, value: i64) -> Self {
        self.param(name, value)
    }

    /// Returns the query text with all parameters substituted.
    pub fn render(&self) -> Result<String, AppError> {
        render(&self.sparql, &self.params)
    }

    /// Executes the query and returns a stream of rows.
    pub async fn execute(self) -> Result<RowStream<'a>, AppError> {
        self.executor
            .execute_sparql(&self.sparql, self.params)
            .await
    }

    /// Executes the query and collects all rows into a vector.
    pub async fn fetch_all(self) -> Result<Vec<Row>, AppError> {
        self.execute().await?.try_collect().await
    }

    /// Executes the query and returns the first row, if any.
    pub async fn fetch_one(self) -> Result<Option<Row>, AppError> {
        let mut stream = self.execute().await?;
        stream.next().await.transpose()
    }

    /// Executes the query as an ASK query.
    pub async fn ask(self) -> Result<bool, AppError> {
        self.executor.ask_sparql(&self.sparql, self.params).await
    }
}

/// Extension trait providing a convenient `query()` method.
///
/// Implemented for every [`SparqlExecutor`], including trait objects, so
/// `graph.query("...")` works on an `Arc<dyn KnowledgeGraph>`.
pub trait QueryExt: SparqlExecutor {
    /// Creates a new query builder for this executor.
    fn query(&self, sparql: &str) -> Query<'_, Self> {
        Query::new(self, sparql)
    }
}

impl<E: SparqlExecutor + ?Sized> QueryExt for E {}
