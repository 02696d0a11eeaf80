//! Row and streaming types for SPARQL query results.

use std::collections::HashMap;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::EntityId;

/// A stream of rows from a query result.
pub type RowStream<'a> = Pin<Box<dyn Stream<Item = Result<Row, AppError>> + Send + 'a>>;

/// One bound value in a SPARQL JSON result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// `uri`, `literal`, `typed-literal` or `bnode`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

impl Binding {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            lang: None,
            datatype: None,
        }
    }

    pub fn lang_literal(value: impl Into<String>, lang: &str) -> Self {
        Self {
            lang: Some(lang.to_string()),
            ..Self::literal(value)
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }
}

/// A single solution from a SELECT query, keyed by variable name.
///
/// Unbound variables (from `OPTIONAL`) are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    data: HashMap<String, Binding>,
}

impl Row {
    /// Creates a new row from a map of variable names to bindings.
    pub fn new(data: HashMap<String, Binding>) -> Self {
        Self { data }
    }

    /// Builds a row from `(variable, binding)` pairs.
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Binding)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Gets the lexical value of a bound variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unbound in this row.
    pub fn get(&self, key: &str) -> Result<&str, AppError> {
        self.get_opt(key)
            .ok_or_else(|| AppError::Internal(format!("column not found: {}", key)))
    }

    /// Gets the lexical value of a variable, or `None` if it is unbound.
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|b| b.value.as_str())
    }

    /// Gets a bound value and normalizes it to an entity id.
    pub fn get_entity(&self, key: &str) -> Result<EntityId, AppError> {
        self.get(key).map(EntityId::from_ref)
    }

    /// Splits a grouped-concatenation value into trimmed, non-empty parts.
    ///
    /// Unbound and empty values yield an empty list.
    pub fn get_list(&self, key: &str, separator: char) -> Vec<String> {
        match self.get_opt(key) {
            Some(v) if !v.is_empty() => v
                .split(separator)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the full binding for a variable, if it exists.
    pub fn binding(&self, key: &str) -> Option<&Binding> {
        self.data.get(key)
    }

    /// Returns all bound variable names in this row.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(|s| s.as_str())
    }

    /// Returns the number of bound variables in this row.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the row has no bound variables.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the row and returns the underlying data map.
    pub fn into_inner(self) -> HashMap<String, Binding> {
        self.data
    }
}

impl From<HashMap<String, Binding>> for Row {
    fn from(data: HashMap<String, Binding>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_get_literal() {
        let row = Row::from_pairs([("typeLabel", Binding::lang_literal("malware", "en"))]);
        assert_eq!(row.get("typeLabel").unwrap(), "malware");
        assert_eq!(row.binding("typeLabel").unwrap().lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_row_get_missing_key() {
        let row = Row::default();
        assert!(row.get("missing").is_err());
        assert_eq!(row.get_opt("missing"), None);
    }

    #[test]
    fn test_row_get_entity_from_uri() {
        let row = Row::from_pairs([(
            "type",
            Binding::uri("http://www.wikidata.org/entity/Q14001"),
        )]);
        assert_eq!(row.get_entity("type").unwrap().as_str(), "Q14001");
        assert!(row.binding("type").unwrap().is_uri());
    }

    #[test]
    fn test_row_get_list() {
        let row = Row::from_pairs([
            ("aliases", Binding::literal("Petya.2017, NotPetya ,")),
            ("types", Binding::literal("")),
        ]);
        assert_eq!(row.get_list("aliases", ','), vec!["Petya.2017", "NotPetya"]);
        assert!(row.get_list("types", ',').is_empty());
        assert!(row.get_list("unbound", ',').is_empty());
    }

    #[test]
    fn test_row_columns() {
        let row = Row::from_pairs([("a", Binding::literal("1")), ("b", Binding::literal("2"))]);
        let mut columns: Vec<_> = row.columns().collect();
        columns.sort();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_binding_deserializes_sparql_json() {
        let binding: Binding = serde_json::from_str(
            r#"{"xml:lang":"en","type":"literal","value":"cyberattack"}"#,
        )
        .unwrap();
        assert_eq!(binding, Binding::lang_literal("cyberattack", "en"));
    }
}
