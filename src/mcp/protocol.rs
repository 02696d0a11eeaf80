//! Output formats shared by MCP tool responses and the CLI.

use clap::ValueEnum;
use rmcp::model::{CallToolResult, Content, ErrorData};
use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// JSON format (default).
    #[default]
    Json,
    /// TOON (Token-Oriented Object Notation) - 40-60% fewer tokens.
    Toon,
}

impl OutputFormat {
    /// Renders a value as text in this format. JSON is pretty-printed.
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String, AppError> {
        match self {
            OutputFormat::Json => serde_json::to_string_pretty(value)
                .map_err(|e| AppError::Internal(format!("JSON serialization error: {}", e))),
            OutputFormat::Toon => serde_toon::to_string(value)
                .map_err(|e| AppError::Internal(format!("TOON serialization error: {}", e))),
        }
    }
}

/// Single-item response that serializes as the raw inner value.
///
/// # Example
///
/// ```ignore
/// Response(hits, params.output_format).into()
/// ```
pub struct Response<T>(pub T, pub Option<OutputFormat>);

impl<T> Response<T> {
    /// Create a response with default (JSON) format.
    pub fn json(data: T) -> Self {
        Response(data, None)
    }

    /// Create a response with TOON format.
    pub fn toon(data: T) -> Self {
        Response(data, Some(OutputFormat::Toon))
    }
}

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T: Serialize> From<Response<T>> for Result<CallToolResult, ErrorData> {
    fn from(response: Response<T>) -> Self {
        let content = match response.1.unwrap_or_default() {
            OutputFormat::Json => Content::json(&response.0)?,
            OutputFormat::Toon => Content::text(OutputFormat::Toon.render(&response.0)?),
        };
        Ok(CallToolResult::success(vec![content]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TypeRef;

    #[test]
    fn test_json_render_is_pretty() {
        let text = OutputFormat::Json
            .render(&TypeRef::labeled("Q14001", "malware"))
            .unwrap();
        assert!(text.contains("\n"));
        assert!(text.contains("\"label\": \"malware\""));
    }

    #[test]
    fn test_response_defaults_to_json() {
        let result: Result<CallToolResult, ErrorData> =
            Response::json(vec![TypeRef::labeled("Q5", "human")]).into();
        assert!(result.is_ok());
    }

    #[test]
    fn test_format_parses_from_snake_case() {
        let format: OutputFormat = serde_json::from_str("\"toon\"").unwrap();
        assert_eq!(format, OutputFormat::Toon);
    }
}
