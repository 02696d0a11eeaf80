//! Model Context Protocol (MCP) server implementation for Cyberlex.
//!
//! Exposes entity search, type classification and concept glossaries to
//! AI assistants over stdio.
//!
//! ## Architecture
//!
//! The server uses compile-time dependency injection via the `Context` struct.
//! Repositories and services are resolved at tool execution time using `FromRef`.
//!
//! ## Modules
//!
//! - `protocol`: Response wrapper and output formats (JSON, TOON)
//! - `server`: MCP server implementation with tool router
//! - `tools`: Tool implementations organized by domain

pub mod protocol;
pub(crate) mod server;
mod tools;

pub use server::McpServer;
