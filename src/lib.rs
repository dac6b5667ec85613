//! context-db-mcp: an MCP server backed by a hosted vector store
//!
//! Tool calls arrive over stdio, get validated, and are translated into
//! calls against the OpenAI vector store API: find-or-create store
//! resolution, document upload with composed attributes, and score-filtered
//! chunk retrieval.

pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod remote;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use store::ContextStore;
