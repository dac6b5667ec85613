//! Request and response value objects for the three tools
//!
//! Everything here is request-scoped: constructed when a tool call arrives,
//! never mutated after validation, discarded once the response is serialized.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Inclusive bounds for the per-request result cap
pub const MAX_RESULTS_MIN: u32 = 1;
pub const MAX_RESULTS_MAX: u32 = 50;

/// Scalar attribute value attached to an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// Attribute key/value mapping, used both as file metadata on ingestion and
/// as an exact-match filter on retrieval
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Request body for the `ingest_document` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestDocumentRequest {
    /// Plain-text content to add to the vector store
    pub content: String,

    /// Target vector store ID; falls back to defaults when omitted
    #[serde(default)]
    pub vector_store_id: Option<String>,

    /// Vector store name to find or create when an ID is not provided
    #[serde(default)]
    pub vector_store_name: Option<String>,

    /// Stable identifier for the document, stored as a file attribute
    #[serde(default)]
    pub document_id: Option<String>,

    /// Logical filename used when uploading; derived when omitted
    #[serde(default)]
    pub filename: Option<String>,

    /// High-level summary or title, stored as a file attribute
    #[serde(default)]
    pub summary: Option<String>,

    /// Additional attribute key/value pairs to attach to the file
    #[serde(default)]
    pub attributes: Option<AttributeMap>,

    /// Chunking strategy forwarded opaquely to the remote API
    #[serde(default)]
    pub chunking_strategy: Option<Value>,

    /// MIME type flagged on the uploaded file
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_mime_type() -> String {
    "text/plain".to_string()
}

impl IngestDocumentRequest {
    /// Reject the request before any remote call is attempted
    pub fn validate(&self) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(Error::Validation(
                "The document content is empty after stripping whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

/// Structured result returned after ingesting a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestDocumentResponse {
    pub vector_store_id: String,
    pub vector_store_name: Option<String>,
    pub file_id: String,
    pub filename: String,
    /// Terminal processing state reported by the remote store, verbatim
    pub status: String,
    pub attributes: Option<AttributeMap>,
}

/// Request body for the `retrieve_relevant_chunks` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrieveRelevantChunksRequest {
    /// Query that drives similarity search
    pub query: String,

    /// Vector store to query; falls back to defaults when omitted
    #[serde(default)]
    pub vector_store_id: Option<String>,

    /// Maximum number of chunks to return, 1 to 50
    #[serde(default)]
    pub max_results: Option<u32>,

    /// Minimum similarity score required for inclusion; equal scores pass
    #[serde(default)]
    pub score_threshold: Option<f64>,

    /// Exact-match attribute filters applied during the search
    #[serde(default)]
    pub attributes_filter: Option<AttributeMap>,

    /// Toggle the remote API's query rewriting
    #[serde(default)]
    pub rewrite_query: Option<bool>,
}

impl RetrieveRelevantChunksRequest {
    /// Reject the request before any remote call is attempted
    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::Validation(
                "The search query is empty after stripping whitespace".to_string(),
            ));
        }
        if let Some(max_results) = self.max_results {
            if !(MAX_RESULTS_MIN..=MAX_RESULTS_MAX).contains(&max_results) {
                return Err(Error::Validation(format!(
                    "max_results must be between {} and {}, got {}",
                    MAX_RESULTS_MIN, MAX_RESULTS_MAX, max_results
                )));
            }
        }
        Ok(())
    }
}

/// Chunk result emitted by a retrieval call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub file_id: String,
    pub filename: String,
    pub score: f64,
    pub text: String,
    pub attributes: Option<AttributeMap>,
}

/// Structured response body for chunk retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRelevantChunksResponse {
    pub vector_store_id: String,
    pub query: String,
    /// Ordered as returned by the remote ranking, stable after filtering
    pub results: Vec<RetrievedChunk>,
}

/// Response for the `get_vector_store_info` tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreInfoResponse {
    pub vector_store_id: String,
    pub vector_store_name: Option<String>,
}
