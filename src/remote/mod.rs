//! Narrow seam over the hosted vector-store provider
//!
//! The provider owns embedding, chunking, ranking, and storage. Everything
//! this crate needs from it fits in five operations, kept behind a trait so
//! the store logic can be exercised against a mock and the HTTP client can
//! be swapped out without touching the core.

mod http;

pub use http::HttpVectorStoreClient;

use crate::error::Result;
use crate::models::AttributeMap;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Handle to a remote vector store, as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteStoreHandle {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Document payload handed to the provider for upload
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Logical filename; the provider may echo something else back, but this
    /// value is authoritative for responses
    pub filename: String,
    /// UTF-8 payload bytes
    pub content: String,
    pub mime_type: String,
    /// Attributes attached to the file; `None` when the composed set is empty
    pub attributes: Option<AttributeMap>,
    /// Opaque chunking configuration forwarded to the provider
    pub chunking_strategy: Option<Value>,
}

/// Uploaded file state once remote processing reached a terminal status
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
}

/// Search parameters forwarded opaquely to the provider
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub max_results: u32,
    pub attributes_filter: Option<AttributeMap>,
    pub rewrite_query: Option<bool>,
}

/// One content segment of a search hit
#[derive(Debug, Clone, Deserialize)]
pub struct HitContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// One ranked search hit from the provider
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    pub file_id: String,
    pub filename: String,
    pub score: f64,
    #[serde(default)]
    pub attributes: Option<AttributeMap>,
    #[serde(default)]
    pub content: Vec<HitContent>,
}

/// The five provider operations this crate consumes
#[async_trait]
pub trait RemoteVectorStore: Send + Sync {
    /// Fetch a store by its exact ID
    async fn retrieve_store(&self, store_id: &str) -> Result<RemoteStoreHandle>;

    /// List existing stores, newest first
    async fn list_stores(&self) -> Result<Vec<RemoteStoreHandle>>;

    /// Create a new store with the given name and optional metadata
    async fn create_store(
        &self,
        name: &str,
        metadata: Option<&AttributeMap>,
    ) -> Result<RemoteStoreHandle>;

    /// Upload a document and block until remote processing reaches a
    /// terminal status
    async fn upload_document(
        &self,
        store_id: &str,
        upload: DocumentUpload,
    ) -> Result<UploadedFile>;

    /// Run a similarity search against a store
    async fn search(&self, store_id: &str, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}
