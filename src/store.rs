//! Vector store resolution, ingestion, and retrieval
//!
//! This module is the heart of the server: it reconciles store references
//! against configured defaults, composes upload attributes and filenames,
//! and shapes search results. The remote provider sits behind the
//! `RemoteVectorStore` trait and is treated as an opaque capability.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    AttributeMap, AttributeValue, IngestDocumentRequest, IngestDocumentResponse,
    RetrieveRelevantChunksRequest, RetrieveRelevantChunksResponse, RetrievedChunk,
    VectorStoreInfoResponse,
};
use crate::remote::{DocumentUpload, RemoteStoreHandle, RemoteVectorStore, SearchQuery};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum length of the summary-derived filename slug
const SUMMARY_SLUG_MAX_CHARS: usize = 40;

/// Store operations backed by a remote vector store provider
pub struct ContextStore {
    remote: Arc<dyn RemoteVectorStore>,
    config: Config,
}

impl ContextStore {
    pub fn new(remote: Arc<dyn RemoteVectorStore>, config: Config) -> Self {
        Self { remote, config }
    }

    /// Resolve or lazily create a vector store.
    ///
    /// Order: explicit ID, explicit name (find-or-create), configured default
    /// ID, configured default name (find-or-create). An explicit ID that does
    /// not exist is an error; a name that matches nothing is created when
    /// `create_if_missing` allows it.
    ///
    /// Find-or-create is not atomic on the remote side: two concurrent calls
    /// for the same missing name may each create a store. Known limitation,
    /// not worked around with client-side locking.
    async fn resolve_store(
        &self,
        store_id: Option<&str>,
        store_name: Option<&str>,
        metadata: Option<&AttributeMap>,
        create_if_missing: bool,
    ) -> Result<RemoteStoreHandle> {
        if let Some(id) = store_id {
            debug!("Using provided vector store id {}", id);
            return self.remote.retrieve_store(id).await;
        }

        if let Some(name) = store_name {
            return self
                .find_or_create_store(name, metadata, create_if_missing)
                .await;
        }

        if let Some(id) = &self.config.default_vector_store_id {
            debug!("Falling back to configured vector store id {}", id);
            return self.remote.retrieve_store(id).await;
        }

        if let Some(name) = &self.config.default_vector_store_name {
            debug!("Falling back to configured vector store name {}", name);
            return self
                .find_or_create_store(name, metadata, create_if_missing)
                .await;
        }

        Err(Error::Config(
            "No vector store identifier was provided and no defaults are configured".to_string(),
        ))
    }

    async fn find_or_create_store(
        &self,
        name: &str,
        metadata: Option<&AttributeMap>,
        create_if_missing: bool,
    ) -> Result<RemoteStoreHandle> {
        debug!("Attempting to locate vector store named {}", name);
        if let Some(existing) = self.find_store_by_name(name).await {
            return Ok(existing);
        }

        if !create_if_missing {
            return Err(Error::NotFound(format!(
                "No vector store named '{}' exists and creation is disabled for this operation",
                name
            )));
        }

        info!("Creating vector store named {}", name);
        self.remote.create_store(name, metadata).await
    }

    /// Return an existing store whose name matches exactly, newest first.
    ///
    /// A listing failure degrades to "no match" so resolution can fall
    /// through to creation; it is logged, never silently dropped.
    async fn find_store_by_name(&self, name: &str) -> Option<RemoteStoreHandle> {
        let stores = match self.remote.list_stores().await {
            Ok(stores) => stores,
            Err(e) => {
                warn!("Failed to list vector stores: {}", e);
                return None;
            }
        };

        stores
            .into_iter()
            .find(|store| store.name.as_deref() == Some(name))
    }

    /// Upload a document into the resolved vector store
    pub async fn ingest(&self, request: &IngestDocumentRequest) -> Result<IngestDocumentResponse> {
        request.validate()?;

        // "Create with no extra tags" when the caller named the store.
        let metadata = request.vector_store_name.as_ref().map(|_| AttributeMap::new());

        let store = self
            .resolve_store(
                request.vector_store_id.as_deref(),
                request.vector_store_name.as_deref(),
                metadata.as_ref(),
                true,
            )
            .await?;

        let filename = request
            .filename
            .clone()
            .unwrap_or_else(|| derive_filename(request));

        let attributes = compose_attributes(request);

        info!("Uploading document {} to vector store {}", filename, store.id);

        let file = self
            .remote
            .upload_document(
                &store.id,
                DocumentUpload {
                    filename: filename.clone(),
                    content: request.content.clone(),
                    mime_type: request.mime_type.clone(),
                    attributes: if attributes.is_empty() {
                        None
                    } else {
                        Some(attributes)
                    },
                    chunking_strategy: request.chunking_strategy.clone(),
                },
            )
            .await?;

        if file.status != "completed" {
            warn!("Vector store file {} finished with status {}", file.id, file.status);
        }

        Ok(IngestDocumentResponse {
            vector_store_id: store.id,
            vector_store_name: store.name,
            file_id: file.id,
            // The locally derived filename is authoritative, whatever the
            // remote side echoes back.
            filename,
            status: file.status,
            attributes: file.attributes,
        })
    }

    /// Search the resolved vector store and shape the results
    pub async fn retrieve(
        &self,
        request: &RetrieveRelevantChunksRequest,
    ) -> Result<RetrieveRelevantChunksResponse> {
        request.validate()?;

        let store = self
            .resolve_store(
                request.vector_store_id.as_deref(),
                None,
                None,
                self.config.create_if_missing,
            )
            .await?;

        let max_results = request
            .max_results
            .unwrap_or(self.config.default_max_results);

        debug!("Searching vector store {} for query {}", store.id, request.query);

        let hits = self
            .remote
            .search(
                &store.id,
                &SearchQuery {
                    query: request.query.clone(),
                    max_results,
                    attributes_filter: request.attributes_filter.clone(),
                    rewrite_query: request.rewrite_query,
                },
            )
            .await?;

        let results = hits
            .into_iter()
            .filter(|hit| match request.score_threshold {
                Some(threshold) => hit.score >= threshold,
                None => true,
            })
            .map(|hit| {
                let text = hit
                    .content
                    .iter()
                    .filter(|segment| segment.kind == "text")
                    .filter_map(|segment| segment.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n\n");
                RetrievedChunk {
                    file_id: hit.file_id,
                    filename: hit.filename,
                    score: hit.score,
                    text,
                    attributes: hit.attributes,
                }
            })
            .collect();

        Ok(RetrieveRelevantChunksResponse {
            vector_store_id: store.id,
            query: request.query.clone(),
            results,
        })
    }

    /// Resolve the target store and report its identity
    pub async fn get_store_info(&self, store_id: Option<&str>) -> Result<VectorStoreInfoResponse> {
        let store = self
            .resolve_store(store_id, None, None, self.config.create_if_missing)
            .await?;

        Ok(VectorStoreInfoResponse {
            vector_store_id: store.id,
            vector_store_name: store.name,
        })
    }
}

/// Derive an upload filename when the caller did not supply one.
///
/// Priority: document ID, then a slug of the summary with a timestamp
/// suffix, then a generic timestamped name.
fn derive_filename(request: &IngestDocumentRequest) -> String {
    if let Some(document_id) = &request.document_id {
        return format!("{}.txt", document_id);
    }
    if let Some(summary) = &request.summary {
        let slug: String = summary
            .to_lowercase()
            .replace(' ', "-")
            .chars()
            .take(SUMMARY_SLUG_MAX_CHARS)
            .collect();
        let slug = if slug.is_empty() { "context".to_string() } else { slug };
        return format!("{}-{}.txt", slug, Utc::now().timestamp());
    }
    format!("context-{}.txt", Utc::now().timestamp())
}

/// Compose the attribute set attached to an uploaded file.
///
/// The caller's map is copied, never mutated. Caller-supplied `document_id`
/// and `summary` keys win over the derived values; `ingested_at` is always
/// stamped with the current UTC time, replacing any caller value.
fn compose_attributes(request: &IngestDocumentRequest) -> AttributeMap {
    let mut attributes = request.attributes.clone().unwrap_or_default();

    if let Some(document_id) = &request.document_id {
        attributes
            .entry("document_id".to_string())
            .or_insert_with(|| AttributeValue::Text(document_id.clone()));
    }
    if let Some(summary) = &request.summary {
        attributes
            .entry("summary".to_string())
            .or_insert_with(|| AttributeValue::Text(summary.clone()));
    }
    attributes.insert(
        "ingested_at".to_string(),
        AttributeValue::Text(Utc::now().to_rfc3339()),
    );

    attributes
}
