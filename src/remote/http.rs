//! HTTP client for the OpenAI vector store API

use super::{
    DocumentUpload, RemoteStoreHandle, RemoteVectorStore, SearchHit, SearchQuery, UploadedFile,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::AttributeMap;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;

/// Page size used when listing stores for name resolution
const LIST_PAGE_LIMIT: u32 = 100;

/// Delay between status polls while an upload is processing
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum number of error body characters carried into an error message
const ERROR_BODY_EXCERPT: usize = 512;

#[derive(Debug, Serialize)]
struct CreateStoreRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a AttributeMap>,
}

#[derive(Debug, Deserialize)]
struct ListStoresResponse {
    #[serde(default)]
    data: Vec<RemoteStoreHandle>,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct AttachFileRequest<'a> {
    file_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<&'a AttributeMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunking_strategy: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    query: &'a str,
    max_num_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<SearchFilters<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rewrite_query: Option<bool>,
}

#[derive(Debug, Serialize)]
struct SearchFilters<'a> {
    attributes: &'a AttributeMap,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

/// Client for the hosted vector store HTTP API
pub struct HttpVectorStoreClient {
    client: Client,
    base_url: Url,
    request_timeout: Duration,
}

impl HttpVectorStoreClient {
    /// Build a client from config. The configured timeout bounds every
    /// individual request as well as the upload polling loop.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url)?;
        let request_timeout = Duration::from_secs_f64(config.request_timeout_seconds);

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| Error::Config("API key contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));
        if let Some(organization) = &config.organization {
            headers.insert(
                "OpenAI-Organization",
                HeaderValue::from_str(organization).map_err(|_| {
                    Error::Config("Organization contains invalid header characters".to_string())
                })?,
            );
        }
        if let Some(project) = &config.project {
            headers.insert(
                "OpenAI-Project",
                HeaderValue::from_str(project).map_err(|_| {
                    Error::Config("Project contains invalid header characters".to_string())
                })?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            request_timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid API URL: {}", e)))
    }

    /// Map a non-success response to an error, draining the body for context
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let mut excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
        if excerpt.is_empty() {
            excerpt = "<empty body>".to_string();
        }

        if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound(format!(
                "Remote API returned 404: {}",
                excerpt
            )))
        } else {
            Err(Error::Remote(format!(
                "Remote API returned {}: {}",
                status, excerpt
            )))
        }
    }

    /// Upload raw bytes to the files endpoint, returning the file ID
    async fn upload_file(&self, upload: &DocumentUpload) -> Result<FileObject> {
        let url = self.endpoint("/v1/files")?;

        let file_part = reqwest::multipart::Part::bytes(upload.content.clone().into_bytes())
            .file_name(upload.filename.clone())
            .mime_str(&upload.mime_type)
            .map_err(|e| Error::Validation(format!("Invalid MIME type '{}': {}", upload.mime_type, e)))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "assistants")
            .part("file", file_part);

        let response = self.client.post(url).multipart(form).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Attach an uploaded file to a store, starting remote processing
    async fn attach_file(
        &self,
        store_id: &str,
        file_id: &str,
        upload: &DocumentUpload,
    ) -> Result<UploadedFile> {
        let url = self.endpoint(&format!("/v1/vector_stores/{}/files", store_id))?;
        let body = AttachFileRequest {
            file_id,
            attributes: upload.attributes.as_ref(),
            chunking_strategy: upload.chunking_strategy.as_ref(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Poll an attached file until it leaves `in_progress`, bounded by the
    /// configured request timeout
    async fn poll_file(&self, store_id: &str, mut file: UploadedFile) -> Result<UploadedFile> {
        let deadline = Instant::now() + self.request_timeout;

        while file.status == "in_progress" {
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!(
                    "File {} still processing after {:.0}s",
                    file.id,
                    self.request_timeout.as_secs_f64()
                )));
            }
            tokio::time::sleep(POLL_INTERVAL).await;

            let url =
                self.endpoint(&format!("/v1/vector_stores/{}/files/{}", store_id, file.id))?;
            let response = self.client.get(url).send().await?;
            file = Self::check(response).await?.json().await?;
            debug!("File {} status: {}", file.id, file.status);
        }

        Ok(file)
    }
}

#[async_trait]
impl RemoteVectorStore for HttpVectorStoreClient {
    async fn retrieve_store(&self, store_id: &str) -> Result<RemoteStoreHandle> {
        let url = self.endpoint(&format!("/v1/vector_stores/{}", store_id))?;
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_stores(&self) -> Result<Vec<RemoteStoreHandle>> {
        let mut url = self.endpoint("/v1/vector_stores")?;
        url.query_pairs_mut()
            .append_pair("limit", &LIST_PAGE_LIMIT.to_string())
            .append_pair("order", "desc");
        let response = self.client.get(url).send().await?;
        let parsed: ListStoresResponse = Self::check(response).await?.json().await?;
        Ok(parsed.data)
    }

    async fn create_store(
        &self,
        name: &str,
        metadata: Option<&AttributeMap>,
    ) -> Result<RemoteStoreHandle> {
        let url = self.endpoint("/v1/vector_stores")?;
        let body = CreateStoreRequest { name, metadata };
        let response = self.client.post(url).json(&body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn upload_document(
        &self,
        store_id: &str,
        upload: DocumentUpload,
    ) -> Result<UploadedFile> {
        info!(
            "Uploading {} ({} bytes) to vector store {}",
            upload.filename,
            upload.content.len(),
            store_id
        );
        let file = self.upload_file(&upload).await?;
        let attached = self.attach_file(store_id, &file.id, &upload).await?;
        self.poll_file(store_id, attached).await
    }

    async fn search(&self, store_id: &str, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let url = self.endpoint(&format!("/v1/vector_stores/{}/search", store_id))?;
        let body = SearchRequestBody {
            query: &query.query,
            max_num_results: query.max_results,
            filters: query
                .attributes_filter
                .as_ref()
                .map(|attributes| SearchFilters { attributes }),
            rewrite_query: query.rewrite_query,
        };
        let response = self.client.post(url).json(&body).send().await?;
        let parsed: SearchResponse = Self::check(response).await?.json().await?;
        Ok(parsed.data)
    }
}
