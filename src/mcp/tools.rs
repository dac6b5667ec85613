//! Tool definitions and handlers for the three vector store tools

use super::types::{ToolDefinition, ToolResult};
use crate::error::Error;
use crate::models::{IngestDocumentRequest, RetrieveRelevantChunksRequest};
use crate::store::ContextStore;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Get all available tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "ingest_document".to_string(),
            description: "Add a plain-text document or feature summary into the configured \
                vector store so that future tasks can retrieve it. Required: content (non-empty \
                string). Optional: vector_store_id, vector_store_name (find-or-create target \
                when no ID is given), document_id, filename (auto-generated if omitted), \
                summary, attributes (key/value file tags), chunking_strategy, mime_type \
                (default text/plain)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "content": {
                        "type": "string",
                        "description": "Plain-text content to ingest. Must not be empty."
                    },
                    "vector_store_id": {
                        "type": "string",
                        "description": "Target vector store ID. Falls back to configured defaults when omitted."
                    },
                    "vector_store_name": {
                        "type": "string",
                        "description": "Vector store name to find or create when no ID is provided."
                    },
                    "document_id": {
                        "type": "string",
                        "description": "Stable identifier for the document, stored as a file attribute."
                    },
                    "filename": {
                        "type": "string",
                        "description": "Logical filename for the uploaded document. Auto-generated if omitted."
                    },
                    "summary": {
                        "type": "string",
                        "description": "High-level summary or title, stored as a file attribute."
                    },
                    "attributes": {
                        "type": "object",
                        "description": "Additional key/value pairs attached as file attributes."
                    },
                    "chunking_strategy": {
                        "type": "object",
                        "description": "Chunking strategy forwarded to the vector store API."
                    },
                    "mime_type": {
                        "type": "string",
                        "description": "MIME type of the file. Defaults to text/plain."
                    }
                },
                "required": ["content"]
            }),
        },
        ToolDefinition {
            name: "retrieve_relevant_chunks".to_string(),
            description: "Search the configured vector store for the chunks most relevant to \
                the provided query. Required: query (non-empty string). Optional: \
                vector_store_id, max_results (1-50), score_threshold (minimum similarity, \
                0-1), attributes_filter (exact-match file attribute filters), rewrite_query. \
                Note: when resolution falls back to a configured default store name that does \
                not exist yet, the store is created lazily even for this read operation."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query that drives similarity search. Must not be empty."
                    },
                    "vector_store_id": {
                        "type": "string",
                        "description": "Vector store to query. Falls back to configured defaults when omitted."
                    },
                    "max_results": {
                        "type": "integer",
                        "description": "Maximum number of chunks to return.",
                        "minimum": 1,
                        "maximum": 50
                    },
                    "score_threshold": {
                        "type": "number",
                        "description": "Minimum similarity score (0-1) required for inclusion. Equal scores pass."
                    },
                    "attributes_filter": {
                        "type": "object",
                        "description": "Exact-match filters on file attributes, e.g. {\"document_id\": \"doc-123\"}."
                    },
                    "rewrite_query": {
                        "type": "boolean",
                        "description": "Enable or disable automatic query rewriting."
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "get_vector_store_info".to_string(),
            description: "Get the ID and name of the configured vector store. Optional: \
                vector_store_id to inspect a specific store instead of the default."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "vector_store_id": {
                        "type": "string",
                        "description": "Vector store ID to inspect. Falls back to configured defaults when omitted."
                    }
                }
            }),
        },
    ]
}

/// Dispatch a tool call by name
pub async fn handle_tool_call(
    name: &str,
    arguments: &HashMap<String, Value>,
    store: &ContextStore,
) -> ToolResult {
    match name {
        "ingest_document" => handle_ingest(arguments, store).await,
        "retrieve_relevant_chunks" => handle_retrieve(arguments, store).await,
        "get_vector_store_info" => handle_store_info(arguments, store).await,
        _ => ToolResult::error(format!("Unknown tool: {}", name)),
    }
}

fn arguments_value(arguments: &HashMap<String, Value>) -> Value {
    Value::Object(
        arguments
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

fn error_result(error: Error) -> ToolResult {
    ToolResult::error(format!("{}: {}", error.kind(), error))
}

fn json_result<T: serde::Serialize>(response: &T) -> ToolResult {
    match serde_json::to_string_pretty(response) {
        Ok(body) => ToolResult::text(body),
        Err(e) => ToolResult::error(format!("Failed to serialize response: {}", e)),
    }
}

async fn handle_ingest(arguments: &HashMap<String, Value>, store: &ContextStore) -> ToolResult {
    let request: IngestDocumentRequest = match serde_json::from_value(arguments_value(arguments)) {
        Ok(request) => request,
        Err(e) => return ToolResult::error(format!("validation_error: {}", e)),
    };

    debug!("Ingesting document into vector store");
    match store.ingest(&request).await {
        Ok(response) => json_result(&response),
        Err(e) => error_result(e),
    }
}

async fn handle_retrieve(arguments: &HashMap<String, Value>, store: &ContextStore) -> ToolResult {
    let request: RetrieveRelevantChunksRequest =
        match serde_json::from_value(arguments_value(arguments)) {
            Ok(request) => request,
            Err(e) => return ToolResult::error(format!("validation_error: {}", e)),
        };

    debug!("Retrieving relevant chunks from vector store");
    match store.retrieve(&request).await {
        Ok(response) => json_result(&response),
        Err(e) => error_result(e),
    }
}

async fn handle_store_info(arguments: &HashMap<String, Value>, store: &ContextStore) -> ToolResult {
    let store_id = match arguments.get("vector_store_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id.clone()),
        Some(_) => return ToolResult::error("validation_error: vector_store_id must be a string"),
    };

    match store.get_store_info(store_id.as_deref()).await {
        Ok(response) => json_result(&response),
        Err(e) => error_result(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_cover_the_three_operations() {
        let names: Vec<String> = get_tool_definitions()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "ingest_document",
                "retrieve_relevant_chunks",
                "get_vector_store_info"
            ]
        );
    }

    #[test]
    fn test_schemas_mark_required_fields() {
        let tools = get_tool_definitions();
        assert_eq!(tools[0].input_schema["required"], json!(["content"]));
        assert_eq!(tools[1].input_schema["required"], json!(["query"]));
        assert!(tools[2].input_schema.get("required").is_none());
        assert_eq!(
            tools[1].input_schema["properties"]["max_results"]["maximum"],
            json!(50)
        );
    }
}
