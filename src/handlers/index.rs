//! Document admission and removal handlers

use super::{validate_non_empty, ToolHandlers};
use crate::types::Document;
use crate::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInput {
    /// Caller-unique id; derived from the content when absent
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
}

impl DocumentInput {
    fn into_document(self) -> Document {
        match self.id {
            Some(id) if !id.trim().is_empty() => Document::new(id, self.content),
            _ => Document::from_content(self.content),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexDocumentsArgs {
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveDocumentsArgs {
    pub ids: Vec<String>,
}

/// Read a JSON array of `{id?, content}` documents from disk
pub fn load_seed_documents(path: &Path) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)?;
    let inputs: Vec<DocumentInput> = serde_json::from_str(&raw)?;
    Ok(inputs.into_iter().map(DocumentInput::into_document).collect())
}

impl ToolHandlers {
    /// Handle index_documents tool call - returns JSON string
    pub async fn handle_index_documents(&self, args: IndexDocumentsArgs) -> Result<String> {
        if let Err(e) = validate_non_empty(&args.documents, "documents") {
            return Ok(serde_json::json!({
                "error": e.to_string()
            })
            .to_string());
        }

        let documents: Vec<Document> = args
            .documents
            .into_iter()
            .map(DocumentInput::into_document)
            .collect();
        let ids: Vec<String> = documents.iter().map(|doc| doc.id.clone()).collect();

        let mut state = self.state.lock().await;
        let previous_count = state.engine.size();
        state.engine.add_documents(documents);
        state.touch();
        let document_count = state.engine.size();
        drop(state);

        // Anything that did not grow the corpus overwrote an earlier document,
        // including ids repeated within this batch
        let replaced = ids.len() - (document_count - previous_count);

        info!(
            "[INDEX] Indexed {} documents ({} replaced), corpus size {}",
            ids.len(),
            replaced,
            document_count
        );

        Ok(serde_json::json!({
            "message": format!("Indexed {} documents ({} replaced).", ids.len(), replaced),
            "ids": ids,
            "documentCount": document_count
        })
        .to_string())
    }

    /// Handle remove_documents tool call - returns JSON string
    pub async fn handle_remove_documents(&self, args: RemoveDocumentsArgs) -> Result<String> {
        if let Err(e) = validate_non_empty(&args.ids, "document ids") {
            return Ok(serde_json::json!({
                "error": e.to_string()
            })
            .to_string());
        }

        let mut state = self.state.lock().await;
        let removed = state.engine.remove_documents(&args.ids);
        if removed > 0 {
            state.touch();
        }
        let document_count = state.engine.size();
        drop(state);

        info!(
            "[INDEX] Removed {} of {} requested documents, corpus size {}",
            removed,
            args.ids.len(),
            document_count
        );

        Ok(serde_json::json!({
            "message": format!("Removed {} documents.", removed),
            "removed": removed,
            "documentCount": document_count
        })
        .to_string())
    }
}
