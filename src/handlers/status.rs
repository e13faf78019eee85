//! Index status handler

use super::ToolHandlers;
use crate::Result;

impl ToolHandlers {
    /// Handle index_status tool call - returns JSON string
    pub async fn handle_index_status(&self) -> Result<String> {
        let state = self.state.lock().await;
        let stats = state.engine.stats();
        let bm25 = state.engine.bm25_params();
        let fusion = state.engine.fusion_config().clone();
        let last_updated = state.last_updated.map(|dt| dt.to_rfc3339());
        drop(state);

        let message = if stats.document_count == 0 {
            "Index is empty. Use index_documents to add content.".to_string()
        } else {
            format!(
                "Index holds {} documents, {} distinct terms (average length {:.1} tokens).",
                stats.document_count, stats.term_count, stats.average_length
            )
        };

        Ok(serde_json::json!({
            "message": message,
            "stats": serde_json::to_value(stats)?,
            "bm25": serde_json::to_value(bm25)?,
            "fusion": serde_json::to_value(&fusion)?,
            "lastUpdated": last_updated
        })
        .to_string())
    }
}
