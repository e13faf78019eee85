use super::ToolHandlers;
use crate::Result;
use tracing::info;

impl ToolHandlers {
    /// Handle clear_index tool call - returns JSON string
    pub async fn handle_clear_index(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let removed = state.engine.size();

        if removed == 0 {
            return Ok(serde_json::json!({
                "message": "Index is already empty."
            })
            .to_string());
        }

        state.engine.clear();
        state.touch();
        drop(state);

        info!("[CLEAR] Cleared {} documents from the index", removed);

        Ok(serde_json::json!({
            "message": format!("Cleared {} documents from the index.", removed),
            "removed": removed
        })
        .to_string())
    }
}
