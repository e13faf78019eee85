//! Search handler
//!
//! Runs a keyword search, or a hybrid search when the caller supplies any
//! precomputed ranking (vector, sparse or late-interaction).

use super::ToolHandlers;
use crate::types::RankedHit;
use crate::Result;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub vector_results: Option<Vec<RankedHit>>,
    #[serde(default)]
    pub sparse_results: Option<Vec<RankedHit>>,
    #[serde(default)]
    pub late_results: Option<Vec<RankedHit>>,
}

impl SearchArgs {
    fn is_hybrid(&self) -> bool {
        self.vector_results.is_some() || self.sparse_results.is_some() || self.late_results.is_some()
    }
}

impl ToolHandlers {
    /// Handle search tool call - returns JSON string
    pub async fn handle_search(&self, args: SearchArgs) -> Result<String> {
        let limit = self.resolve_limit(args.limit);
        let hybrid = args.is_hybrid();
        let mode = if hybrid { "hybrid" } else { "keyword" };

        info!("[SEARCH] Query: \"{}\" ({} mode, limit {})", args.query, mode, limit);

        let results = {
            let state = self.state.lock().await;
            if hybrid {
                let vector_results = args.vector_results.unwrap_or_default();
                state.engine.hybrid_search(
                    &vector_results,
                    &args.query,
                    limit,
                    args.sparse_results.as_deref(),
                    args.late_results.as_deref(),
                )
            } else {
                state.engine.keyword_search(&args.query, limit)
            }
        };

        info!("[SEARCH] Search completed! Found {} results", results.len());

        if results.is_empty() {
            return Ok(serde_json::json!({
                "message": format!("No results found for query: \"{}\"", args.query),
                "mode": mode,
                "resultsCount": 0,
                "results": []
            })
            .to_string());
        }

        Ok(serde_json::json!({
            "message": format!("Found {} results for query: \"{}\"", results.len(), args.query),
            "mode": mode,
            "resultsCount": results.len(),
            "results": serde_json::to_value(&results)?
        })
        .to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{DocumentInput, IndexDocumentsArgs};
    use crate::Config;
    use serde_json::Value;

    fn seeded_handlers() -> ToolHandlers {
        let handlers = ToolHandlers::new(Config::default());
        let documents = [
            ("doc1", "The quick brown fox jumps over the lazy dog"),
            ("doc2", "A quick brown dog runs in the park"),
            ("doc3", "The cat sleeps on the mat"),
        ]
        .into_iter()
        .map(|(id, content)| DocumentInput {
            id: Some(id.to_string()),
            content: content.to_string(),
        })
        .collect();

        tokio_test::block_on(handlers.handle_index_documents(IndexDocumentsArgs { documents }))
            .unwrap();
        handlers
    }

    fn search(handlers: &ToolHandlers, args: SearchArgs) -> Value {
        let response = tokio_test::block_on(handlers.handle_search(args)).unwrap();
        serde_json::from_str(&response).unwrap()
    }

    #[test]
    fn test_keyword_mode() {
        let handlers = seeded_handlers();
        let response = search(
            &handlers,
            SearchArgs {
                query: "quick brown".to_string(),
                ..SearchArgs::default()
            },
        );

        assert_eq!(response["mode"], "keyword");
        assert_eq!(response["resultsCount"], 2);
        assert_eq!(response["results"][0]["sources"], serde_json::json!(["keyword"]));
        assert!(response["results"][0]["content"].is_string());
    }

    #[test]
    fn test_hybrid_mode() {
        let handlers = seeded_handlers();
        let response = search(
            &handlers,
            SearchArgs {
                query: "cat".to_string(),
                vector_results: Some(vec![RankedHit::new("doc3", 0.9)]),
                late_results: Some(vec![RankedHit::new("doc3", 0.5)]),
                ..SearchArgs::default()
            },
        );

        assert_eq!(response["mode"], "hybrid");
        let top = &response["results"][0];
        assert_eq!(top["id"], "doc3");
        assert_eq!(top["sources"], serde_json::json!(["vector", "keyword", "late"]));
        assert!(top.get("lateInteractionScore").is_some());
        assert!(top.get("sparseScore").is_none());
    }

    #[test]
    fn test_sparse_only_request_runs_hybrid() {
        let handlers = seeded_handlers();
        let response = search(
            &handlers,
            SearchArgs {
                query: "cat".to_string(),
                sparse_results: Some(vec![RankedHit::new("doc3", 12.5), RankedHit::new("doc1", 3.0)]),
                ..SearchArgs::default()
            },
        );

        assert_eq!(response["mode"], "hybrid");
        assert_eq!(response["resultsCount"], 2);
        let top = &response["results"][0];
        assert_eq!(top["id"], "doc3");
        assert_eq!(top["sources"], serde_json::json!(["keyword", "sparse"]));
        assert_eq!(top["sparseScore"], 12.5);
        assert!(top.get("vectorScore").is_none());

        let second = &response["results"][1];
        assert_eq!(second["id"], "doc1");
        assert_eq!(second["sources"], serde_json::json!(["sparse"]));
    }

    #[test]
    fn test_no_results_message() {
        let handlers = seeded_handlers();
        let response = search(
            &handlers,
            SearchArgs {
                query: "elephant zebra".to_string(),
                ..SearchArgs::default()
            },
        );

        assert_eq!(response["resultsCount"], 0);
        assert!(response["message"].as_str().unwrap().starts_with("No results"));
    }

    #[test]
    fn test_args_deserialize_camel_case() {
        let args: SearchArgs = serde_json::from_value(serde_json::json!({
            "query": "q",
            "limit": 3,
            "vectorResults": [{"id": "a", "score": 0.5}],
            "sparseResults": [{"id": "b", "score": 2.0}]
        }))
        .unwrap();

        assert_eq!(args.limit, Some(3));
        assert_eq!(args.vector_results.unwrap().len(), 1);
        assert_eq!(args.sparse_results.unwrap()[0].id, "b");
        assert!(args.late_results.is_none());
    }
}
