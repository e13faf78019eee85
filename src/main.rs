use hybrid_retrieval::handlers::{
    load_seed_documents, DocumentInput, IndexDocumentsArgs, RemoveDocumentsArgs, SearchArgs,
    ToolHandlers,
};
use hybrid_retrieval::search::HybridSearchEngine;
use hybrid_retrieval::RankedHit;
use rmcp::{
    handler::server::router::tool::ToolRouter,
    model::*,
    tool, tool_handler,
    transport::stdio,
    ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DocumentParam {
    #[schemars(description = "Unique document id. Derived from the content hash when omitted")]
    #[serde(default)]
    id: Option<String>,
    #[schemars(description = "Document text to index")]
    content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct IndexDocumentsParams {
    #[schemars(description = "Documents to index. Re-using an id replaces the earlier document")]
    documents: Vec<DocumentParam>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct RemoveDocumentsParams {
    #[schemars(description = "Ids of the documents to remove. Unknown ids are ignored")]
    ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    #[schemars(description = "Natural language or keyword query")]
    query: String,
    #[schemars(description = "Maximum number of results to return")]
    #[serde(default)]
    limit: Option<usize>,
    #[schemars(description = "Precomputed dense-vector ranking, best first")]
    #[serde(default)]
    vector_results: Option<Vec<RankedHit>>,
    #[schemars(description = "Precomputed sparse ranking, best first")]
    #[serde(default)]
    sparse_results: Option<Vec<RankedHit>>,
    #[schemars(description = "Precomputed late-interaction ranking, best first")]
    #[serde(default)]
    late_results: Option<Vec<RankedHit>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting retrieval MCP server");

    let config = hybrid_retrieval::Config::from_env()?;
    tracing::info!(
        "Configuration loaded (k1={}, b={}, fusion={:?}, rrf_k={})",
        config.bm25.k1,
        config.bm25.b,
        config.fusion.strategy,
        config.fusion.rrf_k
    );

    let engine = match &config.server.seed_documents {
        Some(path) => {
            let documents = load_seed_documents(path)?;
            tracing::info!("Seeding index with {} documents from {}", documents.len(), path.display());
            HybridSearchEngine::from_documents(documents, config.bm25, config.fusion.clone())
        }
        None => HybridSearchEngine::from_config(&config),
    };

    let handlers = ToolHandlers::with_engine(config, engine);
    tracing::info!("Tool handlers initialized");

    let server = RetrievalServer::new(Arc::new(handlers));

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .map_err(|e| hybrid_retrieval::Error::Mcp(e.to_string()))?;
    service.waiting().await?;

    Ok(())
}

struct RetrievalServer {
    handlers: Arc<ToolHandlers>,
    tool_router: ToolRouter<Self>,
}

impl RetrievalServer {
    fn new(handlers: Arc<ToolHandlers>) -> Self {
        Self {
            handlers,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_tool_result(response: hybrid_retrieval::Result<String>, action: &str) -> CallToolResult {
    match response {
        Ok(json_response) => CallToolResult::success(vec![Content::text(json_response)]),
        Err(e) => CallToolResult::success(vec![Content::text(
            serde_json::json!({"error": format!("{} failed: {}", action, e)}).to_string(),
        )]),
    }
}

#[rmcp::tool_router]
impl RetrievalServer {
    #[tool(
        name = "index_documents",
        description = "Add documents to the keyword index. Documents with an existing id replace the previous version."
    )]
    async fn index_documents(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<IndexDocumentsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let args = IndexDocumentsArgs {
            documents: params
                .0
                .documents
                .into_iter()
                .map(|doc| DocumentInput {
                    id: doc.id,
                    content: doc.content,
                })
                .collect(),
        };

        Ok(to_tool_result(
            self.handlers.handle_index_documents(args).await,
            "Indexing",
        ))
    }

    #[tool(
        name = "remove_documents",
        description = "Remove documents from the index by id."
    )]
    async fn remove_documents(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<RemoveDocumentsParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let args = RemoveDocumentsArgs { ids: params.0.ids };

        Ok(to_tool_result(
            self.handlers.handle_remove_documents(args).await,
            "Removal",
        ))
    }

    #[tool(
        name = "search",
        description = "Search indexed documents. Runs BM25 keyword search, or fuses it with any supplied vector, sparse or late-interaction rankings."
    )]
    async fn search(
        &self,
        params: rmcp::handler::server::wrapper::Parameters<SearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let args = SearchArgs {
            query: params.query,
            limit: params.limit,
            vector_results: params.vector_results,
            sparse_results: params.sparse_results,
            late_results: params.late_results,
        };

        Ok(to_tool_result(self.handlers.handle_search(args).await, "Search"))
    }

    #[tool(
        name = "index_status",
        description = "Report document count, vocabulary size, average document length and fusion settings."
    )]
    async fn index_status(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(to_tool_result(
            self.handlers.handle_index_status().await,
            "Status check",
        ))
    }

    #[tool(
        name = "clear_index",
        description = "Remove every document from the index."
    )]
    async fn clear_index(&self) -> Result<CallToolResult, rmcp::ErrorData> {
        Ok(to_tool_result(self.handlers.handle_clear_index().await, "Clear"))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for RetrievalServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Hybrid retrieval server. Use index_documents to add content, \
                 then search with a query and optional precomputed rankings."
                    .to_string(),
            ),
        }
    }
}
