pub mod clear;
pub mod index;
pub mod search;
pub mod status;

pub use index::{load_seed_documents, DocumentInput, IndexDocumentsArgs, RemoveDocumentsArgs};
pub use search::SearchArgs;

use crate::search::HybridSearchEngine;
use crate::{Config, Error, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Engine plus bookkeeping shared by all tool calls
pub(crate) struct IndexState {
    pub(crate) engine: HybridSearchEngine,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl IndexState {
    pub(crate) fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}

/// MCP tool handlers over one shared engine.
///
/// The engine itself has no internal locking, so every call goes through
/// the mutex and mutations are serialized.
#[derive(Clone)]
pub struct ToolHandlers {
    config: Config,
    state: Arc<Mutex<IndexState>>,
}

impl ToolHandlers {
    pub fn new(config: Config) -> Self {
        let engine = HybridSearchEngine::from_config(&config);
        Self::with_engine(config, engine)
    }

    pub fn with_engine(config: Config, engine: HybridSearchEngine) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(IndexState {
                engine,
                last_updated: None,
            })),
        }
    }

    /// Apply the configured default and cap to a requested result count
    fn resolve_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.config.server.default_top_k)
            .min(self.config.server.max_top_k)
    }
}

/// Reject an empty list argument of a tool call
pub fn validate_non_empty<T>(items: &[T], what: &str) -> Result<()> {
    if items.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "No {} provided. Pass at least one entry.",
            what
        )));
    }

    Ok(())
}
