use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A document admitted to the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Build a document whose id is derived from its content.
    ///
    /// The id is the first 16 hex characters of the SHA-256 digest, so the
    /// same content always maps to the same id.
    pub fn from_content(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let hash = format!("{:x}", hasher.finalize());

        Self {
            id: hash[..16].to_string(),
            content,
        }
    }
}

/// One entry of a ranked list produced by a single retrieval signal.
///
/// Lists of these are always ordered best-first; the rank of an entry is
/// its 1-based position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedHit {
    pub id: String,
    pub score: f32,
}

impl RankedHit {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Retrieval signal that contributed to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Vector,
    Keyword,
    Sparse,
    Late,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Vector => "vector",
            Signal::Keyword => "keyword",
            Signal::Sparse => "sparse",
            Signal::Late => "late",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search result returned by keyword and hybrid search.
///
/// `score` is the BM25 score for keyword search and the fused score for
/// hybrid search. Per-signal raw scores are present only for the signals
/// that actually ranked this id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub id: String,
    pub score: f32,
    pub sources: Vec<Signal>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub vector_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub keyword_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sparse_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub late_interaction_score: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
}

impl ScoredResult {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            sources: Vec::new(),
            vector_score: None,
            keyword_score: None,
            sparse_score: None,
            late_interaction_score: None,
            content: None,
        }
    }

    pub fn has_source(&self, signal: Signal) -> bool {
        self.sources.contains(&signal)
    }

    /// Record the raw score a signal gave this id and tag the signal as a source.
    pub fn record_signal(&mut self, signal: Signal, raw_score: f32) {
        if !self.has_source(signal) {
            self.sources.push(signal);
        }
        let slot = match signal {
            Signal::Vector => &mut self.vector_score,
            Signal::Keyword => &mut self.keyword_score,
            Signal::Sparse => &mut self.sparse_score,
            Signal::Late => &mut self.late_interaction_score,
        };
        *slot = Some(raw_score);
    }
}

/// Anything carrying an id and a mutable relevance score
pub trait Scored {
    fn id(&self) -> &str;
    fn score(&self) -> f32;
    fn set_score(&mut self, score: f32);
}

impl Scored for RankedHit {
    fn id(&self) -> &str {
        &self.id
    }

    fn score(&self) -> f32 {
        self.score
    }

    fn set_score(&mut self, score: f32) {
        self.score = score;
    }
}

impl Scored for ScoredResult {
    fn id(&self) -> &str {
        &self.id
    }

    fn score(&self) -> f32 {
        self.score
    }

    fn set_score(&mut self, score: f32) {
        self.score = score;
    }
}

/// Corpus statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub document_count: usize,
    pub term_count: usize,
    pub average_length: f32,
}
