//! In-memory BM25 inverted index.
//!
//! Scores follow Okapi BM25:
//!
//! ```text
//! score(d, t) = IDF(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * |d| / avgdl))
//! IDF(t)      = ln(1 + (N - df + 0.5) / (df + 0.5))
//! ```
//!
//! The `1 +` inside the logarithm keeps IDF non-negative for terms that
//! appear in most documents.

use crate::config::Bm25Config;
use crate::text::term_frequencies;
use crate::types::{IndexStats, RankedHit};
use std::collections::HashMap;
use tracing::debug;

/// Tokenized projection of one indexed document
#[derive(Debug, Clone)]
struct IndexedDocument {
    term_freqs: HashMap<String, u32>,
    length: usize,
    /// Insertion sequence, used to break score ties
    seq: u64,
}

/// Inverted index with incremental add/remove.
///
/// The index is the only owner of its postings. It is not thread-safe;
/// callers that share it must serialize access.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Config,
    /// term -> (document id -> term frequency)
    postings: HashMap<String, HashMap<String, u32>>,
    documents: HashMap<String, IndexedDocument>,
    total_length: usize,
    avg_length: f32,
    next_seq: u64,
}

impl Bm25Index {
    pub fn new() -> Self {
        Self::with_params(Bm25Config::default())
    }

    pub fn with_params(params: Bm25Config) -> Self {
        Self {
            params,
            postings: HashMap::new(),
            documents: HashMap::new(),
            total_length: 0,
            avg_length: 0.0,
            next_seq: 0,
        }
    }

    pub fn params(&self) -> Bm25Config {
        self.params
    }

    /// Index a document, fully replacing any previous version with the same id.
    pub fn add_document(&mut self, id: &str, content: &str) {
        if self.documents.contains_key(id) {
            debug!("[BM25] Replacing existing document {}", id);
            self.remove_document(id);
        }

        let term_freqs = term_frequencies(content);
        let length: usize = term_freqs.values().map(|&tf| tf as usize).sum();

        for (term, &tf) in &term_freqs {
            self.postings
                .entry(term.clone())
                .or_default()
                .insert(id.to_string(), tf);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.documents.insert(
            id.to_string(),
            IndexedDocument {
                term_freqs,
                length,
                seq,
            },
        );
        self.total_length += length;
        self.refresh_stats();

        debug!(
            "[BM25] Indexed document {} ({} tokens, corpus size {})",
            id,
            length,
            self.documents.len()
        );
    }

    /// Remove a document. Unknown ids are ignored.
    pub fn remove_document(&mut self, id: &str) {
        let Some(doc) = self.documents.remove(id) else {
            return;
        };

        for term in doc.term_freqs.keys() {
            if let Some(posting) = self.postings.get_mut(term) {
                posting.remove(id);
                if posting.is_empty() {
                    self.postings.remove(term);
                }
            }
        }

        self.total_length -= doc.length;
        self.refresh_stats();

        debug!("[BM25] Removed document {} (corpus size {})", id, self.documents.len());
    }

    pub fn has_document(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// Number of indexed documents
    pub fn size(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn clear(&mut self) {
        self.postings.clear();
        self.documents.clear();
        self.total_length = 0;
        self.avg_length = 0.0;
        debug!("[BM25] Index cleared");
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_count: self.documents.len(),
            term_count: self.postings.len(),
            average_length: self.avg_length,
        }
    }

    /// Number of documents containing `term`
    pub fn document_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, HashMap::len)
    }

    /// Inverse document frequency of a term given the current corpus
    pub fn idf(&self, term: &str) -> f32 {
        let n = self.documents.len() as f32;
        let df = self.document_frequency(term) as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Rank documents against `query`, returning at most `top_k` hits.
    ///
    /// Documents sharing no term with the query never appear. Equal scores
    /// are ordered by insertion.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RankedHit> {
        if top_k == 0 || self.documents.is_empty() {
            return Vec::new();
        }

        // Each distinct query term counts once; sorted so float sums are reproducible
        let mut query_terms: Vec<String> = term_frequencies(query).into_keys().collect();
        query_terms.sort_unstable();
        if query_terms.is_empty() {
            return Vec::new();
        }

        let Bm25Config { k1, b } = self.params;
        let avg_length = if self.avg_length > 0.0 { self.avg_length } else { 1.0 };
        let mut scores: HashMap<&str, f32> = HashMap::new();

        for term in &query_terms {
            let Some(posting) = self.postings.get(term) else {
                continue;
            };
            let idf = self.idf(term);

            for (doc_id, &tf) in posting {
                let Some(doc) = self.documents.get(doc_id) else {
                    continue;
                };
                let tf = tf as f32;
                let norm = 1.0 - b + b * (doc.length as f32 / avg_length);
                let contribution = idf * tf * (k1 + 1.0) / (tf + k1 * norm);
                *scores.entry(doc_id.as_str()).or_insert(0.0) += contribution;
            }
        }

        let mut ranked: Vec<(&str, f32, u64)> = scores
            .into_iter()
            .filter_map(|(id, score)| self.documents.get(id).map(|doc| (id, score, doc.seq)))
            .collect();
        ranked.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.2.cmp(&y.2)));
        ranked.truncate(top_k);

        debug!(
            "[BM25] Query with {} terms matched {} documents",
            query_terms.len(),
            ranked.len()
        );

        ranked
            .into_iter()
            .map(|(id, score, _)| RankedHit::new(id, score))
            .collect()
    }

    fn refresh_stats(&mut self) {
        if self.documents.is_empty() {
            self.total_length = 0;
            self.avg_length = 0.0;
        } else {
            self.avg_length = self.total_length as f32 / self.documents.len() as f32;
        }
    }
}

impl Default for Bm25Index {
    fn default() -> Self {
        Self::new()
    }
}
